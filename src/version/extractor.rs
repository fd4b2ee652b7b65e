//! Marker-anchored version extraction
//!
//! Finds the first `<marker><digits>.<digits>.<digits>` token in a blob of
//! text and returns the numeric part. The three-group shape is the default;
//! other arities are available through [`VersionExtractor::with_arity`].
//!
//! Only three groups are ever read by the default pattern: `PHP/7.4` does not
//! match at all, and `PHP/8.1.2.3` yields `8.1.2`.

use regex::Regex;
use tracing::warn;

use crate::version::error::ExtractError;

/// Marker preceding the PHP version in `X-Powered-By` style banners
pub const PHP_MARKER: &str = "PHP/";

/// Marker preceding the application version on its login page
pub const APPLICATION_MARKER: &str = "Version ";

/// Number of numeric groups matched unless configured otherwise
pub const DEFAULT_ARITY: usize = 3;

/// Extracts a dotted version that immediately follows a literal marker
#[derive(Debug, Clone)]
pub struct VersionExtractor {
    marker: String,
    arity: usize,
    pattern: Regex,
}

impl VersionExtractor {
    /// Creates an extractor matching exactly three numeric groups after `marker`
    pub fn new(marker: &str) -> Result<Self, ExtractError> {
        Self::with_arity(marker, DEFAULT_ARITY)
    }

    /// Creates an extractor matching `arity` numeric groups after `marker`
    ///
    /// The marker is matched literally; regex metacharacters in it are escaped.
    pub fn with_arity(marker: &str, arity: usize) -> Result<Self, ExtractError> {
        if arity == 0 {
            return Err(ExtractError::InvalidArity);
        }

        let mut version = String::from("[0-9]+");
        for _ in 1..arity {
            version.push_str(r"\.[0-9]+");
        }
        let pattern = Regex::new(&format!("{}({})", regex::escape(marker), version))?;

        Ok(Self {
            marker: marker.to_string(),
            arity,
            pattern,
        })
    }

    /// Extractor for PHP versions (`PHP/8.1.2`)
    pub fn php() -> Self {
        Self::new(PHP_MARKER).expect("PHP marker pattern is valid")
    }

    /// Extractor for application versions (`Version 1.2.22`)
    pub fn application() -> Self {
        Self::new(APPLICATION_MARKER).expect("application marker pattern is valid")
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Returns the version of the leftmost match, without the marker
    pub fn extract(&self, text: &str) -> Option<String> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Extracts a three-group version following `marker` from `text`
pub fn extract(text: &str, marker: &str) -> Option<String> {
    match VersionExtractor::new(marker) {
        Ok(extractor) => extractor.extract(text),
        Err(e) => {
            warn!("Cannot build extractor for marker '{}': {}", marker, e);
            None
        }
    }
}
