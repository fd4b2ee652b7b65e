//! Component-wise comparison of dotted version strings
//!
//! Versions are split on `.` and compared as integers, left to right. When
//! one version is a prefix of the other, the longer one is greater
//! (`1.2.3.1 > 1.2.3`).
//!
//! Parsing is permissive: a component that is not an integer counts as `0`,
//! so `1.x.3` equals `1.0.3`. This may hide malformed input and ordering is
//! only guaranteed transitive for well-formed dotted integers.

use std::cmp::Ordering;
use std::num::IntErrorKind;

/// Outcome of comparing a first version against a second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonResult {
    FirstGreater,
    Equal,
    SecondGreater,
}

impl ComparisonResult {
    /// Numeric encoding: 1, 0 or -1
    pub fn as_i32(self) -> i32 {
        match self {
            ComparisonResult::FirstGreater => 1,
            ComparisonResult::Equal => 0,
            ComparisonResult::SecondGreater => -1,
        }
    }
}

impl From<Ordering> for ComparisonResult {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Greater => ComparisonResult::FirstGreater,
            Ordering::Equal => ComparisonResult::Equal,
            Ordering::Less => ComparisonResult::SecondGreater,
        }
    }
}

/// Parse a single version component.
///
/// Accepts an optional sign like a plain integer parse. Values beyond the
/// `i64` range saturate; anything else that is not an integer is `0`.
fn parse_component(component: &str) -> i64 {
    match component.parse::<i64>() {
        Ok(n) => n,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => 0,
        },
    }
}

/// Split a version into its integer components
///
/// Examples:
/// - "1.2.22" -> [1, 2, 22]
/// - "8.0" -> [8, 0]
/// - "1.beta.3" -> [1, 0, 3]
pub fn parse_components(version: &str) -> Vec<i64> {
    version.split('.').map(parse_component).collect()
}

/// Compare two dotted versions
pub fn compare_versions(first: &str, second: &str) -> ComparisonResult {
    let first = parse_components(first);
    let second = parse_components(second);

    for (a, b) in first.iter().zip(second.iter()) {
        match a.cmp(b) {
            Ordering::Equal => continue,
            other => return other.into(),
        }
    }

    first.len().cmp(&second.len()).into()
}

/// Whether `version` is strictly older than `threshold`
pub fn is_older_than(version: &str, threshold: &str) -> bool {
    compare_versions(version, threshold) == ComparisonResult::SecondGreater
}
