//! Paginated scan that counts hosts advertising vulnerable versions

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{PAGE_SIZE, ScanConfig};
use crate::search::client::HostSearch;
use crate::search::error::SearchError;
use crate::search::types::{HostRecord, SearchPage};
use crate::version::compare::is_older_than;
use crate::version::extractor::VersionExtractor;

/// A version source paired with the first version that is no longer vulnerable
#[derive(Debug, Clone)]
pub struct VersionRule {
    pub extractor: VersionExtractor,
    pub vulnerable_below: String,
}

impl VersionRule {
    pub fn new(extractor: VersionExtractor, vulnerable_below: &str) -> Self {
        Self {
            extractor,
            vulnerable_below: vulnerable_below.to_string(),
        }
    }

    /// Extracts the version from `text`
    ///
    /// Returns the version and whether it falls below the threshold.
    /// `None` when the text carries no version for this rule.
    pub fn evaluate(&self, text: &str) -> Option<(String, bool)> {
        let version = self.extractor.extract(text)?;
        let vulnerable = is_older_than(&version, &self.vulnerable_below);
        Some((version, vulnerable))
    }
}

/// Versions found on a single host and the resulting verdict
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostAssessment {
    pub app_version: Option<String>,
    pub runtime_version: Option<String>,
    pub vulnerable: bool,
}

/// Outcome of a complete scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanReport {
    /// Hosts flagged by at least one rule
    pub vulnerable: u64,
    /// Total matches reported by the search service
    pub total: u64,
    pub pages_fetched: u64,
    pub hosts_examined: u64,
}

/// Number of pages needed to cover `total` results
pub fn page_count(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size.max(1))
}

/// Walks every search page and tallies hosts below either version threshold
pub struct VulnerabilityScanner {
    search: Arc<dyn HostSearch>,
    query: String,
    max_pages: Option<u64>,
    app_rule: VersionRule,
    runtime_rule: VersionRule,
}

impl VulnerabilityScanner {
    /// Scanner using the application and PHP markers with the configured thresholds
    pub fn new(search: Arc<dyn HostSearch>, config: &ScanConfig) -> Self {
        Self::with_rules(
            search,
            config,
            VersionRule::new(VersionExtractor::application(), &config.app_threshold),
            VersionRule::new(VersionExtractor::php(), &config.php_threshold),
        )
    }

    pub fn with_rules(
        search: Arc<dyn HostSearch>,
        config: &ScanConfig,
        app_rule: VersionRule,
        runtime_rule: VersionRule,
    ) -> Self {
        Self {
            search,
            query: config.query.clone(),
            max_pages: config.max_pages,
            app_rule,
            runtime_rule,
        }
    }

    /// Check one host against both rules
    pub fn assess(&self, host: &HostRecord) -> HostAssessment {
        let text = host.flatten();
        let mut assessment = HostAssessment::default();

        if let Some((version, vulnerable)) = self.app_rule.evaluate(&text) {
            assessment.app_version = Some(version);
            assessment.vulnerable |= vulnerable;
        }

        if let Some((version, vulnerable)) = self.runtime_rule.evaluate(&text) {
            assessment.runtime_version = Some(version);
            assessment.vulnerable |= vulnerable;
        }

        assessment
    }

    /// Run the scan.
    ///
    /// Page 1 is fetched first to learn the total; its matches are reused and
    /// the remaining pages are requested in order. Any search error aborts
    /// the scan and no partial report is returned.
    pub async fn scan(&self) -> Result<ScanReport, SearchError> {
        let first = self.search.search(&self.query, 1).await?;
        let total = first.total;

        let mut pages = page_count(total, PAGE_SIZE);
        if let Some(max) = self.max_pages {
            pages = pages.min(max.max(1));
        }
        info!(
            "Query '{}' matched {} hosts across {} pages",
            self.query, total, pages
        );

        let mut report = ScanReport {
            total,
            pages_fetched: 1,
            ..ScanReport::default()
        };

        if pages == 0 {
            return Ok(report);
        }

        self.tally(&first, &mut report);
        info!("Processed page 1/{} ({} hosts)", pages, first.matches.len());

        for page in 2..=pages {
            let results = self.search.search(&self.query, page).await?;
            report.pages_fetched += 1;
            self.tally(&results, &mut report);
            info!(
                "Processed page {}/{} ({} hosts)",
                page,
                pages,
                results.matches.len()
            );
        }

        Ok(report)
    }

    fn tally(&self, page: &SearchPage, report: &mut ScanReport) {
        for host in &page.matches {
            let assessment = self.assess(host);
            report.hosts_examined += 1;

            if assessment.vulnerable {
                report.vulnerable += 1;
                debug!(
                    "Possibly vulnerable host {} (app: {:?}, php: {:?})",
                    host.label(),
                    assessment.app_version,
                    assessment.runtime_version
                );
            }
        }
    }
}
