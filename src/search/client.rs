//! Search trait for fetching host matches page by page

#[cfg(test)]
use mockall::automock;

use crate::search::error::SearchError;
use crate::search::types::SearchPage;

/// Trait for querying a host search service
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait HostSearch: Send + Sync {
    /// Fetches one page of hosts matching `query`
    ///
    /// # Arguments
    /// * `query` - Search query in the service's filter syntax (e.g., "cacti country:RU")
    /// * `page` - 1-based page number
    ///
    /// # Returns
    /// * `Ok(SearchPage)` - Matches on this page and the total across all pages
    /// * `Err(SearchError)` - If the request or decoding fails
    async fn search(&self, query: &str, page: u64) -> Result<SearchPage, SearchError>;
}
