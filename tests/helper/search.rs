//! Search test utilities

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use banner_audit::search::client::HostSearch;
use banner_audit::search::error::SearchError;
use banner_audit::search::types::{HostRecord, SearchPage};

/// Build a host record with the given banner
pub fn host(ip: &str, data: &str) -> Value {
    json!({ "ip_str": ip, "port": 80, "data": data })
}

/// In-memory search service that records every page it is asked for
pub struct MockSearch {
    total: u64,
    pages: HashMap<u64, Vec<Value>>,
    requests: Mutex<Vec<u64>>,
}

impl MockSearch {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            pages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page(mut self, page: u64, matches: Vec<Value>) -> Self {
        self.pages.insert(page, matches);
        self
    }

    /// Pages requested so far, in order
    pub fn requests(&self) -> Vec<u64> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostSearch for MockSearch {
    async fn search(&self, _query: &str, page: u64) -> Result<SearchPage, SearchError> {
        self.requests.lock().unwrap().push(page);

        match self.pages.get(&page) {
            Some(matches) => Ok(SearchPage::new(
                matches
                    .iter()
                    .cloned()
                    .filter_map(HostRecord::from_value)
                    .collect(),
                self.total,
            )),
            None => Err(SearchError::Api {
                status: 404,
                message: format!("No page {}", page),
            }),
        }
    }
}
