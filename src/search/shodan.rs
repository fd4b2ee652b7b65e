//! Shodan host search API implementation

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FETCH_TIMEOUT_SECS;
use crate::search::client::HostSearch;
use crate::search::error::SearchError;
use crate::search::types::{HostRecord, SearchPage};

/// Response from `/shodan/host/search`
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<Value>,
    #[serde(default)]
    total: u64,
    error: Option<String>,
}

/// Error body Shodan sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Search implementation for the Shodan REST API
pub struct ShodanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ShodanClient {
    /// Creates a new ShodanClient with a custom base URL
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_timeout(base_url, api_key, Duration::from_secs(FETCH_TIMEOUT_SECS))
    }

    /// Creates a new ShodanClient whose requests give up after `timeout`
    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("banner-audit")
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn search_url(&self, query: &str, page: u64) -> Result<Url, SearchError> {
        let endpoint = format!("{}/shodan/host/search", self.base_url);
        let page = page.to_string();

        Url::parse_with_params(
            &endpoint,
            &[
                ("key", self.api_key.as_str()),
                ("query", query),
                ("page", page.as_str()),
            ],
        )
        .map_err(|e| SearchError::InvalidUrl(format!("'{}': {}", self.base_url, e)))
    }

    /// Pulls the `error` message out of a Shodan error body, or falls back to the raw body
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.trim().to_string())
    }
}

#[async_trait::async_trait]
impl HostSearch for ShodanClient {
    async fn search(&self, query: &str, page: u64) -> Result<SearchPage, SearchError> {
        let url = self.search_url(query, page)?;
        debug!("Searching Shodan page {} for '{}'", page, query);

        let response = self.client.get(url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(SearchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(SearchError::Unauthorized(Self::error_message(&body)));
        }

        if !status.is_success() {
            warn!("Shodan returned status {} for page {}", status, page);
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: Self::error_message(&body),
            });
        }

        let data: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse Shodan search response: {}", e);
            SearchError::InvalidResponse(e.to_string())
        })?;

        if let Some(message) = data.error {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let received = data.matches.len();
        let matches: Vec<HostRecord> = data
            .matches
            .into_iter()
            .filter_map(HostRecord::from_value)
            .collect();

        if matches.len() < received {
            debug!(
                "Skipped {} non-object matches on page {}",
                received - matches.len(),
                page
            );
        }

        Ok(SearchPage::new(matches, data.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn search_query(page: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), "test-key".into()),
            Matcher::UrlEncoded("query".into(), "cacti country:RU".into()),
            Matcher::UrlEncoded("page".into(), page.into()),
        ])
    }

    #[tokio::test]
    async fn search_returns_matches_and_total() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/shodan/host/search")
            .match_query(search_query("2"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "matches": [
                        {"ip_str": "192.0.2.1", "port": 80, "data": "X-Powered-By: PHP/7.4.3"},
                        {"ip_str": "192.0.2.2", "port": 443, "data": "Version 1.2.24"}
                    ],
                    "total": 150
                }"#,
            )
            .create_async()
            .await;

        let client = ShodanClient::new(&server.url(), "test-key");
        let result = client.search("cacti country:RU", 2).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.total, 150);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].ip_str(), Some("192.0.2.1"));
        assert_eq!(result.matches[1].banner(), Some("Version 1.2.24"));
    }

    #[tokio::test]
    async fn search_drops_non_object_matches() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/shodan/host/search")
            .match_query(search_query("1"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"matches": ["junk", 42, {"port": 80}], "total": 3}"#)
            .create_async()
            .await;

        let client = ShodanClient::new(&server.url(), "test-key");
        let result = client.search("cacti country:RU", 1).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.total, 3);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].port(), Some(80));
    }

    #[tokio::test]
    async fn search_returns_unauthorized_for_401() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/shodan/host/search")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Please provide a valid API key."}"#)
            .create_async()
            .await;

        let client = ShodanClient::new(&server.url(), "test-key");
        let result = client.search("cacti country:RU", 1).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(SearchError::Unauthorized(ref message)) if message == "Please provide a valid API key."
        ));
    }

    #[tokio::test]
    async fn search_returns_rate_limited_for_429() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/shodan/host/search")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "60")
            .with_body(r#"{"error": "Rate limit reached"}"#)
            .create_async()
            .await;

        let client = ShodanClient::new(&server.url(), "test-key");
        let result = client.search("cacti country:RU", 1).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(SearchError::RateLimited {
                retry_after_secs: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn search_returns_api_error_with_plain_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/shodan/host/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("upstream failure\n")
            .create_async()
            .await;

        let client = ShodanClient::new(&server.url(), "test-key");
        let result = client.search("cacti country:RU", 1).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(SearchError::Api { status: 500, ref message }) if message == "upstream failure"
        ));
    }

    #[tokio::test]
    async fn search_returns_api_error_for_error_field_in_success_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/shodan/host/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Invalid search query"}"#)
            .create_async()
            .await;

        let client = ShodanClient::new(&server.url(), "test-key");
        let result = client.search("cacti country:RU", 1).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(SearchError::Api { status: 200, ref message }) if message == "Invalid search query"
        ));
    }

    #[tokio::test]
    async fn search_returns_invalid_response_for_malformed_json() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/shodan/host/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{not json")
            .create_async()
            .await;

        let client = ShodanClient::new(&server.url(), "test-key");
        let result = client.search("cacti country:RU", 1).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(SearchError::InvalidResponse(_))));
    }

    #[test]
    fn search_url_escapes_query() {
        let client = ShodanClient::new("https://api.example.test/", "k&y");
        let url = client.search_url("cacti country:RU", 3).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.example.test/shodan/host/search?key=k%26y&query=cacti+country%3ARU&page=3"
        );
    }

    /// Address of a port that was just released, so connecting is refused
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn network_error_does_not_reveal_api_key() {
        let client = ShodanClient::new(&closed_port_url(), "SUPERSECRETKEY");
        let err = client.search("cacti country:RU", 1).await.unwrap_err();

        assert!(matches!(err, SearchError::Network(_)));
        let message = format!("Error: {:#}", anyhow::Error::from(err));
        assert!(!message.contains("SUPERSECRETKEY"), "{message}");
        assert!(!message.contains("key="), "{message}");
        assert_eq!(message.matches("Network error").count(), 1, "{message}");
    }

    #[tokio::test]
    async fn search_returns_invalid_url_for_unparseable_base_url() {
        let client = ShodanClient::new("not a url", "test-key");
        let result = client.search("cacti country:RU", 1).await;

        assert!(matches!(
            result,
            Err(SearchError::InvalidUrl(ref message)) if message.starts_with("'not a url'")
        ));
    }
}
