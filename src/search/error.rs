use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Network error")]
    Network(#[source] reqwest::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Request URLs carry the API key as a query parameter, so it is stripped
/// before the error can reach output or logs.
impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        SearchError::Network(e.without_url())
    }
}
