//! Host search collaborator
//!
//! - [`client`]: `HostSearch` trait for fetching one page of matches
//! - [`shodan`]: Shodan REST API implementation
//! - [`types`]: `HostRecord` and `SearchPage`
//! - [`error`]: Error types for search requests

pub mod client;
pub mod error;
pub mod shodan;
pub mod types;
