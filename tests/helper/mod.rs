//! Shared test utilities

pub mod search;

pub use search::{MockSearch, host};
