pub mod config;
pub mod logging;
pub mod scanner;
pub mod search;
pub mod version;
