use std::path::PathBuf;

/// Default base URL for the Shodan REST API
pub const DEFAULT_API_URL: &str = "https://api.shodan.io";

/// Environment variable holding the Shodan API key
pub const API_KEY_ENV: &str = "SHODAN_API_KEY";

/// Search query used when none is given
pub const DEFAULT_QUERY: &str = "cacti country:RU";

/// Number of matches Shodan returns per search page
pub const PAGE_SIZE: u64 = 100;

/// Application versions strictly below this are considered vulnerable
pub const DEFAULT_APP_THRESHOLD: &str = "1.2.23";

/// PHP versions strictly below this are considered vulnerable
pub const DEFAULT_PHP_THRESHOLD: &str = "8.0.0";

/// Timeout for a single search request in seconds
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Settings for a single scan run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub query: String,
    pub app_threshold: String,
    pub php_threshold: String,
    /// Upper bound on page requests; `None` walks every page
    pub max_pages: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            app_threshold: DEFAULT_APP_THRESHOLD.to_string(),
            php_threshold: DEFAULT_PHP_THRESHOLD.to_string(),
            max_pages: None,
        }
    }
}

/// Returns the path to the data directory for banner-audit.
/// Uses $XDG_DATA_HOME/banner-audit if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/banner-audit,
/// or ./banner-audit if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("banner-audit.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("banner-audit")
}
