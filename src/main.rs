use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use tracing::info;

use banner_audit::config::{
    self, API_KEY_ENV, DEFAULT_API_URL, DEFAULT_APP_THRESHOLD, DEFAULT_PHP_THRESHOLD,
    DEFAULT_QUERY, FETCH_TIMEOUT_SECS, ScanConfig,
};
use banner_audit::logging;
use banner_audit::scanner::{ScanReport, VulnerabilityScanner};
use banner_audit::search::shodan::ShodanClient;

#[derive(Parser, Debug)]
#[command(name = "banner-audit")]
#[command(
    version,
    about = "Count Shodan hosts whose banners advertise vulnerable application or PHP versions"
)]
struct Cli {
    /// Shodan search query
    #[arg(long, default_value = DEFAULT_QUERY)]
    query: String,

    /// Shodan API key
    #[arg(
        long,
        env = API_KEY_ENV,
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    api_key: String,

    /// Base URL of the Shodan API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Application versions strictly below this are counted as vulnerable
    #[arg(long, default_value = DEFAULT_APP_THRESHOLD)]
    app_threshold: String,

    /// PHP versions strictly below this are counted as vulnerable
    #[arg(long, default_value = DEFAULT_PHP_THRESHOLD)]
    php_threshold: String,

    /// Stop after this many result pages
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_pages: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = FETCH_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to the data directory instead of stderr
    #[arg(long)]
    log_file: bool,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            query: self.query.clone(),
            app_threshold: self.app_threshold.clone(),
            php_threshold: self.php_threshold.clone(),
            max_pages: self.max_pages,
        }
    }

    fn log_path(&self) -> Option<PathBuf> {
        self.log_file.then(config::log_path)
    }
}

async fn run(cli: &Cli) -> anyhow::Result<ScanReport> {
    let client = ShodanClient::with_timeout(
        &cli.api_url,
        &cli.api_key,
        Duration::from_secs(cli.timeout_secs),
    );
    let scanner = VulnerabilityScanner::new(Arc::new(client), &cli.scan_config());

    let report = scanner.scan().await?;
    info!(
        "Scan finished: {} of {} hosts flagged ({} examined, {} pages)",
        report.vulnerable, report.total, report.hosts_examined, report.pages_fetched
    );

    Ok(report)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose, cli.log_path().as_deref())?;

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(&cli));

    match result {
        Ok(report) => {
            println!("Possible vulnerable {} of {}", report.vulnerable, report.total);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("Scan failed: {:#}", e);
            println!("Error: {:#}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
