//! Tracing subscriber setup for the CLI

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "banner_audit=debug,info"
    } else {
        "banner_audit=info,warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Open `path` for appending, creating its directory first
fn file_writer(path: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let file_name = path
        .file_name()
        .with_context(|| format!("Log path {} has no file name", path.display()))?;
    let appender = tracing_appender::rolling::never(dir, file_name);

    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber.
///
/// Logs go to stderr in compact form, leaving stdout for the result line.
/// With `log_file` they are written as JSON lines to that file instead; keep
/// the returned guard alive until exit so buffered lines are flushed.
pub fn init(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = env_filter(verbose);

    match log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .json(),
                )
                .try_init()
                .context("Failed to install log subscriber")?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .compact(),
                )
                .try_init()
                .context("Failed to install log subscriber")?;
            Ok(None)
        }
    }
}
