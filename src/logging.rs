//! Log setup: journald on Linux, a daily file otherwise.
//!
//! Nothing is written to the terminal, which belongs to command output.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `ALBUMIST_LOG=debug`.
pub const LOG_ENV: &str = "ALBUMIST_LOG";

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "albumist.log";

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where log records ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogBackend {
    Journald,
    File(PathBuf),
}

fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn file_writer(log_dir: &Path) -> Result<NonBlocking> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    // Dropping the guard stops the writer thread.
    let _ = FILE_GUARD.set(guard);
    Ok(writer)
}

/// Install the global subscriber. Call once, before anything logs.
///
/// `log_dir` is used for the file backend; it defaults to the platform's
/// local data directory.
pub fn init(log_dir: Option<PathBuf>) -> Result<LogBackend> {
    let filter = filter_from(std::env::var(LOG_ENV).ok().as_deref());

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(filter)
                .with(journald)
                .try_init()?;
            tracing::debug!("Logging to journald");
            return Ok(LogBackend::Journald);
        }
    }

    let log_dir = log_dir.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("albumist")
            .join("logs")
    });
    let writer = file_writer(&log_dir)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()?;

    tracing::debug!(dir = %log_dir.display(), "Logging to file");
    Ok(LogBackend::File(log_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_directives() {
        assert_eq!(
            filter_from(None).to_string(),
            EnvFilter::new(DEFAULT_FILTER).to_string()
        );
        assert_eq!(
            filter_from(Some("albumist=debug")).to_string(),
            EnvFilter::new("albumist=debug").to_string()
        );
    }
}
