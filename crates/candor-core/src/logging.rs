//! Tracing subscriber setup.
//!
//! One-shot commands log to stderr. The feed view owns the terminal, so it
//! logs to `$CANDOR_HOME/logs/candor.log` instead (or nowhere when
//! `log.file = false`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LogConfig;

/// Environment variable holding an `EnvFilter` directive; wins over `log.level`.
pub const LOG_ENV: &str = "CANDOR_LOG";

const LOG_FILE_NAME: &str = "candor.log";

fn build_filter(from_env: Option<String>, level: &str) -> EnvFilter {
    from_env
        .filter(|directive| !directive.trim().is_empty())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn filter_for(config: &LogConfig) -> EnvFilter {
    build_filter(std::env::var(LOG_ENV).ok(), &config.level)
}

/// Installs a stderr subscriber.
pub fn init_stderr(config: &LogConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter_for(config))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("Failed to install stderr logger")
}

/// Installs a non-blocking file subscriber writing into `dir`.
///
/// The returned guard flushes pending lines on drop and must be held until
/// the program exits. Returns `None` when file logging is disabled.
pub fn init_file(config: &LogConfig, dir: &Path) -> Result<Option<WorkerGuard>> {
    if !config.file {
        return Ok(None);
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter_for(config))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install file logger")?;

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_directive_wins_over_config() {
        let filter = build_filter(Some("candor_core=debug".into()), "warn");
        assert_eq!(filter.to_string(), "candor_core=debug");
    }

    #[test]
    fn test_blank_env_falls_back_to_config() {
        let filter = build_filter(Some("  ".into()), "info");
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_disabled_file_logging_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            level: "info".into(),
            file: false,
        };

        let guard = init_file(&config, &dir.path().join("logs")).unwrap();
        assert!(guard.is_none());
        assert!(!dir.path().join("logs").exists());
    }
}
