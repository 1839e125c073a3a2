//! File logging for the terminal UI
//!
//! The terminal belongs to the UI, so everything goes to a daily file
//! (`pinai.log.YYYY-MM-DD`). The directory comes from `log_dir` in the
//! config, defaulting to `~/.local/share/pinai/logs/`. Verbosity comes from
//! `PINAI_LOG`, then `log_filter` in the config.
//!
//! ```bash
//! PINAI_LOG=debug pinai
//! PINAI_LOG=pinai_core=trace pinai
//! ```

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::error::Result;

pub const LOG_ENV: &str = "PINAI_LOG";
const LOG_FILE_PREFIX: &str = "pinai.log";
const DEFAULT_FILTER: &str = "pinai_tui=info,pinai_core=info,warn";

/// Install the global subscriber and return the directory being written to.
pub fn init(config: &Config) -> Result<PathBuf> {
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let directives = filter_directives(std::env::var(LOG_ENV).ok(), config.log_filter.as_deref());
    let env_filter =
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string())),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dir = %log_dir.display(),
        filter = %directives,
        "Pin Ai starting"
    );
    Ok(log_dir)
}

pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pinai")
        .join("logs")
}

/// The environment wins over the config; blank values count as unset.
fn filter_directives(env: Option<String>, configured: Option<&str>) -> String {
    env.filter(|v| !v.trim().is_empty())
        .or_else(|| configured.map(str::trim).filter(|v| !v.is_empty()).map(String::from))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_precedence() {
        assert_eq!(filter_directives(None, None), DEFAULT_FILTER);
        assert_eq!(filter_directives(None, Some("pinai_core=debug")), "pinai_core=debug");
        assert_eq!(
            filter_directives(Some("trace".into()), Some("pinai_core=debug")),
            "trace"
        );
        assert_eq!(filter_directives(Some(" ".into()), Some("  ")), DEFAULT_FILTER);
    }

    #[test]
    fn test_default_dir_is_app_scoped() {
        assert!(default_log_dir().ends_with("pinai/logs"));
    }
}
