//! Tracing setup for the `fmd` binary.
//!
//! Events go to `$XDG_STATE_HOME/fmd/fmd.log`, or to stderr when that file
//! cannot be opened. The filter is `RUST_LOG` when set, else the config's
//! `log_filter`, else [`DEFAULT_FILTER`].

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "info,fmd=debug,fmd_core=debug";

pub const LOG_FILE: &str = "fmd.log";

/// Where log events are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    File(PathBuf),
    Stderr,
}

/// Pick the filter directive. An unparseable directive falls through to the next source.
pub fn filter_directive(env: Option<&str>, configured: Option<&str>) -> String {
    [env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|d| !d.is_empty() && EnvFilter::try_new(d).is_ok())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Path of the log file under the XDG state dir (parent created).
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fmd")?;
    Ok(xdg_dirs.place_state_file(LOG_FILE)?)
}

fn open_log_file() -> Result<(PathBuf, File)> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    Ok((path, file))
}

/// Install the global subscriber and report which sink it writes to.
/// Never fails: a log file that cannot be opened means stderr.
pub fn init(configured_filter: Option<&str>) -> LogSink {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::new(filter_directive(env.as_deref(), configured_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    match open_log_file() {
        Ok((path, file)) => {
            builder.with_writer(Mutex::new(file)).init();
            tracing::info!("fmd logging initialized at {}", path.display());
            LogSink::File(path)
        }
        Err(e) => {
            builder.with_writer(std::io::stderr).init();
            tracing::warn!("file logging unavailable, using stderr: {:#}", e);
            LogSink::Stderr
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_wins_over_config() {
        assert_eq!(filter_directive(Some("warn"), Some("trace")), "warn");
    }

    #[test]
    fn config_used_when_env_unset_or_blank() {
        assert_eq!(filter_directive(None, Some("fmd_core=trace")), "fmd_core=trace");
        assert_eq!(filter_directive(Some("  "), Some("error")), "error");
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(filter_directive(None, None), DEFAULT_FILTER);
        assert_eq!(filter_directive(Some("fmd=loud"), None), DEFAULT_FILTER);
    }
}
