use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter for a `-v` count. `RUST_LOG` wins unless `quiet` is set.
fn build_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    let filter_str = match verbose_level {
        0 => "info",
        // -v: debug for our crates, keep the HTTP stack quiet
        1 => "debug,hyper=warn,reqwest=warn,rustls=warn",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str))
}

/// Daily rolling appender for `log_path`: "nowwatching.log" rotates as "nowwatching.2026-01-17".
fn rolling_appender(log_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = log_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
    std::fs::create_dir_all(log_dir)?;

    let log_filename = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;
    let log_prefix = log_filename.rsplitn(2, '.').nth(1).unwrap_or(log_filename);

    Ok(RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix))
}

fn file_layer<S>(
    writer: RollingFileAppender,
) -> fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format<fmt::format::Full, ChronoUtc>, RollingFileAppender>
{
    fmt::layer()
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false)
        .with_writer(writer)
}

/// Logs always go to stderr; with `log_file` they are also written to the rolling file.
pub fn init_logging(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let stderr_layer = fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr);
    let file_writer = match log_file {
        Some(path) => Some(rolling_appender(&path)?),
        None => None,
    };

    let registry = Registry::default().with(build_filter(verbose_level, quiet));
    if json {
        registry
            .with(stderr_layer.json())
            .with(file_writer.map(|w| file_layer(w).json()))
            .init();
    } else {
        registry
            .with(stderr_layer)
            .with(file_writer.map(file_layer))
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rolling_appender_creates_log_dir() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("logs").join("nowwatching.log");
        rolling_appender(&log_path).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_rolling_appender_rejects_bare_root() {
        assert!(rolling_appender(Path::new("/")).is_err());
    }
}
