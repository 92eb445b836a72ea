//! Structured logging setup shared by ferroscore binaries.
//!
//! Logs go to stderr so command output on stdout stays machine readable.
//! `RUST_LOG` overrides the level passed in.

use std::str::FromStr;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected pretty or json")),
        }
    }
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Installs the global subscriber. Repeated calls are ignored.
pub fn init_logging(log_level: &str, format: LogFormat) {
    let subscriber = tracing_subscriber::registry().with(build_filter(log_level));

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true);
            let _ = subscriber.with(layer).try_init();
        }
        LogFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);
            let _ = subscriber.with(layer).try_init();
        }
    }

    tracing::debug!(log_level, ?format, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_formats() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("Pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn repeated_initialization_is_harmless() {
        init_logging("warn", LogFormat::Pretty);
        init_logging("debug", LogFormat::Json);
    }
}
