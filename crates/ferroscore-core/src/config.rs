//! Runtime configuration for scoring runs, snapshots, quotas and the job pool.
//!
//! Resolution order for the config file:
//! 1. an explicit path (`--config`)
//! 2. `$FERROSCORE_HOME/ferroscore.toml`
//! 3. `~/.ferroscore/ferroscore.toml`
//!
//! A missing file at 2 or 3 falls back to [`Config::default`]. The
//! `FERROSCORE_SNAPSHOT_DIR` environment variable overrides `snapshot_dir`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregation::MissingPillarPolicy;
use crate::{ConfigError, RecommendationThresholds, WeightSet};

pub const CONFIG_FILE_NAME: &str = "ferroscore.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for ferroscore data.
    pub home: PathBuf,
    /// Directory holding `snapshot_<date>.json` files.
    pub snapshot_dir: PathBuf,
    pub weights: WeightSet,
    pub thresholds: RecommendationThresholds,
    pub missing_pillars: MissingPillarPolicy,
    pub rate_limit: RateLimitConfig,
    pub jobs: JobPoolConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home = resolve_ferroscore_home();
        let snapshot_dir = home.join("snapshots");
        Self {
            home,
            snapshot_dir,
            weights: WeightSet::default(),
            thresholds: RecommendationThresholds::default(),
            missing_pillars: MissingPillarPolicy::default(),
            rate_limit: RateLimitConfig::default(),
            jobs: JobPoolConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration using the documented resolution order.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidate = resolve_ferroscore_home().join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(dir) = env::var_os("FERROSCORE_SNAPSHOT_DIR") {
            if !dir.is_empty() {
                config.snapshot_dir = PathBuf::from(dir);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights
            .validate()
            .map_err(|error| ConfigError::Invalid(error.to_string()))?;
        self.thresholds
            .validate()
            .map_err(|error| ConfigError::Invalid(error.to_string()))?;
        if self.rate_limit.calls == 0 {
            return Err(ConfigError::Invalid(String::from(
                "rate_limit.calls must be greater than zero",
            )));
        }
        if !self.rate_limit.period_secs.is_finite() || self.rate_limit.period_secs <= 0.0 {
            return Err(ConfigError::Invalid(String::from(
                "rate_limit.period_secs must be greater than zero",
            )));
        }
        if self.jobs.workers == 0 || self.jobs.queue_capacity == 0 {
            return Err(ConfigError::Invalid(String::from(
                "jobs.workers and jobs.queue_capacity must be greater than zero",
            )));
        }
        Ok(())
    }
}

/// Admission strategy for outbound provider calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitStrategy {
    /// Hard cap of `calls` in any trailing `period`.
    #[default]
    SlidingWindow,
    /// GCRA spacing of the same budget.
    Smoothed,
}

/// Quota of `calls` per `period_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub calls: u32,
    pub period_secs: f64,
    pub strategy: RateLimitStrategy,
}

impl Default for RateLimitConfig {
    /// Free-tier fundamentals APIs allow roughly five calls a minute.
    fn default() -> Self {
        Self {
            calls: 5,
            period_secs: 60.0,
            strategy: RateLimitStrategy::SlidingWindow,
        }
    }
}

impl RateLimitConfig {
    pub fn new(calls: u32, period: Duration) -> Self {
        Self {
            calls,
            period_secs: period.as_secs_f64(),
            strategy: RateLimitStrategy::SlidingWindow,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::try_from_secs_f64(self.period_secs).unwrap_or(Duration::ZERO)
    }
}

/// Sizing of the background worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for JobPoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 32,
        }
    }
}

fn resolve_ferroscore_home() -> PathBuf {
    if let Some(path) = env::var_os("FERROSCORE_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".ferroscore");
    }

    PathBuf::from(".ferroscore")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.snapshot_dir.ends_with("snapshots"));
        assert_eq!(config.rate_limit.period(), Duration::from_secs(60));
    }

    #[test]
    fn parses_partial_toml_over_defaults() {
        let config = Config::from_toml_str(
            r#"
            snapshot_dir = "/tmp/ferroscore-snapshots"
            missing_pillars = "renormalize"

            [weights]
            fundamental = 0.5
            technical = 0.3
            sentiment = 0.2

            [rate_limit]
            calls = 10
            period_secs = 1.5
            strategy = "smoothed"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.snapshot_dir, PathBuf::from("/tmp/ferroscore-snapshots"));
        assert_eq!(config.weights, WeightSet::new(0.5, 0.3, 0.2));
        assert_eq!(config.missing_pillars, MissingPillarPolicy::Renormalize);
        assert_eq!(config.rate_limit.calls, 10);
        assert_eq!(config.rate_limit.period(), Duration::from_millis(1500));
        assert_eq!(config.rate_limit.strategy, RateLimitStrategy::Smoothed);
        assert_eq!(config.jobs, JobPoolConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unnormalized_weights() {
        let config = Config::from_toml_str(
            r#"
            [weights]
            fundamental = 0.9
            technical = 0.9
            sentiment = 0.9
            "#,
        )
        .expect("config should parse");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[jobs]\nworkers = 2\nqueue_capacity = 8\n").expect("write config");

        let config = Config::from_file(&path).expect("config should load");
        assert_eq!(config.jobs.workers, 2);
        assert_eq!(config.jobs.queue_capacity, 8);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::from_file(Path::new("/nonexistent/ferroscore.toml"))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
