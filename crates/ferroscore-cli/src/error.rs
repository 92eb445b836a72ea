use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ferroscore_core::ValidationError),

    #[error(transparent)]
    Aggregation(#[from] ferroscore_core::AggregationError),

    #[error(transparent)]
    Config(#[from] ferroscore_core::ConfigError),

    #[error("invalid input file {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Snapshot(#[from] ferroscore_snapshot::SnapshotError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Aggregation(_) => 2,
            Self::Config(_) => 2,
            Self::Input { .. } => 2,
            Self::NotFound(_) => 3,
            Self::Snapshot(_) => 10,
            Self::Serialization(_) => 10,
            Self::Io(_) => 10,
        }
    }
}
