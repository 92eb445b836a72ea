use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the snapshot store.
///
/// A missing snapshot is not an error; `load` and `delete` report it through
/// their return values.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("snapshot {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SnapshotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
