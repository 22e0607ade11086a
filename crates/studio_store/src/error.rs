use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize unit '{unit}': {source}")]
    JsonSerialize {
        unit: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unit store lock was poisoned while {operation}")]
    Poisoned { operation: &'static str },
}

impl StoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_serialize(unit: &'static str, source: serde_json::Error) -> Self {
        Self::JsonSerialize { unit, source }
    }
}
