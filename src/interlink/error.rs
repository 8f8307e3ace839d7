use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterlinkError {
    #[error("Invalid orbital elements: {0}")]
    InvalidOrbitalElements(String),
    #[error("Invalid scan config: {0}")]
    InvalidScanConfig(String),
    #[error("Propagation error at {timestamp}: {message}")]
    Propagation {
        timestamp: DateTime<Utc>,
        message: String,
    },
}

impl InterlinkError {
    pub fn propagation(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        InterlinkError::Propagation {
            timestamp,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE in {file}: {source}")]
    InvalidTle {
        file: String,
        source: InterlinkError,
    },
}
