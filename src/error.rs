use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a manifest, talking to the registry, or
/// comparing versions. Every variant is fatal to the check that hit it.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {context}: {source}")]
    Parse {
        context: String,
        source: serde_json::Error,
    },

    #[error("Invalid {subject}: {}", violations.join("; "))]
    Validation {
        subject: String,
        violations: Vec<String>,
    },

    #[error("Invalid version format. version: {0}")]
    VersionFormat(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ScanError {
    pub(crate) fn validation(subject: impl Into<String>, violations: Vec<String>) -> Self {
        ScanError::Validation {
            subject: subject.into(),
            violations,
        }
    }
}
