use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::model::Manifest;

pub const MANIFEST_FILE: &str = "package.json";

pub fn manifest_path(project: &Path) -> PathBuf {
    project.join(MANIFEST_FILE)
}

/// Reads and validates `<project>/package.json`.
pub fn load_manifest(project: &Path) -> Result<Manifest, ScanError> {
    let path = manifest_path(project);
    let subject = format!("package.json at {}", project.display());

    let content = fs::read_to_string(&path).map_err(|source| ScanError::Io {
        path: path.clone(),
        source,
    })?;

    let value = serde_json::from_str(&content).map_err(|source| ScanError::Parse {
        context: subject.clone(),
        source,
    })?;

    Manifest::from_value(&subject, value)
}
