//! Package registry clients.
//!
//! The [`Registry`] trait is the seam between the scanner and the network:
//! [`NpmRegistry`] talks to an npm-compatible HTTP registry, tests swap in a
//! mock.

mod npm;

pub use npm::{NpmRegistry, DEFAULT_REGISTRY_URL};

use crate::error::ScanError;
use crate::model::PackageRecord;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Fetches validated package metadata from a registry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Registry: Send + Sync {
    /// Fetches the full record for `package`.
    ///
    /// # Errors
    ///
    /// Transport failures and non-success statuses surface as
    /// [`ScanError::Transport`]; a malformed body as [`ScanError::Parse`];
    /// a body with the wrong shape as [`ScanError::Validation`].
    async fn fetch_package(&self, package: &str) -> Result<PackageRecord, ScanError>;
}
