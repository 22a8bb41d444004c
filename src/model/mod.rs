//! Core data types for manifests, registry records, and findings.
//!
//! - [`Manifest`] - A project's `package.json`
//! - [`PackageRecord`] - Registry metadata for a single package
//! - [`Finding`] - A problem reported for a dependency
//!
//! # Example
//!
//! ```
//! use depscan::Finding;
//!
//! let finding = Finding::NewMajor {
//!     name: "bar".to_string(),
//!     current: "^1.0.0".to_string(),
//!     latest: "2.0.0".to_string(),
//! };
//!
//! assert_eq!(
//!     finding.to_string(),
//!     "Package bar has a new major version. current: ^1.0.0, latest: 2.0.0"
//! );
//! ```

mod finding;
mod manifest;
mod record;

pub use finding::*;
pub use manifest::*;
pub use record::*;
