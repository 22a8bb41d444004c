pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod registry;
pub mod scanner;
pub mod version;

mod validate;

pub use config::{Config, IgnoreList};
pub use error::ScanError;
pub use model::{Finding, Manifest, PackageRecord, VersionRecord};
pub use scanner::Scanner;
