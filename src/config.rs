//! Configuration file handling.
//!
//! This module provides loading and saving of depscan configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/depscan/config.toml`
//! - macOS: `~/Library/Application Support/depscan/config.toml`
//! - Windows: `%APPDATA%\depscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! registry_url = "https://registry.npmjs.org"
//! include_dev_dependencies = false
//!
//! [ignore]
//! packages = ["@mycompany", "internal-"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::registry::DEFAULT_REGISTRY_URL;

/// Application configuration.
///
/// Every field has a default, so a partial file (or no file at all) is valid.
///
/// # Example
///
/// ```no_run
/// use depscan::Config;
///
/// let config = Config::load_from(&Config::config_path()).unwrap();
/// println!("Registry: {}", config.registry_url);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the npm-compatible registry.
    ///
    /// Default: `https://registry.npmjs.org`
    pub registry_url: String,

    /// Whether `devDependencies` are scanned along with `dependencies`.
    ///
    /// Default: false
    pub include_dev_dependencies: bool,

    /// Dependencies to leave out of every scan.
    pub ignore: IgnoreList,
}

/// Substrings that exclude a dependency from scanning.
///
/// A dependency is skipped when its name contains any listed substring, so
/// `"@mycompany"` skips every package in that scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreList {
    pub packages: Vec<String>,
}

impl IgnoreList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a dependency should be skipped.
    pub fn matches(&self, name: &str) -> bool {
        self.packages.iter().any(|pattern| name.contains(pattern.as_str()))
    }

    /// Adds patterns that are not already present.
    pub fn extend<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            let pattern = pattern.into();
            if !self.packages.contains(&pattern) {
                self.packages.push(pattern);
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            include_dev_dependencies: false,
            ignore: IgnoreList::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to `path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depscan")
            .join("config.toml")
    }

    /// Writes the default configuration to `path` unless a file is already
    /// there. Returns true when a file was created.
    pub fn init(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
