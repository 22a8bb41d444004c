use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::ScanError;
use crate::validate::Violations;

/// A project's `package.json`, reduced to the fields the scanner reads.
///
/// Unknown fields are kept in `extra` so the document survives a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_dependencies: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Validates a parsed JSON document and converts it into a manifest.
    ///
    /// `subject` names the document in the error (usually its path).
    /// All shape problems are reported together.
    pub fn from_value(subject: &str, value: Value) -> Result<Self, ScanError> {
        let mut violations = Violations::new();

        if let Some(obj) = violations.root(&value) {
            violations.string(obj, "name", true);
            violations.string(obj, "version", true);
            violations.string_map(obj, "dependencies", true);
            violations.string_map(obj, "devDependencies", false);
        }

        if !violations.is_empty() {
            return Err(ScanError::validation(subject, violations.into_vec()));
        }

        serde_json::from_value(value).map_err(|source| ScanError::Parse {
            context: subject.to_string(),
            source,
        })
    }

    /// Dependencies to scan. With `include_dev`, `devDependencies` are merged
    /// in; a name present in both keeps its `dependencies` specifier.
    pub fn scan_targets(&self, include_dev: bool) -> BTreeMap<&str, &str> {
        let mut targets: BTreeMap<&str, &str> = BTreeMap::new();

        if include_dev {
            if let Some(dev) = &self.dev_dependencies {
                for (name, spec) in dev {
                    targets.insert(name.as_str(), spec.as_str());
                }
            }
        }

        for (name, spec) in &self.dependencies {
            targets.insert(name.as_str(), spec.as_str());
        }

        targets
    }
}
