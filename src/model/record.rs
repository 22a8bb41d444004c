use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::error::ScanError;
use crate::validate::Violations;

/// Registry metadata for one package (the body of `GET <registry>/<name>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    #[serde(rename = "dist-tags")]
    pub dist_tags: BTreeMap<String, String>,
    pub versions: HashMap<String, VersionRecord>,
}

/// The part of a published version the scanner cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl PackageRecord {
    /// Validates a registry response for `package` and converts it.
    pub fn from_value(package: &str, value: Value) -> Result<Self, ScanError> {
        let mut violations = Violations::new();

        if let Some(obj) = violations.root(&value) {
            violations.string(obj, "name", true);
            violations.string_map(obj, "dist-tags", true);
            violations.object_map(obj, "versions", true, |violations, path, entry| {
                match entry.as_object() {
                    Some(version) => {
                        let field = format!("{}.deprecated", path);
                        match version.get("deprecated") {
                            None | Some(Value::String(_)) => {}
                            Some(_) => violations.push(&field, "expected string"),
                        }
                    }
                    None => violations.push(path, "expected object"),
                }
            });
        }

        if !violations.is_empty() {
            return Err(ScanError::validation(
                format!("registry response for package {}", package),
                violations.into_vec(),
            ));
        }

        serde_json::from_value(value).map_err(|source| ScanError::Parse {
            context: format!("registry response for package {}", package),
            source,
        })
    }

    /// The version the `latest` dist-tag points at.
    pub fn latest(&self) -> Option<&str> {
        self.dist_tags.get("latest").map(String::as_str)
    }

    /// The deprecation message for `version`, if the publisher set a non-empty one.
    pub fn deprecation(&self, version: &str) -> Option<&str> {
        self.versions
            .get(version)?
            .deprecated
            .as_deref()
            .filter(|message| !message.is_empty())
    }
}
