//! Version specifier helpers shared by both checks.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ScanError;

/// First `major.minor.patch` triple anywhere in the string. ASCII digits only.
static VERSION_TRIPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(([0-9]+)\.[0-9]+\.[0-9]+)").unwrap());

/// Range operators that may prefix a declared version.
const RANGE_OPERATORS: [char; 3] = ['^', '~', '@'];

/// Extracts the major version from a specifier such as `^1.2.3` or `2.0.0`.
///
/// Fails with [`ScanError::VersionFormat`] when the string holds no dotted
/// triple, or when the major component does not fit in a `u64`.
pub fn extract_major(spec: &str) -> Result<u64, ScanError> {
    let captures = VERSION_TRIPLE
        .captures(spec)
        .ok_or_else(|| ScanError::VersionFormat(spec.to_string()))?;

    captures[2]
        .parse()
        .map_err(|_| ScanError::VersionFormat(spec.to_string()))
}

/// Drops a single leading `^`, `~`, or `@` so the rest can be used as a key
/// into the registry's `versions` map.
pub fn strip_range_operator(spec: &str) -> &str {
    spec.strip_prefix(RANGE_OPERATORS).unwrap_or(spec)
}

/// True when `latest` is on a strictly higher major version than `current`.
pub fn is_major_behind(current: &str, latest: &str) -> Result<bool, ScanError> {
    let current = extract_major(current)?;
    let latest = extract_major(latest)?;
    Ok(latest > current)
}
