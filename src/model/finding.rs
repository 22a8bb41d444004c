use std::fmt;

/// A problem the scanner found with one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// The registry's `latest` tag is on a higher major version than the
    /// declared specifier.
    NewMajor {
        name: String,
        current: String,
        latest: String,
    },
    /// The declared version is marked deprecated by its publisher.
    Deprecated {
        name: String,
        version: String,
        message: String,
    },
}

impl Finding {
    /// Name of the dependency the finding is about.
    pub fn package(&self) -> &str {
        match self {
            Finding::NewMajor { name, .. } | Finding::Deprecated { name, .. } => name,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::NewMajor {
                name,
                current,
                latest,
            } => write!(
                f,
                "Package {} has a new major version. current: {}, latest: {}",
                name, current, latest
            ),
            Finding::Deprecated { name, version, .. } => {
                write!(f, "Package {} is deprecated. version: {}", name, version)
            }
        }
    }
}
