use crate::error::ScanError;
use crate::model::PackageRecord;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Public npm registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl NpmRegistry {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_REGISTRY_URL)
    }

    /// Points the client at a mirror or test server.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Scoped names keep their `@` but the separator is escaped:
    /// `@scope/name` becomes `@scope%2Fname`.
    fn encode_package_name(package: &str) -> String {
        if package.starts_with('@') {
            package.replace('/', "%2F")
        } else {
            package.to_string()
        }
    }

    fn package_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, Self::encode_package_name(package))
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::Registry for NpmRegistry {
    async fn fetch_package(&self, package: &str) -> Result<PackageRecord, ScanError> {
        let url = self.package_url(package);
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Registry returned status {} for {}", status, url);
        }

        let body = response.error_for_status()?.text().await?;
        let value = serde_json::from_str(&body).map_err(|source| ScanError::Parse {
            context: format!("registry response for package {}", package),
            source,
        })?;

        PackageRecord::from_value(package, value)
    }
}
