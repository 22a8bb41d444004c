//! Dependency checks.
//!
//! A [`Scanner`] combines a project's `package.json` with registry metadata
//! and reports two kinds of findings:
//!
//! | Check | Reported when |
//! |-------|---------------|
//! | [`Scanner::scan_major_versions`] | `latest` is on a higher major than the declared version |
//! | [`Scanner::scan_deprecated`] | the declared version is marked deprecated |
//!
//! Each check loads the manifest, drops ignored dependencies, and fetches
//! every remaining package concurrently. The first error aborts the check;
//! findings already reported stay reported.
//!
//! # Example
//!
//! ```no_run
//! use depscan::{IgnoreList, Scanner};
//! use depscan::output::StdoutReporter;
//! use depscan::registry::NpmRegistry;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scanner = Scanner::new(NpmRegistry::new(), StdoutReporter);
//!     let ignore = IgnoreList::new(["@mycompany"]);
//!
//!     scanner.run(Path::new("."), &ignore).await?;
//!     Ok(())
//! }
//! ```

mod manifest;

pub use manifest::{load_manifest, manifest_path, MANIFEST_FILE};

use crate::config::IgnoreList;
use crate::error::ScanError;
use crate::model::{Finding, Manifest};
use crate::output::Reporter;
use crate::registry::Registry;
use crate::version::{is_major_behind, strip_range_operator};
use futures::future::try_join_all;
use std::future::Future;
use std::path::Path;
use tracing::{debug, info};

pub struct Scanner {
    registry: Box<dyn Registry>,
    reporter: Box<dyn Reporter>,
    include_dev: bool,
}

impl Scanner {
    pub fn new(registry: impl Registry + 'static, reporter: impl Reporter + 'static) -> Self {
        Self {
            registry: Box::new(registry),
            reporter: Box::new(reporter),
            include_dev: false,
        }
    }

    /// Also scan `devDependencies`.
    pub fn with_dev_dependencies(mut self, include_dev: bool) -> Self {
        self.include_dev = include_dev;
        self
    }

    /// Runs the major-version check, then the deprecation check.
    pub async fn run(
        &self,
        project: &Path,
        ignore: &IgnoreList,
    ) -> Result<Vec<Finding>, ScanError> {
        let mut findings = self.scan_major_versions(project, ignore).await?;
        findings.extend(self.scan_deprecated(project, ignore).await?);
        Ok(findings)
    }

    /// Reports every dependency whose registry `latest` tag is on a newer
    /// major version than the declared specifier.
    pub async fn scan_major_versions(
        &self,
        project: &Path,
        ignore: &IgnoreList,
    ) -> Result<Vec<Finding>, ScanError> {
        let manifest = load_manifest(project)?;
        self.fan_out(&manifest, ignore, "major version", |name, spec| {
            self.check_major_version(name, spec)
        })
        .await
    }

    /// Reports every dependency whose declared version is deprecated.
    ///
    /// The leading range operator is stripped and the remainder is looked up
    /// verbatim, so `^1.0.0` checks `1.0.0` and not whatever it resolves to.
    /// A version the registry does not list is not an error.
    pub async fn scan_deprecated(
        &self,
        project: &Path,
        ignore: &IgnoreList,
    ) -> Result<Vec<Finding>, ScanError> {
        let manifest = load_manifest(project)?;
        self.fan_out(&manifest, ignore, "deprecation", |name, spec| {
            self.check_deprecated(name, spec)
        })
        .await
    }

    async fn fan_out<'a, F, Fut>(
        &self,
        manifest: &'a Manifest,
        ignore: &IgnoreList,
        check: &str,
        per_dependency: F,
    ) -> Result<Vec<Finding>, ScanError>
    where
        F: Fn(&'a str, &'a str) -> Fut,
        Fut: Future<Output = Result<Option<Finding>, ScanError>>,
    {
        let targets: Vec<(&str, &str)> = manifest
            .scan_targets(self.include_dev)
            .into_iter()
            .filter(|(name, _)| {
                let skip = ignore.matches(name);
                if skip {
                    debug!("Ignoring {}", name);
                }
                !skip
            })
            .collect();

        info!(
            "Running {} check on {} dependencies of {}",
            check,
            targets.len(),
            manifest.name
        );

        let results = try_join_all(
            targets
                .into_iter()
                .map(|(name, spec)| per_dependency(name, spec)),
        )
        .await?;

        Ok(results.into_iter().flatten().collect())
    }

    async fn check_major_version(
        &self,
        name: &str,
        spec: &str,
    ) -> Result<Option<Finding>, ScanError> {
        let record = self.registry.fetch_package(name).await?;
        let latest = record.latest().ok_or_else(|| {
            ScanError::validation(
                format!("registry response for package {}", name),
                vec!["`dist-tags.latest`: required field is missing".to_string()],
            )
        })?;

        if !is_major_behind(spec, latest)? {
            return Ok(None);
        }

        let finding = Finding::NewMajor {
            name: name.to_string(),
            current: spec.to_string(),
            latest: latest.to_string(),
        };
        self.reporter.report(&finding);
        Ok(Some(finding))
    }

    async fn check_deprecated(
        &self,
        name: &str,
        spec: &str,
    ) -> Result<Option<Finding>, ScanError> {
        let record = self.registry.fetch_package(name).await?;
        let version = strip_range_operator(spec);
        debug!("Looking up {}@{}", name, version);

        let Some(message) = record.deprecation(version) else {
            return Ok(None);
        };
        debug!("{}@{} deprecated: {}", name, version, message);

        let finding = Finding::Deprecated {
            name: name.to_string(),
            version: spec.to_string(),
            message: message.to_string(),
        };
        self.reporter.report(&finding);
        Ok(Some(finding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PackageRecord, VersionRecord};
    use crate::output::BufferReporter;
    use crate::registry::MockRegistry;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Barrier;
    use tokio::time::timeout;

    fn project(dependencies: &[(&str, &str)]) -> TempDir {
        let deps: BTreeMap<&str, &str> = dependencies.iter().copied().collect();
        let manifest = serde_json::json!({
            "name": "foo",
            "version": "1.0.0",
            "dependencies": deps,
        });
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), manifest.to_string()).unwrap();
        dir
    }

    fn record(name: &str, latest: &str, deprecated: &[(&str, &str)]) -> PackageRecord {
        let versions: HashMap<String, VersionRecord> = deprecated
            .iter()
            .map(|(version, message)| {
                (
                    version.to_string(),
                    VersionRecord {
                        deprecated: Some(message.to_string()),
                    },
                )
            })
            .collect();
        PackageRecord {
            name: name.to_string(),
            dist_tags: BTreeMap::from([("latest".to_string(), latest.to_string())]),
            versions,
        }
    }

    fn scanner(registry: impl Registry + 'static) -> (Scanner, Arc<BufferReporter>) {
        let reporter = Arc::new(BufferReporter::new());
        (Scanner::new(registry, reporter.clone()), reporter)
    }

    #[tokio::test]
    async fn test_new_major_version_is_reported() {
        let dir = project(&[("bar", "1.0.0")]);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .withf(|name| name == "bar")
            .times(1)
            .returning(|_| Ok(record("bar", "2.0.0", &[])));

        let (scanner, reporter) = scanner(registry);
        let findings = scanner
            .scan_major_versions(dir.path(), &IgnoreList::default())
            .await
            .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(
            reporter.lines(),
            vec!["Package bar has a new major version. current: 1.0.0, latest: 2.0.0"]
        );
    }

    #[tokio::test]
    async fn test_same_major_version_is_not_reported() {
        let dir = project(&[("bar", "2.0.0"), ("baz", "^3.1.0")]);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .withf(|name| name == "bar")
            .times(1)
            .returning(|_| Ok(record("bar", "2.0.0", &[])));
        registry
            .expect_fetch_package()
            .withf(|name| name == "baz")
            .times(1)
            .returning(|_| Ok(record("baz", "3.4.0", &[])));

        let (scanner, reporter) = scanner(registry);
        let findings = scanner
            .scan_major_versions(dir.path(), &IgnoreList::default())
            .await
            .unwrap();

        assert!(findings.is_empty());
        assert!(reporter.lines().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_specifier_aborts_major_check() {
        let dir = project(&[("bar", "latest")]);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .returning(|_| Ok(record("bar", "2.0.0", &[])));

        let (scanner, _) = scanner(registry);
        let err = scanner
            .scan_major_versions(dir.path(), &IgnoreList::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::VersionFormat(v) if v == "latest"));
    }

    #[tokio::test]
    async fn test_missing_latest_tag_fails_major_check() {
        let dir = project(&[("bar", "1.0.0")]);
        let mut registry = MockRegistry::new();
        registry.expect_fetch_package().returning(|_| {
            Ok(PackageRecord {
                name: "bar".to_string(),
                dist_tags: BTreeMap::new(),
                versions: HashMap::new(),
            })
        });

        let (scanner, _) = scanner(registry);
        let err = scanner
            .scan_major_versions(dir.path(), &IgnoreList::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("`dist-tags.latest`"));
    }

    #[tokio::test]
    async fn test_deprecated_version_is_reported() {
        let dir = project(&[("bar", "1.0.0")]);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .withf(|name| name == "bar")
            .times(1)
            .returning(|_| {
                Ok(record(
                    "bar",
                    "2.0.0",
                    &[("1.0.0", "this version is deprecated")],
                ))
            });

        let (scanner, reporter) = scanner(registry);
        let findings = scanner
            .scan_deprecated(dir.path(), &IgnoreList::default())
            .await
            .unwrap();

        assert_eq!(
            findings,
            vec![Finding::Deprecated {
                name: "bar".to_string(),
                version: "1.0.0".to_string(),
                message: "this version is deprecated".to_string(),
            }]
        );
        assert_eq!(
            reporter.lines(),
            vec!["Package bar is deprecated. version: 1.0.0"]
        );
    }

    #[tokio::test]
    async fn test_range_operator_is_stripped_before_lookup() {
        let dir = project(&[("bar", "^1.0.0")]);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .returning(|_| Ok(record("bar", "2.0.0", &[("1.0.0", "use baz")])));

        let (scanner, reporter) = scanner(registry);
        scanner
            .scan_deprecated(dir.path(), &IgnoreList::default())
            .await
            .unwrap();

        assert_eq!(
            reporter.lines(),
            vec!["Package bar is deprecated. version: ^1.0.0"]
        );
    }

    #[tokio::test]
    async fn test_unknown_version_is_not_an_error() {
        let dir = project(&[("bar", "~1.2.3")]);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .returning(|_| Ok(record("bar", "2.0.0", &[("1.0.0", "old")])));

        let (scanner, reporter) = scanner(registry);
        let findings = scanner
            .scan_deprecated(dir.path(), &IgnoreList::default())
            .await
            .unwrap();

        assert!(findings.is_empty());
        assert!(reporter.lines().is_empty());
    }

    #[tokio::test]
    async fn test_ignored_dependencies_are_never_fetched() {
        let dir = project(&[("@mycompany/logger", "1.0.0"), ("bar", "1.0.0")]);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .withf(|name| name == "bar")
            .times(2)
            .returning(|_| Ok(record("bar", "2.0.0", &[("1.0.0", "old")])));
        registry
            .expect_fetch_package()
            .withf(|name| name.contains("@mycompany"))
            .times(0);

        let (scanner, reporter) = scanner(registry);
        let findings = scanner
            .run(dir.path(), &IgnoreList::new(["@mycompany"]))
            .await
            .unwrap();

        assert_eq!(findings.len(), 2);
        assert_eq!(
            reporter.lines(),
            vec![
                "Package bar has a new major version. current: 1.0.0, latest: 2.0.0",
                "Package bar is deprecated. version: 1.0.0",
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_manifest_fails_before_any_fetch() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "foo", "version": "1.0.0" }"#,
        )
        .unwrap();
        let mut registry = MockRegistry::new();
        registry.expect_fetch_package().times(0);

        let (scanner, _) = scanner(registry);
        let err = scanner
            .run(dir.path(), &IgnoreList::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_registry_failure_aborts_check() {
        let dir = project(&[("bar", "1.0.0"), ("qux", "1.0.0")]);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .withf(|name| name == "bar")
            .returning(|name| {
                Err(ScanError::validation(
                    format!("registry response for package {}", name),
                    vec!["`dist-tags`: required field is missing".to_string()],
                ))
            });
        registry
            .expect_fetch_package()
            .withf(|name| name == "qux")
            .returning(|_| Ok(record("qux", "1.0.0", &[])));

        let (scanner, _) = scanner(registry);
        let err = scanner
            .scan_major_versions(dir.path(), &IgnoreList::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("package bar"));
    }

    #[tokio::test]
    async fn test_dev_dependencies_opt_in() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
                "name": "foo",
                "version": "1.0.0",
                "dependencies": {},
                "devDependencies": { "vitest": "0.34.0" }
            }"#,
        )
        .unwrap();
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .withf(|name| name == "vitest")
            .times(1)
            .returning(|_| Ok(record("vitest", "1.0.0", &[])));

        let (scanner, reporter) = scanner(registry);
        let scanner = scanner.with_dev_dependencies(true);
        scanner
            .scan_major_versions(dir.path(), &IgnoreList::default())
            .await
            .unwrap();

        assert_eq!(
            reporter.lines(),
            vec!["Package vitest has a new major version. current: 0.34.0, latest: 1.0.0"]
        );
    }

    /// Every fetch waits until all of them have started.
    struct RendezvousRegistry {
        barrier: Barrier,
    }

    #[async_trait]
    impl Registry for RendezvousRegistry {
        async fn fetch_package(&self, package: &str) -> Result<PackageRecord, ScanError> {
            self.barrier.wait().await;
            Ok(record(package, "2.0.0", &[]))
        }
    }

    /// `a-stalled` never answers; `b-broken` fails straight away.
    struct StalledRegistry;

    #[async_trait]
    impl Registry for StalledRegistry {
        async fn fetch_package(&self, package: &str) -> Result<PackageRecord, ScanError> {
            if package == "a-stalled" {
                return std::future::pending().await;
            }
            Err(ScanError::validation(
                format!("registry response for package {}", package),
                vec!["`versions`: required field is missing".to_string()],
            ))
        }
    }

    #[tokio::test]
    async fn test_fetches_run_concurrently() {
        let dir = project(&[("bar", "1.0.0"), ("baz", "1.0.0"), ("qux", "1.0.0")]);
        let registry = RendezvousRegistry {
            barrier: Barrier::new(3),
        };

        let (scanner, reporter) = scanner(registry);
        let findings = timeout(
            Duration::from_secs(5),
            scanner.scan_major_versions(dir.path(), &IgnoreList::default()),
        )
        .await
        .expect("fetches did not all start together")
        .unwrap();

        assert_eq!(findings.len(), 3);
        assert_eq!(reporter.lines().len(), 3);
    }

    #[tokio::test]
    async fn test_first_failure_ends_check_while_siblings_pending() {
        let dir = project(&[("a-stalled", "1.0.0"), ("b-broken", "1.0.0")]);
        let (scanner, _) = scanner(StalledRegistry);

        let err = timeout(
            Duration::from_secs(5),
            scanner.scan_major_versions(dir.path(), &IgnoreList::default()),
        )
        .await
        .expect("check waited on a pending fetch")
        .unwrap_err();

        assert!(err.to_string().contains("package b-broken"));
    }
}
