//! Helm tooling configuration.

use std::fs;
use std::path::Path;

use chartdeploy_runner::RunConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HelmError, HelmResult};

/// Name under which the companion chart repository is registered.
pub const DEFAULT_REPO_NAME: &str = "istio.io";

/// Companion chart repository registered before packaging.
pub const DEFAULT_REPO_URL: &str =
    "https://storage.googleapis.com/istio-prerelease/daily-build/master-latest-daily/charts";

/// Configuration for the external tools used during provisioning.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```yaml
/// repo_url: https://charts.example.com/nightly
/// timeout_seconds: 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    /// Helm executable
    pub helm_binary: String,
    /// kubectl executable, used by the deployment handle
    pub kubectl_binary: String,
    /// Chart repository name
    pub repo_name: String,
    /// Chart repository URL
    pub repo_url: String,
    /// Per-invocation timeout in seconds (0 = no timeout)
    pub timeout_seconds: u64,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            helm_binary: "helm".to_string(),
            kubectl_binary: "kubectl".to_string(),
            repo_name: DEFAULT_REPO_NAME.to_string(),
            repo_url: DEFAULT_REPO_URL.to_string(),
            timeout_seconds: 300,
        }
    }
}

impl HelmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> HelmResult<Self> {
        let path = path.as_ref();
        debug!("Loading helm config from {:?}", path);

        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> HelmResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_helm_binary(mut self, binary: impl Into<String>) -> Self {
        self.helm_binary = binary.into();
        self
    }

    pub fn with_kubectl_binary(mut self, binary: impl Into<String>) -> Self {
        self.kubectl_binary = binary.into();
        self
    }

    pub fn with_repo(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.repo_name = name.into();
        self.repo_url = url.into();
        self
    }

    pub fn with_repo_url(mut self, url: impl Into<String>) -> Self {
        self.repo_url = url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Check that no required value is blank.
    pub fn validate(&self) -> HelmResult<()> {
        let required = [
            ("helm_binary", &self.helm_binary),
            ("kubectl_binary", &self.kubectl_binary),
            ("repo_name", &self.repo_name),
            ("repo_url", &self.repo_url),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(HelmError::Config(format!("{} must not be empty", key)));
            }
        }
        Ok(())
    }

    /// Run configuration for a single tool invocation.
    pub fn run_config(&self) -> RunConfig {
        RunConfig::default().timeout(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = HelmConfig::default();

        assert_eq!(config.helm_binary, "helm");
        assert_eq!(config.repo_name, "istio.io");
        assert_eq!(config.repo_url, DEFAULT_REPO_URL);
        assert_eq!(config.run_config().timeout_seconds, 300);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = HelmConfig::from_yaml("repo_url: https://charts.example.com\n").unwrap();

        assert_eq!(config.repo_url, "https://charts.example.com");
        assert_eq!(config.repo_name, DEFAULT_REPO_NAME);
        assert_eq!(config.helm_binary, "helm");
    }

    #[test]
    fn test_blank_value_rejected() {
        let err = HelmConfig::from_yaml("repo_url: ''\n").unwrap_err();
        assert!(matches!(err, HelmError::Config(ref msg) if msg.contains("repo_url")));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = HelmConfig::from_yaml("timeout_seconds: soon\n").unwrap_err();
        assert!(matches!(err, HelmError::Yaml(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("helm.yaml");
        fs::write(&path, "helm_binary: /opt/helm2/helm\ntimeout_seconds: 0\n").unwrap();

        let config = HelmConfig::from_file(&path).unwrap();
        assert_eq!(config.helm_binary, "/opt/helm2/helm");
        assert_eq!(config.run_config().timeout_seconds, 0);
    }

    #[test]
    fn test_builder() {
        let config = HelmConfig::new()
            .with_repo("local", "http://127.0.0.1:8879")
            .with_helm_binary("helm2")
            .with_timeout(30);

        assert_eq!(config.repo_name, "local");
        assert_eq!(config.repo_url, "http://127.0.0.1:8879");
        assert_eq!(config.helm_binary, "helm2");
        assert_eq!(config.timeout_seconds, 30);
    }
}
