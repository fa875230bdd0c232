//! Top-level provisioning: request in, manifest file and deployment handle out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chartdeploy_runner::CommandRunner;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::HelmConfig;
use crate::deployment::YamlDeployment;
use crate::error::{HelmError, HelmResult};
use crate::instance::{validate_namespace, InstanceName};
use crate::manifest::{assemble_manifest, write_manifest};
use crate::renderer::{ChartRenderer, RenderParams};
use crate::values::ValuesResolver;
use crate::workspace::{absolutize, Workspace};

/// What to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    /// Target namespace
    pub namespace: String,
    /// Chart source directory
    pub chart_dir: PathBuf,
    /// Directory for the Helm workspace and generated manifest
    pub work_dir: PathBuf,
    /// Values file name under `chart_dir`, or a path; empty for none
    #[serde(default)]
    pub values_file: String,
    /// `--set` overrides
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl DeploymentRequest {
    pub fn new(
        namespace: impl Into<String>,
        chart_dir: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            chart_dir: chart_dir.into(),
            work_dir: work_dir.into(),
            values_file: String::new(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_values_file(mut self, values_file: impl Into<String>) -> Self {
        self.values_file = values_file.into();
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_values(mut self, values: BTreeMap<String, String>) -> Self {
        self.values.extend(values);
        self
    }
}

/// Result of a successful provisioning call.
#[derive(Debug, Clone)]
pub struct HelmInstance {
    instance_name: InstanceName,
    deployment: YamlDeployment,
}

impl HelmInstance {
    pub fn instance_name(&self) -> &InstanceName {
        &self.instance_name
    }

    pub fn manifest_path(&self) -> &Path {
        self.deployment.manifest_path()
    }

    pub fn deployment(&self) -> &YamlDeployment {
        &self.deployment
    }

    pub fn into_deployment(self) -> YamlDeployment {
        self.deployment
    }
}

/// Provisions Helm-rendered manifests.
pub struct HelmDeployment {
    renderer: ChartRenderer,
}

impl HelmDeployment {
    pub fn new(runner: Arc<dyn CommandRunner>, config: HelmConfig) -> Self {
        Self {
            renderer: ChartRenderer::new(runner, config),
        }
    }

    /// Bound the whole provisioning sequence by `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.renderer = self.renderer.with_deadline(deadline);
        self
    }

    pub fn config(&self) -> &HelmConfig {
        self.renderer.config()
    }

    /// Render the chart and write `<work_dir>/<instance>.yaml`.
    ///
    /// Fails before running anything external when the namespace is invalid
    /// or the values file cannot be found. Render failures are wrapped in
    /// [`HelmError::ChartGeneration`]; no manifest is written in that case.
    pub async fn provision(&self, request: &DeploymentRequest) -> HelmResult<HelmInstance> {
        validate_namespace(&request.namespace)?;

        let instance_name = InstanceName::generate(&request.namespace);
        info!("Generated Helm instance name: {}", instance_name);

        let workspace = Workspace::new(absolutize(&request.work_dir)?);
        let manifest_path = workspace.manifest_path(&instance_name);

        let values =
            ValuesResolver::resolve(&request.values_file, &request.chart_dir, &request.values)?;

        let params = RenderParams {
            instance_name: instance_name.clone(),
            namespace: request.namespace.clone(),
            chart_dir: request.chart_dir.clone(),
            values,
        };

        let rendered = self
            .renderer
            .render(&workspace, &params)
            .await
            .map_err(|e| HelmError::ChartGeneration(Box::new(e)))?;

        let manifest = assemble_manifest(&request.namespace, &rendered);
        write_manifest(&manifest_path, &manifest)?;

        info!("Created Helm-generated YAML file: {}", manifest_path.display());

        Ok(HelmInstance {
            instance_name,
            deployment: YamlDeployment::new(&request.namespace, manifest_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartdeploy_runner::{MockResponse, MockRunner};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_request_builder() {
        let request = DeploymentRequest::new("test-ns", "/charts/app", "/work")
            .with_values_file("values-e2e.yaml")
            .with_value("image.tag", "v2")
            .with_values(BTreeMap::from([("replicas".to_string(), "3".to_string())]));

        assert_eq!(request.values_file, "values-e2e.yaml");
        assert_eq!(request.values.len(), 2);
        assert_eq!(request.values.get("image.tag"), Some(&"v2".to_string()));
    }

    #[test]
    fn test_request_from_yaml() {
        let request: DeploymentRequest = serde_yaml::from_str(
            "namespace: test-ns\nchart_dir: /charts/app\nwork_dir: /work\n",
        )
        .unwrap();

        assert!(request.values_file.is_empty());
        assert!(request.values.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_namespace_rejected_before_rendering() {
        let work = tempdir().unwrap();
        let runner = MockRunner::new();
        let deployment = HelmDeployment::new(Arc::new(runner.clone()), HelmConfig::default());

        let request = DeploymentRequest::new("../escape", "/charts/app", work.path());
        let err = deployment.provision(&request).await.unwrap_err();

        assert!(matches!(err, HelmError::InvalidNamespace(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provision_writes_manifest() {
        let work = tempdir().unwrap();
        let runner = MockRunner::new()
            .respond_to(" template ", MockResponse::success("---\nkind: Service\n"));
        let deployment = HelmDeployment::new(Arc::new(runner), HelmConfig::default());

        let request = DeploymentRequest::new("test-ns", "/charts/app", work.path());
        let instance = deployment.provision(&request).await.unwrap();

        assert_eq!(
            instance.manifest_path(),
            work.path().join(instance.instance_name().manifest_file_name())
        );
        assert_eq!(instance.deployment().namespace(), "test-ns");

        let written = fs::read_to_string(instance.manifest_path()).unwrap();
        assert!(written.ends_with("---\nkind: Service\n"));
    }
}
