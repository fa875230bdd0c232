//! # chartdeploy_helm
//!
//! Provisions a templated deployment manifest from a local Helm chart.
//!
//! Provisioning resolves the values file, bootstraps an isolated Helm home
//! under the work directory, registers the chart repository, packages the
//! chart, renders it with `helm template`, prepends a Namespace document and
//! writes the result to `<work_dir>/<namespace>-<nanos>.yaml`. The written
//! manifest is handed back as a [`YamlDeployment`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chartdeploy_helm::{DeploymentRequest, HelmConfig, HelmDeployment};
//! use chartdeploy_runner::{ProcessRunner, ProcessRunnerOptions};
//!
//! # async fn example() -> chartdeploy_helm::HelmResult<()> {
//! let runner = Arc::new(ProcessRunner::new(ProcessRunnerOptions::default()));
//! let deployment = HelmDeployment::new(runner, HelmConfig::default());
//!
//! let request = DeploymentRequest::new("test-ns", "install/kubernetes/helm/istio", "/tmp/work")
//!     .with_values_file("values-e2e.yaml")
//!     .with_value("global.hub", "docker.io/istio");
//!
//! let instance = deployment.provision(&request).await?;
//! println!("{}", instance.manifest_path().display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod deployment;
pub mod error;
pub mod instance;
pub mod manifest;
pub mod provision;
pub mod renderer;
pub mod steps;
pub mod values;
pub mod workspace;

pub use config::{HelmConfig, DEFAULT_REPO_NAME, DEFAULT_REPO_URL};
pub use deployment::YamlDeployment;
pub use error::{HelmError, HelmResult};
pub use instance::{validate_namespace, InstanceName};
pub use manifest::{assemble_manifest, namespace_manifest, write_manifest};
pub use provision::{DeploymentRequest, HelmDeployment, HelmInstance};
pub use renderer::{ChartRenderer, RenderParams};
pub use steps::HelmStep;
pub use values::{ResolvedValues, ValuesResolver};
pub use workspace::Workspace;
