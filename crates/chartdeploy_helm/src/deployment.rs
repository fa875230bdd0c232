//! Handle to a manifest file that can be applied to and removed from a cluster.

use std::path::{Path, PathBuf};

use chartdeploy_runner::{CommandLine, CommandRunner};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::HelmConfig;
use crate::error::{HelmError, HelmResult};

/// A YAML manifest deployed into a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YamlDeployment {
    namespace: String,
    manifest_path: PathBuf,
}

impl YamlDeployment {
    pub fn new(namespace: impl Into<String>, manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            namespace: namespace.into(),
            manifest_path: manifest_path.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// `kubectl apply` the manifest into the namespace.
    pub async fn apply(&self, runner: &dyn CommandRunner, config: &HelmConfig) -> HelmResult<()> {
        let command = CommandLine::new(&config.kubectl_binary)
            .arg("apply")
            .args(["-n", self.namespace.as_str()])
            .arg("-f")
            .arg(self.manifest_path.to_string_lossy());

        self.kubectl("apply", runner, config, &command).await
    }

    /// `kubectl delete` everything the manifest created.
    pub async fn delete(&self, runner: &dyn CommandRunner, config: &HelmConfig) -> HelmResult<()> {
        let command = CommandLine::new(&config.kubectl_binary)
            .arg("delete")
            .args(["-n", self.namespace.as_str()])
            .arg("-f")
            .arg(self.manifest_path.to_string_lossy())
            .arg("--ignore-not-found");

        self.kubectl("delete", runner, config, &command).await
    }

    async fn kubectl(
        &self,
        action: &str,
        runner: &dyn CommandRunner,
        config: &HelmConfig,
        command: &CommandLine,
    ) -> HelmResult<()> {
        let cmd_str = command.to_string();
        info!("executing: {}", cmd_str);

        let (reason, output) = match runner.run(command, &config.run_config()).await {
            Ok(result) if result.success() => {
                info!("kubectl {} succeeded for namespace {}", action, self.namespace);
                return Ok(());
            }
            Ok(result) => (
                format!("exit code {}", result.exit_code),
                result.combined_output(),
            ),
            Err(e) => (e.to_string(), String::new()),
        };

        error!("failed executing command ({}): {}: {}", cmd_str, reason, output);
        Err(HelmError::Kubectl {
            action: action.to_string(),
            command: cmd_str,
            reason,
            output,
        })
    }
}
