//! The ordered Helm invocations that make up a render.

use std::fmt;

use chartdeploy_runner::CommandLine;
use serde::{Deserialize, Serialize};

use crate::config::HelmConfig;
use crate::renderer::RenderParams;
use crate::workspace::Workspace;

/// One external Helm invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelmStep {
    /// Client-only initialization of the Helm home (no Tiller).
    Init,
    /// Register the companion chart repository.
    RepoAdd,
    /// Package the chart source into the build directory.
    Package,
    /// Render the chart templates.
    Template,
}

impl HelmStep {
    /// Steps in execution order.
    pub const PIPELINE: [HelmStep; 4] = [
        HelmStep::Init,
        HelmStep::RepoAdd,
        HelmStep::Package,
        HelmStep::Template,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::RepoAdd => "repo add",
            Self::Package => "package",
            Self::Template => "template",
        }
    }

    /// Whether this step's stdout is the rendered manifest.
    pub fn produces_manifest(&self) -> bool {
        matches!(self, Self::Template)
    }

    /// Build the command line for this step.
    pub fn command(
        &self,
        config: &HelmConfig,
        workspace: &Workspace,
        params: &RenderParams,
    ) -> CommandLine {
        let helm = CommandLine::new(&config.helm_binary)
            .arg("--home")
            .arg(workspace.home_dir().to_string_lossy());

        match self {
            Self::Init => helm.args(["init", "--client-only"]),
            Self::RepoAdd => helm
                .args(["repo", "add"])
                .arg(&config.repo_name)
                .arg(&config.repo_url),
            Self::Package => helm
                .args(["package", "-u"])
                .arg(params.chart_dir.to_string_lossy())
                .arg("-d")
                .arg(workspace.build_dir().to_string_lossy()),
            Self::Template => {
                let mut cmd = helm
                    .arg("template")
                    .arg(params.chart_dir.to_string_lossy())
                    .arg("--name")
                    .arg(params.instance_name.to_string())
                    .arg("--namespace")
                    .arg(&params.namespace);

                if let Some(values_file) = &params.values.values_file {
                    cmd = cmd.arg("--values").arg(values_file.to_string_lossy());
                }

                cmd.args(params.values.set_args.iter().cloned())
            }
        }
    }
}

impl fmt::Display for HelmStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
