//! Chart rendering through the Helm CLI.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chartdeploy_runner::{CommandLine, CommandRunner, ExecutionResult};
use tracing::{error, info};

use crate::config::HelmConfig;
use crate::error::{HelmError, HelmResult};
use crate::instance::InstanceName;
use crate::steps::HelmStep;
use crate::values::ResolvedValues;
use crate::workspace::Workspace;

/// Inputs of a single render.
#[derive(Debug, Clone)]
pub struct RenderParams {
    /// Release name passed to `helm template --name`
    pub instance_name: InstanceName,
    /// Target namespace
    pub namespace: String,
    /// Chart source directory
    pub chart_dir: PathBuf,
    /// Values file and overrides
    pub values: ResolvedValues,
}

/// Runs the Helm pipeline and returns the rendered manifest text.
pub struct ChartRenderer {
    runner: Arc<dyn CommandRunner>,
    config: HelmConfig,
    deadline: Option<Instant>,
}

impl ChartRenderer {
    pub fn new(runner: Arc<dyn CommandRunner>, config: HelmConfig) -> Self {
        Self {
            runner,
            config,
            deadline: None,
        }
    }

    /// Abandon any invocation still running at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn config(&self) -> &HelmConfig {
        &self.config
    }

    /// Render the chart described by `params`.
    ///
    /// Creates the workspace directories, then runs every [`HelmStep`] in
    /// order. The first failing step aborts the render.
    pub async fn render(&self, workspace: &Workspace, params: &RenderParams) -> HelmResult<String> {
        workspace.create()?;

        let mut rendered = String::new();
        for step in HelmStep::PIPELINE {
            let command = step.command(&self.config, workspace, params);
            let result = self.exec(step, &command).await?;
            if step.produces_manifest() {
                rendered = result.stdout;
            }
        }

        Ok(rendered)
    }

    /// Run one step and turn a non-zero exit into an error.
    async fn exec(&self, step: HelmStep, command: &CommandLine) -> HelmResult<ExecutionResult> {
        let cmd_str = command.to_string();
        info!("executing: {}", cmd_str);

        let mut run_config = self.config.run_config();
        if let Some(deadline) = self.deadline {
            run_config = run_config.deadline(deadline);
        }

        match self.runner.run(command, &run_config).await {
            Ok(result) if result.success() => Ok(result),
            Ok(result) => {
                let output = result.combined_output();
                error!(
                    "failed executing command ({}): exit code {}: {}",
                    cmd_str, result.exit_code, output
                );
                Err(HelmError::ToolInvocation {
                    step,
                    command: cmd_str,
                    reason: format!("exit code {}", result.exit_code),
                    output,
                })
            }
            Err(e) => {
                error!("failed executing command ({}): {}", cmd_str, e);
                Err(HelmError::ToolInvocation {
                    step,
                    command: cmd_str,
                    reason: e.to_string(),
                    output: String::new(),
                })
            }
        }
    }
}
