//! Process-based command runner.
//!
//! Spawns the program directly (no intermediate shell) with captured
//! stdout/stderr, and kills it if the run config's time limit elapses.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::command::CommandLine;
use crate::config::RunConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Process runner options.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunnerOptions {
    /// Dry-run mode (log commands without executing)
    pub dry_run: bool,
}

impl ProcessRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Runner executing commands as local processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    options: ProcessRunnerOptions,
}

impl ProcessRunner {
    pub fn new(options: ProcessRunnerOptions) -> Self {
        Self { options }
    }

    /// Check if dry-run mode is enabled.
    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    fn build_command(command: &CommandLine, run_config: &RunConfig) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&run_config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &run_config.current_dir {
            cmd.current_dir(dir);
        }

        cmd
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn is_available(&self, program: &str) -> RunnerResult<bool> {
        let status = Command::new(program)
            .arg("--help")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        Ok(status.map(|s| s.success()).unwrap_or(false))
    }

    async fn run(
        &self,
        command: &CommandLine,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        let cmd_str = command.to_string();

        if self.options.dry_run {
            info!("[DRY-RUN] Would execute: {}", cmd_str);
            let now = Utc::now();
            return Ok(ExecutionResult {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
                started_at: now,
                finished_at: now,
                duration_ms: 0,
            });
        }

        let limit = run_config.remaining(Instant::now());
        if limit.is_some_and(|limit| limit.is_zero()) {
            return Err(RunnerError::DeadlineExceeded(cmd_str));
        }

        debug!("Executing: {}", cmd_str);

        let started_at = Utc::now();
        let child = Self::build_command(command, run_config)
            .spawn()
            .map_err(|source| RunnerError::SpawnFailed {
                command: cmd_str.clone(),
                source,
            })?;

        // Dropping the wait future drops the child, which kills it.
        let output = match limit {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    error!("Command did not finish within {:?}: {}", limit, cmd_str);
                    return Err(if run_config.deadline_passed(Instant::now()) {
                        RunnerError::DeadlineExceeded(cmd_str)
                    } else {
                        RunnerError::Timeout(run_config.timeout_seconds)
                    });
                }
            },
            None => child.wait_with_output().await?,
        };

        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        let Some(code) = output.status.code() else {
            error!("Command terminated by a signal: {}", cmd_str);
            return Err(RunnerError::ExecutionFailed(format!(
                "`{}` terminated by a signal",
                cmd_str
            )));
        };
        let exit_code = i64::from(code);

        if exit_code == 0 {
            debug!("Command completed successfully in {}ms", duration_ms);
        } else {
            debug!(
                "Command failed with exit code {} after {}ms",
                exit_code, duration_ms
            );
        }

        Ok(ExecutionResult {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            started_at,
            finished_at,
            duration_ms,
        })
    }
}
