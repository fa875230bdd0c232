//! Command runner trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::CommandLine;
use crate::config::RunConfig;
use crate::error::RunnerResult;

/// Result of a process execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Exit code from the process (-1 when terminated by a signal)
    pub exit_code: i64,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Process execution capability.
///
/// A non-zero exit is reported through [`ExecutionResult::exit_code`], not as
/// an error. Errors mean the process could not be started or did not finish
/// within its time limit.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Check if a program can be started.
    async fn is_available(&self, program: &str) -> RunnerResult<bool>;

    /// Run a command to completion and capture its output.
    async fn run(&self, command: &CommandLine, run_config: &RunConfig)
        -> RunnerResult<ExecutionResult>;
}
