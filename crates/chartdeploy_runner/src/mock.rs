//! Mock command runner for testing.
//!
//! Provides a configurable mock implementation of the CommandRunner trait
//! for use in unit tests without requiring the real tools to be installed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::command::CommandLine;
use crate::config::RunConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Predefined mock response for a command execution.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            duration_ms: 100,
        }
    }

    pub fn failure(exit_code: i64, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration_ms: 100,
        }
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub method: String,
    pub command: Option<CommandLine>,
    pub current_dir: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
    pub has_deadline: bool,
}

/// Mock command runner for testing.
///
/// Responses are chosen in this order: the first scripted response whose
/// pattern appears in the rendered command line, then the queued responses
/// in rotation, then an empty success.
#[derive(Clone)]
pub struct MockRunner {
    /// Whether programs should report as available.
    available: Arc<RwLock<bool>>,
    /// Queued responses for run calls.
    responses: Arc<RwLock<Vec<MockResponse>>>,
    /// Index of next queued response to return.
    response_index: Arc<AtomicUsize>,
    /// Responses keyed by a substring of the command line.
    scripted: Arc<RwLock<Vec<(String, MockResponse)>>>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Simulated start failure (as a string message for ExecutionFailed).
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self {
            available: Arc::new(RwLock::new(true)),
            responses: Arc::new(RwLock::new(Vec::new())),
            response_index: Arc::new(AtomicUsize::new(0)),
            scripted: Arc::new(RwLock::new(Vec::new())),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Set whether programs are available.
    pub fn set_available(self, available: bool) -> Self {
        *self.available.write() = available;
        self
    }

    /// Add a mock response for the next run call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Set multiple responses.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses;
        self
    }

    /// Answer every command containing `pattern` with `response`.
    pub fn respond_to(self, pattern: impl Into<String>, response: MockResponse) -> Self {
        self.scripted.write().push((pattern.into(), response));
        self
    }

    /// Set a failure to simulate.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Clear all captured calls.
    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Check if a specific method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.captured_calls
            .read()
            .iter()
            .any(|c| c.method == method)
    }

    /// Get calls to a specific method.
    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Rendered command lines of all run calls, in order.
    pub fn commands(&self) -> Vec<String> {
        self.get_method_calls("run")
            .into_iter()
            .filter_map(|c| c.command.map(|cmd| cmd.to_string()))
            .collect()
    }

    /// Record a call.
    fn record_call(&self, call: CapturedCall) {
        self.captured_calls.write().push(call);
    }

    /// Get the response for a command.
    fn next_response(&self, command: &CommandLine) -> MockResponse {
        let rendered = command.to_string();
        if let Some((_, response)) = self
            .scripted
            .read()
            .iter()
            .find(|(pattern, _)| rendered.contains(pattern.as_str()))
        {
            return response.clone();
        }

        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }

    /// Check for simulated failure.
    fn check_failure(&self) -> RunnerResult<()> {
        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(RunnerError::ExecutionFailed(msg));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn is_available(&self, program: &str) -> RunnerResult<bool> {
        self.record_call(CapturedCall {
            method: "is_available".to_string(),
            command: Some(CommandLine::new(program)),
            current_dir: None,
            timeout_seconds: None,
            has_deadline: false,
        });
        Ok(*self.available.read())
    }

    async fn run(
        &self,
        command: &CommandLine,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        self.record_call(CapturedCall {
            method: "run".to_string(),
            command: Some(command.clone()),
            current_dir: run_config.current_dir.clone(),
            timeout_seconds: Some(run_config.timeout_seconds),
            has_deadline: run_config.deadline.is_some(),
        });

        self.check_failure()?;

        let response = self.next_response(command);
        let started_at = Utc::now();
        let finished_at = started_at + chrono::Duration::milliseconds(response.duration_ms as i64);

        Ok(ExecutionResult {
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at,
            finished_at,
            duration_ms: response.duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_runner_basic() {
        let runner = MockRunner::new().add_response(MockResponse::success("rendered"));

        let cmd = CommandLine::new("helm").arg("template");
        let result = runner.run(&cmd, &RunConfig::default()).await.unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "rendered");
    }

    #[tokio::test]
    async fn test_mock_runner_captures_calls() {
        let runner = MockRunner::new();

        let cmd = CommandLine::new("helm").args(["repo", "add", "stable"]);
        let config = RunConfig::default().timeout(42).current_dir("/work");
        let _ = runner.run(&cmd, &config).await;

        let calls = runner.get_method_calls("run");
        assert_eq!(calls.len(), 1);

        let call = &calls[0];
        assert_eq!(call.command.as_ref(), Some(&cmd));
        assert_eq!(call.timeout_seconds, Some(42));
        assert_eq!(call.current_dir, Some(PathBuf::from("/work")));
        assert!(!call.has_deadline);
        assert_eq!(runner.commands(), vec!["helm repo add stable".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_runner_failure_simulation() {
        let runner = MockRunner::new().simulate_failure("simulated error");

        let cmd = CommandLine::new("helm");
        let result = runner.run(&cmd, &RunConfig::default()).await;

        assert!(matches!(result, Err(RunnerError::ExecutionFailed(_))));
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_runner_multiple_responses() {
        let runner = MockRunner::new().with_responses(vec![
            MockResponse::success("first"),
            MockResponse::success("second"),
            MockResponse::failure(1, "third failed"),
        ]);

        let cmd = CommandLine::new("helm");

        let r1 = runner.run(&cmd, &RunConfig::default()).await.unwrap();
        assert_eq!(r1.stdout, "first");

        let r2 = runner.run(&cmd, &RunConfig::default()).await.unwrap();
        assert_eq!(r2.stdout, "second");

        let r3 = runner.run(&cmd, &RunConfig::default()).await.unwrap();
        assert_eq!(r3.exit_code, 1);
        assert_eq!(r3.stderr, "third failed");
    }

    #[tokio::test]
    async fn test_scripted_response_takes_precedence() {
        let runner = MockRunner::new()
            .add_response(MockResponse::success("queued"))
            .respond_to(" package ", MockResponse::failure(1, "bad chart"));

        let package = CommandLine::new("helm").args(["package", "-u", "/chart"]);
        let init = CommandLine::new("helm").args(["init", "--client-only"]);

        let failed = runner.run(&package, &RunConfig::default()).await.unwrap();
        assert_eq!(failed.exit_code, 1);

        let queued = runner.run(&init, &RunConfig::default()).await.unwrap();
        assert_eq!(queued.stdout, "queued");
    }

    #[tokio::test]
    async fn test_mock_runner_availability() {
        let available_runner = MockRunner::new().set_available(true);
        assert!(available_runner.is_available("helm").await.unwrap());

        let unavailable_runner = MockRunner::new().set_available(false);
        assert!(!unavailable_runner.is_available("helm").await.unwrap());
        assert!(unavailable_runner.was_called("is_available"));
    }
}
