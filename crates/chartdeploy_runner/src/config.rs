//! Run configuration types.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Run configuration with time limits and process environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Timeout in seconds (0 = no timeout)
    pub timeout_seconds: u64,
    /// Absolute point in time after which the invocation is abandoned
    #[serde(skip)]
    pub deadline: Option<Instant>,
    /// Working directory for the process
    pub current_dir: Option<PathBuf>,
    /// Extra environment variables
    pub env: HashMap<String, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 300, // 5 minutes
            deadline: None,
            current_dir: None,
            env: HashMap::new(),
        }
    }
}

impl RunConfig {
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Disable the per-invocation timeout.
    pub fn no_timeout(mut self) -> Self {
        self.timeout_seconds = 0;
        self
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Time an invocation started at `now` may run, or `None` when unbounded.
    ///
    /// Returns `Some(Duration::ZERO)` once the deadline has passed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let timeout =
            (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds));
        let until_deadline = self
            .deadline
            .map(|deadline| deadline.saturating_duration_since(now));

        match (timeout, until_deadline) {
            (Some(timeout), Some(until_deadline)) => Some(timeout.min(until_deadline)),
            (timeout, until_deadline) => timeout.or(until_deadline),
        }
    }

    /// Whether the deadline (if any) has passed at `now`.
    pub fn deadline_passed(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::default()
            .timeout(60)
            .current_dir("/tmp/work")
            .env("HELM_HOME", "/tmp/work/helmrepo");

        assert_eq!(config.timeout_seconds, 60);
        assert_eq!(config.current_dir, Some(PathBuf::from("/tmp/work")));
        assert_eq!(
            config.env.get("HELM_HOME"),
            Some(&"/tmp/work/helmrepo".to_string())
        );
    }

    #[test]
    fn test_remaining_without_limits() {
        let config = RunConfig::default().no_timeout();
        assert_eq!(config.remaining(Instant::now()), None);
    }

    #[test]
    fn test_remaining_uses_timeout() {
        let config = RunConfig::default().timeout(10);
        assert_eq!(config.remaining(Instant::now()), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_remaining_prefers_earlier_deadline() {
        let now = Instant::now();
        let config = RunConfig::default()
            .timeout(300)
            .deadline(now + Duration::from_secs(5));

        assert_eq!(config.remaining(now), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_remaining_after_deadline_is_zero() {
        let now = Instant::now();
        let config = RunConfig::default().no_timeout().deadline(now);

        assert_eq!(config.remaining(now + Duration::from_secs(1)), Some(Duration::ZERO));
        assert!(config.deadline_passed(now));
    }
}
