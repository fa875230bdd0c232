//! Instance (release) naming.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HelmError, HelmResult};

/// Last timestamp handed out, so names stay unique within the process.
static LAST_ISSUED: AtomicI64 = AtomicI64::new(i64::MIN);

const MAX_NAMESPACE_LEN: usize = 63;

fn namespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("namespace pattern is valid")
    })
}

/// Check that `namespace` is a valid Kubernetes namespace name.
pub fn validate_namespace(namespace: &str) -> HelmResult<()> {
    if namespace.len() > MAX_NAMESPACE_LEN || !namespace_pattern().is_match(namespace) {
        return Err(HelmError::InvalidNamespace(namespace.to_string()));
    }
    Ok(())
}

/// Release name of one provisioning call: `<namespace>-<unix nanos>`.
///
/// Used both as the `helm template --name` value and as the manifest file
/// stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceName {
    namespace: String,
    timestamp_nanos: i64,
}

impl InstanceName {
    /// Generate a fresh name from the current time.
    ///
    /// Timestamps are strictly increasing within the process: a call landing
    /// in the same nanosecond as the previous one gets the next value.
    pub fn generate(namespace: &str) -> Self {
        Self::at(namespace, next_timestamp())
    }

    /// Build a name for a known timestamp.
    pub fn at(namespace: &str, timestamp_nanos: i64) -> Self {
        Self {
            namespace: namespace.to_string(),
            timestamp_nanos,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn timestamp_nanos(&self) -> i64 {
        self.timestamp_nanos
    }

    /// File name of the manifest written for this instance.
    pub fn manifest_file_name(&self) -> String {
        format!("{}.yaml", self)
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.namespace, self.timestamp_nanos)
    }
}

fn next_timestamp() -> i64 {
    let now = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros().saturating_mul(1_000));

    let mut issued = now;
    // The closure always returns Some, so the update cannot fail.
    let _ = LAST_ISSUED.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        issued = if now > last { now } else { last.saturating_add(1) };
        Some(issued)
    });
    issued
}
