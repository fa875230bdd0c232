//! Error types for Helm provisioning.

use std::path::PathBuf;

use thiserror::Error;

use crate::steps::HelmStep;

/// Result type alias for Helm operations.
pub type HelmResult<T> = Result<T, HelmError>;

/// Errors that can occur while provisioning a Helm deployment.
#[derive(Error, Debug)]
pub enum HelmError {
    #[error("Invalid namespace '{0}': must be a lowercase RFC 1123 label of at most 63 characters")]
    InvalidNamespace(String),

    #[error("Values file not found: '{reference}' (also tried under {})", .chart_dir.display())]
    ValuesNotFound { reference: String, chart_dir: PathBuf },

    #[error("Failed to create workspace directory {}: {source}", .path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("helm {step} failed ({command}): {reason}: {output}")]
    ToolInvocation {
        step: HelmStep,
        command: String,
        reason: String,
        output: String,
    },

    #[error("chart generation failed: {0}")]
    ChartGeneration(#[source] Box<HelmError>),

    #[error("Unable to write helm generated yaml to {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("kubectl {action} failed ({command}): {reason}: {output}")]
    Kubectl {
        action: String,
        command: String,
        reason: String,
        output: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl HelmError {
    /// The underlying error, looking through the chart generation wrapper.
    pub fn root(&self) -> &HelmError {
        match self {
            Self::ChartGeneration(inner) => inner.root(),
            other => other,
        }
    }

    /// Whether the error came from rendering the chart.
    pub fn is_chart_generation(&self) -> bool {
        matches!(self, Self::ChartGeneration(_))
    }
}
