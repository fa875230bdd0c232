//! CLI command definitions.

use anyhow::Result;
use chartdeploy_runner::CommandRunner;
use clap::{Parser, Subcommand};
use tracing::debug;

pub mod lifecycle;
pub mod render;

/// chartdeploy - provision namespaced manifests from Helm charts
#[derive(Parser)]
#[command(name = "chartdeploy")]
#[command(version, about = "Provision namespaced manifests from Helm charts")]
#[command(long_about = r#"
chartdeploy renders a local Helm chart into a single manifest file that
starts with its own Namespace document, ready to be applied to a cluster.

WORKFLOWS:
  render  → Package and template a chart into <work-dir>/<namespace>-<nanos>.yaml
  apply   → kubectl apply a generated manifest
  delete  → kubectl delete a generated manifest

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Values file not found
  4 - Chart generation failed
  5 - Manifest could not be written
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a chart into a namespaced manifest file
    Render(render::RenderArgs),

    /// Apply a generated manifest to the cluster
    Apply(lifecycle::ManifestArgs),

    /// Delete the resources of a generated manifest
    Delete(lifecycle::ManifestArgs),
}

/// Fail early when `program` cannot be started. Dry runs never start it.
pub async fn ensure_available(
    runner: &dyn CommandRunner,
    program: &str,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        return Ok(());
    }

    if !runner.is_available(program).await? {
        anyhow::bail!("`{}` is not installed or not executable", program);
    }
    debug!("Found {}", program);
    Ok(())
}
