//! Apply and delete commands for generated manifests.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use chartdeploy_helm::{HelmConfig, YamlDeployment};
use chartdeploy_runner::{ProcessRunner, ProcessRunnerOptions};

use super::ensure_available;

#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Namespace the manifest was generated for
    #[arg(short, long, env = "CHARTDEPLOY_NAMESPACE")]
    pub namespace: String,

    /// Generated manifest file
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// YAML file with helm/kubectl binaries, repository and timeout
    #[arg(long, env = "CHARTDEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log the kubectl command without running it
    #[arg(long)]
    pub dry_run: bool,
}

fn prepare(args: &ManifestArgs) -> Result<(YamlDeployment, HelmConfig, ProcessRunner)> {
    if !args.manifest.exists() {
        anyhow::bail!("Manifest not found: {}", args.manifest.display());
    }

    let config = match &args.config {
        Some(path) => HelmConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => HelmConfig::default(),
    };

    let options = if args.dry_run {
        ProcessRunnerOptions::new().dry_run()
    } else {
        ProcessRunnerOptions::new()
    };

    Ok((
        YamlDeployment::new(&args.namespace, &args.manifest),
        config,
        ProcessRunner::new(options),
    ))
}

pub async fn apply(args: ManifestArgs) -> Result<()> {
    let (deployment, config, runner) = prepare(&args)?;
    ensure_available(&runner, &config.kubectl_binary, args.dry_run).await?;
    deployment.apply(&runner, &config).await?;
    println!("Applied {}", deployment.manifest_path().display());
    Ok(())
}

pub async fn delete(args: ManifestArgs) -> Result<()> {
    let (deployment, config, runner) = prepare(&args)?;
    ensure_available(&runner, &config.kubectl_binary, args.dry_run).await?;
    deployment.delete(&runner, &config).await?;
    println!("Deleted resources from {}", deployment.manifest_path().display());
    Ok(())
}
