//! Render command - provision a manifest from a chart.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use chartdeploy_helm::{DeploymentRequest, HelmConfig, HelmDeployment};
use chartdeploy_runner::{ProcessRunner, ProcessRunnerOptions};

use super::ensure_available;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Target namespace
    #[arg(short, long, env = "CHARTDEPLOY_NAMESPACE")]
    pub namespace: String,

    /// Chart source directory
    #[arg(short, long)]
    pub chart_dir: PathBuf,

    /// Directory for the Helm workspace and generated manifest
    #[arg(short, long, env = "CHARTDEPLOY_WORK_DIR")]
    pub work_dir: PathBuf,

    /// Values file: a path, or a file name under the chart directory
    #[arg(short = 'f', long, default_value = "")]
    pub values: String,

    /// Value override (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,

    /// YAML file with helm/kubectl binaries, repository and timeout
    #[arg(long, env = "CHARTDEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Chart repository URL to register
    #[arg(long, env = "CHARTDEPLOY_REPO_URL")]
    pub repo_url: Option<String>,

    /// Per-command timeout in seconds (0 = none)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Time budget in seconds for the whole render
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Log the helm commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RenderOutput<'a> {
    namespace: &'a str,
    instance: String,
    manifest: String,
}

/// Parse a `KEY=VALUE` pair.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Build the helm configuration from the config file and flags.
pub fn load_config(args: &RenderArgs) -> Result<HelmConfig> {
    let mut config = match &args.config {
        Some(path) => HelmConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => HelmConfig::default(),
    };

    if let Some(url) = &args.repo_url {
        config = config.with_repo_url(url);
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }

    config.validate()?;
    Ok(config)
}

pub async fn execute(args: RenderArgs) -> Result<()> {
    info!("Rendering chart {} for namespace {}", args.chart_dir.display(), args.namespace);

    let config = load_config(&args)?;

    let options = if args.dry_run {
        ProcessRunnerOptions::new().dry_run()
    } else {
        ProcessRunnerOptions::new()
    };
    let runner = Arc::new(ProcessRunner::new(options));
    ensure_available(runner.as_ref(), &config.helm_binary, args.dry_run).await?;

    let mut deployment = HelmDeployment::new(runner, config);
    if let Some(seconds) = args.deadline {
        deployment = deployment.with_deadline(Instant::now() + Duration::from_secs(seconds));
    }

    let overrides: BTreeMap<String, String> = args.set.iter().cloned().collect();
    let request = DeploymentRequest::new(&args.namespace, &args.chart_dir, &args.work_dir)
        .with_values_file(&args.values)
        .with_values(overrides);

    let instance = deployment.provision(&request).await?;

    if args.json {
        let output = RenderOutput {
            namespace: &args.namespace,
            instance: instance.instance_name().to_string(),
            manifest: instance.manifest_path().display().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", instance.manifest_path().display());
    }

    Ok(())
}
