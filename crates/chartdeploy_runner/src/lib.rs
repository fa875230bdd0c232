//! # chartdeploy_runner
//!
//! External process execution for chartdeploy.
//!
//! Every tool invocation made while provisioning a chart (helm, kubectl)
//! goes through the [`CommandRunner`] trait, so the pipeline can be driven
//! by real processes or by a scripted [`MockRunner`] in tests.
//!
//! # Features
//!
//! - **Process Runner**: `tokio::process` based execution with captured output
//! - **Time Limits**: Per-invocation timeout plus an absolute deadline
//! - **Dry-Run Mode**: Log commands without executing them
//! - **Mock Runner**: Scripted responses and captured calls for testing
//!
//! # Example
//!
//! ```rust,no_run
//! use chartdeploy_runner::{
//!     CommandLine, CommandRunner, ProcessRunner, ProcessRunnerOptions, RunConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = ProcessRunner::new(ProcessRunnerOptions::default());
//!
//!     let command = CommandLine::new("helm").args(["version", "--client"]);
//!     let result = runner.run(&command, &RunConfig::default().timeout(30)).await?;
//!     println!("Exit code: {}", result.exit_code);
//!
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod mock;
pub mod process;
pub mod runner;

pub use command::CommandLine;
pub use config::RunConfig;
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use process::{ProcessRunner, ProcessRunnerOptions};
pub use runner::{CommandRunner, ExecutionResult};
