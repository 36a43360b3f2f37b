//! go-scrutinize - Scrutinizer CI harness for Go projects
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Domain types (project identity, outcomes, errors) know nothing about processes
//! - The pipeline drives external tools through the `CommandRunner` port
//! - The binary only parses arguments, initialises logging and maps errors to exit codes

pub mod config;
pub mod domain;
pub mod pipeline;
pub mod report;
pub mod runner;

// Re-export main types for convenient access
pub use domain::{
    Environment, ProjectIdentifier, RunSummary, ScrutinizeError, ScrutinizeResult, StageKind,
    StageOutcome, StageStatus,
};

pub use config::{ConfigBuilder, ScrutinizeConfig};

pub use pipeline::Scrutinizer;

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use runner::{CommandRunner, FailurePolicy, Invocation, ProcessOutput, SystemRunner};

use std::path::Path;

/// Resolve the environment from the current process and run the whole
/// pipeline with real processes in `workdir`
pub fn scrutinize<P: AsRef<Path>>(
    config: ScrutinizeConfig,
    workdir: P,
) -> ScrutinizeResult<RunSummary> {
    let environment = Environment::from_process()?;
    Scrutinizer::new(SystemRunner, environment, config, workdir.as_ref()).run()
}
