//! The scrutinize pipeline
//!
//! Architecture: Application Service - Scrutinizer runs the stages strictly in order
//! - dependencies, then lint, then coverage; each stage blocks on one child process at a time
//! - A stage error ends the run; the caller decides what that means for the process
//! - Linter findings are the one tolerated failure (see `FailurePolicy::Tolerant`)

mod coverage;
mod dependencies;
mod lint;

use crate::config::ScrutinizeConfig;
use crate::domain::errors::ScrutinizeResult;
use crate::domain::outcome::{RunSummary, StageKind, StageOutcome};
use crate::domain::project::Environment;
use crate::runner::{CommandRunner, Invocation};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Runs the Scrutinizer build steps for one Go project
pub struct Scrutinizer<R: CommandRunner> {
    runner: R,
    environment: Environment,
    config: ScrutinizeConfig,
    workdir: PathBuf,
}

impl<R: CommandRunner> Scrutinizer<R> {
    /// `workdir` is the project checkout: reports land there and every tool runs there
    pub fn new(
        runner: R,
        environment: Environment,
        config: ScrutinizeConfig,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self { runner, environment, config, workdir: workdir.into() }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn config(&self) -> &ScrutinizeConfig {
        &self.config
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run every stage in order, stopping at the first fatal error
    pub fn run(&self) -> ScrutinizeResult<RunSummary> {
        let mut summary = RunSummary::new(self.environment.project.full());
        tracing::info!(
            "Scrutinizing {} (tools in {})",
            summary.project,
            self.environment.tool_path.display()
        );

        summary.record(self.timed(StageKind::Dependencies, || self.install_dependencies())?);
        summary.record(self.timed(StageKind::Lint, || self.run_lint())?);
        summary.record(self.timed(StageKind::Coverage, || self.run_coverage())?);

        Ok(summary)
    }

    fn timed<F>(&self, stage: StageKind, body: F) -> ScrutinizeResult<StageOutcome>
    where
        F: FnOnce() -> ScrutinizeResult<StageOutcome>,
    {
        tracing::info!("Stage {} started", stage);
        let start_time = Instant::now();

        let result = body();
        let elapsed_ms = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => {
                tracing::info!("Stage {} finished in {} ms", stage, elapsed_ms);
                Ok(outcome.with_elapsed(elapsed_ms))
            }
            Err(e) => {
                tracing::error!("Stage {} failed after {} ms: {}", stage, elapsed_ms, e);
                Err(e)
            }
        }
    }

    /// `<fetch program> <fetch command> <package>` run in the working directory
    fn fetch(&self, package: &str) -> Invocation {
        let deps = &self.config.dependencies;
        Invocation::new(&deps.fetch_program)
            .arg(&deps.fetch_command)
            .arg(package)
            .current_dir(&self.workdir)
    }

    /// Install a tool package; no-op when it is already present
    fn install_tool(&self, package: &str) -> ScrutinizeResult<()> {
        tracing::info!("Installing {}", package);
        self.runner.run(&self.fetch(package))?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::project::ProjectIdentifier;
    use crate::runner::fake::FakeRunner;
    use tempfile::TempDir;

    pub(crate) fn environment() -> Environment {
        Environment {
            project: ProjectIdentifier::parse("g/acme/widgets").unwrap(),
            tool_path: PathBuf::from("/home/ci/go"),
        }
    }

    pub(crate) fn scrutinizer<'a>(
        runner: &'a FakeRunner,
        dir: &TempDir,
    ) -> Scrutinizer<&'a FakeRunner> {
        Scrutinizer::new(runner, environment(), ScrutinizeConfig::default(), dir.path())
    }
}
