//! Dependency installation stage

use super::Scrutinizer;
use crate::domain::errors::ScrutinizeResult;
use crate::domain::outcome::{StageKind, StageOutcome};
use crate::runner::{CommandRunner, Invocation};

impl<R: CommandRunner> Scrutinizer<R> {
    /// Fetch every package of the project tree along with its test dependencies
    pub fn install_dependencies(&self) -> ScrutinizeResult<StageOutcome> {
        let invocation = self.dependencies_invocation();
        tracing::info!("Installing project dependencies");
        self.runner.run(&invocation)?;
        Ok(StageOutcome::passed(StageKind::Dependencies))
    }

    pub(crate) fn dependencies_invocation(&self) -> Invocation {
        let deps = &self.config.dependencies;
        Invocation::new(&deps.fetch_program)
            .arg(&deps.fetch_command)
            .args(deps.project_args.iter().cloned())
            .current_dir(&self.workdir)
    }
}
