//! Lint stage: install gometalinter, run it, keep its checkstyle report
//!
//! Findings make the linter exit non-zero, so its exit status is tolerated.
//! Installing it, starting it and writing the report are all still fatal.

use super::Scrutinizer;
use crate::domain::errors::ScrutinizeResult;
use crate::domain::outcome::{StageKind, StageOutcome};
use crate::report::{count_checkstyle_findings, write_artifact};
use crate::runner::{CommandRunner, Invocation};

impl<R: CommandRunner> Scrutinizer<R> {
    /// Install the linter and its analyzers, run it and write the lint report
    pub fn run_lint(&self) -> ScrutinizeResult<StageOutcome> {
        let lint = &self.config.lint;

        self.install_tool(&lint.package)?;

        tracing::info!("Installing {} analyzers", lint.binary);
        let install = Invocation::new(self.environment.tool_binary(&lint.binary))
            .arg("--install")
            .current_dir(&self.workdir);
        self.runner.run(&install)?;

        let invocation = self.lint_invocation();
        tracing::info!("Running {}", invocation.program_name());
        let output = self.runner.run(&invocation)?;

        let report_path = self.workdir.join(&lint.report_file);
        write_artifact(&report_path, &output.stdout)?;

        let outcome = if output.success() {
            StageOutcome::passed(StageKind::Lint)
        } else {
            StageOutcome::tolerated(StageKind::Lint, output.status)
        };
        let mut outcome = outcome.with_artifact(report_path);
        outcome.findings = count_checkstyle_findings(&output.stdout_lossy());

        if let Some(findings) = outcome.findings {
            tracing::info!("Linter reported {} finding(s)", findings);
        }
        Ok(outcome)
    }

    /// The linter run, with `--config=` only when the project ships a linter config
    pub(crate) fn lint_invocation(&self) -> Invocation {
        let lint = &self.config.lint;

        let mut invocation = Invocation::new(self.environment.tool_binary(&lint.binary))
            .args(["./...", "--checkstyle"])
            .arg(format!("--deadline={}", lint.deadline))
            .current_dir(&self.workdir)
            .tolerant();

        if self.workdir.join(&lint.config_file).exists() {
            tracing::debug!("Using linter config {}", lint.config_file);
            invocation = invocation.arg(format!("--config={}", lint.config_file));
        }

        invocation.args(lint.extra_args.iter().cloned())
    }
}
