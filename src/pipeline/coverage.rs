//! Test and coverage stage
//!
//! Unlike the linter, a failing test run is a real failure: nothing is converted
//! and no coverage report is written.

use super::Scrutinizer;
use crate::domain::errors::ScrutinizeResult;
use crate::domain::outcome::{StageKind, StageOutcome};
use crate::report::{coverage_line_rate, rewrite_source_paths, write_artifact};
use crate::runner::{CommandRunner, Invocation};

impl<R: CommandRunner> Scrutinizer<R> {
    /// Run the test suite under the coverage collector and write the coverage report
    pub fn run_coverage(&self) -> ScrutinizeResult<StageOutcome> {
        let coverage = &self.config.coverage;

        for package in &coverage.packages {
            self.install_tool(package)?;
        }

        // Test output goes straight to our stderr; stdout carries the coverage profile
        let collect = Invocation::new(self.environment.tool_binary(&coverage.collector))
            .args(coverage.test_args.iter().cloned())
            .current_dir(&self.workdir)
            .inherit_stderr();
        tracing::info!("Running tests with {}", coverage.collector);
        let profile = self.runner.run(&collect)?;

        let convert = Invocation::new(self.environment.tool_binary(&coverage.converter))
            .current_dir(&self.workdir)
            .stdin(profile.stdout);
        tracing::info!("Converting coverage with {}", coverage.converter);
        let converted = self.runner.run(&convert)?;

        let local_path = self.environment.project_source_path();
        let (report, replaced) =
            rewrite_source_paths(&converted.stdout, &local_path, &coverage.build_path);
        tracing::debug!("Rewrote {} occurrence(s) of {}", replaced, local_path);

        let report_path = self.workdir.join(&coverage.report_file);
        write_artifact(&report_path, &report)?;

        let mut outcome = StageOutcome::passed(StageKind::Coverage).with_artifact(report_path);
        outcome.line_rate = coverage_line_rate(&String::from_utf8_lossy(&report));
        Ok(outcome)
    }
}
