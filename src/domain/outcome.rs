//! Stage outcomes and the summary of a single run
//!
//! Architecture: Aggregate Root - RunSummary collects the outcome of every stage in order
//! - Outcomes only exist for stages that completed; a fatal stage produces an error instead
//! - Tolerated outcomes keep the exit code the tool reported

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Dependencies,
    Lint,
    Coverage,
}

impl StageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::Lint => "lint",
            Self::Coverage => "coverage",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a completed stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    /// Every command exited successfully
    Passed,
    /// The stage's main tool exited non-zero and the stage policy accepted it
    Tolerated { exit_code: Option<i32> },
}

/// Outcome of one completed stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: StageKind,
    #[serde(flatten)]
    pub status: StageStatus,
    /// Wall time spent in the stage
    pub elapsed_ms: u64,
    /// Report written by the stage, if any
    pub artifact: Option<PathBuf>,
    /// Checkstyle `<error>` entries found in the lint report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<usize>,
    /// Overall line rate of the coverage report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_rate: Option<f64>,
}

impl StageOutcome {
    pub fn passed(stage: StageKind) -> Self {
        Self {
            stage,
            status: StageStatus::Passed,
            elapsed_ms: 0,
            artifact: None,
            findings: None,
            line_rate: None,
        }
    }

    pub fn tolerated(stage: StageKind, exit_code: Option<i32>) -> Self {
        Self { status: StageStatus::Tolerated { exit_code }, ..Self::passed(stage) }
    }

    pub fn with_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact = Some(path.into());
        self
    }

    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn is_tolerated(&self) -> bool {
        matches!(self.status, StageStatus::Tolerated { .. })
    }
}

/// Summary of one scrutinize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// `<domain>/<owner>/<project>` that was scrutinized
    pub project: String,
    pub started_at: DateTime<Utc>,
    pub stages: Vec<StageOutcome>,
}

impl RunSummary {
    pub fn new(project: impl Into<String>) -> Self {
        Self { project: project.into(), started_at: Utc::now(), stages: Vec::new() }
    }

    pub fn record(&mut self, outcome: StageOutcome) {
        self.stages.push(outcome);
    }

    pub fn stage(&self, kind: StageKind) -> Option<&StageOutcome> {
        self.stages.iter().find(|outcome| outcome.stage == kind)
    }

    /// Total time across recorded stages
    pub fn total_elapsed_ms(&self) -> u64 {
        self.stages.iter().map(|outcome| outcome.elapsed_ms).sum()
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &PathBuf> {
        self.stages.iter().filter_map(|outcome| outcome.artifact.as_ref())
    }
}
