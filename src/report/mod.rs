//! Run reporting: written artifacts and the printed run summary
//!
//! Architecture: Anti-Corruption Layer - formatters translate domain outcomes to external formats
//! - `artifacts` owns the files handed to the analysis platform
//! - `ReportFormatter` renders a RunSummary for people or for machines

pub mod artifacts;

pub use artifacts::{
    count_checkstyle_findings, coverage_line_rate, rewrite_source_paths, write_artifact,
};

use crate::domain::errors::{ScrutinizeError, ScrutinizeResult};
use crate::domain::outcome::{RunSummary, StageOutcome, StageStatus};
use std::io::Write;

#[cfg(feature = "colors")]
use colored::Colorize;

/// Supported output formats for the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    Human,
    /// JSON document for programmatic consumption
    Json,
}

impl OutputFormat {
    /// Parse format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json"]
    }
}

/// Options for customizing summary output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (human format only)
    pub use_colors: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Renders run summaries
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a run summary in the specified format
    pub fn format_summary(&self, summary: &RunSummary, format: OutputFormat) -> ScrutinizeResult<String> {
        match format {
            OutputFormat::Human => Ok(self.format_human(summary)),
            OutputFormat::Json => self.format_json(summary),
        }
    }

    /// Write a formatted summary to a writer
    pub fn write_summary<W: Write>(
        &self,
        summary: &RunSummary,
        format: OutputFormat,
        mut writer: W,
    ) -> ScrutinizeResult<()> {
        let formatted = self.format_summary(summary, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    fn format_human(&self, summary: &RunSummary) -> String {
        let mut output = format!("Scrutinized {}\n", summary.project);

        for outcome in &summary.stages {
            output.push_str(&format!(
                "  {:<13} {} ({} ms)",
                outcome.stage.as_str(),
                self.status_label(outcome),
                outcome.elapsed_ms
            ));
            if let Some(artifact) = &outcome.artifact {
                output.push_str(&format!(" -> {}", artifact.display()));
            }
            output.push('\n');

            if let Some(findings) = outcome.findings {
                output.push_str(&format!(
                    "                {} lint finding{}\n",
                    findings,
                    if findings == 1 { "" } else { "s" }
                ));
            }
            if let Some(rate) = outcome.line_rate {
                output.push_str(&format!("                {:.1}% line coverage\n", rate * 100.0));
            }
        }

        output.push_str(&format!(
            "Completed {} stage{} in {:.1}s\n",
            summary.stages.len(),
            if summary.stages.len() == 1 { "" } else { "s" },
            summary.total_elapsed_ms() as f64 / 1000.0
        ));
        output
    }

    fn status_label(&self, outcome: &StageOutcome) -> String {
        let label = match outcome.status {
            StageStatus::Passed => "passed".to_string(),
            StageStatus::Tolerated { exit_code: Some(code) } => format!("tolerated (exit {code})"),
            StageStatus::Tolerated { exit_code: None } => "tolerated (signal)".to_string(),
        };
        self.paint(label, outcome.is_tolerated())
    }

    #[cfg(feature = "colors")]
    fn paint(&self, label: String, tolerated: bool) -> String {
        if !self.options.use_colors {
            return label;
        }
        if tolerated {
            label.yellow().to_string()
        } else {
            label.green().to_string()
        }
    }

    #[cfg(not(feature = "colors"))]
    fn paint(&self, label: String, _tolerated: bool) -> String {
        label
    }

    fn format_json(&self, summary: &RunSummary) -> ScrutinizeResult<String> {
        let json = serde_json::json!({
            "project": summary.project,
            "started_at": summary.started_at.to_rfc3339(),
            "total_elapsed_ms": summary.total_elapsed_ms(),
            "stages": summary.stages,
        });

        serde_json::to_string_pretty(&json)
            .map_err(|e| ScrutinizeError::config(format!("JSON serialization failed: {e}")))
    }
}
