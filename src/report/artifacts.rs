//! Report artifacts written for the analysis platform
//!
//! Architecture: Infrastructure - persistence and literal rewriting of tool output
//! - Reports are overwritten on every run
//! - Rewriting is a literal substring replacement, never a path-aware one
//! - Insight extraction is best effort and never fails a run

use crate::domain::errors::{ScrutinizeError, ScrutinizeResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref CHECKSTYLE_ERROR: Regex = Regex::new(r"<error[\s/>]").expect("static regex");
    static ref COVERAGE_LINE_RATE: Regex =
        Regex::new(r#"<coverage\b[^>]*?\bline-rate="([0-9.eE+-]+)""#).expect("static regex");
}

/// Write (or overwrite) a report file
pub fn write_artifact(path: &Path, contents: &[u8]) -> ScrutinizeResult<()> {
    fs::write(path, contents).map_err(|e| ScrutinizeError::report_write(path, e))?;
    tracing::info!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Replace every occurrence of the local checkout path with the build path.
/// Works on raw bytes so anything that is not valid UTF-8 passes through untouched.
/// Returns the rewritten report and the number of replacements made.
pub fn rewrite_source_paths(report: &[u8], local_path: &str, build_path: &str) -> (Vec<u8>, usize) {
    if local_path.is_empty() {
        return (report.to_vec(), 0);
    }
    let needle = local_path.as_bytes();
    let mut rewritten = Vec::with_capacity(report.len());
    let mut occurrences = 0;
    let mut rest = report;
    while let Some(at) = find_bytes(rest, needle) {
        rewritten.extend_from_slice(&rest[..at]);
        rewritten.extend_from_slice(build_path.as_bytes());
        rest = &rest[at + needle.len()..];
        occurrences += 1;
    }
    rewritten.extend_from_slice(rest);
    (rewritten, occurrences)
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Number of `<error>` entries in a checkstyle report
pub fn count_checkstyle_findings(report: &str) -> Option<usize> {
    if !report.contains("<checkstyle") {
        return None;
    }
    Some(CHECKSTYLE_ERROR.find_iter(report).count())
}

/// The root `line-rate` of a Cobertura-style coverage report
pub fn coverage_line_rate(report: &str) -> Option<f64> {
    COVERAGE_LINE_RATE
        .captures(report)
        .and_then(|captures| captures.get(1))
        .and_then(|rate| rate.as_str().parse().ok())
}
