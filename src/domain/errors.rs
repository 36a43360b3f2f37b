//! Error taxonomy for the scrutinize pipeline
//!
//! Architecture: Domain Errors - every failure a stage can report is a variant here
//! - Stages return errors instead of terminating the process
//! - Only the binary decides that an error ends the run
//! - Captured diagnostics travel with the error so the caller can log them

use std::path::PathBuf;

/// Error types that can occur while scrutinizing a project
#[derive(Debug, thiserror::Error)]
pub enum ScrutinizeError {
    /// A required environment variable is absent or empty
    #[error("Missing environment variable {variable}: {hint}")]
    MissingEnvironment { variable: String, hint: String },

    /// The project identifier did not resolve to domain/owner/project
    #[error("Malformed project identifier '{value}': expected <domain>/<owner>/<project>")]
    MalformedProject { value: String },

    /// Settings file could not be loaded, parsed or validated
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// An external tool could not be started at all
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran and reported failure
    #[error("Command '{command}' failed with {}", describe_status(.status))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    /// A report artifact could not be written
    #[error("Unable to write {}: {source}", .path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other IO failure
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ScrutinizeError {
    /// Create a missing environment variable error
    pub fn missing_env(variable: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingEnvironment { variable: variable.into(), hint: hint.into() }
    }

    /// Create a malformed project identifier error
    pub fn malformed_project(value: impl Into<String>) -> Self {
        Self::MalformedProject { value: value.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a failed command error
    pub fn command_failed(
        command: impl Into<String>,
        status: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed { command: command.into(), status, stderr: stderr.into() }
    }

    /// Create a report write error
    pub fn report_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReportWrite { path: path.into(), source }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "termination by signal".to_string(),
    }
}

/// Result type for scrutinize operations
pub type ScrutinizeResult<T> = Result<T, ScrutinizeError>;
