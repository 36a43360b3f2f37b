//! External process execution
//!
//! Architecture: Port and Adapter - stages describe invocations, a `CommandRunner` executes them
//! - `SystemRunner` spawns real processes and blocks until each exits
//! - Tests substitute a recording runner and never spawn anything
//! - Whether a non-zero exit is fatal is decided by the invocation's `FailurePolicy`

#[cfg(test)]
pub(crate) mod fake;

use crate::domain::errors::{ScrutinizeError, ScrutinizeResult};
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

/// What a non-zero exit status means for the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Non-zero exit is a real failure and aborts the run
    Strict,
    /// Non-zero exit is an expected signal (linter findings); the output is kept
    /// and the run continues. Failing to start the tool is still fatal.
    Tolerant,
}

/// Where the child's standard error goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StderrMode {
    /// Captured into `ProcessOutput::stderr`
    Capture,
    /// Streamed straight to our own standard error
    Inherit,
}

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    pub stdin: Option<Vec<u8>>,
    pub stderr: StderrMode,
    pub policy: FailurePolicy,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            stdin: None,
            stderr: StderrMode::Capture,
            policy: FailurePolicy::Strict,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn stdin(mut self, input: Vec<u8>) -> Self {
        self.stdin = Some(input);
        self
    }

    pub fn inherit_stderr(mut self) -> Self {
        self.stderr = StderrMode::Inherit;
        self
    }

    pub fn tolerant(mut self) -> Self {
        self.policy = FailurePolicy::Tolerant;
        self
    }

    /// Program name without its directory, used in log lines
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code; `None` when the process was killed by a signal
    pub status: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Executes invocations and reports their raw output
pub trait CommandRunner {
    /// Run to completion. Errors only when the process could not be started
    /// or fed; exit status is reported in the output, not as an error.
    fn execute(&self, invocation: &Invocation) -> ScrutinizeResult<ProcessOutput>;

    /// Run and apply the invocation's failure policy. Captured diagnostics of a
    /// rejected exit are logged before the error is returned.
    fn run(&self, invocation: &Invocation) -> ScrutinizeResult<ProcessOutput> {
        tracing::debug!("Running {}", invocation);
        let output = self.execute(invocation)?;

        if output.success() {
            return Ok(output);
        }

        let stderr = output.stderr_lossy();
        match invocation.policy {
            FailurePolicy::Tolerant => {
                if !stderr.trim().is_empty() {
                    tracing::warn!("{} reported:\n{}", invocation.program_name(), stderr.trim_end());
                }
                Ok(output)
            }
            FailurePolicy::Strict => {
                if !stderr.trim().is_empty() {
                    tracing::error!("{}", stderr.trim_end());
                }
                let stdout = output.stdout_lossy();
                if !stdout.trim().is_empty() {
                    tracing::error!("{}", stdout.trim_end());
                }
                Err(ScrutinizeError::command_failed(invocation.to_string(), output.status, stderr))
            }
        }
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn execute(&self, invocation: &Invocation) -> ScrutinizeResult<ProcessOutput> {
        (**self).execute(invocation)
    }
}

/// Spawns real child processes, one at a time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn execute(&self, invocation: &Invocation) -> ScrutinizeResult<ProcessOutput> {
        let spawn_error =
            |source: io::Error| ScrutinizeError::Spawn { command: invocation.to_string(), source };

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }
        command.stdout(Stdio::piped());
        command.stderr(match invocation.stderr {
            StderrMode::Capture => Stdio::piped(),
            StderrMode::Inherit => Stdio::inherit(),
        });
        command.stdin(if invocation.stdin.is_some() { Stdio::piped() } else { Stdio::null() });

        let mut child = command.spawn().map_err(spawn_error)?;

        // Fed from a separate thread so a child filling its stdout pipe cannot
        // block on us while we block on its stdin.
        let feeder = match (child.stdin.take(), &invocation.stdin) {
            (Some(mut pipe), Some(input)) => {
                let input = input.clone();
                Some(thread::spawn(move || pipe.write_all(&input)))
            }
            _ => None,
        };

        let output = child.wait_with_output().map_err(spawn_error)?;

        if let Some(feeder) = feeder {
            match feeder.join() {
                Ok(Ok(())) => {}
                // The child exited without reading everything; its status tells the story
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(spawn_error(e)),
                Err(_) => {
                    return Err(spawn_error(io::Error::new(
                        io::ErrorKind::Other,
                        "stdin feeder thread panicked",
                    )))
                }
            }
        }

        Ok(ProcessOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            status: output.status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeRunner;
    use super::*;

    #[test]
    fn test_invocation_display() {
        let invocation = Invocation::new("/go/bin/gometalinter").args(["./...", "--checkstyle"]);
        assert_eq!(invocation.to_string(), "/go/bin/gometalinter ./... --checkstyle");
        assert_eq!(invocation.program_name(), "gometalinter");
    }

    #[test]
    fn test_strict_policy_rejects_non_zero_exit() {
        let runner = FakeRunner::new().respond("go", ProcessOutput {
            stderr: b"cannot find package".to_vec(),
            status: Some(1),
            ..Default::default()
        });

        let err = runner.run(&Invocation::new("go").arg("get")).unwrap_err();
        match err {
            ScrutinizeError::CommandFailed { command, status, stderr } => {
                assert_eq!(command, "go get");
                assert_eq!(status, Some(1));
                assert_eq!(stderr, "cannot find package");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tolerant_policy_keeps_output() {
        let runner = FakeRunner::new().respond("gometalinter", ProcessOutput {
            stdout: b"<checkstyle/>".to_vec(),
            status: Some(1),
            ..Default::default()
        });

        let output = runner.run(&Invocation::new("gometalinter").tolerant()).unwrap();
        assert_eq!(output.stdout, b"<checkstyle/>");
        assert!(!output.success());
    }

    #[test]
    fn test_tolerant_policy_still_fails_on_spawn_error() {
        let runner = FakeRunner::new().fail_to_spawn("gometalinter");
        let err = runner.run(&Invocation::new("/go/bin/gometalinter").tolerant()).unwrap_err();
        assert!(matches!(err, ScrutinizeError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_pipes_stdin_to_stdout() {
        let output = SystemRunner
            .execute(&Invocation::new("cat").stdin(b"<coverage/>".to_vec()))
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, b"<coverage/>");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_status() {
        let output = SystemRunner
            .execute(&Invocation::new("sh").args(["-c", "echo oops >&2; exit 3"]))
            .unwrap();
        assert_eq!(output.status, Some(3));
        assert_eq!(output.stderr_lossy().trim(), "oops");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let err = SystemRunner
            .execute(&Invocation::new("/nonexistent/go-scrutinize-missing-tool"))
            .unwrap_err();
        assert!(matches!(err, ScrutinizeError::Spawn { .. }));
    }
}
