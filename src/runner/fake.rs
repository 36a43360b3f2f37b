//! Recording runner for tests

use super::{CommandRunner, Invocation, ProcessOutput};
use crate::domain::errors::{ScrutinizeError, ScrutinizeResult};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;

enum Scripted {
    Output(ProcessOutput),
    SpawnFailure,
}

/// Records every invocation and replays scripted results per program name.
/// Programs without a script exit 0 with empty output.
#[derive(Default)]
pub(crate) struct FakeRunner {
    scripts: RefCell<HashMap<String, VecDeque<Scripted>>>,
    calls: RefCell<Vec<Invocation>>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue an output for the next call to `program` (matched on file name)
    pub(crate) fn respond(self, program: &str, output: ProcessOutput) -> Self {
        self.push(program, Scripted::Output(output));
        self
    }

    /// Queue a successful call printing `stdout`
    pub(crate) fn respond_stdout(self, program: &str, stdout: &str) -> Self {
        self.respond(
            program,
            ProcessOutput { stdout: stdout.as_bytes().to_vec(), status: Some(0), ..Default::default() },
        )
    }

    /// Queue a call exiting with `status` and printing `stderr`
    pub(crate) fn respond_failure(self, program: &str, status: i32, stderr: &str) -> Self {
        self.respond(
            program,
            ProcessOutput { stderr: stderr.as_bytes().to_vec(), status: Some(status), ..Default::default() },
        )
    }

    /// Queue a call that cannot be started
    pub(crate) fn fail_to_spawn(self, program: &str) -> Self {
        self.push(program, Scripted::SpawnFailure);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Every call rendered as a command line
    pub(crate) fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(ToString::to_string).collect()
    }

    fn push(&self, program: &str, scripted: Scripted) {
        self.scripts.borrow_mut().entry(program.to_string()).or_default().push_back(scripted);
    }
}

impl CommandRunner for FakeRunner {
    fn execute(&self, invocation: &Invocation) -> ScrutinizeResult<ProcessOutput> {
        self.calls.borrow_mut().push(invocation.clone());

        let next = self
            .scripts
            .borrow_mut()
            .get_mut(&invocation.program_name())
            .and_then(|queue| queue.pop_front());

        match next {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::SpawnFailure) => Err(ScrutinizeError::Spawn {
                command: invocation.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
            }),
            None => Ok(ProcessOutput { status: Some(0), ..Default::default() }),
        }
    }
}
