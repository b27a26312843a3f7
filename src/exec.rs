//! External command execution with testable invocation.
//!
//! Everything that shells out (audio extraction, probing, muxing) goes
//! through the `CommandExecutor` trait. Invocation is always a fixed program
//! plus an argument vector; caller-influenced strings are passed as single
//! arguments and never interpolated into a shell command line.

use crate::error::{Result, SubgenError};
use std::collections::VecDeque;
use std::process::Command;
use std::sync::{Arc, Mutex};

/// Captured result of one external tool invocation.
///
/// A non-zero exit is reported here, not as an error: callers decide whether
/// it is fatal and what to do with the captured stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Raw standard output
    pub stdout: Vec<u8>,
    /// Standard error, lossily decoded
    pub stderr: String,
}

/// Trait for executing external tools.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
/// Enables testability by allowing mock implementations.
pub trait CommandExecutor: Send + Sync {
    /// Run a program with arguments and capture its output.
    ///
    /// Returns an error only when the process cannot be started (tool not
    /// installed, permissions); a failing exit status is a `ToolOutput` with
    /// `success == false`.
    fn execute(&self, program: &str, args: &[&str]) -> Result<ToolOutput>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, program: &str, args: &[&str]) -> Result<ToolOutput> {
        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SubgenError::ToolNotFound {
                    tool: program.to_string(),
                }
            } else {
                SubgenError::Io(e)
            }
        })?;

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Mock command executor for testing.
///
/// Records all invocations and returns configured responses in order.
/// Clones share state, so a test can keep a handle after moving the executor
/// into a gateway.
#[derive(Debug, Clone, Default)]
pub struct MockCommandExecutor {
    calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    responses: Arc<Mutex<VecDeque<Result<ToolOutput>>>>,
}

impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next invocation.
    pub fn push_response(&self, response: Result<ToolOutput>) {
        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        responses.push_back(response);
    }

    /// Queue a successful invocation with the given stdout.
    pub fn push_success(&self, stdout: &[u8]) {
        self.push_response(Ok(ToolOutput {
            success: true,
            stdout: stdout.to_vec(),
            stderr: String::new(),
        }));
    }

    /// Queue a non-zero exit with the given stderr.
    pub fn push_failure(&self, stderr: &str) {
        self.push_response(Ok(ToolOutput {
            success: false,
            stdout: Vec::new(),
            stderr: stderr.to_string(),
        }));
    }

    /// All invocations seen so far, as (program, args) pairs.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, program: &str, args: &[&str]) -> Result<ToolOutput> {
        {
            let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
            calls.push((
                program.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
            ));
        }
        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        responses.pop_front().unwrap_or_else(|| {
            Ok(ToolOutput {
                success: true,
                stdout: Vec::new(),
                stderr: String::new(),
            })
        })
    }
}
