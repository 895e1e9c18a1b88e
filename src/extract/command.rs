//! External command execution for ffmpeg and ffprobe.
//!
//! The `CommandExecutor` trait keeps the video path testable without the
//! real tools installed.

use crate::error::{MultisumError, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync so one executor can be shared by every run.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments.
    ///
    /// Returns the stdout of the command on success.
    fn execute(&self, command: &str, args: &[&str]) -> Result<String>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        tracing::trace!(command, ?args, "Executing external tool");

        let output = Command::new(command).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MultisumError::ToolNotFound {
                    tool: command.to_string(),
                }
            } else {
                MultisumError::ToolFailed {
                    tool: command.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MultisumError::ToolFailed {
                tool: command.to_string(),
                message: format!("exit status {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Mock command executor for testing.
///
/// Records every call and answers from a queue of configured responses,
/// defaulting to empty stdout. A command registered with `with_file_output`
/// also writes the given bytes to its last argument, the way ffmpeg writes
/// its output file.
#[derive(Debug, Default)]
pub struct MockCommandExecutor {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    responses: Mutex<VecDeque<Result<String>>>,
    file_outputs: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a successful response to the queue.
    pub fn with_response(self, response: &str) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(Ok(response.to_string()));
        }
        self
    }

    /// Add an error response to the queue.
    pub fn with_error(self, error: MultisumError) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(Err(error));
        }
        self
    }

    /// Make `command` write `bytes` to the path in its last argument.
    pub fn with_file_output(self, command: &str, bytes: Vec<u8>) -> Self {
        if let Ok(mut outputs) = self.file_outputs.lock() {
            outputs.push((command.to_string(), bytes));
        }
        self
    }

    /// All recorded calls as (command, args).
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((
                command.to_string(),
                args.iter().map(|s| s.to_string()).collect(),
            ));
        }

        let response = self
            .responses
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Ok(String::new()));

        if response.is_ok()
            && let Some(target) = args.last()
            && let Ok(outputs) = self.file_outputs.lock()
            && let Some((_, bytes)) = outputs.iter().find(|(c, _)| c == command)
        {
            std::fs::write(Path::new(target), bytes)?;
        }

        response
    }
}
