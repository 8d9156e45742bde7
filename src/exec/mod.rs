//! Subprocess execution seam.
//!
//! Provisioning stages describe the commands they need as [`CommandSpec`]
//! values and hand them to a [`CommandRunner`]. The production runner
//! spawns real processes with inherited stdio so package manager and pip
//! output streams straight to the terminal.

use std::fmt;
use std::io;
use std::process::{Command, ExitStatus};

use crate::activate::EnvDescriptor;

/// A fully-described command: program, arguments, and the environment
/// overlay (if any) to apply before spawning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Option<EnvDescriptor>,
}

impl CommandSpec {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: None,
        }
    }

    /// Attach an environment overlay applied to the spawned process only.
    pub fn with_env(mut self, env: EnvDescriptor) -> Self {
        self.env = Some(env);
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(' ') {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Exit status of a finished command, decoupled from `std::process` so
/// test runners can fabricate one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    code: Option<i32>,
}

impl CommandStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<ExitStatus> for CommandStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

// Rendered after "exited with" in stage failure messages.
impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "code {}", code),
            None => write!(f, "a signal"),
        }
    }
}

/// Runs commands on behalf of provisioning stages.
pub trait CommandRunner: Send + Sync {
    fn run(&self, spec: &CommandSpec) -> io::Result<CommandStatus>;
}

/// Spawns real processes. Stdout and stderr are inherited so the user
/// sees package manager and pip progress as it happens.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<CommandStatus> {
        tracing::debug!("Running: {}", spec);
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(env) = &spec.env {
            env.apply(&mut command);
        }
        let status = command.status()?;
        Ok(CommandStatus::from(status))
    }
}

/// Records every spec it receives instead of spawning anything, and can
/// report failure at a chosen call index.
#[cfg(test)]
pub struct RecordingRunner {
    calls: std::sync::Mutex<Vec<CommandSpec>>,
    fail_index: Option<usize>,
}

#[cfg(test)]
impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: std::sync::Mutex::new(Vec::new()),
            fail_index: None,
        }
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            calls: std::sync::Mutex::new(Vec::new()),
            fail_index: Some(index),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<CommandStatus> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(spec.clone());
        if self.fail_index == Some(index) {
            Ok(CommandStatus::from_code(1))
        } else {
            Ok(CommandStatus::from_code(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_program_and_args() {
        let spec = CommandSpec::new("apt-get", ["install", "-y", "ffmpeg"]);
        assert_eq!(spec.to_string(), "apt-get install -y ffmpeg");
    }

    #[test]
    fn display_quotes_args_with_spaces() {
        let spec = CommandSpec::new("python3", ["-m", "venv", "my env"]);
        assert_eq!(spec.to_string(), "python3 -m venv 'my env'");
    }

    #[test]
    fn status_success_only_for_zero() {
        assert!(CommandStatus::from_code(0).success());
        assert!(!CommandStatus::from_code(1).success());
        assert!(!CommandStatus::from_code(100).success());
    }

    #[test]
    fn status_display_names_code_or_signal() {
        assert_eq!(CommandStatus::from_code(1).to_string(), "code 1");
        let signalled = CommandStatus { code: None };
        assert_eq!(signalled.to_string(), "a signal");
    }

    #[test]
    fn recording_runner_keeps_call_order() {
        let runner = RecordingRunner::new();
        let first = CommandSpec::new("apt-get", ["update"]);
        let second = CommandSpec::new("python3", ["-m", "venv", "whisper_env"]);
        runner.run(&first).unwrap();
        runner.run(&second).unwrap();
        let calls = runner.calls();
        assert_eq!(calls, vec![first, second]);
    }

    #[test]
    fn recording_runner_fails_at_requested_index() {
        let runner = RecordingRunner::failing_at(1);
        let spec = CommandSpec::new("true", Vec::<String>::new());
        assert!(runner.run(&spec).unwrap().success());
        assert!(!runner.run(&spec).unwrap().success());
        assert!(runner.run(&spec).unwrap().success());
    }
}
