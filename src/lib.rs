//! whisperup - Provision a local OpenAI Whisper speech-to-text toolchain
//!
//! Installs the system packages Whisper needs (Python, venv support,
//! ffmpeg), builds an isolated virtual environment, and installs Whisper
//! into it from a pinned git reference.

pub mod activate;
pub mod cli;
pub mod config;
pub mod exec;
pub mod platform;
pub mod provision;

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::CommandStatus;

/// Main error type for the provisioning pipeline.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("unsupported package manager '{0}'. Supported: apt")]
    UnsupportedPackageManager(String),

    #[error("required binary '{name}' not found on PATH ({hint})")]
    MissingBinary { name: String, hint: &'static str },

    #[error("stage '{stage}' could not launch '{program}': {source}")]
    Launch {
        stage: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stage '{stage}' failed: `{command}` exited with {status}")]
    StageFailed {
        stage: &'static str,
        command: String,
        status: CommandStatus,
    },

    #[error("virtual environment at '{}' is missing its interpreter entry point", .0.display())]
    VenvIncomplete(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
