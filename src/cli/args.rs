//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// whisperup - Provision a local OpenAI Whisper speech-to-text toolchain
#[derive(Parser, Debug)]
#[command(name = "whisperup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision the toolchain: system packages, virtual environment, Whisper
    Setup {
        /// Print the commands each stage would run without executing them
        #[arg(long)]
        dry_run: bool,

        /// Where to create the virtual environment
        #[arg(long)]
        venv_dir: Option<PathBuf>,

        /// Git reference to install Whisper from
        #[arg(long = "ref", value_name = "REF", conflicts_with = "unpinned")]
        git_ref: Option<String>,

        /// Install from the repository default branch instead of the pinned reference
        #[arg(long)]
        unpinned: bool,

        /// Skip the system package stage (assumes python3, venv support, and ffmpeg exist)
        #[arg(long)]
        skip_system: bool,
    },

    /// Print shell statements that activate the provisioned environment
    Env {
        /// Virtual environment to describe
        #[arg(long)]
        venv_dir: Option<PathBuf>,
    },

    /// Run diagnostic checks on the host and any provisioned environment
    Doctor {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Virtual environment to inspect
        #[arg(long)]
        venv_dir: Option<PathBuf>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
