//! whisperup - Provision a local OpenAI Whisper speech-to-text toolchain
//!
//! Entry point for the whisperup CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use whisperup::cli::{Cli, Commands};
use whisperup::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Completions { shell } => {
            whisperup::cli::completions::print(shell);
        }
        // Config manages the file itself, so a corrupt file must not keep
        // it from running; `show` loads on its own.
        Commands::Config(config_cmd) => {
            whisperup::cli::commands::config_command(config_cmd)?;
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            // Execute command
            match command {
                Commands::Setup {
                    dry_run,
                    venv_dir,
                    git_ref,
                    unpinned,
                    skip_system,
                } => {
                    whisperup::cli::commands::run_setup(
                        &settings,
                        dry_run,
                        venv_dir,
                        git_ref,
                        unpinned,
                        skip_system,
                    )
                    .await?;
                }
                Commands::Env { venv_dir } => {
                    whisperup::cli::commands::print_env(&settings, venv_dir)?;
                }
                Commands::Doctor { json, venv_dir } => {
                    whisperup::cli::commands::run_doctor(&settings, json, venv_dir).await?;
                }
                Commands::Completions { .. } | Commands::Config(..) => unreachable!(),
            }
        }
    }

    Ok(())
}
