//! CLI command implementations

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::activate::EnvDescriptor;
use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::exec::SystemRunner;
use crate::platform;
use crate::provision::{Pipeline, ProvisionContext, WhisperSource};

/// Provision the Whisper toolchain end to end
pub async fn run_setup(
    settings: &Settings,
    dry_run: bool,
    venv_dir: Option<PathBuf>,
    git_ref: Option<String>,
    unpinned: bool,
    skip_system: bool,
) -> Result<()> {
    let mut settings = settings.clone();
    if let Some(dir) = venv_dir {
        settings.env.venv_dir = dir;
    }
    if let Some(reference) = git_ref {
        // An explicit reference re-pins a config that lifted the pin.
        settings.whisper.git_ref = reference;
        settings.whisper.unpinned = false;
    }

    settings.validate()?;

    let source = WhisperSource::from_settings(&settings.whisper, unpinned);
    if source.is_unpinned() {
        tracing::warn!(
            "Installing Whisper unpinned; upstream changes can break reproducibility"
        );
    }

    let pipeline = Pipeline::new(&settings, source, skip_system);
    let runner = SystemRunner;

    if dry_run {
        let host = platform::preflight_dry_run(
            &settings.system.package_manager,
            settings.system.escalate,
        )?;
        let ctx = ProvisionContext {
            runner: &runner,
            host,
            env: None,
        };

        println!("whisperup setup (dry run)");
        println!();
        for line in pipeline.render_plan(&ctx) {
            println!("{}", line);
        }
        println!();
        println!("No commands were executed.");
        return Ok(());
    }

    let host = platform::preflight(
        &settings.system.package_manager,
        settings.system.escalate,
        !skip_system,
    )?;
    let mut ctx = ProvisionContext {
        runner: &runner,
        host,
        env: None,
    };
    pipeline.execute(&mut ctx)?;

    print_usage_hint(&settings);
    Ok(())
}

fn print_usage_hint(settings: &Settings) {
    println!();
    println!("Setup complete. To transcribe audio:");
    println!(
        "  source {}/bin/activate    (or: eval \"$(whisperup env)\")",
        settings.env.venv_dir.display()
    );
    println!("  whisper <audio-file> --model small");
}

/// Print shell statements that activate the provisioned environment
pub fn print_env(settings: &Settings, venv_dir: Option<PathBuf>) -> Result<()> {
    let venv = venv_dir.unwrap_or_else(|| settings.env.venv_dir.clone());

    if !venv.join("bin").join("python").exists() {
        anyhow::bail!(
            "no provisioned environment at '{}'. Run `whisperup setup` first.",
            venv.display()
        );
    }

    let descriptor = EnvDescriptor::for_venv(&venv)?;
    print!("{}", descriptor.export_lines());
    Ok(())
}

/// Handle config subcommands
pub fn config_command(cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let settings = Settings::load()?;
            let toml = toml::to_string_pretty(&settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: String,
    detail: String,
}

#[derive(Serialize)]
struct DoctorReport {
    venv_dir: String,
    checks: Vec<DoctorCheck>,
    notes: Vec<String>,
}

/// Run diagnostic checks to help troubleshoot local setup issues.
pub async fn run_doctor(settings: &Settings, json: bool, venv_dir: Option<PathBuf>) -> Result<()> {
    let report = collect_doctor_report(settings, venv_dir);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("whisperup doctor");
    println!("venv: {}", report.venv_dir);
    println!();

    for check in &report.checks {
        println!("{:<10} {:<10} {}", check.name, check.status, check.detail);
    }

    if !report.notes.is_empty() {
        println!();
        for note in &report.notes {
            println!("{}", note);
        }
    }

    Ok(())
}

fn collect_doctor_report(settings: &Settings, venv_dir: Option<PathBuf>) -> DoctorReport {
    let venv = venv_dir.unwrap_or_else(|| settings.env.venv_dir.clone());
    let root = platform::is_root();

    let apt_ok = platform::find_in_path("apt-get").is_some();
    let sudo_ok = platform::find_in_path("sudo").is_some();
    let python_ok = platform::find_in_path(&settings.env.python).is_some();
    let ffmpeg_ok = platform::find_in_path("ffmpeg").is_some();

    let mut checks = vec![
        DoctorCheck {
            name: "apt-get",
            status: probe_status(apt_ok),
            detail: "drives system package installation".to_string(),
        },
        if root {
            DoctorCheck {
                name: "sudo",
                status: "n/a".to_string(),
                detail: "already running as root".to_string(),
            }
        } else {
            DoctorCheck {
                name: "sudo",
                status: probe_status(sudo_ok),
                detail: "escalates package commands".to_string(),
            }
        },
        DoctorCheck {
            name: "python",
            status: probe_status(python_ok),
            detail: format!("'{}' creates the virtual environment", settings.env.python),
        },
        DoctorCheck {
            name: "ffmpeg",
            status: probe_status(ffmpeg_ok),
            detail: "decodes audio for Whisper".to_string(),
        },
    ];

    let venv_python = venv.join("bin").join("python");
    let venv_status = if platform::is_executable(&venv_python) {
        "ok"
    } else if venv.exists() {
        "incomplete"
    } else {
        "missing"
    };
    checks.push(DoctorCheck {
        name: "venv",
        status: venv_status.to_string(),
        detail: venv.display().to_string(),
    });

    // Present is not enough: the entry point has to be runnable.
    let whisper_path = venv.join("bin").join("whisper");
    let whisper_ok = platform::is_executable(&whisper_path);
    let whisper_status = if whisper_ok {
        "ok"
    } else if whisper_path.exists() {
        "not runnable"
    } else {
        "missing"
    };
    checks.push(DoctorCheck {
        name: "whisper",
        status: whisper_status.to_string(),
        detail: "Whisper CLI inside the environment".to_string(),
    });

    let mut notes = Vec::new();
    if !root && !sudo_ok {
        notes.push(
            "warning: not running as root and sudo is missing; system package installation will fail."
                .to_string(),
        );
    }
    if venv_status != "ok" || !whisper_ok {
        notes.push("hint: run `whisperup setup` to provision the environment.".to_string());
    } else {
        notes.push(
            "ok: environment looks ready. Activate it and run `whisper --help`.".to_string(),
        );
    }

    DoctorReport {
        venv_dir: venv.display().to_string(),
        checks,
        notes,
    }
}

fn probe_status(found: bool) -> String {
    if found {
        "ok".to_string()
    } else {
        "missing".to_string()
    }
}
