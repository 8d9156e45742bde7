//! The individual stages a provisioning run is made of.

use std::path::PathBuf;

use crate::activate::EnvDescriptor;
use crate::config::WhisperSettings;
use crate::exec::{CommandRunner, CommandSpec};
use crate::platform::HostContext;
use crate::ProvisionError;

/// State threaded through the stages of one run. Activation fills in
/// `env`; later stages apply it to their commands.
pub struct ProvisionContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub host: HostContext,
    pub env: Option<EnvDescriptor>,
}

/// One stage of the provisioning pipeline.
pub trait ProvisionStep {
    fn title(&self) -> &'static str;

    /// The commands this stage would run. Used for plan rendering and by
    /// the default `run` implementation.
    fn commands(&self, ctx: &ProvisionContext) -> Vec<CommandSpec>;

    /// Extra line shown under this stage in the plan.
    fn plan_note(&self) -> Option<&'static str> {
        None
    }

    fn run(&self, ctx: &mut ProvisionContext) -> Result<(), ProvisionError> {
        for spec in self.commands(ctx) {
            execute(self.title(), ctx.runner, &spec)?;
        }
        Ok(())
    }
}

fn execute(
    stage: &'static str,
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
) -> Result<(), ProvisionError> {
    let status = runner.run(spec).map_err(|source| ProvisionError::Launch {
        stage,
        program: spec.program.clone(),
        source,
    })?;

    if !status.success() {
        return Err(ProvisionError::StageFailed {
            stage,
            command: spec.to_string(),
            status,
        });
    }
    Ok(())
}

/// Refresh the package index and install the system prerequisites.
pub struct SystemPackages {
    pub packages: Vec<String>,
}

impl ProvisionStep for SystemPackages {
    fn title(&self) -> &'static str {
        "Install system packages"
    }

    fn commands(&self, ctx: &ProvisionContext) -> Vec<CommandSpec> {
        let mut install = vec!["install".to_string(), "-y".to_string()];
        install.extend(self.packages.iter().cloned());
        vec![
            ctx.host.elevated("apt-get", ["update"]),
            ctx.host.elevated("apt-get", install),
        ]
    }
}

/// Create the Python virtual environment.
pub struct CreateVenv {
    pub python: String,
    pub venv_dir: PathBuf,
}

impl ProvisionStep for CreateVenv {
    fn title(&self) -> &'static str {
        "Create virtual environment"
    }

    fn commands(&self, _ctx: &ProvisionContext) -> Vec<CommandSpec> {
        vec![CommandSpec::new(
            self.python.clone(),
            [
                "-m".to_string(),
                "venv".to_string(),
                self.venv_dir.display().to_string(),
            ],
        )]
    }
}

/// Verify the environment is usable and record its activation overlay in
/// the context. Spawns nothing itself.
pub struct Activate {
    pub venv_dir: PathBuf,
}

impl ProvisionStep for Activate {
    fn title(&self) -> &'static str {
        "Activate environment (process-local)"
    }

    fn commands(&self, _ctx: &ProvisionContext) -> Vec<CommandSpec> {
        Vec::new()
    }

    fn plan_note(&self) -> Option<&'static str> {
        Some("no commands; later stages receive VIRTUAL_ENV and a PATH pointing into the environment")
    }

    fn run(&self, ctx: &mut ProvisionContext) -> Result<(), ProvisionError> {
        let python = self.venv_dir.join("bin").join("python");
        if !python.exists() {
            return Err(ProvisionError::VenvIncomplete(self.venv_dir.clone()));
        }
        ctx.env = Some(EnvDescriptor::for_venv(&self.venv_dir)?);
        Ok(())
    }
}

/// Where pip should install Whisper from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhisperSource {
    Pinned { url: String, git_ref: String },
    Unpinned { url: String },
}

impl WhisperSource {
    /// A CLI `--unpinned` flag or the config file can both lift the pin.
    pub fn from_settings(whisper: &WhisperSettings, unpinned_flag: bool) -> Self {
        if unpinned_flag || whisper.unpinned {
            Self::Unpinned {
                url: whisper.git_url.clone(),
            }
        } else {
            Self::Pinned {
                url: whisper.git_url.clone(),
                git_ref: whisper.git_ref.clone(),
            }
        }
    }

    /// The requirement string handed to pip.
    pub fn pip_requirement(&self) -> String {
        match self {
            Self::Pinned { url, git_ref } => format!("git+{url}@{git_ref}"),
            Self::Unpinned { url } => format!("git+{url}"),
        }
    }

    pub fn is_unpinned(&self) -> bool {
        matches!(self, Self::Unpinned { .. })
    }
}

/// Upgrade pip inside the environment, then install Whisper into it.
pub struct InstallWhisper {
    pub venv_dir: PathBuf,
    pub source: WhisperSource,
}

impl ProvisionStep for InstallWhisper {
    fn title(&self) -> &'static str {
        "Install OpenAI Whisper"
    }

    fn commands(&self, ctx: &ProvisionContext) -> Vec<CommandSpec> {
        // The environment's own interpreter drives pip, so packages land
        // inside the venv even if PATH lookup would find another python.
        let python = self
            .venv_dir
            .join("bin")
            .join("python")
            .display()
            .to_string();

        let mut specs = vec![
            CommandSpec::new(python.clone(), ["-m", "pip", "install", "--upgrade", "pip"]),
            CommandSpec::new(
                python,
                [
                    "-m".to_string(),
                    "pip".to_string(),
                    "install".to_string(),
                    self.source.pip_requirement(),
                ],
            ),
        ];

        if let Some(env) = &ctx.env {
            specs = specs
                .into_iter()
                .map(|spec| spec.with_env(env.clone()))
                .collect();
        }
        specs
    }
}
