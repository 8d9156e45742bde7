//! Application settings management

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::platform::Escalate;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// System package installation settings
    #[serde(default)]
    pub system: SystemSettings,

    /// Virtual environment settings
    #[serde(default)]
    pub env: EnvSettings,

    /// Whisper installation settings
    #[serde(default)]
    pub whisper: WhisperSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Package manager driving system installs (only apt is supported)
    #[serde(default = "default_package_manager")]
    pub package_manager: String,

    /// System packages the toolchain needs
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,

    /// When to prefix package commands with sudo (auto, always, never)
    #[serde(default)]
    pub escalate: Escalate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvSettings {
    /// Where the virtual environment is created (relative paths resolve
    /// against the working directory)
    #[serde(default = "default_venv_dir")]
    pub venv_dir: PathBuf,

    /// Interpreter used to create the environment
    #[serde(default = "default_python")]
    pub python: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperSettings {
    /// Git repository Whisper is installed from
    #[serde(default = "default_git_url")]
    pub git_url: String,

    /// Git reference pinned by default installs
    #[serde(default = "default_git_ref")]
    pub git_ref: String,

    /// Install whatever the repository's default branch holds instead of
    /// the pinned reference
    #[serde(default)]
    pub unpinned: bool,
}

// Default value functions

fn default_package_manager() -> String {
    "apt".to_string()
}

fn default_packages() -> Vec<String> {
    vec![
        "python3".to_string(),
        "python3-venv".to_string(),
        "ffmpeg".to_string(),
    ]
}

fn default_venv_dir() -> PathBuf {
    PathBuf::from("whisper_env")
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_git_url() -> String {
    "https://github.com/openai/whisper.git".to_string()
}

fn default_git_ref() -> String {
    "v20250625".to_string()
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            package_manager: default_package_manager(),
            packages: default_packages(),
            escalate: Escalate::default(),
        }
    }
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            venv_dir: default_venv_dir(),
            python: default_python(),
        }
    }
}

impl Default for WhisperSettings {
    fn default() -> Self {
        Self {
            git_url: default_git_url(),
            git_ref: default_git_ref(),
            unpinned: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            system: SystemSettings::default(),
            env: EnvSettings::default(),
            whisper: WhisperSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("No config file found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(settings)
    }

    /// Check that the settings describe a runnable provisioning plan
    pub fn validate(&self) -> Result<()> {
        if self.system.packages.is_empty() {
            bail!("system.packages must not be empty");
        }
        if self.env.venv_dir.as_os_str().is_empty() {
            bail!("env.venv_dir must not be empty");
        }
        if self.env.python.trim().is_empty() {
            bail!("env.python must not be empty");
        }
        if self.whisper.git_url.trim().is_empty() {
            bail!("whisper.git_url must not be empty");
        }
        if !self.whisper.unpinned && self.whisper.git_ref.trim().is_empty() {
            bail!("whisper.git_ref must not be empty unless whisper.unpinned = true");
        }
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "whisperup", "whisperup")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}
