//! Process-local virtual environment activation.
//!
//! Instead of mutating the shell the way `source bin/activate` does, an
//! [`EnvDescriptor`] captures the variable changes activation implies and
//! applies them to individual child processes. The parent process
//! environment is never touched.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use crate::ProvisionError;

/// The environment overlay a virtual environment implies: variables to
/// set, variables to clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvDescriptor {
    sets: BTreeMap<String, String>,
    unsets: Vec<String>,
}

impl EnvDescriptor {
    /// Describe activation of the virtual environment at `venv_dir`.
    ///
    /// Relative paths are resolved against the current working directory
    /// so the descriptor stays valid if a child process changes
    /// directory.
    pub fn for_venv(venv_dir: &Path) -> Result<Self, ProvisionError> {
        let absolute = if venv_dir.is_absolute() {
            venv_dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(venv_dir)
        };
        Ok(Self::build(&absolute, std::env::var("PATH").ok()))
    }

    fn build(venv_abs: &Path, existing_path: Option<String>) -> Self {
        let bin = venv_abs.join("bin");
        let path_value = match existing_path {
            Some(existing) if !existing.is_empty() => {
                format!("{}:{}", bin.display(), existing)
            }
            _ => bin.display().to_string(),
        };

        let mut sets = BTreeMap::new();
        sets.insert("VIRTUAL_ENV".to_string(), venv_abs.display().to_string());
        sets.insert("PATH".to_string(), path_value);

        Self {
            sets,
            unsets: vec!["PYTHONHOME".to_string()],
        }
    }

    /// Apply the overlay to a command about to be spawned.
    pub fn apply(&self, command: &mut Command) {
        for key in &self.unsets {
            command.env_remove(key);
        }
        for (key, value) in &self.sets {
            command.env(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.sets.get(key).map(String::as_str)
    }

    /// Render the overlay as shell statements suitable for
    /// `eval "$(whisperup env)"`.
    pub fn export_lines(&self) -> String {
        let mut out = String::new();
        for key in &self.unsets {
            out.push_str(&format!("unset {}\n", key));
        }
        for (key, value) in &self.sets {
            out.push_str(&format!("export {}={}\n", key, sh_single_quote(value)));
        }
        out
    }
}

fn sh_single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
