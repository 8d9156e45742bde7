//! Host inspection and preflight validation.
//!
//! Provisioning only proceeds once the host looks workable: the
//! configured package manager is one we know how to drive, and the
//! binaries the run will need are actually on PATH.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::exec::CommandSpec;
use crate::ProvisionError;

/// When to prefix system package commands with `sudo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escalate {
    /// Escalate only when not already running as root.
    #[default]
    Auto,
    Always,
    Never,
}

/// Facts about the host that provisioning stages need.
#[derive(Debug, Clone)]
pub struct HostContext {
    escalation: Option<String>,
}

impl HostContext {
    /// The command commands get prefixed with, if any.
    pub fn escalation(&self) -> Option<&str> {
        self.escalation.as_deref()
    }

    /// Build a spec for a command that needs system privileges.
    pub fn elevated<I, A>(&self, program: &str, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        match &self.escalation {
            Some(prefix) => {
                let mut full: Vec<String> = vec![program.to_string()];
                full.extend(args.into_iter().map(Into::into));
                CommandSpec::new(prefix.clone(), full)
            }
            None => CommandSpec::new(
                program,
                args.into_iter().map(Into::into).collect::<Vec<String>>(),
            ),
        }
    }
}

/// Validate configuration and host readiness before any stage runs.
pub fn preflight(
    package_manager: &str,
    escalate: Escalate,
    include_system: bool,
) -> Result<HostContext, ProvisionError> {
    validate_package_manager(package_manager)?;
    let escalation = escalation_for(escalate, is_root());

    if include_system {
        if find_in_path("apt-get").is_none() {
            return Err(ProvisionError::MissingBinary {
                name: "apt-get".to_string(),
                hint: "whisperup provisions Debian-based systems",
            });
        }
        if let Some(prefix) = &escalation {
            if find_in_path(prefix).is_none() {
                return Err(ProvisionError::MissingBinary {
                    name: prefix.clone(),
                    hint: "run as root or install sudo",
                });
            }
        }
    }

    Ok(HostContext { escalation })
}

/// Preflight for plan rendering only: validates configuration but skips
/// the PATH probes, since a dry run spawns nothing.
pub fn preflight_dry_run(
    package_manager: &str,
    escalate: Escalate,
) -> Result<HostContext, ProvisionError> {
    validate_package_manager(package_manager)?;
    Ok(HostContext {
        escalation: escalation_for(escalate, is_root()),
    })
}

pub fn validate_package_manager(name: &str) -> Result<(), ProvisionError> {
    match name {
        "apt" => Ok(()),
        other => Err(ProvisionError::UnsupportedPackageManager(other.to_string())),
    }
}

fn escalation_for(mode: Escalate, root: bool) -> Option<String> {
    match mode {
        Escalate::Auto => (!root).then(|| "sudo".to_string()),
        Escalate::Always => Some("sudo".to_string()),
        Escalate::Never => None,
    }
}

/// Whether the current process already has root privileges.
pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no failure modes.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Locate an executable on the current PATH.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_in_dirs(name, std::env::split_paths(&path))
}

fn find_in_dirs<I>(name: &str, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Whether `path` is an existing file with the executable bit set.
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match path.metadata() {
            Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apt_is_the_only_supported_package_manager() {
        assert!(validate_package_manager("apt").is_ok());
        let err = validate_package_manager("dnf").unwrap_err();
        assert!(err.to_string().contains("unsupported package manager 'dnf'"));
        assert!(err.to_string().contains("Supported: apt"));
    }

    #[test]
    fn auto_escalation_depends_on_root() {
        assert_eq!(escalation_for(Escalate::Auto, true), None);
        assert_eq!(escalation_for(Escalate::Auto, false), Some("sudo".to_string()));
        assert_eq!(escalation_for(Escalate::Always, true), Some("sudo".to_string()));
        assert_eq!(escalation_for(Escalate::Never, false), None);
    }

    #[test]
    fn dry_run_preflight_resolves_escalation() {
        let host = preflight_dry_run("apt", Escalate::Always).unwrap();
        assert_eq!(host.escalation(), Some("sudo"));

        let host = preflight_dry_run("apt", Escalate::Never).unwrap();
        assert_eq!(host.escalation(), None);
    }

    #[test]
    fn elevated_prefixes_when_escalation_is_set() {
        let host = HostContext {
            escalation: Some("sudo".to_string()),
        };
        let spec = host.elevated("apt-get", ["update"]);
        assert_eq!(spec.program, "sudo");
        assert_eq!(spec.args, vec!["apt-get".to_string(), "update".to_string()]);
    }

    #[test]
    fn elevated_runs_directly_without_escalation() {
        let host = HostContext { escalation: None };
        let spec = host.elevated("apt-get", ["install", "-y", "ffmpeg"]);
        assert_eq!(spec.program, "apt-get");
        assert_eq!(spec.args.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn find_in_dirs_requires_the_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("mytool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();

        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(find_in_dirs("mytool", [dir.path().to_path_buf()]), None);

        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(
            find_in_dirs("mytool", [dir.path().to_path_buf()]),
            Some(tool)
        );
    }
}
