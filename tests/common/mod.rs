use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

#[allow(dead_code)]
pub fn run_whisperup(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

/// Write an empty placeholder with the executable bit set.
#[allow(dead_code)]
pub fn write_executable(path: &Path) {
    std::fs::write(path, "").expect("write placeholder");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .expect("mark placeholder executable");
    }
}

pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    data: TempDir,
    work: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            data: tempfile::tempdir().expect("create temporary XDG data dir"),
            work: tempfile::tempdir().expect("create temporary working dir"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_whisperup"))
            .args(args)
            .current_dir(self.work.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to execute whisperup binary")
    }

    /// Working directory relative venv paths resolve against.
    #[allow(dead_code)]
    pub fn work_path(&self) -> PathBuf {
        self.work.path().to_path_buf()
    }

    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        let output = self.run(&["config", "path"]);
        assert!(
            output.status.success(),
            "config path should succeed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        let path = String::from_utf8_lossy(&output.stdout);
        PathBuf::from(path.trim())
    }

    #[allow(dead_code)]
    pub fn write_config(&self, contents: &str) {
        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).expect("create config parent directory");
        }
        std::fs::write(&config_path, contents).expect("write config file");
    }

    /// Fabricate a venv directory layout that looks provisioned.
    #[allow(dead_code)]
    pub fn fabricate_venv(&self, name: &str) -> PathBuf {
        let venv = self.work.path().join(name);
        let bin = venv.join("bin");
        std::fs::create_dir_all(&bin).expect("create venv bin dir");
        write_executable(&bin.join("python"));
        venv
    }
}
