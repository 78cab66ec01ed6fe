//! Test-only helpers: a scratch Django-style project and a scripted tool.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::apply::MigrationTool;
use crate::io::config::CONFIG_FILE_NAME;
use crate::io::process::MigrationCommand;
use crate::io::venv::activate_path;

/// [`MigrationTool`] that returns pre-scripted exit codes and records calls.
///
/// Errors once the script is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedTool {
    codes: RefCell<VecDeque<i32>>,
    calls: RefCell<Vec<MigrationCommand>>,
}

impl ScriptedTool {
    pub fn new(codes: Vec<i32>) -> Self {
        Self {
            codes: RefCell::new(codes.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<MigrationCommand> {
        self.calls.borrow().clone()
    }
}

impl MigrationTool for ScriptedTool {
    fn migrate(&self, migration: &MigrationCommand) -> Result<i32> {
        self.calls.borrow_mut().push(migration.clone());
        self.codes
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted tool has no exit code left"))
    }
}

/// Temporary project root containing `manage.py` and a `scripts/` directory.
pub struct TestProject {
    _temp: TempDir,
    root: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let root = fs::canonicalize(temp.path()).context("canonicalize tempdir")?;
        fs::create_dir_all(root.join("scripts")).context("create scripts dir")?;
        fs::write(root.join("manage.py"), "").context("write manage.py")?;
        Ok(Self { _temp: temp, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create `env/` with an activate script declaring `VIRTUAL_ENV`.
    pub fn create_venv(&self) -> Result<PathBuf> {
        let venv_root = self.root.join("env");
        let activate = activate_path(&self.root, "env");
        let bin_dir = activate.parent().context("activate has parent")?;
        fs::create_dir_all(bin_dir).context("create venv bin dir")?;
        let script = format!(
            "# This file must be used with \"source bin/activate\"\nVIRTUAL_ENV=\"{}\"\nexport VIRTUAL_ENV\n_OLD_VIRTUAL_PATH=\"$PATH\"\nPATH=\"$VIRTUAL_ENV/bin:$PATH\"\nexport PATH\n",
            venv_root.display()
        );
        fs::write(&activate, script).context("write activate")?;
        Ok(venv_root)
    }

    pub fn write_config(&self, contents: &str) -> Result<()> {
        fs::write(self.root.join(CONFIG_FILE_NAME), contents).context("write config")
    }

    /// Path where the fake interpreter appends one `cwd|VIRTUAL_ENV|args` line per call.
    pub fn invocation_log(&self) -> PathBuf {
        self.root.join("invocations.log")
    }

    /// Lines recorded by fake interpreters.
    pub fn invocations(&self) -> Result<Vec<String>> {
        let path = self.invocation_log();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path).context("read invocation log")?;
        Ok(contents.lines().map(str::to_string).collect())
    }

    /// Copy `binary` to `scripts/migrate`, the deployed location.
    pub fn install_binary(&self, binary: &Path) -> Result<PathBuf> {
        let dest = self.root.join("scripts").join("migrate");
        fs::copy(binary, &dest)
            .with_context(|| format!("copy {} to {}", binary.display(), dest.display()))?;
        Ok(dest)
    }

    /// Write an executable `sh` script at `dir/name` that logs its call and
    /// exits with `exit_code`.
    #[cfg(unix)]
    pub fn write_fake_interpreter(
        &self,
        dir: &Path,
        name: &str,
        exit_code: i32,
    ) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        let path = dir.join(name);
        let script = format!(
            "#!/bin/sh\nprintf '%s|%s|%s\\n' \"$(pwd -P)\" \"${{VIRTUAL_ENV:-}}\" \"$*\" >> '{}'\nexit {exit_code}\n",
            self.invocation_log().display()
        );
        fs::write(&path, script).with_context(|| format!("write {}", path.display()))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("chmod {}", path.display()))?;
        Ok(path)
    }
}
