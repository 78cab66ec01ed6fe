//! Optional runner configuration stored in `<root>/migrate.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// File name looked up at the project root.
pub const CONFIG_FILE_NAME: &str = "migrate.toml";

/// Runner configuration (TOML).
///
/// Every field is optional. Defaults reproduce the fixed deployment behavior:
/// `python manage.py migrate core` inside the `env` virtualenv, followed by a
/// gunicorn restart reminder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MigrateConfig {
    /// Django app label whose migrations are applied.
    pub app: String,

    /// Management script, relative to the project root.
    pub manage_script: String,

    /// Interpreter used to run the management script.
    pub interpreter: String,

    /// Virtualenv directory, relative to the project root.
    pub venv_dir: String,

    /// Printed after `Done. ` once migrations succeed.
    pub restart_hint: String,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            app: "core".to_string(),
            manage_script: "manage.py".to_string(),
            interpreter: "python".to_string(),
            venv_dir: "env".to_string(),
            restart_hint:
                "Restart gunicorn (e.g. sudo systemctl restart gunicorn) if running on server."
                    .to_string(),
        }
    }
}

impl MigrateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.app.trim().is_empty() || self.app.chars().any(char::is_whitespace) {
            return Err(anyhow!("app must be a single non-empty label"));
        }
        if self.manage_script.trim().is_empty() {
            return Err(anyhow!("manage_script must be non-empty"));
        }
        if self.interpreter.trim().is_empty() {
            return Err(anyhow!("interpreter must be non-empty"));
        }
        if self.venv_dir.trim().is_empty() {
            return Err(anyhow!("venv_dir must be non-empty"));
        }
        Ok(())
    }

    /// Line printed before the migration tool is spawned.
    pub fn announce_line(&self) -> String {
        format!("Applying {} migrations...", self.app)
    }

    /// Line printed after the migration tool succeeded.
    pub fn done_line(&self) -> String {
        format!("Done. {}", self.restart_hint)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `MigrateConfig::default()`.
pub fn load_config(path: &Path) -> Result<MigrateConfig> {
    if !path.exists() {
        let cfg = MigrateConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: MigrateConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join(CONFIG_FILE_NAME)).expect("load");
        assert_eq!(cfg, MigrateConfig::default());
    }

    #[test]
    fn default_lines_match_deploy_output() {
        let cfg = MigrateConfig::default();
        assert_eq!(cfg.announce_line(), "Applying core migrations...");
        assert_eq!(
            cfg.done_line(),
            "Done. Restart gunicorn (e.g. sudo systemctl restart gunicorn) if running on server."
        );
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "interpreter = \"python3\"\nvenv_dir = \".venv\"\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.interpreter, "python3");
        assert_eq!(cfg.venv_dir, ".venv");
        assert_eq!(cfg.app, "core");
        assert_eq!(cfg.manage_script, "manage.py");
    }

    #[test]
    fn rejects_app_label_with_whitespace() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "app = \"core extra\"\n").expect("write");

        let err = load_config(&path).expect_err("should reject");
        assert!(format!("{err:#}").contains("app must be"));
    }

    #[test]
    fn rejects_unparsable_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "app = [\n").expect("write");

        let err = load_config(&path).expect_err("should reject");
        assert!(format!("{err:#}").contains("parse"));
    }

    #[test]
    fn rejects_empty_interpreter() {
        let cfg = MigrateConfig {
            interpreter: "  ".to_string(),
            ..MigrateConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
