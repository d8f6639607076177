//! User settings (`config.toml` in the config directory).
//!
//! Every field has a default, so a missing file or an empty one is a valid
//! configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Settings file name inside [`paths::config_dir`].
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Runtime variable-data directory. Default downloads live below it.
    pub var_dir: Option<String>,
    /// Resources applied concurrently within one dependency level.
    pub jobs: usize,
    /// `User-Agent` for downloads.
    pub user_agent: Option<String>,
    pub package: PackageCommands,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            var_dir: None,
            jobs: 1,
            user_agent: None,
            package: PackageCommands::default(),
        }
    }
}

/// Command templates for the `package` resource kind.
///
/// `{name}` is replaced by the package name. Templates are split on
/// whitespace and run without a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageCommands {
    /// Exits 0 when the package is installed.
    pub query: String,
    pub install: String,
    pub remove: String,
}

impl Default for PackageCommands {
    fn default() -> Self {
        Self {
            query: "dpkg -s {name}".to_string(),
            install: "apt-get install -y {name}".to_string(),
            remove: "apt-get remove -y {name}".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the config directory.
    pub fn load() -> Result<Self> {
        let path = paths::config_dir()?.join(CONFIG_FILE);
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Resolved variable-data directory.
    pub fn var_dir(&self) -> Result<PathBuf> {
        paths::var_dir(self.var_dir.as_deref())
    }

    /// Worker count, never below one.
    pub fn jobs(&self) -> usize {
        self.jobs.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load_from(&tmp.path().join(CONFIG_FILE)).unwrap();

        assert_eq!(settings.jobs(), 1);
        assert!(settings.var_dir.is_none());
        assert_eq!(settings.package, PackageCommands::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
var_dir = "/srv/tempfetch"
jobs = 4

[package]
query = "rpm -q {name}"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.var_dir.as_deref(), Some("/srv/tempfetch"));
        assert_eq!(settings.jobs(), 4);
        assert_eq!(settings.package.query, "rpm -q {name}");
        assert_eq!(settings.package.install, "apt-get install -y {name}");
    }

    #[test]
    fn test_zero_jobs_means_one() {
        let settings = Settings {
            jobs: 0,
            ..Settings::default()
        };
        assert_eq!(settings.jobs(), 1);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "jobs = \"many\"").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid settings"));
    }
}
