//! Centralized path resolution for tempfetch
//!
//! # Environment Variables
//!
//! - `TEMPFETCH_CONFIG_DIR` - Override config directory
//! - `TEMPFETCH_VAR_DIR` - Override the runtime variable-data directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `TEMPFETCH_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/tempfetch` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\tempfetch`
//!    - macOS/Linux: `~/.config/tempfetch`
//!
//! For var_dir():
//! 1. `TEMPFETCH_VAR_DIR` environment variable
//! 2. `var_dir` from `config.toml`
//! 3. `XDG_STATE_HOME/tempfetch` (if set)
//! 4. Platform default:
//!    - Windows: `%LOCALAPPDATA%\tempfetch`
//!    - macOS/Linux: `~/.local/state/tempfetch`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "tempfetch";

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "TEMPFETCH_CONFIG_DIR";

/// Environment variable for var directory override
pub const ENV_VAR_DIR: &str = "TEMPFETCH_VAR_DIR";

/// Subdirectory of the var dir holding downloads without an explicit path
pub const TEMP_FILES_DIR: &str = "temp_files";

/// Get the tempfetch config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!("Using config dir from {ENV_CONFIG_DIR}: {}", path.display());
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_NAME);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            return Ok(app_data.join(APP_NAME));
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_NAME);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the runtime variable-data directory
///
/// `configured` is the `var_dir` setting, if any. The environment
/// variable wins over it.
pub fn var_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_VAR_DIR) {
        let path = expand(&dir);
        log::debug!("Using var dir from {ENV_VAR_DIR}: {}", path.display());
        return Ok(path);
    }

    if let Some(dir) = configured {
        let path = expand(dir);
        log::debug!("Using var dir from config: {}", path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join(APP_NAME);
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(local_app_data) = dirs::data_local_dir() {
            return Ok(local_app_data.join(APP_NAME));
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join(APP_NAME);
    log::debug!("Using default var dir: {}", path.display());
    Ok(path)
}

/// Directory for downloads that don't name a path.
pub fn temp_files_dir(var_dir: &Path) -> PathBuf {
    var_dir.join(TEMP_FILES_DIR)
}

/// Expand ~ and environment variables in a path string.
///
/// Unresolvable variables leave the input untouched.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Helper to run a test with temporary env var
    ///
    /// # Safety
    /// Uses unsafe env::set_var/remove_var; each variable is only touched
    /// by one test.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: no other test touches this variable
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: as above
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    fn without_env_var<F, R>(key: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: no other test touches this variable
        unsafe { env::remove_var(key) };
        let result = f();
        if let Some(v) = original {
            // SAFETY: as above
            unsafe { env::set_var(key, v) };
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env_var(ENV_CONFIG_DIR, "/custom/config/path", || {
            let result = config_dir().unwrap();
            assert_eq!(result, PathBuf::from("/custom/config/path"));
        });
    }

    // One test for every var_dir source so the env mutations never race.
    #[test]
    fn test_var_dir_priority() {
        with_env_var(ENV_VAR_DIR, "/custom/var", || {
            assert_eq!(
                var_dir(Some("/from/config")).unwrap(),
                PathBuf::from("/custom/var")
            );
        });

        without_env_var(ENV_VAR_DIR, || {
            assert_eq!(
                var_dir(Some("/from/config")).unwrap(),
                PathBuf::from("/from/config")
            );

            with_env_var("XDG_STATE_HOME", "/tmp/xdg-state-test", || {
                assert_eq!(
                    var_dir(None).unwrap(),
                    PathBuf::from("/tmp/xdg-state-test/tempfetch")
                );
            });
        });
    }

    #[test]
    fn test_temp_files_dir() {
        assert_eq!(
            temp_files_dir(Path::new("/var/lib/tempfetch")),
            PathBuf::from("/var/lib/tempfetch/temp_files")
        );
    }

    #[test]
    fn test_expand_with_tilde() {
        let result = expand("~/test/path");
        let home = dirs::home_dir().unwrap();
        assert_eq!(result, home.join("test").join("path"));
    }

    #[test]
    fn test_expand_absolute() {
        assert_eq!(expand("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_unknown_var_is_untouched() {
        let result = expand("$TEMPFETCH_SURELY_UNSET_VAR/x");
        assert_eq!(result, PathBuf::from("$TEMPFETCH_SURELY_UNSET_VAR/x"));
    }
}
