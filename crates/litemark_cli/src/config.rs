//! Data directory resolution for the CLI.
//!
//! Precedence: `--data-dir`, then `LITEMARK_DATA_DIR`, then the platform
//! data directory. The result is always absolute.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const DATA_DIR_ENV: &str = "LITEMARK_DATA_DIR";
const APP_DIR_NAME: &str = "litemark";
const LOG_DIR_NAME: &str = "logs";

/// Resolves the data directory from the flag, the environment and the
/// platform default.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    let env_value = std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty());
    let chosen = choose_data_dir(flag, env_value, platform_data_dir());
    absolutize(&chosen)
}

/// Log files live under the data directory.
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_DIR_NAME)
}

fn choose_data_dir(
    flag: Option<PathBuf>,
    env_value: Option<OsString>,
    platform: Option<PathBuf>,
) -> PathBuf {
    flag.or_else(|| env_value.map(PathBuf::from))
        .or(platform)
        .unwrap_or_else(|| PathBuf::from(".litemark"))
}

pub fn platform_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join(APP_DIR_NAME));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(APP_DIR_NAME),
            );
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|value| !value.is_empty()) {
            return Some(PathBuf::from(xdg).join(APP_DIR_NAME));
        }
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join(APP_DIR_NAME),
            );
        }
    }

    None
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}
