// src/core/paths.rs

use crate::constants::{ANVIL_DIR, CONFIG_FILENAME, PROJECT_SETTINGS_FILENAME};
use crate::core::environment::Environment;
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref ANVIL_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Failures locating or expanding paths.
#[derive(Error, Debug)]
pub enum PathError {
    /// The OS reports no configuration directory.
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    /// `~` or a `$VAR` in user input could not be expanded.
    #[error("Could not expand path '{path}': {reason}")]
    Expansion {
        /// The input as typed.
        path: String,
        /// Why expansion failed.
        reason: String,
    },
}

/// Returns the path to the anvil configuration directory (`~/.config/anvil`).
///
/// Memoized: the first call asks the OS, later calls return the cached value.
/// The directory is not created here; nothing in anvil writes to it.
pub fn get_anvil_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = ANVIL_CONFIG_DIR
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join("anvil");

    *cached = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path to the user's `config.toml`.
pub fn get_config_file_path() -> Result<PathBuf, PathError> {
    get_anvil_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Returns the path of the settings file for a project rooted at `root`.
pub fn project_settings_path(root: &Path) -> PathBuf {
    root.join(ANVIL_DIR).join(PROJECT_SETTINGS_FILENAME)
}

/// Expands `~` and environment variables in a user-typed path and resolves it
/// against `base` when it is relative. Both come from `env`.
pub fn expand_user_path(input: &str, base: &Path, env: &dyn Environment) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full_with_context(
        input,
        || env.home_dir().map(|home| home.to_string_lossy().into_owned()),
        |name| {
            env.var(name)
                .map(Some)
                .ok_or_else(|| "variable is not set".to_string())
        },
    )
    .map_err(|e| PathError::Expansion {
        path: input.to_string(),
        reason: e.to_string(),
    })?;

    let path = PathBuf::from(expanded.into_owned());
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(base.join(path))
    }
}

/// Canonical form of a path that may not exist yet.
///
/// Existing paths are canonicalized; for a missing path the nearest existing
/// ancestor is canonicalized and the remaining components are appended.
pub fn canonical_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            canonical_path(parent).join(name)
        }
        _ => path.to_path_buf(),
    }
}
