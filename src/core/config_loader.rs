//! # Config Loader
//!
//! Reads the user configuration (`config.toml`) and the per-project settings
//! file (`.anvil/project.toml`). A missing file is not an error: callers get the
//! defaults instead.
use crate::{
    core::{
        error::{ShellError, ShellResult},
        paths,
    },
    models::{ProjectSettings, ShellConfig},
};
use anyhow::{Context, Result};
use std::{fs, io::ErrorKind, path::Path};

/// Loads the user configuration.
///
/// `explicit` takes priority (the `--config` flag); otherwise the file in the
/// anvil config directory is used when it exists.
pub fn load_shell_config(explicit: Option<&Path>) -> Result<ShellConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match paths::get_config_file_path() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("{}. Using default configuration.", e);
                return Ok(ShellConfig::default());
            }
        },
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound && explicit.is_none() => {
            log::debug!("No config at '{}'. Using defaults.", path.display());
            return Ok(ShellConfig::default());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read config file '{}'", path.display()));
        }
    };

    let config: ShellConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
    log::debug!("Loaded config from '{}': {:?}", path.display(), config);
    Ok(config)
}

/// Reads the settings of the project rooted at `root`, if the file exists.
pub fn read_project_settings(root: &Path) -> ShellResult<Option<ProjectSettings>> {
    let path = paths::project_settings_path(root);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ShellError::io(path, e)),
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ShellError::Config(format!("'{}': {}", path.display(), e)))
}

/// Writes the settings of the project rooted at `root`, creating `.anvil/` if needed.
pub fn write_project_settings(root: &Path, settings: &ProjectSettings) -> ShellResult<()> {
    let path = paths::project_settings_path(root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ShellError::io(parent, e))?;
    }
    let text = toml::to_string_pretty(settings)
        .map_err(|e| ShellError::Config(format!("'{}': {}", path.display(), e)))?;
    fs::write(&path, text).map_err(|e| ShellError::io(&path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PackagingType;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_config_is_parsed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "marker = \"build.gradle\"\n[resource_types]\njava = '\\.java$'\n")
            .unwrap();

        let config = load_shell_config(Some(&path)).unwrap();
        assert_eq!(config.marker, "build.gradle");
        assert_eq!(
            config.resource_types.get("java").map(String::as_str),
            Some(r"\.java$")
        );
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = load_shell_config(Some(&dir.path().join("nope.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_project_settings_write_then_read() {
        let dir = TempDir::new().unwrap();
        assert!(read_project_settings(dir.path()).unwrap().is_none());

        let settings = ProjectSettings {
            packaging: PackagingType::War,
        };
        write_project_settings(dir.path(), &settings).unwrap();
        assert_eq!(read_project_settings(dir.path()).unwrap(), Some(settings));
    }

    #[test]
    fn test_malformed_project_settings_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = paths::project_settings_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "packaging = \"ear\"").unwrap();
        assert!(matches!(
            read_project_settings(dir.path()),
            Err(ShellError::Config(_))
        ));
    }
}
