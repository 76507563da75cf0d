// src/core/resource_factory.rs

use crate::core::{
    error::{ShellError, ShellResult},
    paths,
    resource::{DirectoryResource, FileResource, Resource, ResourceType},
};
use crate::models::ShellConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maps a file name pattern to a specialised file type.
#[derive(Debug)]
struct TypeRule {
    name: String,
    pattern: Regex,
}

/// Materialises the most specific resource node for a path.
///
/// The factory is shared (`Arc`) by every resource it creates, so children and
/// parents are always classified with the same rules.
#[derive(Debug, Default)]
pub struct ResourceFactory {
    rules: Vec<TypeRule>,
}

impl ResourceFactory {
    /// A factory that only knows plain files and directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a factory with the typed file rules from the user configuration.
    pub fn from_config(config: &ShellConfig) -> ShellResult<Self> {
        let mut factory = Self::new();
        for (name, pattern) in &config.resource_types {
            factory.register_type(name, pattern)?;
        }
        Ok(factory)
    }

    /// Registers a typed file rule. Rules are tried in registration order.
    pub fn register_type(&mut self, name: &str, pattern: &str) -> ShellResult<()> {
        let regex = Regex::new(pattern).map_err(|e| {
            ShellError::Config(format!("invalid pattern for resource type '{}': {}", name, e))
        })?;
        log::debug!("Registered resource type '{}' for /{}/", name, pattern);
        self.rules.push(TypeRule {
            name: name.to_string(),
            pattern: regex,
        });
        Ok(())
    }

    /// Classifies a path as it currently exists on disk.
    pub fn classify(&self, path: &Path) -> ResourceType {
        if path.is_dir() {
            return ResourceType::Directory;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(&name))
            .map_or(ResourceType::File, |rule| ResourceType::Typed(rule.name.clone()))
    }

    /// Returns the most specific resource for `path`.
    pub fn resource_from(self: &Arc<Self>, path: &Path) -> Resource {
        let path = normalize(path);
        let resource_type = self.classify(&path);
        self.create_from_type(&resource_type, &path)
    }

    /// Constructs a resource of the given type at `path`, whether or not
    /// anything exists there yet.
    pub fn create_from_type(self: &Arc<Self>, resource_type: &ResourceType, path: &Path) -> Resource {
        let path = normalize(path);
        match resource_type {
            ResourceType::Directory => {
                Resource::Directory(DirectoryResource::new(path, Arc::clone(self)))
            }
            other => Resource::File(FileResource::new(path, Arc::clone(self), other.clone())),
        }
    }
}

/// Canonicalizes the parent and keeps the final component as given, so a
/// symlinked child stays under the directory that lists it.
fn normalize(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            paths::canonical_path(parent).join(name)
        }
        _ => paths::canonical_path(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_classify_directory_file_and_typed() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("beans.xml"), "<beans/>").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let mut factory = ResourceFactory::new();
        factory.register_type("descriptor", r"\.xml$").unwrap();

        assert_eq!(factory.classify(&dir.path().join("sub")), ResourceType::Directory);
        assert_eq!(
            factory.classify(&dir.path().join("beans.xml")),
            ResourceType::Typed("descriptor".to_string())
        );
        assert_eq!(factory.classify(&dir.path().join("notes.txt")), ResourceType::File);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let mut factory = ResourceFactory::new();
        assert!(matches!(
            factory.register_type("broken", "(["),
            Err(ShellError::Config(_))
        ));
    }

    #[test]
    fn test_create_from_type_does_not_touch_disk() {
        let dir = TempDir::new().unwrap();
        let factory = Arc::new(ResourceFactory::new());
        let target = dir.path().join("later");

        let resource = factory.create_from_type(&ResourceType::Directory, &target);
        assert!(matches!(resource, Resource::Directory(_)));
        assert!(!resource.exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_from_config_loads_rules() {
        let config = ShellConfig::default();
        let factory = ResourceFactory::from_config(&config).unwrap();
        assert_eq!(
            factory.classify(Path::new("/nowhere/web.xml")),
            ResourceType::Typed("descriptor".to_string())
        );
    }
}
