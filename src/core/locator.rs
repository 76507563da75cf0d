// src/core/locator.rs

use crate::core::{
    project::Project,
    resource::{DirectoryResource, Resource},
};
use crate::facets::build::BuildFacet;
use log::{debug, trace};

/// Discovers projects on disk.
pub trait ProjectLocator {
    /// Builds a project rooted at `dir`, registering whatever facets the
    /// locator can vouch for.
    fn create_project(&self, dir: &DirectoryResource) -> Project;

    /// Walks upward from `start` and returns the first directory that holds the
    /// project marker, or `None` when the walk runs out of directories.
    fn find_project_root_recursively(&self, start: &DirectoryResource) -> Option<DirectoryResource>;

    /// Finds the root above `start` and builds its project.
    fn locate(&self, start: &DirectoryResource) -> Option<Project> {
        self.find_project_root_recursively(start)
            .map(|root| self.create_project(&root))
    }
}

/// Locates projects by the presence of a marker file (`pom.xml` by default).
#[derive(Debug, Clone)]
pub struct MarkerProjectLocator {
    marker: String,
}

impl MarkerProjectLocator {
    /// A locator looking for `marker`.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// The marker file name.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    fn has_marker(&self, dir: &DirectoryResource) -> bool {
        dir.get_child(&self.marker).exists()
    }
}

impl ProjectLocator for MarkerProjectLocator {
    fn create_project(&self, dir: &DirectoryResource) -> Project {
        let project = Project::new(dir.clone());
        if self.has_marker(dir) {
            project.register_facet(BuildFacet::new(&self.marker));
        }
        project
    }

    fn find_project_root_recursively(&self, start: &DirectoryResource) -> Option<DirectoryResource> {
        let mut current = Some(start.clone());
        while let Some(dir) = current {
            trace!("Probing '{}' for '{}'.", dir.path().display(), self.marker);
            if self.has_marker(&dir) {
                debug!("Project root found at '{}'.", dir.path().display());
                return Some(dir);
            }
            current = match dir.parent() {
                Some(Resource::Directory(parent)) => Some(parent),
                _ => None,
            };
        }
        debug!("No '{}' above '{}'.", self.marker, start.path().display());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resource_factory::ResourceFactory;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn dir_at(factory: &Arc<ResourceFactory>, path: &std::path::Path) -> DirectoryResource {
        factory.resource_from(path).as_directory().cloned().unwrap()
    }

    #[test]
    fn test_finds_marker_at_depth() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("p");
        let deep = root.join("src/main/java");
        fs::create_dir_all(&deep).unwrap();
        fs::write(root.join("pom.xml"), "").unwrap();

        let factory = Arc::new(ResourceFactory::new());
        let locator = MarkerProjectLocator::new("pom.xml");

        let found = locator
            .find_project_root_recursively(&dir_at(&factory, &deep))
            .unwrap();
        assert_eq!(found.path(), dunce::canonicalize(&root).unwrap());

        let at_root = locator
            .find_project_root_recursively(&dir_at(&factory, &root))
            .unwrap();
        assert_eq!(at_root, found);
    }

    #[test]
    fn test_no_marker_returns_none() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("a/b");
        fs::create_dir_all(&deep).unwrap();

        let factory = Arc::new(ResourceFactory::new());
        let locator = MarkerProjectLocator::new("anvil-test-marker-that-does-not-exist.xml");
        assert!(locator
            .find_project_root_recursively(&dir_at(&factory, &deep))
            .is_none());
    }

    #[test]
    fn test_locate_registers_build_facet() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("pom.xml"), "").unwrap();
        let factory = Arc::new(ResourceFactory::new());
        let locator = MarkerProjectLocator::new("pom.xml");

        let project = locator.locate(&dir_at(&factory, tmp.path())).unwrap();
        assert!(project.has_facet::<BuildFacet>());
    }
}
