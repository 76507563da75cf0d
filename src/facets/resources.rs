// src/facets/resources.rs

use crate::constants::{RESOURCES_FOLDER, WEB_ROOT_FOLDER};
use crate::core::{
    error::ShellResult,
    project::{Facet, FacetBase, FacetType},
    resource::DirectoryResource,
};
use crate::facets::build::BuildFacet;

/// The project has resource folders: `src/main/resources` and the web root.
#[derive(Debug, Default)]
pub struct ResourceFacet {
    base: FacetBase,
}

impl ResourceFacet {
    /// An unbound resource facet.
    pub fn new() -> Self {
        Self::default()
    }

    /// `src/main/resources`.
    pub fn resource_folder(&self) -> ShellResult<DirectoryResource> {
        self.base
            .require_project()?
            .root()
            .get_child_directory(RESOURCES_FOLDER)
    }

    /// `src/main/webapp`.
    pub fn web_root(&self) -> ShellResult<DirectoryResource> {
        self.base
            .require_project()?
            .root()
            .get_child_directory(WEB_ROOT_FOLDER)
    }
}

impl Facet for ResourceFacet {
    fn base(&self) -> &FacetBase {
        &self.base
    }

    fn requires(&self) -> Vec<FacetType> {
        vec![FacetType::of::<BuildFacet>()]
    }

    fn is_installed(&self) -> bool {
        self.resource_folder().is_ok_and(|d| d.exists())
    }

    fn install(&self) -> ShellResult<bool> {
        self.resource_folder()?.mkdirs()?;
        self.web_root()?.mkdirs()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::tests::project_in;
    use tempfile::TempDir;

    #[test]
    fn test_install_creates_folders() {
        let dir = TempDir::new().unwrap();
        let project = project_in(&dir);
        project.install_facet(BuildFacet::new("pom.xml")).unwrap();

        let facet = project.install_facet(ResourceFacet::new()).unwrap();
        assert!(dir.path().join("src/main/resources").is_dir());
        assert!(dir.path().join("src/main/webapp").is_dir());
        assert!(facet.is_installed());
    }
}
