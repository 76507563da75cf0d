//! # Built-in Facets
//!
//! The capability units a project can carry, and the catalog the `project`
//! plugin installs them from by name.
use crate::core::{
    constraints,
    error::{ShellError, ShellResult},
    project::{Facet, FacetType, Project},
};
use log::debug;

/// The build marker facet.
pub mod build;
/// The descriptor file facet.
pub mod descriptor;
/// The packaging facet.
pub mod packaging;
/// The resource folder facet.
pub mod resources;

use descriptor::DescriptorFacet;
use packaging::PackagingFacet;
use resources::ResourceFacet;

/// A facet that can be installed by name.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    name: &'static str,
    description: &'static str,
    facet_type: FacetType,
    install: fn(&Project) -> ShellResult<()>,
    detect: fn(&Project) -> bool,
}

impl CatalogEntry {
    fn of<F: Facet + Default>(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            facet_type: FacetType::of::<F>(),
            install: |project| project.install_facet(F::default()).map(|_| ()),
            detect: |project| {
                let facet = F::default();
                if constraints::verify_facet_prerequisites(project, "detect", &facet.requires()).is_err() {
                    return false;
                }
                facet.set_project(project);
                if facet.is_installed() {
                    project.register_facet(facet);
                    true
                } else {
                    false
                }
            },
        }
    }

    /// The name typed by the user.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A one-line description.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// The facet type installed.
    pub fn facet_type(&self) -> FacetType {
        self.facet_type
    }
}

/// The facets installable by name, in dependency order.
#[derive(Debug, Clone)]
pub struct FacetCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for FacetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FacetCatalog {
    /// The built-in facets.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                CatalogEntry::of::<PackagingFacet>("packaging", "Project packaging settings"),
                CatalogEntry::of::<ResourceFacet>("resources", "Resource and web root folders"),
                CatalogEntry::of::<DescriptorFacet>("descriptor", "Component descriptor (beans.xml)"),
            ],
        }
    }

    /// All entries.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// The entry named `name`.
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Installs the facet named `name` on `project`.
    pub fn install(&self, project: &Project, name: &str) -> ShellResult<FacetType> {
        let entry = self
            .find(name)
            .ok_or_else(|| ShellError::not_found(format!("Facet '{}'", name)))?;
        (entry.install)(project)?;
        Ok(entry.facet_type)
    }

    /// Registers every catalog facet already present on disk.
    ///
    /// Entries are visited in dependency order, so a facet is only detected
    /// once its prerequisites have been.
    pub fn detect_installed(&self, project: &Project) -> Vec<FacetType> {
        let found: Vec<FacetType> = self
            .entries
            .iter()
            .filter(|entry| !project.has_facet_type(&entry.facet_type))
            .filter(|entry| (entry.detect)(project))
            .map(|entry| entry.facet_type)
            .collect();
        if !found.is_empty() {
            debug!(
                "Detected facets on '{}': {:?}",
                project.root_path().display(),
                found
            );
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::tests::project_in;
    use build::BuildFacet;
    use tempfile::TempDir;

    #[test]
    fn test_install_by_name() {
        let dir = TempDir::new().unwrap();
        let project = project_in(&dir);
        project.install_facet(BuildFacet::new("pom.xml")).unwrap();
        let catalog = FacetCatalog::builtin();

        assert_eq!(
            catalog.install(&project, "packaging").unwrap(),
            FacetType::of::<PackagingFacet>()
        );
        assert!(project.has_facet::<PackagingFacet>());
        assert!(matches!(
            catalog.install(&project, "nope"),
            Err(ShellError::NotFound { .. })
        ));
    }

    #[test]
    fn test_detect_installed_on_fresh_project() {
        let dir = TempDir::new().unwrap();
        let first = project_in(&dir);
        first.install_facet(BuildFacet::new("pom.xml")).unwrap();
        let catalog = FacetCatalog::builtin();
        for name in ["packaging", "resources", "descriptor"] {
            catalog.install(&first, name).unwrap();
        }

        let second = project_in(&dir);
        second.register_facet(BuildFacet::new("pom.xml"));
        let detected = catalog.detect_installed(&second);
        assert_eq!(detected.len(), 3);
        assert!(second.has_facet::<DescriptorFacet>());
    }
}
