//! The component descriptor (`beans.xml`).
//!
//! Where the descriptor lives depends on packaging: web archives keep it under
//! `WEB-INF/` in the web root, everything else under `META-INF/` in the
//! resource folder. Changing packaging therefore means moving the file, which
//! [`DescriptorFacet::relocate`] does explicitly.
use crate::constants::DESCRIPTOR_FILENAME;
use crate::core::{
    error::ShellResult,
    project::{Facet, FacetBase, FacetType},
    resource::FileResource,
};
use crate::facets::{packaging::PackagingFacet, resources::ResourceFacet};
use crate::models::PackagingType;
use log::{info, warn};

/// Written on install. The shell never parses it.
const DESCRIPTOR_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<beans xmlns="http://java.sun.com/xml/ns/javaee"
       xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
       xsi:schemaLocation="http://java.sun.com/xml/ns/javaee http://java.sun.com/xml/ns/javaee/beans_1_0.xsd">
</beans>
"#;

/// The project carries a component descriptor.
#[derive(Debug, Default)]
pub struct DescriptorFacet {
    base: FacetBase,
}

impl DescriptorFacet {
    /// An unbound descriptor facet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The descriptor location for the project's current packaging.
    pub fn config_file(&self) -> ShellResult<FileResource> {
        let project = self.base.require_project()?;
        let packaging = project.get_facet::<PackagingFacet>()?.packaging()?;
        self.config_file_for(packaging)
    }

    /// The descriptor location for `packaging`.
    pub fn config_file_for(&self, packaging: PackagingType) -> ShellResult<FileResource> {
        let project = self.base.require_project()?;
        let resources = project.get_facet::<ResourceFacet>()?;
        match packaging {
            PackagingType::War => resources
                .web_root()?
                .get_child_file(&format!("WEB-INF/{}", DESCRIPTOR_FILENAME)),
            PackagingType::Jar => resources
                .resource_folder()?
                .get_child_file(&format!("META-INF/{}", DESCRIPTOR_FILENAME)),
            PackagingType::Pom => {
                warn!(
                    "Packaging '{}' has no descriptor location; using the resource folder.",
                    packaging
                );
                resources
                    .resource_folder()?
                    .get_child_file(&format!("META-INF/{}", DESCRIPTOR_FILENAME))
            }
        }
    }

    /// The descriptor text.
    pub fn contents(&self) -> ShellResult<String> {
        self.config_file()?.read_to_string()
    }

    /// Moves the descriptor from its `from` location to its `to` location.
    ///
    /// Returns `false` when there was nothing to move (the file is absent or
    /// both packagings share a location).
    pub fn relocate(&self, from: PackagingType, to: PackagingType) -> ShellResult<bool> {
        let source = self.config_file_for(from)?;
        let target = self.config_file_for(to)?;
        if source == target || !source.exists() {
            return Ok(false);
        }
        source.move_to(&target)?;
        info!(
            "Relocated descriptor to '{}'.",
            target.path().display()
        );
        Ok(true)
    }
}

impl Facet for DescriptorFacet {
    fn base(&self) -> &FacetBase {
        &self.base
    }

    fn requires(&self) -> Vec<FacetType> {
        vec![
            FacetType::of::<ResourceFacet>(),
            FacetType::of::<PackagingFacet>(),
        ]
    }

    fn is_installed(&self) -> bool {
        self.config_file().is_ok_and(|f| f.exists())
    }

    fn install(&self) -> ShellResult<bool> {
        let file = self.config_file()?;
        if !file.exists() {
            file.set_contents(DESCRIPTOR_TEMPLATE)?;
        }
        Ok(true)
    }
}
