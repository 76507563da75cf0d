// src/facets/packaging.rs

use crate::core::{
    config_loader,
    error::ShellResult,
    project::{Facet, FacetBase, FacetType},
};
use crate::facets::build::BuildFacet;
use crate::models::{PackagingType, ProjectSettings};
use log::info;

/// The project declares how it is packaged, in `.anvil/project.toml`.
#[derive(Debug, Default)]
pub struct PackagingFacet {
    base: FacetBase,
}

impl PackagingFacet {
    /// An unbound packaging facet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current settings; defaults when the file is missing.
    pub fn settings(&self) -> ShellResult<ProjectSettings> {
        let project = self.base.require_project()?;
        Ok(config_loader::read_project_settings(project.root_path())?.unwrap_or_default())
    }

    /// The declared packaging type.
    pub fn packaging(&self) -> ShellResult<PackagingType> {
        self.settings().map(|s| s.packaging)
    }

    /// Changes the packaging type and returns the previous one.
    pub fn set_packaging(&self, packaging: PackagingType) -> ShellResult<PackagingType> {
        let project = self.base.require_project()?;
        let mut settings = self.settings()?;
        let previous = settings.packaging;
        settings.packaging = packaging;
        config_loader::write_project_settings(project.root_path(), &settings)?;
        info!("Packaging changed from '{}' to '{}'.", previous, packaging);
        Ok(previous)
    }
}

impl Facet for PackagingFacet {
    fn base(&self) -> &FacetBase {
        &self.base
    }

    fn requires(&self) -> Vec<FacetType> {
        vec![FacetType::of::<BuildFacet>()]
    }

    fn is_installed(&self) -> bool {
        self.project()
            .is_some_and(|p| matches!(config_loader::read_project_settings(p.root_path()), Ok(Some(_))))
    }

    fn install(&self) -> ShellResult<bool> {
        if self.is_installed() {
            return Ok(true);
        }
        let project = self.base.require_project()?;
        config_loader::write_project_settings(project.root_path(), &ProjectSettings::default())?;
        Ok(true)
    }
}
