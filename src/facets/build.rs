// src/facets/build.rs

use crate::core::{
    error::ShellResult,
    project::{Facet, FacetBase},
};

/// The project has a build descriptor: the marker file the locator looks for.
#[derive(Debug)]
pub struct BuildFacet {
    base: FacetBase,
    marker: String,
}

impl BuildFacet {
    /// A build facet keyed on `marker` (`pom.xml`).
    pub fn new(marker: &str) -> Self {
        Self {
            base: FacetBase::new(),
            marker: marker.to_string(),
        }
    }

    /// The marker file name.
    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Facet for BuildFacet {
    fn base(&self) -> &FacetBase {
        &self.base
    }

    fn is_installed(&self) -> bool {
        self.project()
            .is_some_and(|p| p.root().get_child(&self.marker).exists())
    }

    fn install(&self) -> ShellResult<bool> {
        let project = self.base.require_project()?;
        project.root().get_child_file(&self.marker)?.create_new_file()?;
        Ok(true)
    }
}
