//! # Project & Facet Model
//!
//! A [`Project`] is a root directory plus the set of facets installed on it.
//! Facets are capability units with an idempotent `install`/`is_installed`
//! lifecycle and a list of prerequisite facet types.
//!
//! Facets keep a weak back-reference to their project through [`FacetBase`], so
//! the project owns its facets and nothing owns the project in return.
use crate::core::{
    commons::short_type_name,
    constraints,
    error::{ShellError, ShellResult},
    resource::DirectoryResource,
};
use log::{debug, info};
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// The identity of a facet type, with a short display name.
#[derive(Clone, Copy)]
pub struct FacetType {
    id: TypeId,
    name: &'static str,
}

impl FacetType {
    /// The facet type of `F`.
    pub fn of<F: Facet>() -> Self {
        Self {
            id: TypeId::of::<F>(),
            name: short_type_name(type_name::<F>()),
        }
    }

    /// The short type name (`BuildFacet`).
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for FacetType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FacetType {}

impl Hash for FacetType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The project binding every facet embeds.
#[derive(Debug, Default)]
pub struct FacetBase {
    project: RwLock<Weak<ProjectInner>>,
}

impl FacetBase {
    /// An unbound base.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound project, if it is still alive.
    pub fn project(&self) -> Option<Project> {
        self.project
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .upgrade()
            .map(|inner| Project { inner })
    }

    /// Binds this facet to `project`.
    pub fn bind(&self, project: &Project) {
        *self.project.write().unwrap_or_else(PoisonError::into_inner) =
            Arc::downgrade(&project.inner);
    }

    /// The bound project or a `NotFound` error.
    pub fn require_project(&self) -> ShellResult<Project> {
        self.project()
            .ok_or_else(|| ShellError::not_found("Project bound to facet"))
    }
}

/// A capability attached to one project.
pub trait Facet: Any + fmt::Debug + Send + Sync {
    /// The project binding.
    fn base(&self) -> &FacetBase;

    /// Facet types that must be installed before this one.
    fn requires(&self) -> Vec<FacetType> {
        Vec::new()
    }

    /// Whether the artifacts this facet needs are present.
    fn is_installed(&self) -> bool;

    /// Creates the artifacts this facet needs. Returns `false` if it could not.
    ///
    /// Callers go through [`Project::install_facet`], which skips this call
    /// when [`Facet::is_installed`] already holds.
    fn install(&self) -> ShellResult<bool>;

    /// The project this facet is bound to.
    fn project(&self) -> Option<Project> {
        self.base().project()
    }

    /// Binds this facet to `project`.
    fn set_project(&self, project: &Project) {
        self.base().bind(project);
    }
}

struct InstalledFacet {
    facet_type: FacetType,
    facet: Arc<dyn Facet>,
    instance: Arc<dyn Any + Send + Sync>,
}

struct ProjectInner {
    root: DirectoryResource,
    facets: RwLock<HashMap<TypeId, InstalledFacet>>,
}

impl fmt::Debug for ProjectInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root.path())
            .finish_non_exhaustive()
    }
}

/// A project root and its installed facets. Clones share the same project.
#[derive(Clone)]
pub struct Project {
    inner: Arc<ProjectInner>,
}

impl Project {
    /// A project rooted at `root` with no facets.
    pub fn new(root: DirectoryResource) -> Self {
        Self {
            inner: Arc::new(ProjectInner {
                root,
                facets: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The project root.
    pub fn root(&self) -> &DirectoryResource {
        &self.inner.root
    }

    /// The project root path.
    pub fn root_path(&self) -> &Path {
        self.inner.root.path()
    }

    /// Whether a facet of type `F` is registered.
    pub fn has_facet<F: Facet>(&self) -> bool {
        self.has_facet_type(&FacetType::of::<F>())
    }

    /// Whether a facet of the given type is registered.
    pub fn has_facet_type(&self, facet_type: &FacetType) -> bool {
        self.inner
            .facets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&facet_type.id)
    }

    /// The registered facet of type `F`.
    pub fn get_facet<F: Facet>(&self) -> ShellResult<Arc<F>> {
        let facets = self
            .inner
            .facets
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        facets
            .get(&TypeId::of::<F>())
            .and_then(|entry| Arc::clone(&entry.instance).downcast::<F>().ok())
            .ok_or_else(|| ShellError::not_found(format!("Facet '{}'", FacetType::of::<F>())))
    }

    /// Binds `facet` to this project and stores it, replacing a previous
    /// instance of the same type.
    pub fn register_facet<F: Facet>(&self, facet: F) -> Arc<F> {
        let facet = Arc::new(facet);
        facet.set_project(self);

        let facet_type = FacetType::of::<F>();
        let as_facet: Arc<dyn Facet> = facet.clone();
        let instance: Arc<dyn Any + Send + Sync> = facet.clone();
        let previous = self
            .inner
            .facets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                facet_type.id,
                InstalledFacet {
                    facet_type,
                    facet: as_facet,
                    instance,
                },
            );
        if previous.is_some() {
            debug!("Replaced facet '{}' on '{}'.", facet_type, self.root_path().display());
        } else {
            debug!("Registered facet '{}' on '{}'.", facet_type, self.root_path().display());
        }
        facet
    }

    /// Unregisters the facet of type `F`. Returns whether one was registered.
    pub fn remove_facet<F: Facet>(&self) -> bool {
        self.remove_facet_type(&FacetType::of::<F>())
    }

    /// Unregisters the facet of the given type.
    pub fn remove_facet_type(&self, facet_type: &FacetType) -> bool {
        let removed = self
            .inner
            .facets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&facet_type.id)
            .is_some();
        if removed {
            debug!("Removed facet '{}' from '{}'.", facet_type, self.root_path().display());
        }
        removed
    }

    /// Installs `facet` on this project.
    ///
    /// Prerequisites must already be registered; they are never installed on
    /// the caller's behalf. The facet is registered only once it reports itself
    /// installed. On failure the facet set is left as it was.
    pub fn install_facet<F: Facet>(&self, facet: F) -> ShellResult<Arc<F>> {
        let facet_type = FacetType::of::<F>();
        constraints::verify_facet_prerequisites(self, facet_type.name(), &facet.requires())?;
        facet.set_project(self);

        if facet.is_installed() {
            debug!("Facet '{}' already installed.", facet_type);
            return Ok(self.register_facet(facet));
        }

        let failure = |reason: String| ShellError::InstallFailure {
            facet: facet_type.name().to_string(),
            reason,
        };
        match facet.install() {
            Ok(true) if facet.is_installed() => {
                info!("Installed facet '{}' on '{}'.", facet_type, self.root_path().display());
                Ok(self.register_facet(facet))
            }
            Ok(true) => Err(failure(
                "install reported success but the facet is still not installed".to_string(),
            )),
            Ok(false) => Err(failure("install reported failure".to_string())),
            Err(e) => Err(failure(e.to_string())),
        }
    }

    /// The registered facet types, sorted by name.
    pub fn installed_facets(&self) -> Vec<FacetType> {
        let mut types: Vec<FacetType> = self
            .inner
            .facets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|entry| entry.facet_type)
            .collect();
        types.sort_by_key(|t| t.name());
        types
    }

    /// The names of the registered facets, sorted.
    pub fn facet_names(&self) -> Vec<&'static str> {
        self.installed_facets().iter().map(FacetType::name).collect()
    }

    /// Registered facets whose `is_installed()` no longer holds.
    pub fn broken_facets(&self) -> Vec<FacetType> {
        let facets = self
            .inner
            .facets
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut broken: Vec<FacetType> = facets
            .values()
            .filter(|entry| !entry.facet.is_installed())
            .map(|entry| entry.facet_type)
            .collect();
        broken.sort_by_key(|t| t.name());
        broken
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.root_path() == other.root_path()
    }
}

impl Eq for Project {}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root_path())
            .field("facets", &self.facet_names())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::resource_factory::ResourceFactory;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Installs a marker file; counts install calls.
    #[derive(Debug, Default)]
    pub(crate) struct MarkerFacet {
        base: FacetBase,
        pub(crate) installs: AtomicUsize,
    }

    impl Facet for MarkerFacet {
        fn base(&self) -> &FacetBase {
            &self.base
        }

        fn is_installed(&self) -> bool {
            self.project()
                .is_some_and(|p| p.root_path().join("marker.flag").exists())
        }

        fn install(&self) -> ShellResult<bool> {
            self.installs.fetch_add(1, Ordering::SeqCst);
            let project = self.base.require_project()?;
            project.root().get_child_file("marker.flag")?.create_new_file()?;
            Ok(true)
        }
    }

    #[derive(Debug, Default)]
    struct DependentFacet {
        base: FacetBase,
    }

    impl Facet for DependentFacet {
        fn base(&self) -> &FacetBase {
            &self.base
        }

        fn requires(&self) -> Vec<FacetType> {
            vec![FacetType::of::<MarkerFacet>()]
        }

        fn is_installed(&self) -> bool {
            true
        }

        fn install(&self) -> ShellResult<bool> {
            Ok(true)
        }
    }

    #[derive(Debug, Default)]
    struct FailingFacet {
        base: FacetBase,
    }

    impl Facet for FailingFacet {
        fn base(&self) -> &FacetBase {
            &self.base
        }

        fn is_installed(&self) -> bool {
            false
        }

        fn install(&self) -> ShellResult<bool> {
            Ok(false)
        }
    }

    pub(crate) fn project_in(dir: &TempDir) -> Project {
        let factory = Arc::new(ResourceFactory::new());
        let root = factory
            .resource_from(dir.path())
            .as_directory()
            .cloned()
            .unwrap();
        Project::new(root)
    }

    #[test]
    fn test_get_missing_facet_is_not_found() {
        let dir = TempDir::new().unwrap();
        let project = project_in(&dir);
        assert!(!project.has_facet::<MarkerFacet>());
        assert!(matches!(
            project.get_facet::<MarkerFacet>(),
            Err(ShellError::NotFound { .. })
        ));
    }

    #[test]
    fn test_register_binds_and_replaces() {
        let dir = TempDir::new().unwrap();
        let project = project_in(&dir);

        let first = project.register_facet(MarkerFacet::default());
        assert_eq!(first.project().unwrap(), project);
        let second = project.register_facet(MarkerFacet::default());

        let stored = project.get_facet::<MarkerFacet>().unwrap();
        assert!(Arc::ptr_eq(&stored, &second));
        assert_eq!(project.facet_names(), vec!["MarkerFacet"]);
    }

    #[test]
    fn test_install_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let project = project_in(&dir);

        let facet = project.install_facet(MarkerFacet::default()).unwrap();
        assert!(facet.is_installed());
        assert_eq!(facet.installs.load(Ordering::SeqCst), 1);

        let again = project.install_facet(MarkerFacet::default()).unwrap();
        assert!(again.is_installed());
        assert_eq!(again.installs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_install_refuses_missing_prerequisite() {
        let dir = TempDir::new().unwrap();
        let project = project_in(&dir);

        let result = project.install_facet(DependentFacet::default());
        assert!(matches!(result, Err(ShellError::ConstraintViolation { .. })));
        assert!(!project.has_facet::<MarkerFacet>());
        assert!(!project.has_facet::<DependentFacet>());

        project.install_facet(MarkerFacet::default()).unwrap();
        assert!(project.install_facet(DependentFacet::default()).is_ok());
    }

    #[test]
    fn test_failed_install_leaves_facets_untouched() {
        let dir = TempDir::new().unwrap();
        let project = project_in(&dir);

        let result = project.install_facet(FailingFacet::default());
        assert!(matches!(result, Err(ShellError::InstallFailure { .. })));
        assert!(project.installed_facets().is_empty());
    }

    #[test]
    fn test_remove_and_broken_facets() {
        let dir = TempDir::new().unwrap();
        let project = project_in(&dir);
        project.install_facet(MarkerFacet::default()).unwrap();
        assert!(project.broken_facets().is_empty());

        fs_remove(&dir);
        assert_eq!(project.broken_facets(), vec![FacetType::of::<MarkerFacet>()]);

        assert!(project.remove_facet::<MarkerFacet>());
        assert!(!project.remove_facet::<MarkerFacet>());
    }

    fn fs_remove(dir: &TempDir) {
        std::fs::remove_file(dir.path().join("marker.flag")).unwrap();
    }
}
