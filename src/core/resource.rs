//! # Resource Tree
//!
//! Typed nodes over the physical filesystem. A [`Resource`] is a cheap, cloneable
//! handle; clones share the same node, including the lazily computed parent and,
//! for directories, the cached child listing.
//!
//! A directory's listing is cached behind one mutex per directory. Every read
//! compares the recorded [`DirectorySignature`] with the live one and rebuilds
//! the whole listing from a single directory pass when they differ, so callers
//! never observe children from two different generations.
use crate::core::{
    cache::{self, DirectorySignature},
    error::{ShellError, ShellResult},
    resource_factory::ResourceFactory,
};
use log::debug;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// The kind of node a path materialises as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// A directory.
    Directory,
    /// A plain file.
    File,
    /// A file matched by one of the factory's typed rules.
    Typed(String),
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => f.write_str("directory"),
            Self::File => f.write_str("file"),
            Self::Typed(name) => f.write_str(name),
        }
    }
}

impl ResourceType {
    /// Whether a resource of this type can stand in for `requested`.
    /// Typed files are files.
    pub fn is_a(&self, requested: &Self) -> bool {
        self == requested || (matches!(self, Self::Typed(_)) && *requested == Self::File)
    }
}

/// State shared by every node kind.
struct Node {
    path: PathBuf,
    factory: Arc<ResourceFactory>,
    parent: OnceLock<Option<Resource>>,
}

impl Node {
    fn new(path: PathBuf, factory: Arc<ResourceFactory>) -> Self {
        Self {
            path,
            factory,
            parent: OnceLock::new(),
        }
    }

    fn parent(&self) -> Option<Resource> {
        self.parent
            .get_or_init(|| self.path.parent().map(|p| self.factory.resource_from(p)))
            .clone()
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// A node in the resource tree.
#[derive(Clone)]
pub enum Resource {
    /// A directory node.
    Directory(DirectoryResource),
    /// A file node, plain or typed.
    File(FileResource),
}

impl Resource {
    /// The canonical path of this node.
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(d) => d.path(),
            Self::File(f) => f.path(),
        }
    }

    /// The last path component.
    pub fn name(&self) -> String {
        match self {
            Self::Directory(d) => d.name(),
            Self::File(f) => f.name(),
        }
    }

    /// The node type.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Directory(_) => ResourceType::Directory,
            Self::File(f) => f.resource_type().clone(),
        }
    }

    /// Whether something exists at this path.
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// The containing directory, or `None` at a filesystem root.
    pub fn parent(&self) -> Option<Resource> {
        match self {
            Self::Directory(d) => d.node().parent(),
            Self::File(f) => f.inner.node.parent(),
        }
    }

    /// The directory view of this node, if it is one.
    pub fn as_directory(&self) -> Option<&DirectoryResource> {
        match self {
            Self::Directory(d) => Some(d),
            Self::File(_) => None,
        }
    }

    /// The file view of this node, if it is one.
    pub fn as_file(&self) -> Option<&FileResource> {
        match self {
            Self::File(f) => Some(f),
            Self::Directory(_) => None,
        }
    }

    /// Whether both handles share one node, not merely one path.
    #[cfg(test)]
    pub(crate) fn same_node(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Directory(a), Self::Directory(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            (Self::File(a), Self::File(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            _ => false,
        }
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path().hash(state);
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.resource_type(), self.path().display())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

// --- Directory ---

/// A listing and the signature of the pass that produced it.
struct Listing {
    signature: DirectorySignature,
    children: Vec<Resource>,
}

struct DirectoryNode {
    node: Node,
    listing: Mutex<Option<Listing>>,
}

/// A directory node with a cached, staleness-checked child listing.
#[derive(Clone)]
pub struct DirectoryResource {
    inner: Arc<DirectoryNode>,
}

impl DirectoryResource {
    pub(crate) fn new(path: PathBuf, factory: Arc<ResourceFactory>) -> Self {
        Self {
            inner: Arc::new(DirectoryNode {
                node: Node::new(path, factory),
                listing: Mutex::new(None),
            }),
        }
    }

    fn node(&self) -> &Node {
        &self.inner.node
    }

    /// The canonical path.
    pub fn path(&self) -> &Path {
        &self.node().path
    }

    /// The directory name.
    pub fn name(&self) -> String {
        self.node().name()
    }

    /// Whether the directory exists.
    pub fn exists(&self) -> bool {
        self.path().is_dir()
    }

    /// The containing directory, or `None` at a filesystem root.
    pub fn parent(&self) -> Option<Resource> {
        self.node().parent()
    }

    /// The current children in directory enumeration order.
    ///
    /// Served from the cache while the live signature matches the recorded
    /// one; rebuilt in full otherwise.
    pub fn list_resources(&self) -> ShellResult<Vec<Resource>> {
        let path = self.path();
        let mut listing = self
            .inner
            .listing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = listing.as_ref() {
            match cache::calculate_signature(path) {
                Ok(live) if live == cached.signature => return Ok(cached.children.clone()),
                Ok(_) => debug!("Listing of '{}' is stale, rebuilding.", path.display()),
                Err(e) => {
                    *listing = None;
                    return Err(ShellError::io(path, e));
                }
            }
        }

        *listing = None;
        let snapshot = cache::snapshot_directory(path).map_err(|e| ShellError::io(path, e))?;
        let factory = &self.node().factory;
        let children: Vec<Resource> = snapshot
            .entries
            .iter()
            .map(|child| factory.resource_from(child))
            .collect();
        debug!("Listed '{}': {} children.", path.display(), children.len());

        *listing = Some(Listing {
            signature: snapshot.signature,
            children: children.clone(),
        });
        Ok(children)
    }

    /// Drops the cached listing; the next read rebuilds it.
    pub fn invalidate(&self) {
        let mut listing = self
            .inner
            .listing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *listing = None;
    }

    /// Resolves a child through the factory. Never consults the listing cache.
    pub fn get_child(&self, name: &str) -> Resource {
        self.resolve(Path::new(name))
    }

    /// Resolves a path relative to this directory; absolute paths are taken
    /// as they are.
    pub fn resolve(&self, relative: &Path) -> Resource {
        self.node().factory.resource_from(&self.path().join(relative))
    }

    /// Resolves a child expecting `resource_type`.
    ///
    /// A missing child is synthesised with the requested type; an existing
    /// child of another type is an `AmbiguousResource` error.
    pub fn get_child_of_type(&self, resource_type: &ResourceType, name: &str) -> ShellResult<Resource> {
        let child = self.get_child(name);
        let actual = child.resource_type();
        if actual.is_a(resource_type) {
            return Ok(child);
        }
        if child.exists() {
            return Err(ShellError::AmbiguousResource {
                path: child.path().to_path_buf(),
                expected: resource_type.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(self
            .node()
            .factory
            .create_from_type(resource_type, child.path()))
    }

    /// The child directory `name`, synthesised when missing.
    pub fn get_child_directory(&self, name: &str) -> ShellResult<DirectoryResource> {
        match self.get_child_of_type(&ResourceType::Directory, name)? {
            Resource::Directory(d) => Ok(d),
            Resource::File(f) => Err(ShellError::AmbiguousResource {
                path: f.path().to_path_buf(),
                expected: ResourceType::Directory.to_string(),
                actual: f.resource_type().to_string(),
            }),
        }
    }

    /// The child file `name` of whatever file type the factory assigns,
    /// synthesised when missing. Fails only when a directory is in the way.
    pub fn get_child_file(&self, name: &str) -> ShellResult<FileResource> {
        match self.get_child(name) {
            Resource::File(f) => Ok(f),
            Resource::Directory(d) => Err(ShellError::AmbiguousResource {
                path: d.path().to_path_buf(),
                expected: ResourceType::File.to_string(),
                actual: ResourceType::Directory.to_string(),
            }),
        }
    }

    /// Creates this directory and any missing ancestors.
    pub fn mkdirs(&self) -> ShellResult<()> {
        fs::create_dir_all(self.path()).map_err(|e| ShellError::io(self.path(), e))
    }

    /// Removes this directory if it is empty. Returns whether it was removed.
    pub fn delete(&self) -> ShellResult<bool> {
        match fs::remove_dir(self.path()) {
            Ok(()) => {
                self.invalidate();
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ShellError::io(self.path(), e)),
        }
    }

    /// Wraps this directory as a generic resource.
    pub fn to_resource(&self) -> Resource {
        Resource::Directory(self.clone())
    }
}

impl PartialEq for DirectoryResource {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for DirectoryResource {}

impl fmt::Debug for DirectoryResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectoryResource({})", self.path().display())
    }
}

// --- File ---

struct FileNode {
    node: Node,
    resource_type: ResourceType,
}

/// A file node, optionally carrying a specialised file type.
#[derive(Clone)]
pub struct FileResource {
    inner: Arc<FileNode>,
}

impl FileResource {
    pub(crate) fn new(path: PathBuf, factory: Arc<ResourceFactory>, resource_type: ResourceType) -> Self {
        Self {
            inner: Arc::new(FileNode {
                node: Node::new(path, factory),
                resource_type,
            }),
        }
    }

    /// The canonical path.
    pub fn path(&self) -> &Path {
        &self.inner.node.path
    }

    /// The file name.
    pub fn name(&self) -> String {
        self.inner.node.name()
    }

    /// `File` or the typed name assigned by the factory.
    pub fn resource_type(&self) -> &ResourceType {
        &self.inner.resource_type
    }

    /// Whether a file exists at this path.
    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// The containing directory.
    pub fn parent(&self) -> Option<Resource> {
        self.inner.node.parent()
    }

    /// Reads the whole file as UTF-8.
    pub fn read_to_string(&self) -> ShellResult<String> {
        fs::read_to_string(self.path()).map_err(|e| ShellError::io(self.path(), e))
    }

    /// Replaces the file contents, creating the file and its parents if needed.
    pub fn set_contents(&self, contents: impl AsRef<[u8]>) -> ShellResult<()> {
        self.create_parents()?;
        fs::write(self.path(), contents).map_err(|e| ShellError::io(self.path(), e))
    }

    /// Creates an empty file. Returns `false` when one already existed.
    pub fn create_new_file(&self) -> ShellResult<bool> {
        self.create_parents()?;
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path())
        {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(ShellError::io(self.path(), e)),
        }
    }

    /// Removes the file. Returns whether there was one to remove.
    pub fn delete(&self) -> ShellResult<bool> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ShellError::io(self.path(), e)),
        }
    }

    /// Moves this file's contents to `target`.
    ///
    /// The target is written and read back before the source is removed; if any
    /// step fails the source is left in place.
    pub fn move_to(&self, target: &FileResource) -> ShellResult<()> {
        if self.path() == target.path() {
            return Ok(());
        }
        let contents = fs::read(self.path()).map_err(|e| ShellError::io(self.path(), e))?;
        target.set_contents(&contents)?;

        let written = fs::read(target.path()).map_err(|e| ShellError::io(target.path(), e))?;
        if written != contents {
            return Err(ShellError::io(
                target.path(),
                std::io::Error::other("written contents do not match the source"),
            ));
        }

        fs::remove_file(self.path()).map_err(|e| ShellError::io(self.path(), e))?;
        debug!(
            "Moved '{}' to '{}'.",
            self.path().display(),
            target.path().display()
        );
        Ok(())
    }

    /// Wraps this file as a generic resource.
    pub fn to_resource(&self) -> Resource {
        Resource::File(self.clone())
    }

    fn create_parents(&self) -> ShellResult<()> {
        match self.path().parent() {
            Some(parent) if !parent.exists() => {
                fs::create_dir_all(parent).map_err(|e| ShellError::io(parent, e))
            }
            _ => Ok(()),
        }
    }
}

impl PartialEq for FileResource {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for FileResource {}

impl fmt::Debug for FileResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileResource({}, {})", self.resource_type(), self.path().display())
    }
}
