//! # Built-in Plugins
//!
//! Every shell starts with these registered. Each module exposes a
//! `register` function adding its plugin metadata and instance.
use crate::core::{
    error::ShellResult,
    execution::InvocationContext,
    registry::{CommandRegistry, PluginRegistry},
    resource::{DirectoryResource, Resource},
};
use crate::facets::FacetCatalog;
use anyhow::{Result, anyhow};

/// `descriptor show` and `descriptor path`.
pub mod descriptor;
/// `ls`, `cd`, `pwd`, `touch` and `cat`.
pub mod navigation;
/// The `project` command group.
pub mod project;
/// `echo` and `upper`.
pub mod text;

/// Registers all built-in plugins.
pub fn register_builtins(
    commands: &mut CommandRegistry,
    plugins: &mut PluginRegistry,
    catalog: FacetCatalog,
) -> ShellResult<()> {
    navigation::register(commands, plugins)?;
    text::register(commands, plugins)?;
    project::register(commands, plugins, catalog)?;
    descriptor::register(commands, plugins)?;
    Ok(())
}

/// The directory the cursor is in: the cursor itself, or a file's parent.
pub(crate) fn cursor_dir(ctx: &InvocationContext<'_>) -> Result<DirectoryResource> {
    match ctx.cursor() {
        Resource::Directory(dir) => Ok(dir.clone()),
        Resource::File(file) => file
            .parent()
            .and_then(|p| p.as_directory().cloned())
            .ok_or_else(|| anyhow!("'{}' has no parent directory", file.path().display())),
    }
}
