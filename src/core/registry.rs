//! # Registries
//!
//! [`CommandRegistry`] maps what the user types to command metadata.
//! [`PluginRegistry`] maps a plugin type to the instance its commands run on.
//! Both are filled explicitly at start-up and handed to the execution engine.
use crate::core::{
    error::{ShellError, ShellResult},
    metadata::{CommandMetadata, PluginMetadata, PluginType},
};
use anyhow::{Result, anyhow};
use log::debug;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Plugins by name and alias.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    plugins: Vec<Arc<PluginMetadata>>,
    by_name: HashMap<String, usize>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin under its name and aliases.
    pub fn register(&mut self, plugin: PluginMetadata) -> ShellResult<()> {
        let slot = self.plugins.len();
        let names: Vec<String> = std::iter::once(plugin.name().to_string())
            .chain(plugin.aliases().iter().cloned())
            .collect();
        if let Some(taken) = names.iter().find(|n| self.by_name.contains_key(*n)) {
            return Err(ShellError::Config(format!(
                "command name '{}' is already registered",
                taken
            )));
        }
        for name in names {
            self.by_name.insert(name, slot);
        }
        debug!(
            "Registered plugin '{}' with {} command(s).",
            plugin.name(),
            plugin.commands().len()
        );
        self.plugins.push(Arc::new(plugin));
        Ok(())
    }

    /// The plugin typed as `name` (or one of its aliases).
    pub fn plugin(&self, name: &str) -> Option<&Arc<PluginMetadata>> {
        self.by_name
            .get(name)
            .and_then(|slot| self.plugins.get(*slot))
    }

    /// All plugins in registration order.
    pub fn plugins(&self) -> &[Arc<PluginMetadata>] {
        &self.plugins
    }

    /// Resolves the leading tokens of a statement to a command.
    ///
    /// Returns the command and how many tokens named it: two for
    /// `plugin command`, one when the plugin's default command applies.
    pub fn resolve(&self, tokens: &[String]) -> Option<(Arc<CommandMetadata>, usize)> {
        let plugin = self.plugin(tokens.first()?)?;
        if let Some(command) = tokens.get(1).and_then(|name| plugin.command(name)) {
            return Some((Arc::clone(command), 2));
        }
        plugin
            .default_command()
            .map(|command| (Arc::clone(command), 1))
    }
}

type PluginInstance = Arc<dyn Any + Send + Sync>;
type PluginFactory = Arc<dyn Fn() -> Result<PluginInstance> + Send + Sync>;

enum PluginSource {
    Singleton(PluginInstance),
    Factory(PluginFactory),
}

impl fmt::Debug for PluginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton(_) => f.write_str("Singleton"),
            Self::Factory(_) => f.write_str("Factory"),
        }
    }
}

/// Plugin instances by type: one shared instance, or a fresh one per call.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    sources: HashMap<TypeId, PluginSource>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one instance shared by every invocation.
    pub fn register_singleton<P: Any + Send + Sync>(&mut self, plugin: P) {
        self.sources
            .insert(TypeId::of::<P>(), PluginSource::Singleton(Arc::new(plugin)));
    }

    /// Registers a constructor called once per invocation.
    pub fn register_factory<P, F>(&mut self, factory: F)
    where
        P: Any + Send + Sync,
        F: Fn() -> Result<P> + Send + Sync + 'static,
    {
        let erased: PluginFactory =
            Arc::new(move || factory().map(|p| Arc::new(p) as PluginInstance));
        self.sources
            .insert(TypeId::of::<P>(), PluginSource::Factory(erased));
    }

    /// Whether an instance source exists for `plugin_type`.
    pub fn contains(&self, plugin_type: &PluginType) -> bool {
        self.sources.contains_key(&plugin_type.id())
    }

    /// The instance commands of `plugin_type` run on.
    pub fn resolve(&self, plugin_type: &PluginType) -> Result<PluginInstance> {
        match self.sources.get(&plugin_type.id()) {
            Some(PluginSource::Singleton(instance)) => Ok(Arc::clone(instance)),
            Some(PluginSource::Factory(factory)) => factory(),
            None => Err(anyhow!(
                "no instance registered for plugin type '{}'",
                plugin_type.name()
            )),
        }
    }
}
