//! # Command & Option Metadata
//!
//! Static descriptions of plugins, their commands and each command's options.
//! Metadata is assembled once, at registration, through [`PluginBuilder`] and
//! [`CommandBuilder`], and is immutable afterwards.
//!
//! ```ignore
//! let plugin = PluginBuilder::<Greeter>::new("greet")
//!     .with_help("Greets people")
//!     .with_command(
//!         CommandBuilder::default_command()
//!             .with_option(OptionMetadata::positional(ValueType::String).with_description("who"))
//!             .with_option(OptionMetadata::flag("loud").with_short('l'))
//!             .run(|greeter: &Greeter, args, ctx| greeter.greet(&args.string(0)?, args.boolean(1), ctx)),
//!     )
//!     .build()?;
//! ```
use crate::core::{
    commons::short_type_name,
    conversion::Arguments,
    error::{ShellError, ShellResult},
    execution::InvocationContext,
    project::{Facet, FacetType},
    resource::ResourceType,
};
use anyhow::anyhow;
use std::any::{Any, TypeId, type_name};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The declared type of an option's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// Free text.
    String,
    /// `true`/`false` (also `yes`/`no`, `on`/`off`, `1`/`0`).
    Boolean,
    /// A signed integer.
    Integer,
    /// A floating-point number.
    Float,
    /// A filesystem path.
    Path,
    /// Zero or more values of the inner type. A positional sequence is variadic.
    Sequence(Box<ValueType>),
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Boolean => f.write_str("boolean"),
            Self::Integer => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Path => f.write_str("path"),
            Self::Sequence(inner) => write!(f, "{}[]", inner),
        }
    }
}

/// A hint for interactive front-ends on how to ask for a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptType {
    /// Any text.
    #[default]
    Any,
    /// A Java-style identifier.
    JavaVariableName,
    /// A dotted, fully qualified type or package name.
    QualifiedName,
    /// A file path.
    FilePath,
    /// A directory path.
    DirectoryPath,
    /// The name of a facet known to the catalog.
    FacetName,
}

/// One parameter of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMetadata {
    name: String,
    short_name: String,
    value_type: ValueType,
    description: String,
    help: String,
    default_value: Option<String>,
    required: bool,
    flag_only: bool,
    pipe_in: bool,
    pipe_out: bool,
    prompt_type: PromptType,
    index: usize,
    effective_index: Option<usize>,
}

impl OptionMetadata {
    fn base(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            short_name: String::new(),
            value_type,
            description: String::new(),
            help: String::new(),
            default_value: None,
            required: false,
            flag_only: false,
            pipe_in: false,
            pipe_out: false,
            prompt_type: PromptType::Any,
            index: 0,
            effective_index: None,
        }
    }

    /// A positional option, bound by position among the ordered options.
    pub fn positional(value_type: ValueType) -> Self {
        Self::base("", value_type)
    }

    /// A named option (`--name value`).
    pub fn named(name: &str, value_type: ValueType) -> Self {
        Self::base(name, value_type)
    }

    /// A boolean switch that takes no value (`--name`).
    pub fn flag(name: &str) -> Self {
        Self {
            flag_only: true,
            ..Self::base(name, ValueType::Boolean)
        }
    }

    /// An option fed by the previous pipeline stage.
    pub fn pipe_in(value_type: ValueType) -> Self {
        Self {
            pipe_in: true,
            ..Self::base("", value_type)
        }
    }

    /// Marks the command as writing to the pipe-out channel.
    pub fn pipe_out() -> Self {
        Self {
            pipe_out: true,
            ..Self::base("", ValueType::String)
        }
    }

    /// Sets the single-character alias (`-s`).
    pub fn with_short(mut self, short: char) -> Self {
        self.short_name = short.to_string();
        self
    }

    /// Sets the short description shown in descriptors and usage.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Sets the longer help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Sets the default, in string form. It is converted when used.
    pub fn with_default(mut self, default: &str) -> Self {
        self.default_value = Some(default.to_string());
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the prompt hint.
    pub fn with_prompt(mut self, prompt_type: PromptType) -> Self {
        self.prompt_type = prompt_type;
        self
    }

    /// The long name; empty for positional and piped options.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The short alias; empty when none.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// The declared value type.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// The short description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// The default value in string form.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref().filter(|d| !d.is_empty())
    }

    /// Whether a non-empty default value is declared.
    pub fn has_default_value(&self) -> bool {
        self.default_value().is_some()
    }

    /// Whether a value must be supplied.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether this is a switch taking no value.
    pub fn is_flag_only(&self) -> bool {
        self.flag_only
    }

    /// Whether this option receives the piped value.
    pub fn is_pipe_in(&self) -> bool {
        self.pipe_in
    }

    /// Whether this option stands for the pipe-out channel.
    pub fn is_pipe_out(&self) -> bool {
        self.pipe_out
    }

    /// The prompt hint.
    pub fn prompt_type(&self) -> PromptType {
        self.prompt_type
    }

    /// The position in the command's declared option list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The position among ordered options, `None` for unordered ones.
    pub fn effective_index(&self) -> Option<usize> {
        self.effective_index
    }

    /// Whether the option is bound by name.
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// Whether the option is excluded from positional binding.
    pub fn not_ordered(&self) -> bool {
        self.pipe_in || self.pipe_out || self.is_named()
    }

    /// Whether the value type is boolean.
    pub fn is_boolean(&self) -> bool {
        self.value_type == ValueType::Boolean
    }

    /// Whether the value type is a sequence.
    pub fn is_varargs(&self) -> bool {
        matches!(self.value_type, ValueType::Sequence(_))
    }

    /// `[name=description (type)]`, with `ARG` standing in for a missing
    /// description and the `name=` part only on named options.
    pub fn option_descriptor(&self) -> String {
        let prefix = if self.is_named() {
            format!("{}=", self.name)
        } else {
            String::new()
        };
        let description = if self.description.is_empty() {
            "ARG"
        } else {
            &self.description
        };
        format!("[{}{} ({})]", prefix, description, self.value_type)
    }

    /// How the option is written on a usage line.
    pub fn usage_fragment(&self) -> String {
        let body = if self.is_named() {
            if self.flag_only {
                format!("--{}", self.name)
            } else {
                format!("--{} <{}>", self.name, self.value_type)
            }
        } else {
            let label = if self.description.is_empty() {
                "arg"
            } else {
                &self.description
            };
            if self.is_varargs() {
                format!("<{}...>", label)
            } else {
                format!("<{}>", label)
            }
        };
        if self.required {
            body
        } else {
            format!("[{}]", body)
        }
    }
}

/// The identity of a plugin type.
#[derive(Clone, Copy)]
pub struct PluginType {
    id: TypeId,
    name: &'static str,
}

impl PluginType {
    /// The plugin type of `P`.
    pub fn of<P: Any>() -> Self {
        Self {
            id: TypeId::of::<P>(),
            name: short_type_name(type_name::<P>()),
        }
    }

    /// The type id used to resolve instances.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The short type name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for PluginType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PluginType {}

impl fmt::Debug for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The type-erased body of a command.
///
/// Receives the resolved plugin instance, the converted arguments and the
/// invocation context.
pub type Operation = Arc<
    dyn Fn(&(dyn Any + Send + Sync), &Arguments, &mut InvocationContext<'_>) -> anyhow::Result<()>
        + Send
        + Sync,
>;

/// The immutable description of one command.
#[derive(Clone)]
pub struct CommandMetadata {
    name: String,
    plugin_name: String,
    plugin_type: PluginType,
    help: String,
    is_default: bool,
    options: Vec<OptionMetadata>,
    required_facets: Vec<FacetType>,
    requires_project: bool,
    resource_scope: Option<ResourceType>,
    operation: Operation,
}

impl CommandMetadata {
    /// The command name; for a default command this is the plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning plugin's name.
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// How the command is typed: `plugin` or `plugin command`.
    pub fn qualified_name(&self) -> String {
        if self.is_default {
            self.plugin_name.clone()
        } else {
            format!("{} {}", self.plugin_name, self.name)
        }
    }

    /// The owning plugin's type.
    pub fn plugin_type(&self) -> PluginType {
        self.plugin_type
    }

    /// The help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Whether this runs when only the plugin name is typed.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// The options in declaration order.
    pub fn options(&self) -> &[OptionMetadata] {
        &self.options
    }

    /// The option with the given declared index.
    pub fn option(&self, index: usize) -> Option<&OptionMetadata> {
        self.options.get(index)
    }

    /// The named option matching a long or short name.
    pub fn named_option(&self, name: &str) -> Option<&OptionMetadata> {
        self.options.iter().find(|o| {
            o.is_named() && (o.name == name || (!o.short_name.is_empty() && o.short_name == name))
        })
    }

    /// The ordered options, sorted by effective index.
    pub fn ordered_options(&self) -> Vec<&OptionMetadata> {
        let mut ordered: Vec<&OptionMetadata> = self
            .options
            .iter()
            .filter(|o| o.effective_index.is_some())
            .collect();
        ordered.sort_by_key(|o| o.effective_index);
        ordered
    }

    /// The option receiving the piped value, if any.
    pub fn pipe_in_option(&self) -> Option<&OptionMetadata> {
        self.options.iter().find(|o| o.pipe_in)
    }

    /// Facets that must be installed on the current project.
    pub fn required_facets(&self) -> &[FacetType] {
        &self.required_facets
    }

    /// Whether an open project is needed.
    pub fn requires_project(&self) -> bool {
        self.requires_project || !self.required_facets.is_empty()
    }

    /// The resource type the cursor must be on, if restricted.
    pub fn resource_scope(&self) -> Option<&ResourceType> {
        self.resource_scope.as_ref()
    }

    /// The command body.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// A one-line usage string.
    pub fn usage(&self) -> String {
        let mut parts = vec![self.qualified_name()];
        parts.extend(self.ordered_options().iter().map(|o| o.usage_fragment()));
        parts.extend(
            self.options
                .iter()
                .filter(|o| o.is_named())
                .map(OptionMetadata::usage_fragment),
        );
        parts.join(" ")
    }
}

impl fmt::Debug for CommandMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandMetadata")
            .field("name", &self.name)
            .field("plugin", &self.plugin_name)
            .field("options", &self.options)
            .field("required_facets", &self.required_facets)
            .finish_non_exhaustive()
    }
}

/// The description of a plugin and its commands.
#[derive(Debug, Clone)]
pub struct PluginMetadata {
    name: String,
    aliases: Vec<String>,
    help: String,
    topic: String,
    plugin_type: PluginType,
    commands: Vec<Arc<CommandMetadata>>,
}

impl PluginMetadata {
    /// The plugin name, typed as the first token.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// The grouping topic for help listings.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The plugin type.
    pub fn plugin_type(&self) -> PluginType {
        self.plugin_type
    }

    /// All commands.
    pub fn commands(&self) -> &[Arc<CommandMetadata>] {
        &self.commands
    }

    /// The command run when only the plugin name is typed.
    pub fn default_command(&self) -> Option<&Arc<CommandMetadata>> {
        self.commands.iter().find(|c| c.is_default)
    }

    /// The non-default command with the given name.
    pub fn command(&self, name: &str) -> Option<&Arc<CommandMetadata>> {
        self.commands.iter().find(|c| !c.is_default && c.name == name)
    }
}

/// Assembles a [`CommandMetadata`] for plugin type `P`.
pub struct CommandBuilder<P> {
    name: Option<String>,
    help: String,
    options: Vec<OptionMetadata>,
    required_facets: Vec<FacetType>,
    requires_project: bool,
    resource_scope: Option<ResourceType>,
    operation: Option<Operation>,
    _plugin: PhantomData<fn() -> P>,
}

impl<P> fmt::Debug for CommandBuilder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<P: Any + Send + Sync> CommandBuilder<P> {
    fn empty(name: Option<String>) -> Self {
        Self {
            name,
            help: String::new(),
            options: Vec::new(),
            required_facets: Vec::new(),
            requires_project: false,
            resource_scope: None,
            operation: None,
            _plugin: PhantomData,
        }
    }

    /// A command typed as `plugin name`.
    pub fn new(name: &str) -> Self {
        Self::empty(Some(name.to_string()))
    }

    /// The command run when only the plugin name is typed.
    pub fn default_command() -> Self {
        Self::empty(None)
    }

    /// Sets the help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Appends an option. Declaration order is the declared index.
    pub fn with_option(mut self, option: OptionMetadata) -> Self {
        self.options.push(option);
        self
    }

    /// Requires facet `F` on the current project.
    pub fn requires_facet<F: Facet>(mut self) -> Self {
        self.required_facets.push(FacetType::of::<F>());
        self
    }

    /// Requires an open project.
    pub fn requires_project(mut self) -> Self {
        self.requires_project = true;
        self
    }

    /// Restricts the command to cursors of the given resource type.
    pub fn with_resource_scope(mut self, scope: ResourceType) -> Self {
        self.resource_scope = Some(scope);
        self
    }

    /// Sets the command body.
    pub fn run<F>(mut self, body: F) -> Self
    where
        F: Fn(&P, &Arguments, &mut InvocationContext<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.operation = Some(Arc::new(
            move |instance: &(dyn Any + Send + Sync),
                  args: &Arguments,
                  ctx: &mut InvocationContext<'_>| {
                let plugin = instance
                    .downcast_ref::<P>()
                    .ok_or_else(|| anyhow!("plugin instance is not a {}", type_name::<P>()))?;
                body(plugin, args, ctx)
            },
        ));
        self
    }

    fn build(self, plugin: &PluginBuilder<P>) -> ShellResult<CommandMetadata> {
        let is_default = self.name.is_none();
        let name = self.name.unwrap_or_else(|| plugin.name.clone());
        let qualified = if is_default {
            name.clone()
        } else {
            format!("{} {}", plugin.name, name)
        };
        let invalid = |reason: String| ShellError::Config(format!("command '{}': {}", qualified, reason));

        let operation = self
            .operation
            .ok_or_else(|| invalid("no operation declared".to_string()))?;

        let mut options = self.options;
        let mut seen = HashSet::new();
        let mut next_effective = 0;
        let mut varargs_seen = false;
        for (index, option) in options.iter_mut().enumerate() {
            option.index = index;
            if option.is_named() {
                if !seen.insert(option.name.clone()) {
                    return Err(invalid(format!("duplicate option '--{}'", option.name)));
                }
                if !option.short_name.is_empty() && !seen.insert(option.short_name.clone()) {
                    return Err(invalid(format!("duplicate option '-{}'", option.short_name)));
                }
            } else if option.flag_only {
                return Err(invalid(format!("flag option {} has no name", index)));
            }
            if option.not_ordered() {
                continue;
            }
            if varargs_seen {
                return Err(invalid("a variadic option must be the last positional".to_string()));
            }
            varargs_seen = option.is_varargs();
            option.effective_index = Some(next_effective);
            next_effective += 1;
        }

        let mut required_facets = plugin.required_facets.clone();
        for facet in self.required_facets {
            if !required_facets.contains(&facet) {
                required_facets.push(facet);
            }
        }

        Ok(CommandMetadata {
            name,
            plugin_name: plugin.name.clone(),
            plugin_type: PluginType::of::<P>(),
            help: self.help,
            is_default,
            options,
            required_facets,
            requires_project: plugin.requires_project || self.requires_project,
            resource_scope: self.resource_scope.or_else(|| plugin.resource_scope.clone()),
            operation,
        })
    }
}

/// Assembles a [`PluginMetadata`] for plugin type `P`.
pub struct PluginBuilder<P> {
    name: String,
    aliases: Vec<String>,
    help: String,
    topic: String,
    required_facets: Vec<FacetType>,
    requires_project: bool,
    resource_scope: Option<ResourceType>,
    commands: Vec<CommandBuilder<P>>,
}

impl<P> fmt::Debug for PluginBuilder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginBuilder")
            .field("name", &self.name)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}

impl<P: Any + Send + Sync> PluginBuilder<P> {
    /// A plugin typed as `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            help: String::new(),
            topic: "other".to_string(),
            required_facets: Vec::new(),
            requires_project: false,
            resource_scope: None,
            commands: Vec::new(),
        }
    }

    /// Adds an alternative name.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Sets the help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Sets the grouping topic.
    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = topic.to_string();
        self
    }

    /// Requires facet `F` for every command of the plugin.
    pub fn requires_facet<F: Facet>(mut self) -> Self {
        self.required_facets.push(FacetType::of::<F>());
        self
    }

    /// Requires an open project for every command of the plugin.
    pub fn requires_project(mut self) -> Self {
        self.requires_project = true;
        self
    }

    /// Restricts every command to cursors of the given resource type.
    pub fn with_resource_scope(mut self, scope: ResourceType) -> Self {
        self.resource_scope = Some(scope);
        self
    }

    /// Adds a command.
    pub fn with_command(mut self, command: CommandBuilder<P>) -> Self {
        self.commands.push(command);
        self
    }

    /// Validates and freezes the metadata.
    pub fn build(mut self) -> ShellResult<PluginMetadata> {
        let builders = std::mem::take(&mut self.commands);
        if builders.is_empty() {
            return Err(ShellError::Config(format!(
                "plugin '{}' declares no commands",
                self.name
            )));
        }

        let mut commands: Vec<Arc<CommandMetadata>> = Vec::with_capacity(builders.len());
        for builder in builders {
            let command = builder.build(&self)?;
            let clash = commands
                .iter()
                .any(|c| c.is_default == command.is_default && c.name == command.name);
            if clash {
                return Err(ShellError::Config(format!(
                    "plugin '{}' declares '{}' twice",
                    self.name,
                    command.qualified_name()
                )));
            }
            commands.push(Arc::new(command));
        }

        Ok(PluginMetadata {
            name: self.name,
            aliases: self.aliases,
            help: self.help,
            topic: self.topic,
            plugin_type: PluginType::of::<P>(),
            commands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Dummy;

    fn noop(_: &Dummy, _: &Arguments, _: &mut InvocationContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_option_descriptor() {
        let named = OptionMetadata::named("type", ValueType::String).with_description("the type");
        assert_eq!(named.option_descriptor(), "[type=the type (String)]");

        let positional = OptionMetadata::positional(ValueType::Integer);
        assert_eq!(positional.option_descriptor(), "[ARG (int)]");
    }

    #[test]
    fn test_empty_default_counts_as_no_default() {
        let empty = OptionMetadata::positional(ValueType::Integer).with_default("");
        assert!(!empty.has_default_value());
        assert_eq!(empty.default_value(), None);

        let zero = OptionMetadata::positional(ValueType::Integer).with_default("0");
        assert!(zero.has_default_value());
        assert_eq!(zero.default_value(), Some("0"));
    }

    #[test]
    fn test_effective_indices_skip_unordered_options() {
        let plugin = PluginBuilder::<Dummy>::new("field")
            .with_command(
                CommandBuilder::new("add")
                    .with_option(OptionMetadata::named("named", ValueType::String))
                    .with_option(OptionMetadata::positional(ValueType::String))
                    .with_option(OptionMetadata::pipe_in(ValueType::String))
                    .with_option(OptionMetadata::positional(ValueType::Integer))
                    .with_option(OptionMetadata::pipe_out())
                    .run(noop),
            )
            .build()
            .unwrap();

        let command = plugin.command("add").unwrap();
        let effective: Vec<Option<usize>> =
            command.options().iter().map(OptionMetadata::effective_index).collect();
        assert_eq!(effective, vec![None, Some(0), None, Some(1), None]);
        let declared: Vec<usize> = command.options().iter().map(OptionMetadata::index).collect();
        assert_eq!(declared, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_default_command_takes_plugin_name() {
        let plugin = PluginBuilder::<Dummy>::new("ls")
            .with_command(CommandBuilder::default_command().run(noop))
            .with_command(CommandBuilder::new("all").run(noop))
            .build()
            .unwrap();

        let default = plugin.default_command().unwrap();
        assert_eq!(default.name(), "ls");
        assert_eq!(default.qualified_name(), "ls");
        assert_eq!(plugin.command("all").unwrap().qualified_name(), "ls all");
        assert!(plugin.command("ls").is_none());
    }

    #[test]
    fn test_plugin_requirements_are_inherited() {
        #[derive(Debug, Default)]
        struct Needed {
            base: crate::core::project::FacetBase,
        }
        impl Facet for Needed {
            fn base(&self) -> &crate::core::project::FacetBase {
                &self.base
            }
            fn is_installed(&self) -> bool {
                true
            }
            fn install(&self) -> ShellResult<bool> {
                Ok(true)
            }
        }

        let plugin = PluginBuilder::<Dummy>::new("p")
            .requires_facet::<Needed>()
            .with_resource_scope(ResourceType::Directory)
            .with_command(CommandBuilder::default_command().requires_facet::<Needed>().run(noop))
            .build()
            .unwrap();
        let command = plugin.default_command().unwrap();
        assert_eq!(command.required_facets(), &[FacetType::of::<Needed>()]);
        assert!(command.requires_project());
        assert_eq!(command.resource_scope(), Some(&ResourceType::Directory));
    }

    #[test]
    fn test_invalid_metadata_is_rejected() {
        let missing_operation = PluginBuilder::<Dummy>::new("p")
            .with_command(CommandBuilder::default_command())
            .build();
        assert!(matches!(missing_operation, Err(ShellError::Config(_))));

        let varargs_not_last = PluginBuilder::<Dummy>::new("p")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(OptionMetadata::positional(ValueType::Sequence(Box::new(
                        ValueType::String,
                    ))))
                    .with_option(OptionMetadata::positional(ValueType::String))
                    .run(noop),
            )
            .build();
        assert!(varargs_not_last.is_err());

        let duplicate = PluginBuilder::<Dummy>::new("p")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(OptionMetadata::flag("all").with_short('a'))
                    .with_option(OptionMetadata::named("a", ValueType::String))
                    .run(noop),
            )
            .build();
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_usage_line() {
        let plugin = PluginBuilder::<Dummy>::new("touch")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(
                        OptionMetadata::positional(ValueType::Sequence(Box::new(ValueType::String)))
                            .with_description("names")
                            .required(),
                    )
                    .with_option(OptionMetadata::flag("quiet"))
                    .run(noop),
            )
            .build()
            .unwrap();
        assert_eq!(
            plugin.default_command().unwrap().usage(),
            "touch <names...> [--quiet]"
        );
    }
}
