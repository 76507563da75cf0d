// src/plugins/navigation.rs

use crate::core::{
    error::ShellResult,
    execution::InvocationContext,
    conversion::Arguments,
    metadata::{CommandBuilder, OptionMetadata, PluginBuilder, PromptType, ValueType},
    paths,
    registry::{CommandRegistry, PluginRegistry},
    resource::Resource,
};
use crate::plugins::cursor_dir;
use anyhow::{Result, anyhow};

/// Moving around and touching the resource tree.
#[derive(Debug, Default)]
pub struct NavigationPlugin;

impl NavigationPlugin {
    /// Resolves user input (`~`, `$VAR`, relative or absolute) against the cursor.
    fn resolve(&self, ctx: &InvocationContext<'_>, input: &str) -> Result<Resource> {
        let base = cursor_dir(ctx)?;
        let path = paths::expand_user_path(input, base.path(), ctx.environment())?;
        Ok(base.resolve(&path))
    }

    fn ls(&self, args: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let target = match args.opt_string(0) {
            Some(input) => self.resolve(ctx, &input)?,
            None => ctx.cursor().clone(),
        };
        let show_all = args.boolean(1);

        let dir = match target {
            Resource::Directory(dir) if dir.exists() => dir,
            Resource::Directory(dir) => {
                return Err(anyhow!(t!("nav.error.not_found"), path = dir.path().display()));
            }
            Resource::File(file) if file.exists() => {
                ctx.out().println(&file.name());
                return Ok(());
            }
            Resource::File(file) => {
                return Err(anyhow!(t!("nav.error.not_found"), path = file.path().display()));
            }
        };

        let mut children = dir.list_resources()?;
        children.sort_by_key(Resource::name);
        for child in children {
            let name = child.name();
            if !show_all && name.starts_with('.') {
                continue;
            }
            let line = match child {
                Resource::Directory(_) => format!("{}/", name),
                Resource::File(_) => name,
            };
            ctx.out().println(&line);
        }
        Ok(())
    }

    fn cd(&self, args: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let input = args.string(0)?;
        let target = if input == ".." {
            cursor_dir(ctx)?
                .parent()
                .ok_or_else(|| anyhow!(t!("nav.error.not_found"), path = input))?
        } else {
            self.resolve(ctx, &input)?
        };

        match target {
            Resource::Directory(dir) if dir.exists() => {
                ctx.change_cursor(dir.to_resource());
                Ok(())
            }
            Resource::Directory(dir) => {
                Err(anyhow!(t!("nav.error.not_found"), path = dir.path().display()))
            }
            Resource::File(file) if !file.exists() => {
                Err(anyhow!(t!("nav.error.not_found"), path = file.path().display()))
            }
            Resource::File(file) => Err(anyhow!(
                t!("nav.error.not_a_directory"),
                path = file.path().display()
            )),
        }
    }

    fn pwd(&self, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let path = ctx.cursor().path().display().to_string();
        ctx.out().println(&path);
        Ok(())
    }

    fn touch(&self, args: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let dir = cursor_dir(ctx)?;
        for name in args.strings(0) {
            let file = dir.get_child_file(&name)?;
            if !file.create_new_file()? {
                log::debug!("'{}' already exists.", file.path().display());
            }
        }
        Ok(())
    }

    fn cat(&self, args: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let input = args.string(0)?;
        match self.resolve(ctx, &input)? {
            Resource::File(file) if file.exists() => {
                let contents = file.read_to_string()?;
                ctx.out().write(&contents);
                Ok(())
            }
            Resource::File(file) => {
                Err(anyhow!(t!("nav.error.not_found"), path = file.path().display()))
            }
            Resource::Directory(dir) => Err(anyhow!(
                t!("nav.error.not_a_file"),
                path = dir.path().display()
            )),
        }
    }
}

/// Registers `ls`, `cd`, `pwd`, `touch` and `cat`.
pub fn register(commands: &mut CommandRegistry, plugins: &mut PluginRegistry) -> ShellResult<()> {
    commands.register(
        PluginBuilder::<NavigationPlugin>::new("ls")
            .with_alias("dir")
            .with_topic("navigation")
            .with_help("List the contents of a directory")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(
                        OptionMetadata::positional(ValueType::Path)
                            .with_description("path")
                            .with_prompt(PromptType::DirectoryPath),
                    )
                    .with_option(
                        OptionMetadata::flag("all")
                            .with_short('a')
                            .with_description("Show hidden entries"),
                    )
                    .with_option(OptionMetadata::pipe_out())
                    .run(NavigationPlugin::ls),
            )
            .build()?,
    )?;

    commands.register(
        PluginBuilder::<NavigationPlugin>::new("cd")
            .with_topic("navigation")
            .with_help("Change the current directory")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(
                        OptionMetadata::positional(ValueType::String)
                            .with_description("path")
                            .with_default("~")
                            .with_prompt(PromptType::DirectoryPath),
                    )
                    .run(NavigationPlugin::cd),
            )
            .build()?,
    )?;

    commands.register(
        PluginBuilder::<NavigationPlugin>::new("pwd")
            .with_topic("navigation")
            .with_help("Print the current resource")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(OptionMetadata::pipe_out())
                    .run(|plugin: &NavigationPlugin, _, ctx| plugin.pwd(ctx)),
            )
            .build()?,
    )?;

    commands.register(
        PluginBuilder::<NavigationPlugin>::new("touch")
            .with_topic("files")
            .with_help("Create empty files")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(
                        OptionMetadata::positional(ValueType::Sequence(Box::new(ValueType::String)))
                            .with_description("names")
                            .required()
                            .with_prompt(PromptType::FilePath),
                    )
                    .run(NavigationPlugin::touch),
            )
            .build()?,
    )?;

    commands.register(
        PluginBuilder::<NavigationPlugin>::new("cat")
            .with_topic("files")
            .with_help("Print a file")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(
                        OptionMetadata::positional(ValueType::String)
                            .with_description("file")
                            .required()
                            .with_prompt(PromptType::FilePath),
                    )
                    .with_option(OptionMetadata::pipe_out())
                    .run(NavigationPlugin::cat),
            )
            .build()?,
    )?;

    plugins.register_singleton(NavigationPlugin);
    Ok(())
}
