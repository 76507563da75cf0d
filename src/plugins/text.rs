// src/plugins/text.rs

use crate::core::{
    conversion::Arguments,
    error::ShellResult,
    execution::InvocationContext,
    metadata::{CommandBuilder, OptionMetadata, PluginBuilder, ValueType},
    registry::{CommandRegistry, PluginRegistry},
};
use anyhow::Result;

/// Text producers and filters for pipelines.
#[derive(Debug, Default)]
pub struct TextPlugin;

impl TextPlugin {
    fn echo(&self, args: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let line = args.strings(0).join(" ");
        ctx.out().println(&line);
        Ok(())
    }

    fn upper(&self, args: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let text = match args.opt_string(0) {
            Some(piped) => piped,
            None => {
                let mut joined = args.strings(1).join(" ");
                joined.push('\n');
                joined
            }
        };
        ctx.out().write(&text.to_uppercase());
        Ok(())
    }
}

/// Registers `echo` and `upper`.
pub fn register(commands: &mut CommandRegistry, plugins: &mut PluginRegistry) -> ShellResult<()> {
    commands.register(
        PluginBuilder::<TextPlugin>::new("echo")
            .with_topic("text")
            .with_help("Write the arguments to the output")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(
                        OptionMetadata::positional(ValueType::Sequence(Box::new(ValueType::String)))
                            .with_description("words"),
                    )
                    .with_option(OptionMetadata::pipe_out())
                    .run(TextPlugin::echo),
            )
            .build()?,
    )?;

    commands.register(
        PluginBuilder::<TextPlugin>::new("upper")
            .with_topic("text")
            .with_help("Upper-case the piped input, or the arguments")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(OptionMetadata::pipe_in(ValueType::String))
                    .with_option(
                        OptionMetadata::positional(ValueType::Sequence(Box::new(ValueType::String)))
                            .with_description("words"),
                    )
                    .with_option(OptionMetadata::pipe_out())
                    .run(TextPlugin::upper),
            )
            .build()?,
    )?;

    plugins.register_singleton(TextPlugin);
    Ok(())
}
