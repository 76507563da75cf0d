// src/plugins/descriptor.rs

use crate::core::{
    conversion::Arguments,
    error::ShellResult,
    execution::InvocationContext,
    metadata::{CommandBuilder, OptionMetadata, PluginBuilder},
    registry::{CommandRegistry, PluginRegistry},
};
use crate::facets::descriptor::DescriptorFacet;
use anyhow::Result;

/// Inspects the component descriptor of the current project.
#[derive(Debug, Default)]
pub struct DescriptorPlugin;

impl DescriptorPlugin {
    fn show(&self, _: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let facet = ctx.require_project()?.get_facet::<DescriptorFacet>()?;
        let contents = facet.contents()?;
        ctx.out().write(&contents);
        Ok(())
    }

    fn path(&self, _: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let facet = ctx.require_project()?.get_facet::<DescriptorFacet>()?;
        let path = facet.config_file()?.path().display().to_string();
        ctx.out().println(&path);
        Ok(())
    }
}

/// Registers `descriptor` and `descriptor path`.
pub fn register(commands: &mut CommandRegistry, plugins: &mut PluginRegistry) -> ShellResult<()> {
    commands.register(
        PluginBuilder::<DescriptorPlugin>::new("descriptor")
            .with_alias("beans")
            .with_topic("project")
            .with_help("Show the component descriptor")
            .requires_facet::<DescriptorFacet>()
            .with_command(
                CommandBuilder::default_command()
                    .with_option(OptionMetadata::pipe_out())
                    .run(DescriptorPlugin::show),
            )
            .with_command(
                CommandBuilder::new("path")
                    .with_help("Print where the descriptor lives")
                    .with_option(OptionMetadata::pipe_out())
                    .run(DescriptorPlugin::path),
            )
            .build()?,
    )?;

    plugins.register_singleton(DescriptorPlugin);
    Ok(())
}
