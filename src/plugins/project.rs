// src/plugins/project.rs

use crate::core::{
    conversion::Arguments,
    error::ShellResult,
    execution::InvocationContext,
    metadata::{CommandBuilder, OptionMetadata, PluginBuilder, PromptType, ValueType},
    registry::{CommandRegistry, PluginRegistry},
};
use crate::facets::{FacetCatalog, descriptor::DescriptorFacet, packaging::PackagingFacet};
use crate::models::PackagingType;
use anyhow::{Result, anyhow};

/// Inspects the current project and manages its facets.
#[derive(Debug)]
pub struct ProjectPlugin {
    catalog: FacetCatalog,
}

impl ProjectPlugin {
    /// A plugin installing facets from `catalog`.
    pub fn new(catalog: FacetCatalog) -> Self {
        Self { catalog }
    }

    fn info(&self, _: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let project = ctx.require_project()?;
        let names = project.facet_names();
        let facets = if names.is_empty() {
            t!("project.info.none").to_string()
        } else {
            names.join(", ")
        };

        let out = ctx.out();
        out.println(&format!(t!("project.info.root"), path = project.root_path().display()));
        out.println(&format!(t!("project.info.facets"), facets = facets));
        if let Ok(packaging) = project.get_facet::<PackagingFacet>() {
            out.println(&format!(t!("project.info.packaging"), packaging = packaging.packaging()?));
        }
        for broken in project.broken_facets() {
            log::warn!("Facet '{}' is registered but no longer installed.", broken);
        }
        Ok(())
    }

    fn list_facets(&self, _: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let project = ctx.require_project()?;
        let lines: Vec<String> = self
            .catalog
            .entries()
            .iter()
            .map(|entry| {
                let mark = if project.has_facet_type(&entry.facet_type()) {
                    format!(" [{}]", t!("project.label.installed"))
                } else {
                    String::new()
                };
                format!("{:<12} {}{}", entry.name(), entry.description(), mark)
            })
            .collect();
        for line in lines {
            ctx.out().println(&line);
        }
        Ok(())
    }

    fn install_facet(&self, args: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let project = ctx.require_project()?;
        let name = args.string(0)?;
        let facet_type = self.catalog.install(project, &name)?;
        ctx.out()
            .println(&format!(t!("project.success.facet_installed"), facet = facet_type));
        Ok(())
    }

    fn remove_facet(&self, args: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let project = ctx.require_project()?;
        let name = args.string(0)?;
        let entry = self
            .catalog
            .find(&name)
            .ok_or_else(|| anyhow!(t!("project.error.facet_not_installed"), facet = name))?;
        if !project.remove_facet_type(&entry.facet_type()) {
            return Err(anyhow!(t!("project.error.facet_not_installed"), facet = name));
        }
        ctx.out()
            .println(&format!(t!("project.success.facet_removed"), facet = entry.facet_type()));
        Ok(())
    }

    fn set_packaging(&self, args: &Arguments, ctx: &mut InvocationContext<'_>) -> Result<()> {
        let project = ctx.require_project()?;
        let value = args.string(0)?;
        let packaging = PackagingType::parse(&value)
            .ok_or_else(|| anyhow!(t!("project.error.unknown_packaging"), value = value))?;

        let previous = project.get_facet::<PackagingFacet>()?.set_packaging(packaging)?;
        ctx.out().println(&format!(
            t!("project.success.packaging_changed"),
            from = previous,
            to = packaging
        ));

        if let Ok(descriptor) = project.get_facet::<DescriptorFacet>() {
            if descriptor.relocate(previous, packaging)? {
                let path = descriptor.config_file()?.path().display().to_string();
                ctx.out()
                    .println(&format!(t!("project.info.descriptor_relocated"), path = path));
            }
        }
        Ok(())
    }
}

/// Registers `project` and its subcommands.
pub fn register(
    commands: &mut CommandRegistry,
    plugins: &mut PluginRegistry,
    catalog: FacetCatalog,
) -> ShellResult<()> {
    let facet_name = || {
        OptionMetadata::positional(ValueType::String)
            .with_description("facet")
            .required()
            .with_prompt(PromptType::FacetName)
    };

    commands.register(
        PluginBuilder::<ProjectPlugin>::new("project")
            .with_topic("project")
            .with_help("Inspect the current project and manage its facets")
            .requires_project()
            .with_command(
                CommandBuilder::default_command()
                    .with_option(OptionMetadata::pipe_out())
                    .run(ProjectPlugin::info),
            )
            .with_command(
                CommandBuilder::new("list-facets")
                    .with_help("List the facets that can be installed")
                    .with_option(OptionMetadata::pipe_out())
                    .run(ProjectPlugin::list_facets),
            )
            .with_command(
                CommandBuilder::new("install-facet")
                    .with_help("Install a facet by name")
                    .with_option(facet_name())
                    .run(ProjectPlugin::install_facet),
            )
            .with_command(
                CommandBuilder::new("remove-facet")
                    .with_help("Unregister a facet without touching its files")
                    .with_option(facet_name())
                    .run(ProjectPlugin::remove_facet),
            )
            .with_command(
                CommandBuilder::new("set-packaging")
                    .with_help("Change the packaging type (jar, war or pom)")
                    .requires_facet::<PackagingFacet>()
                    .with_option(
                        OptionMetadata::positional(ValueType::String)
                            .with_description("type")
                            .required(),
                    )
                    .run(ProjectPlugin::set_packaging),
            )
            .build()?,
    )?;

    plugins.register_singleton(ProjectPlugin::new(catalog));
    Ok(())
}
