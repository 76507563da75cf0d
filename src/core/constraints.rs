// src/core/constraints.rs

use crate::core::{
    error::{ShellError, ShellResult},
    metadata::CommandMetadata,
    project::{FacetType, Project},
    resource::Resource,
};
use log::debug;

/// Checks that `command` may run against the current project.
///
/// Fails on the first required facet that is not installed. Commands needing a
/// project fail when none is open.
pub fn verify_available(project: Option<&Project>, command: &CommandMetadata) -> ShellResult<()> {
    let project = match project {
        Some(p) => p,
        None if command.requires_project() => {
            let reason = match command.required_facets().first() {
                Some(facet) => format!("no project is open to provide facet '{}'", facet.name()),
                None => "no project is open".to_string(),
            };
            return Err(ShellError::ScopeViolation {
                command: command.qualified_name(),
                reason,
            });
        }
        None => return Ok(()),
    };

    if let Some(missing) = first_missing(project, command.required_facets()) {
        debug!(
            "'{}' blocked: facet '{}' missing on '{}'.",
            command.qualified_name(),
            missing,
            project.root_path().display()
        );
        return Err(ShellError::ConstraintViolation {
            command: command.qualified_name(),
            facet: missing.name().to_string(),
        });
    }
    Ok(())
}

/// Checks that every prerequisite of the facet `facet_name` is installed.
pub fn verify_facet_prerequisites(
    project: &Project,
    facet_name: &str,
    requires: &[FacetType],
) -> ShellResult<()> {
    match first_missing(project, requires) {
        Some(missing) => Err(ShellError::ConstraintViolation {
            command: facet_name.to_string(),
            facet: missing.name().to_string(),
        }),
        None => Ok(()),
    }
}

/// Checks that the cursor is on the kind of resource the command is scoped to.
pub fn verify_scope(command: &CommandMetadata, cursor: &Resource) -> ShellResult<()> {
    match command.resource_scope() {
        Some(scope) if !cursor.resource_type().is_a(scope) => Err(ShellError::ScopeViolation {
            command: command.qualified_name(),
            reason: format!(
                "the current resource is a {}, not a {}",
                cursor.resource_type(),
                scope
            ),
        }),
        _ => Ok(()),
    }
}

fn first_missing(project: &Project, required: &[FacetType]) -> Option<FacetType> {
    required
        .iter()
        .find(|facet| !project.has_facet_type(facet))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversion::Arguments;
    use crate::core::execution::InvocationContext;
    use crate::core::metadata::{CommandBuilder, PluginBuilder};
    use crate::core::project::tests::{MarkerFacet, project_in};
    use crate::core::resource::ResourceType;
    use crate::core::resource_factory::ResourceFactory;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct Dummy;

    fn noop(_: &Dummy, _: &Arguments, _: &mut InvocationContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn gated() -> Arc<CommandMetadata> {
        PluginBuilder::<Dummy>::new("gated")
            .with_command(
                CommandBuilder::default_command()
                    .requires_facet::<MarkerFacet>()
                    .with_resource_scope(ResourceType::Directory)
                    .run(noop),
            )
            .build()
            .unwrap()
            .default_command()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_missing_facet_is_a_constraint_violation() {
        let dir = TempDir::new().unwrap();
        let project = project_in(&dir);
        let command = gated();

        let err = verify_available(Some(&project), &command).unwrap_err();
        assert!(matches!(
            &err,
            ShellError::ConstraintViolation { facet, .. } if facet == "MarkerFacet"
        ));

        project.register_facet(MarkerFacet::default());
        assert!(verify_available(Some(&project), &command).is_ok());
    }

    #[test]
    fn test_no_project_is_a_scope_violation() {
        let command = gated();
        let err = verify_available(None, &command).unwrap_err();
        assert!(matches!(
            &err,
            ShellError::ScopeViolation { reason, .. } if reason.contains("MarkerFacet")
        ));
        assert!(err.is_constraint());
    }

    #[test]
    fn test_resource_scope() {
        let dir = TempDir::new().unwrap();
        let project = project_in(&dir);
        let command = gated();
        let file = project.root().get_child("file.txt");

        assert!(verify_scope(&command, &project.root().to_resource()).is_ok());
        assert!(matches!(
            verify_scope(&command, &file),
            Err(ShellError::ScopeViolation { .. })
        ));
    }

    #[test]
    fn test_file_scope_accepts_typed_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("beans.xml"), "<beans/>").unwrap();
        let mut factory = ResourceFactory::new();
        factory.register_type("descriptor", r"\.xml$").unwrap();
        let cursor = Arc::new(factory).resource_from(&dir.path().join("beans.xml"));

        let command = PluginBuilder::<Dummy>::new("edit")
            .with_command(
                CommandBuilder::default_command()
                    .with_resource_scope(ResourceType::File)
                    .run(noop),
            )
            .build()
            .unwrap()
            .default_command()
            .cloned()
            .unwrap();

        assert_eq!(cursor.resource_type(), ResourceType::Typed("descriptor".to_string()));
        assert!(verify_scope(&command, &cursor).is_ok());
    }
}
