//! # Dispatcher
//!
//! Owns the shell state (cursor, open project, registries) and runs one input
//! line at a time. A line is split with shell quoting rules; `|` tokens split it
//! into pipeline stages, and each stage's pipe-out text becomes the next
//! stage's piped input.
use crate::constants::PIPE_TOKEN;
use crate::core::{
    commons::wrap_value,
    environment::Environment,
    error::{ShellError, ShellResult},
    execution::{ExecutionEngine, PipeOut},
    locator::{MarkerProjectLocator, ProjectLocator},
    project::Project,
    registry::{CommandRegistry, PluginRegistry},
    resource::{DirectoryResource, Resource},
    resource_factory::ResourceFactory,
};
use crate::facets::FacetCatalog;
use crate::models::ShellConfig;
use crate::plugins;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

/// Words the dispatcher answers itself instead of routing to a plugin.
const HELP_COMMAND: &str = "help";

/// A running shell.
#[derive(Debug)]
pub struct Shell {
    engine: ExecutionEngine,
    factory: Arc<ResourceFactory>,
    locator: MarkerProjectLocator,
    catalog: FacetCatalog,
    cursor: Resource,
    project: Option<Project>,
    prompt: String,
    script_only: bool,
}

impl Shell {
    /// A shell with the built-in plugins, positioned at `start`. Commands see
    /// the host through `environment`.
    pub fn new(
        config: &ShellConfig,
        start: &Path,
        environment: Arc<dyn Environment>,
    ) -> ShellResult<Self> {
        let factory = Arc::new(ResourceFactory::from_config(config)?);
        let catalog = FacetCatalog::builtin();

        let mut commands = CommandRegistry::new();
        let mut plugin_instances = PluginRegistry::new();
        plugins::register_builtins(&mut commands, &mut plugin_instances, catalog.clone())?;

        Self::with_engine(
            ExecutionEngine::new(commands, plugin_instances).with_environment(environment),
            factory,
            MarkerProjectLocator::new(config.marker.as_str()),
            catalog,
            &config.prompt,
            start,
        )
    }

    /// A shell over an already assembled engine.
    pub fn with_engine(
        engine: ExecutionEngine,
        factory: Arc<ResourceFactory>,
        locator: MarkerProjectLocator,
        catalog: FacetCatalog,
        prompt: &str,
        start: &Path,
    ) -> ShellResult<Self> {
        let cursor = factory.resource_from(start);
        if !matches!(&cursor, Resource::Directory(d) if d.exists()) {
            return Err(ShellError::not_found(format!(
                "Directory '{}'",
                start.display()
            )));
        }

        let mut shell = Self {
            engine,
            factory,
            locator,
            catalog,
            cursor,
            project: None,
            prompt: prompt.to_string(),
            script_only: false,
        };
        shell.refresh_project();
        Ok(shell)
    }

    /// Marks every following execution as script-driven.
    pub fn set_script_only(&mut self, script_only: bool) {
        self.script_only = script_only;
    }

    /// The resource the shell is positioned at.
    pub fn cursor(&self) -> &Resource {
        &self.cursor
    }

    /// The open project, if the cursor is inside one.
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// The shared resource factory.
    pub fn factory(&self) -> &Arc<ResourceFactory> {
        &self.factory
    }

    /// The interactive prompt: `[prompt project] cursor $ `.
    pub fn prompt(&self) -> String {
        let scope = match &self.project {
            Some(project) => format!("{} {}", self.prompt, project.root().name()),
            None => self.prompt.clone(),
        };
        format!("[{}] {} $ ", scope, self.cursor.name())
    }

    /// Runs one input line and returns the output of its last stage.
    pub fn execute_line(&mut self, line: &str) -> ShellResult<String> {
        let tokens = shlex::split(line).ok_or_else(|| ShellError::UnexpectedArguments {
            command: line.to_string(),
            arguments: t!("shell.error.unbalanced_quotes").to_string(),
        })?;
        if tokens.is_empty() {
            return Ok(String::new());
        }

        if tokens.first().map(String::as_str) == Some(HELP_COMMAND) {
            return Ok(self.help(tokens.get(1).map(String::as_str)));
        }

        let stages: Vec<&[String]> = tokens.split(|t| t == PIPE_TOKEN).collect();
        if stages.iter().any(|stage| stage.is_empty()) {
            return Err(ShellError::UnexpectedArguments {
                command: line.to_string(),
                arguments: wrap_value(PIPE_TOKEN),
            });
        }

        let mut piped: Option<String> = None;
        for stage in stages {
            let execution = self
                .engine
                .prepare(stage, piped.as_deref())?
                .script_only(self.script_only);
            let mut out = PipeOut::new();
            let outcome =
                self.engine
                    .execute(execution, self.project.as_ref(), &self.cursor, &mut out)?;
            if let Some(next) = outcome.next_cursor {
                self.set_cursor(next);
            }
            piped = Some(out.take());
        }
        Ok(piped.unwrap_or_default())
    }

    /// Moves the cursor and re-locates the project around it.
    pub fn set_cursor(&mut self, cursor: Resource) {
        debug!("Cursor -> '{}'.", cursor.path().display());
        self.cursor = cursor;
        self.refresh_project();
    }

    /// Keeps the open project while the cursor stays under its root; otherwise
    /// locates the project around the cursor and detects its facets.
    fn refresh_project(&mut self) {
        let dir: Option<DirectoryResource> = match &self.cursor {
            Resource::Directory(dir) => Some(dir.clone()),
            Resource::File(file) => file.parent().and_then(|p| p.as_directory().cloned()),
        };
        let root = dir.and_then(|d| self.locator.find_project_root_recursively(&d));

        match root {
            Some(root) if self.project.as_ref().is_some_and(|p| p.root() == &root) => {}
            Some(root) => {
                let project = self.locator.create_project(&root);
                let detected = self.catalog.detect_installed(&project);
                info!(
                    "Opened project '{}' ({} facet(s) detected).",
                    root.path().display(),
                    detected.len()
                );
                self.project = Some(project);
            }
            None => {
                if self.project.take().is_some() {
                    info!("Left project.");
                }
            }
        }
    }

    fn help(&self, topic: Option<&str>) -> String {
        let registry = self.engine.commands();
        let mut out = String::new();
        match topic.and_then(|name| registry.plugin(name)) {
            Some(plugin) => {
                out.push_str(&format!("{}: {}\n", plugin.name(), plugin.help()));
                for command in plugin.commands() {
                    out.push_str(&format!("  {}\n", command.usage()));
                    if !command.help().is_empty() {
                        out.push_str(&format!("      {}\n", command.help()));
                    }
                }
            }
            None => {
                out.push_str(t!("shell.help.header"));
                out.push('\n');
                for plugin in registry.plugins() {
                    out.push_str(&format!("  {:<12} {}\n", plugin.name(), plugin.help()));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::FixedEnvironment;
    use crate::facets::{build::BuildFacet, descriptor::DescriptorFacet};
    use std::fs;
    use tempfile::TempDir;

    fn env_with_home(home: &Path) -> Arc<dyn Environment> {
        Arc::new(FixedEnvironment {
            os_name: "linux".to_string(),
            home: Some(home.to_path_buf()),
            ..FixedEnvironment::default()
        })
    }

    fn shell_at(path: &Path) -> Shell {
        Shell::new(&ShellConfig::default(), path, env_with_home(path)).unwrap()
    }

    #[test]
    fn test_cd_home_uses_injected_environment() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        fs::create_dir_all(home.join("docs")).unwrap();
        fs::create_dir(dir.path().join("work")).unwrap();
        let mut shell = Shell::new(
            &ShellConfig::default(),
            &dir.path().join("work"),
            env_with_home(&home),
        )
        .unwrap();

        shell.execute_line("cd").unwrap();
        assert_eq!(shell.cursor().name(), "home");

        shell.execute_line("cd /").unwrap();
        shell.execute_line("cd ~/docs").unwrap();
        assert_eq!(shell.cursor().name(), "docs");
        assert_eq!(
            shell.cursor().path(),
            crate::core::paths::canonical_path(&home.join("docs"))
        );
    }

    #[test]
    fn test_pipeline_upper_cases_echo() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_at(dir.path());
        let out = shell.execute_line("echo hello | upper").unwrap();
        assert_eq!(out.trim_end(), "HELLO");
    }

    #[test]
    fn test_quoted_arguments_and_empty_stage() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_at(dir.path());
        assert_eq!(
            shell.execute_line("echo 'a  b' c").unwrap(),
            "a  b c\n"
        );
        assert!(shell.execute_line("echo a |").is_err());
        assert!(shell.execute_line("echo 'open").is_err());
        assert_eq!(shell.execute_line("   ").unwrap(), "");
    }

    #[test]
    fn test_unknown_command() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_at(dir.path());
        assert!(matches!(
            shell.execute_line("frobnicate now"),
            Err(ShellError::NoSuchCommand { .. })
        ));
    }

    #[test]
    fn test_cd_moves_cursor_and_opens_project() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("p");
        fs::create_dir_all(root.join("src/main/java")).unwrap();
        fs::write(root.join("pom.xml"), "<project/>").unwrap();

        let mut shell = shell_at(dir.path());
        assert!(shell.project().is_none());

        shell.execute_line("cd p/src/main/java").unwrap();
        assert_eq!(shell.cursor().name(), "java");
        let project = shell.project().unwrap().clone();
        assert!(project.has_facet::<BuildFacet>());

        shell.execute_line("cd ..").unwrap();
        assert_eq!(shell.cursor().name(), "main");
        assert_eq!(shell.project(), Some(&project));

        shell.execute_line(&format!("cd {}", dir.path().display())).unwrap();
        assert!(shell.project().is_none());
    }

    #[test]
    fn test_cd_into_file_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.txt"), "x").unwrap();
        let mut shell = shell_at(dir.path());
        assert!(matches!(
            shell.execute_line("cd f.txt"),
            Err(ShellError::ExecutionFailed { .. })
        ));
        assert!(shell.execute_line("cd missing").is_err());
    }

    #[test]
    fn test_touch_ls_and_cat() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut shell = shell_at(dir.path());

        shell.execute_line("touch b.txt a.txt .hidden").unwrap();
        assert_eq!(shell.execute_line("ls").unwrap(), "a.txt\nb.txt\nsub/\n");
        assert_eq!(
            shell.execute_line("ls --all").unwrap(),
            ".hidden\na.txt\nb.txt\nsub/\n"
        );

        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        assert_eq!(shell.execute_line("cat a.txt | upper").unwrap(), "ALPHA");
        assert!(shell.execute_line("cat sub").is_err());
        assert!(matches!(
            shell.execute_line("touch"),
            Err(ShellError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_project_commands_require_a_project() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_at(dir.path());
        let err = shell.execute_line("project").unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn test_facet_lifecycle_and_relocation() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        let mut shell = shell_at(dir.path());

        let err = shell.execute_line("descriptor").unwrap_err();
        assert!(matches!(err, ShellError::ConstraintViolation { .. }));
        assert!(shell.execute_line("project install-facet descriptor").is_err());

        for name in ["packaging", "resources", "descriptor"] {
            shell
                .execute_line(&format!("project install-facet {}", name))
                .unwrap();
        }
        let info = shell.execute_line("project").unwrap();
        assert!(info.contains("DescriptorFacet"));
        assert!(info.contains("jar"));

        let jar = dir.path().join("src/main/resources/META-INF/beans.xml");
        let war = dir.path().join("src/main/webapp/WEB-INF/beans.xml");
        let before = fs::read_to_string(&jar).unwrap();

        shell.execute_line("project set-packaging war").unwrap();
        assert!(!jar.exists());
        assert_eq!(fs::read_to_string(&war).unwrap(), before);
        assert_eq!(shell.execute_line("descriptor").unwrap(), before);

        assert!(shell.execute_line("project set-packaging ear").is_err());
    }

    #[test]
    fn test_facets_are_detected_when_project_reopens() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        {
            let mut shell = shell_at(dir.path());
            for name in ["packaging", "resources", "descriptor"] {
                shell
                    .execute_line(&format!("project install-facet {}", name))
                    .unwrap();
            }
        }

        let shell = shell_at(dir.path());
        assert!(shell.project().unwrap().has_facet::<DescriptorFacet>());
    }

    #[test]
    fn test_remove_facet_gates_commands_again() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        let mut shell = shell_at(dir.path());
        shell.execute_line("project install-facet packaging").unwrap();
        shell.execute_line("project set-packaging war").unwrap();

        shell.execute_line("project remove-facet packaging").unwrap();
        assert!(matches!(
            shell.execute_line("project set-packaging jar"),
            Err(ShellError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn test_help_lists_plugins() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_at(dir.path());
        let all = shell.execute_line("help").unwrap();
        assert!(all.contains("project"));
        assert!(all.contains("echo"));

        let project = shell.execute_line("help project").unwrap();
        assert!(project.contains("project set-packaging <type>"));
    }

    #[test]
    fn test_start_must_be_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "x").unwrap();
        assert!(Shell::new(&ShellConfig::default(), &file, env_with_home(dir.path())).is_err());
    }
}
