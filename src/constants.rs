// src/constants.rs

/// The name of the directory holding anvil's per-project settings.
pub const ANVIL_DIR: &str = ".anvil";

/// The name of the project settings file (inside .anvil/).
pub const PROJECT_SETTINGS_FILENAME: &str = "project.toml";

/// The name of the user configuration file (in ~/.config/anvil/).
pub const CONFIG_FILENAME: &str = "config.toml";

/// The resource whose presence marks a directory as a project root.
pub const DEFAULT_PROJECT_MARKER: &str = "pom.xml";

/// Source resources folder, relative to the project root.
pub const RESOURCES_FOLDER: &str = "src/main/resources";

/// Web root folder, relative to the project root.
pub const WEB_ROOT_FOLDER: &str = "src/main/webapp";

/// The descriptor file managed by `DescriptorFacet`.
pub const DESCRIPTOR_FILENAME: &str = "beans.xml";

/// The token separating the stages of a pipeline.
pub const PIPE_TOKEN: &str = "|";
