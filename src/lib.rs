//! # anvil
//!
//! An extensible command shell over a virtual model of a project's file tree.
//!
//! - **`core`**: resources, projects and facets, the project locator, command
//!   metadata, the constraint gate and the execution engine.
//! - **`facets`**: the built-in capability units a project can install.
//! - **`plugins`**: the built-in commands registered with every shell.
//! - **`cli`**: the command-line surface and the line dispatcher.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

/// Command-line surface and line dispatcher.
pub mod cli;
/// File and folder names.
pub mod constants;
/// Resources, projects, metadata and the execution engine.
pub mod core;
/// Built-in facets.
pub mod facets;
/// Configuration and settings models.
pub mod models;
/// Built-in plugins.
pub mod plugins;
