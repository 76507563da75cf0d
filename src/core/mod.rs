// src/core/mod.rs

/// Token binding into a command's parameter array.
pub mod arg_parser;
/// Directory signatures for listing staleness checks.
pub mod cache;
/// Small display helpers.
pub mod commons;
/// Shell configuration and project settings files.
pub mod config_loader;
/// Facet and scope checks run before a command.
pub mod constraints;
/// Raw arguments and their typed values.
pub mod conversion;
/// Injected access to the host environment.
pub mod environment;
/// The shell error type.
pub mod error;
/// The execution engine.
pub mod execution;
/// Project root discovery.
pub mod locator;
/// Plugin, command and option metadata and their builders.
pub mod metadata;
/// Config locations and user path expansion.
pub mod paths;
/// Projects and the facets installed on them.
pub mod project;
/// Command and plugin instance registries.
pub mod registry;
/// The resource tree.
pub mod resource;
/// Classifies paths into resource nodes.
pub mod resource_factory;
