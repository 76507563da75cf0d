// src/core/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// The single failure surface of the shell core.
///
/// Every variant carries a human-readable message. None of them is fatal to the
/// host process: the shell loop reports the error and keeps going.
#[derive(Error, Debug)]
pub enum ShellError {
    /// A required entity does not exist (no project root, missing facet, missing plugin).
    #[error("{what} not found.")]
    NotFound {
        /// What was looked for.
        what: String,
    },
    /// The current project lacks a facet the command (or facet) requires.
    #[error("Command '{command}' requires facet '{facet}', which is not installed.")]
    ConstraintViolation {
        /// The command (or facet) being gated.
        command: String,
        /// The first missing requirement.
        facet: String,
    },
    /// A constraint other than a missing facet was not met (no project, wrong scope).
    #[error("Command '{command}' cannot run here: {reason}")]
    ScopeViolation {
        /// The command being gated.
        command: String,
        /// Why it cannot run.
        reason: String,
    },
    /// A raw argument could not be coerced to its declared type.
    #[error("Command option '{option}' must be of type '{expected}' (got '{value}').")]
    TypeConversion {
        /// The option descriptor.
        option: String,
        /// The expected value type.
        expected: String,
        /// The offending raw value.
        value: String,
    },
    /// A path resolved to a resource of a different type than requested.
    #[error("Requested resource '{path}' was not of type '{expected}', but was instead '{actual}'.")]
    AmbiguousResource {
        /// The resolved path.
        path: PathBuf,
        /// The requested resource type.
        expected: String,
        /// The type found on disk.
        actual: String,
    },
    /// The input did not resolve to any registered command.
    #[error("No such command: {statement}")]
    NoSuchCommand {
        /// The original input.
        statement: String,
    },
    /// A facet could not create the artifacts it needs.
    #[error("Failed to install facet '{facet}': {reason}")]
    InstallFailure {
        /// The facet being installed.
        facet: String,
        /// What went wrong.
        reason: String,
    },
    /// A required option received no value.
    #[error("Option '{option}' of command '{command}' is required but was not provided.")]
    MissingArgument {
        /// The command being bound.
        command: String,
        /// The option descriptor.
        option: String,
    },
    /// Tokens were left over after binding, or an option was given twice.
    #[error("Unexpected arguments for command '{command}': {arguments}")]
    UnexpectedArguments {
        /// The command being bound.
        command: String,
        /// The unclaimed tokens.
        arguments: String,
    },
    /// Anything raised by a plugin operation or by resolving the plugin instance.
    #[error("Command '{command}' failed: {source}")]
    ExecutionFailed {
        /// The originating command.
        command: String,
        /// The underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A filesystem call failed.
    #[error("Filesystem error at '{path}': {source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Configuration could not be read or written.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShellError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Wraps an `io::Error` with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a plugin-level failure for the given command.
    pub fn execution(command: impl Into<String>, source: anyhow::Error) -> Self {
        Self::ExecutionFailed {
            command: command.into(),
            source: source.into(),
        }
    }

    /// Whether this error is a facet or scope gate failure.
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation { .. } | Self::ScopeViolation { .. }
        )
    }
}

/// Result alias used across the core.
pub type ShellResult<T> = Result<T, ShellError>;
