// src/models.rs

use crate::constants::DEFAULT_PROJECT_MARKER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// --- `config.toml` MODELS (user configuration) ---

/// The deserialized user configuration.
///
/// ```toml
/// marker = "pom.xml"
/// prompt = "anvil"
///
/// [resource_types]
/// descriptor = '\.xml$'
/// source = '\.(rs|java)$'
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// The resource that marks a project root.
    #[serde(default = "default_marker")]
    pub marker: String,
    /// The text shown before the cursor in the interactive prompt.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Specialised file types: type name -> regex matched against the file name.
    #[serde(default)]
    pub resource_types: BTreeMap<String, String>,
}

fn default_marker() -> String {
    DEFAULT_PROJECT_MARKER.to_string()
}

fn default_prompt() -> String {
    "anvil".to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        let mut resource_types = BTreeMap::new();
        resource_types.insert("descriptor".to_string(), r"\.xml$".to_string());
        Self {
            marker: default_marker(),
            prompt: default_prompt(),
            resource_types,
        }
    }
}

// --- `.anvil/project.toml` MODELS (per-project settings) ---

/// How a project is packaged. Decides where packaging-sensitive files live.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackagingType {
    /// A library or executable archive.
    #[default]
    Jar,
    /// A web application archive.
    War,
    /// An aggregator with no archive of its own.
    Pom,
}

impl PackagingType {
    /// Parses a user-typed packaging name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "jar" => Some(Self::Jar),
            "war" => Some(Self::War),
            "pom" => Some(Self::Pom),
            _ => None,
        }
    }
}

impl fmt::Display for PackagingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jar => "jar",
            Self::War => "war",
            Self::Pom => "pom",
        };
        f.write_str(name)
    }
}

/// The deserialized `.anvil/project.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSettings {
    /// How the project is packaged.
    #[serde(default)]
    pub packaging: PackagingType,
}
