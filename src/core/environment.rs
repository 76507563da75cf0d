// src/core/environment.rs

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Read-only access to the host environment.
///
/// Handed to the components that need it instead of reading globals, so tests
/// can substitute a `FixedEnvironment`.
pub trait Environment: Debug + Send + Sync {
    /// The operating system name (`linux`, `macos`, `windows`, ...).
    fn os_name(&self) -> &str;

    /// The user's home directory, if one can be determined.
    fn home_dir(&self) -> Option<PathBuf>;

    /// The directory the shell was started from.
    fn current_dir(&self) -> Option<PathBuf>;

    /// The value of an environment variable.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real environment. Each value is queried on first use and then cached
/// for the life of the process.
#[derive(Debug, Default)]
pub struct SystemEnvironment {
    home: OnceLock<Option<PathBuf>>,
    cwd: OnceLock<Option<PathBuf>>,
}

impl SystemEnvironment {
    /// Creates an accessor with nothing cached yet.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Environment for SystemEnvironment {
    fn os_name(&self) -> &str {
        env::consts::OS
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home
            .get_or_init(|| {
                let home = dirs::home_dir();
                log::debug!("Resolved home directory: {:?}", home);
                home
            })
            .clone()
    }

    fn current_dir(&self) -> Option<PathBuf> {
        self.cwd
            .get_or_init(|| env::current_dir().ok().map(|p| dunce::simplified(&p).to_path_buf()))
            .clone()
    }

    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

/// A fixed environment for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct FixedEnvironment {
    /// Reported OS name.
    pub os_name: String,
    /// Reported home directory.
    pub home: Option<PathBuf>,
    /// Reported current directory.
    pub cwd: Option<PathBuf>,
    /// Reported variables.
    pub vars: HashMap<String, String>,
}

impl Environment for FixedEnvironment {
    fn os_name(&self) -> &str {
        &self.os_name
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn current_dir(&self) -> Option<PathBuf> {
        self.cwd.clone()
    }

    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_environment_reports_its_values() {
        let env = FixedEnvironment {
            os_name: "windows".to_string(),
            home: Some(PathBuf::from("C:\\Users\\dev")),
            vars: HashMap::from([("PROJECT".to_string(), "demo".to_string())]),
            ..FixedEnvironment::default()
        };
        assert_eq!(env.os_name(), "windows");
        assert_eq!(env.home_dir(), Some(PathBuf::from("C:\\Users\\dev")));
        assert!(env.current_dir().is_none());
        assert_eq!(env.var("PROJECT").as_deref(), Some("demo"));
        assert!(env.var("MISSING").is_none());
    }

    #[test]
    fn test_system_environment_is_cached() {
        let env = SystemEnvironment::new();
        let first = env.current_dir();
        let second = env.current_dir();
        assert_eq!(first, second);
        assert!(!env.os_name().is_empty());
    }
}
