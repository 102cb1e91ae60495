//! Configuration file support for rym.
//!
//! Loads an optional `rym.toml` from the working directory. Every key has a
//! default, and values given on the command line win over the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cli::DispatchConfig;

pub const CONFIG_FILE: &str = "rym.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid type filter '{pattern}': {source}")]
    TypeFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0}")]
    Color(String),
}

/// Contents of `rym.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RymConfig {
    /// Operation run when only a task is named. An empty string disables it.
    pub default_operation: String,
    /// Operations never exposed on the command line.
    pub ignored_operations: Vec<String>,
    /// Task definition file holding extra root options.
    pub procfile: PathBuf,
    /// Directory the task runs in.
    pub work_dir: Option<PathBuf>,
    /// Regex over task type names handed to the module loader.
    pub type_filter: Option<String>,
}

impl Default for RymConfig {
    fn default() -> Self {
        Self {
            default_operation: "execute".to_string(),
            ignored_operations: vec!["dispose".to_string()],
            procfile: PathBuf::from(crate::procfile::DEFAULT_PROCFILE),
            work_dir: None,
            type_filter: None,
        }
    }
}

impl RymConfig {
    /// Load `rym.toml` from `path`. A missing file is the default config,
    /// anything else that goes wrong is an error.
    pub fn try_load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Dispatcher settings for `program`.
    pub fn dispatch_config(&self, program: &str) -> DispatchConfig {
        let default_operation = Some(self.default_operation.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        DispatchConfig {
            program: program.to_string(),
            default_operation,
            ignored_operations: self.ignored_operations.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = RymConfig::try_load_from_path(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, RymConfig::default());
        assert_eq!(config.procfile, PathBuf::from("Rymfile"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"
default_operation = "run"
work_dir = "build"
"#,
        );
        let config = RymConfig::try_load_from_path(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.default_operation, "run");
        assert_eq!(config.work_dir, Some(PathBuf::from("build")));
        assert_eq!(config.ignored_operations, vec!["dispose".to_string()]);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "default_operation = [");
        assert!(matches!(
            RymConfig::try_load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_dispatch_config() {
        let config = RymConfig {
            ignored_operations: vec!["Dispose".into(), "Close".into()],
            ..RymConfig::default()
        };
        let dispatch = config.dispatch_config("tasks");
        assert_eq!(dispatch.program, "tasks");
        assert_eq!(dispatch.default_operation.as_deref(), Some("execute"));
        assert_eq!(dispatch.ignored_operations.len(), 2);

        let disabled = RymConfig {
            default_operation: "  ".into(),
            ..RymConfig::default()
        };
        assert!(disabled.dispatch_config("rym").default_operation.is_none());
    }
}
