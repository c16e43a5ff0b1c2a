//! Configuration loading and root folder resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal; callers log a warning and
//! continue with compiled defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Directory name used under the platform config and data folders
pub const APP_DIR_NAME: &str = "timetable";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "timetable.db";

/// Default optimization engine endpoint
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:5000";

/// Default engine call timeout in seconds
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 120;

/// TOML configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Folder holding the database
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[engine]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `[logging]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Outcome of loading the optional TOML file
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTomlConfig {
    pub config: TomlConfig,
    /// Why compiled defaults were used instead of the file, for logging once
    /// the subscriber is installed
    pub fallback_reason: Option<String>,
}

/// Load the TOML config, degrading to defaults when absent or malformed
///
/// `explicit` is a path passed on the command line; when `None` the platform
/// default location is tried. A missing default file is not worth a warning;
/// a missing explicit file or an unreadable one is.
pub fn load_toml_config_or_default(explicit: Option<&Path>, file_name: &str) -> LoadedTomlConfig {
    let defaults = |reason: Option<String>| LoadedTomlConfig {
        config: TomlConfig::default(),
        fallback_reason: reason,
    };

    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path(file_name) {
            Some(path) => path,
            None => return defaults(None),
        },
    };

    if !path.exists() {
        return match explicit {
            Some(_) => defaults(Some(format!("Config file not found: {}", path.display()))),
            None => defaults(None),
        };
    }

    match load_toml_config(&path) {
        Ok(config) => LoadedTomlConfig {
            config,
            fallback_reason: None,
        },
        Err(e) => defaults(Some(e.to_string())),
    }
}

/// Platform config file location, e.g. `~/.config/timetable/orchestrator.toml`
pub fn default_config_path(file_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(file_name))
}

/// Resolve the root folder in priority order: CLI, environment, TOML, default
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("/var/lib/timetable"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/timetable"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\timetable"))
    } else {
        PathBuf::from("./timetable_data")
    }
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_level_defaults_to_info() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.engine.url.is_none());
    }

    #[test]
    fn test_database_path_joins_file_name() {
        let path = database_path(Path::new("/tmp/tt"));
        assert_eq!(path, PathBuf::from("/tmp/tt/timetable.db"));
    }
}
