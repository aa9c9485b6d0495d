//! Configuration for nodemod runs.
//!
//! # Configuration Hierarchy
//!
//! Settings are resolved in the following order of precedence (highest to lowest):
//! 1. **Environment Variables**: `NODEMOD_*` (e.g., `NODEMOD_RUN__DRY_RUN=true`)
//! 2. **Configuration File**: `nodemod.toml` in the target directory, or the
//!    file passed with `--config`.
//! 3. **Default Values**: Hardcoded defaults in the configuration structs.
//!
//! # Configuration File Example
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [run]
//! extensions = ["js", "mjs", "cjs"]
//! ignore_dirs = ["node_modules", "vendor"]
//! install = false
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Name of the configuration file looked up in the target directory
pub const CONFIG_FILE_NAME: &str = "nodemod.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Recipe run configuration
    pub run: RunConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format for development
    #[default]
    Pretty,
    /// Structured JSON format for CI pipelines
    Json,
}

/// Settings controlling how a recipe is run over a directory tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// File extensions (without dot) that are parsed and transformed
    pub extensions: Vec<String>,
    /// Directory names that are never descended into
    pub ignore_dirs: Vec<String>,
    /// Report changes without writing files
    pub dry_run: bool,
    /// Remove dependencies a recipe made obsolete from package.json
    pub update_package_json: bool,
    /// Run the package manager install after editing package.json
    pub install: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            extensions: ["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            ignore_dirs: ["node_modules", ".git", "dist", "build", "coverage"]
                .iter()
                .map(|dir| dir.to_string())
                .collect(),
            dry_run: false,
            update_package_json: true,
            install: true,
        }
    }
}

impl AppConfig {
    /// Loads configuration from defaults, a TOML file and the environment.
    ///
    /// When `explicit` is given the file must exist. Otherwise
    /// `nodemod.toml` in `workspace_root` is used if present.
    pub fn load(explicit: Option<&Path>, workspace_root: &Path) -> Result<Self, ConfigError> {
        let config_path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile(path.display().to_string()))
            }
            Some(path) => path.to_path_buf(),
            None => workspace_root.join(CONFIG_FILE_NAME),
        };

        let defaults = toml::to_string(&AppConfig::default())?;

        Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("NODEMOD_").split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Whether a file with this extension is handled by recipes
    pub fn handles_extension(&self, extension: &str) -> bool {
        self.run.extensions.iter().any(|ext| ext == extension)
    }

    /// Whether a directory with this name is skipped during discovery
    pub fn ignores_dir(&self, name: &str) -> bool {
        self.run.ignore_dirs.iter().any(|dir| dir == name)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Figment error: {0}")]
    Figment(#[from] figment::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    MissingFile(String),
}

impl From<ConfigError> for figment::Error {
    fn from(err: ConfigError) -> figment::Error {
        use figment::error::Kind;
        figment::Error::from(Kind::Message(err.to_string()))
    }
}

impl From<ConfigError> for nodemod_foundation::NodemodError {
    fn from(err: ConfigError) -> Self {
        nodemod_foundation::NodemodError::config(err.to_string())
    }
}
