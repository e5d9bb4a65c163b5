//! Configuration file loading and parsing.

use crate::types::TasksmithConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var regex"));

/// Location of the config file relative to the project root.
pub const CONFIG_FILE: &str = ".tasksmith/config.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the project config file.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_FILE)
    }

    /// Load configuration from `.tasksmith/config.yaml`, falling back to
    /// defaults when the file does not exist.
    pub fn load(&self) -> Result<TasksmithConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(TasksmithConfig::default());
        }

        self.load_file(&config_path)
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_file(&self, path: &Path) -> Result<TasksmithConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        self.parse(&contents)
    }

    /// Parse configuration text, expanding environment variables first.
    pub fn parse(&self, contents: &str) -> Result<TasksmithConfig, ConfigError> {
        let expanded = self.expand_env_vars(contents)?;

        let config: TasksmithConfig = if expanded.trim().is_empty() {
            TasksmithConfig::default()
        } else {
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        self.validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        for cap in ENV_VAR.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// Validate configuration values.
    fn validate(&self, config: &TasksmithConfig) -> Result<(), ConfigError> {
        if !(1..=9).contains(&config.render.ordinal_width) {
            return Err(ConfigError::ValidationError {
                message: "render.ordinal_width must be between 1 and 9".to_string(),
            });
        }

        for (name, value) in [
            ("commands.test", &config.commands.test),
            ("commands.build", &config.commands.build),
            ("commands.lint", &config.commands.lint),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: format!("{name} must not be empty"),
                });
            }
        }

        let mut seen = HashSet::new();
        for stage in config.stages.iter() {
            if stage.name.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "stage name must not be empty".to_string(),
                });
            }
            if stage.section.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: format!("stage '{}' has an empty section marker", stage.name),
                });
            }
            if !seen.insert(stage.name.as_str()) {
                return Err(ConfigError::ValidationError {
                    message: format!("stage '{}' is listed twice", stage.name),
                });
            }
        }

        Ok(())
    }
}
