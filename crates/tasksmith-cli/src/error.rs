//! CLI error handling and formatting.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use tasksmith_common_config::ConfigError;
use tasksmith_plan::{BatchError, OutlineError, RenderError};
use thiserror::Error;

pub mod formatter;

pub use formatter::ErrorFormatter;

/// CLI error type with rich context
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
        path: Option<PathBuf>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        hint: Option<String>,
    },

    /// Some documents could not be read or written; the rest were processed.
    #[error("{message}")]
    Documents {
        message: String,
        paths: Vec<PathBuf>,
    },

    #[error("{message}")]
    User {
        message: String,
        hint: Option<String>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Validation { .. } => "E003",
            Self::Documents { .. } => "E004",
            Self::User { .. } => "E005",
            Self::Other(_) => "E999",
        }
    }

    /// Process exit status for this error
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::Io { .. } => 3,
            Self::Validation { .. } => 5,
            Self::Documents { .. } => 1,
            Self::User { .. } => 1,
            Self::Other(_) => 1,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } => hint.as_deref(),
            Self::Validation { hint, .. } => hint.as_deref(),
            Self::User { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    /// Create an IO error with path
    pub fn io_with_path(
        message: impl Into<String>,
        source: io::Error,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source,
            path: Some(path.into()),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a validation error with hint
    pub fn validation_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create a user error with hint
    pub fn user_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

// Conversion implementations
impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            path: None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::NotFound { .. } => "Pass an existing file with --config or unset TASKSMITH_CONFIG",
            ConfigError::EnvVarNotFound { .. } => "Set the variable or give it a default with ${VAR:-default}",
            _ => "Check your .tasksmith/config.yaml",
        };
        Self::Config {
            message: format!("Configuration error: {err}"),
            source: Some(Box::new(err)),
            hint: Some(hint.to_string()),
        }
    }
}

impl From<OutlineError> for CliError {
    fn from(err: OutlineError) -> Self {
        Self::validation_with_hint(
            format!("Malformed outline: {err}"),
            "Fix the outline and re-run; no documents were written",
        )
    }
}

impl From<RenderError> for CliError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(source) => Self::Io {
                message: format!("Failed to read templates: {source}"),
                source,
                path: None,
            },
            other => Self::Config {
                message: format!("Template error: {other}"),
                source: Some(Box::new(other)),
                hint: Some("Check the templates in paths.template_dir".to_string()),
            },
        }
    }
}

impl From<BatchError> for CliError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Outline(e) => e.into(),
            BatchError::Render(e) => e.into(),
            BatchError::Io { path, source } => Self::Io {
                message: format!("{}: {source}", path.display()),
                source,
                path: Some(path),
            },
            BatchError::Pattern(e) => Self::User {
                message: format!("Invalid document directory: {e}"),
                hint: None,
            },
        }
    }
}
