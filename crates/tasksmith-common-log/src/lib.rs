//! Logging infrastructure for tasksmith.
//!
//! Logs always go to stderr (and optionally a file) so that command
//! summaries on stdout stay machine-readable.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Log file path (if file logging enabled).
    pub file_path: Option<PathBuf>,
    /// Include source location.
    pub source_location: bool,
    /// Include span events.
    pub span_events: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        }
    }
}

impl LogLevel {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Level for a `-v` count; `quiet` wins over verbosity.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        match verbose {
            _ if quiet => Self::Error,
            0 => Self::Warn,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON structured format.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file_path: None,
            source_location: false,
            span_events: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("TASKSMITH_LOG_LEVEL") {
            if let Some(l) = LogLevel::parse(&level) {
                config.level = l;
            }
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            if let Some(l) = LogLevel::parse(&level) {
                config.level = l;
            }
        }

        if let Ok(format) = std::env::var("TASKSMITH_LOG_FORMAT") {
            config.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }

        if let Ok(file_path) = std::env::var("TASKSMITH_LOG_FILE") {
            config.file_path = Some(PathBuf::from(file_path));
        }

        if let Ok(source_location) = std::env::var("TASKSMITH_LOG_SOURCE") {
            config.source_location =
                source_location.to_lowercase() == "true" || source_location == "1";
        }

        config
    }

    /// Override the level, keeping everything else.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

/// Initialize logging with the given configuration.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::new(config.level.as_str());

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);

    let log_file = match &config.file_path {
        Some(path) => Some(Mutex::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        )),
        None => None,
    };

    match (config.format, log_file) {
        (LogFormat::Pretty, None) => {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .with_span_events(span_events);

            registry
                .with(layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
        (LogFormat::Pretty, Some(file)) => {
            let stderr_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .with_span_events(span_events.clone());

            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .with_span_events(span_events);

            registry
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
        (LogFormat::Compact, None) => {
            let layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_span_events(span_events);

            registry
                .with(layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
        (LogFormat::Compact, Some(file)) => {
            let stderr_layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_span_events(span_events.clone());

            let file_layer = fmt::layer()
                .compact()
                .with_writer(file)
                .with_ansi(false)
                .with_span_events(span_events);

            registry
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
        (LogFormat::Json, None) => {
            let layer = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_span_events(span_events);

            registry
                .with(layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
        (LogFormat::Json, Some(file)) => {
            let stderr_layer = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_span_events(span_events.clone());

            let file_layer = fmt::layer()
                .json()
                .with_writer(file)
                .with_span_events(span_events);

            registry
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
    }

    Ok(())
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    #[error("failed to open log file: {0}")]
    FileError(#[from] io::Error),
}

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 5] = [
        "TASKSMITH_LOG_LEVEL",
        "TASKSMITH_LOG_FORMAT",
        "TASKSMITH_LOG_FILE",
        "TASKSMITH_LOG_SOURCE",
        "RUST_LOG",
    ];

    fn with_clean_env(body: impl FnOnce()) {
        let saved: Vec<_> = VARS.iter().map(|v| (*v, env::var(v).ok())).collect();
        for var in VARS {
            env::remove_var(var);
        }

        body();

        for (var, value) in saved {
            match value {
                Some(v) => env::set_var(var, v),
                None => env::remove_var(var),
            }
        }
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("invalid"), None);
    }

    #[test]
    fn test_log_level_from_verbosity() {
        assert_eq!(LogLevel::from_verbosity(0, false), LogLevel::Warn);
        assert_eq!(LogLevel::from_verbosity(1, false), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(2, false), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(7, false), LogLevel::Trace);
        assert_eq!(LogLevel::from_verbosity(0, true), LogLevel::Error);
    }

    #[test]
    fn test_log_level_from() {
        use tracing_subscriber::filter::LevelFilter;
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::TRACE);
        assert_eq!(LevelFilter::from(LogLevel::Info), LevelFilter::INFO);
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::ERROR);
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file_path.is_none());
        assert!(!config.source_location);
        assert!(!config.span_events);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        with_clean_env(|| {
            env::set_var("TASKSMITH_LOG_LEVEL", "debug");
            env::set_var("TASKSMITH_LOG_FORMAT", "json");
            env::set_var("TASKSMITH_LOG_FILE", "/tmp/tasksmith.log");
            env::set_var("TASKSMITH_LOG_SOURCE", "1");

            let config = LogConfig::from_env();
            assert_eq!(config.level, LogLevel::Debug);
            assert_eq!(config.format, LogFormat::Json);
            assert_eq!(config.file_path, Some(PathBuf::from("/tmp/tasksmith.log")));
            assert!(config.source_location);
        });
    }

    #[test]
    #[serial]
    fn test_rust_log_fallback() {
        with_clean_env(|| {
            env::set_var("RUST_LOG", "error");
            assert_eq!(LogConfig::from_env().level, LogLevel::Error);
        });
    }

    #[test]
    fn test_with_level_keeps_format() {
        let config = LogConfig {
            format: LogFormat::Compact,
            ..LogConfig::default()
        }
        .with_level(LogLevel::Trace);
        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    fn test_init_fails_on_unwritable_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            file_path: Some(dir.path().join("missing").join("out.log")),
            ..LogConfig::default()
        };
        assert!(matches!(init(config), Err(LogError::FileError(_))));
    }
}
