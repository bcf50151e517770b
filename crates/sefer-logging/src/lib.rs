//! Structured JSONL logging with session context for Sefer
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines format for log aggregation (default)
//! - **Session Context**: Tag spans with the session id and the scope being browsed
//! - **File Rotation**: Daily/hourly log rotation via tracing-appender
//!
//! # Quick Start
//!
//! ```ignore
//! use sefer_logging::{LogConfig, SeferSubscriberBuilder};
//!
//! // JSONL to stderr at info
//! let _guard = SeferSubscriberBuilder::new().init();
//!
//! // Pretty human-readable output
//! let _guard = SeferSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init();
//! ```
//!
//! Console output goes to stderr so command output on stdout stays clean.

pub mod config;
pub mod context;
pub mod layers;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy, TargetFilters};
pub use context::{SessionContextData, SessionContextGuard};
pub use layers::{SessionContextLayer, SessionExtension, jsonl_layer};

use std::fs::{self, File};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the subscriber
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("log file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("a global subscriber is already installed: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Builder for configuring and initializing the Sefer logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::development()`
/// for human-readable pretty output during development.
#[derive(Debug, Clone, Default)]
pub struct SeferSubscriberBuilder {
    config: LogConfig,
}

impl SeferSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Initialize the subscriber globally, reporting failures on stderr
    ///
    /// The returned guard flushes file output on drop and must be kept alive
    /// for the duration of the program.
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: logging not initialized: {e}");
                None
            }
        }
    }

    /// Try to initialize the subscriber globally
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(self.config.directives())
                .map_err(|e| LoggingError::Filter(e.to_string()))?,
        };

        let registry = Registry::default()
            .with(env_filter)
            .with(SessionContextLayer::new());

        let console = &self.config.console;
        let jsonl = &self.config.jsonl;

        // Separate arms for pretty vs JSONL console to satisfy the type system
        match (console.enabled, console.pretty, self.config.file.as_ref()) {
            // Pretty console + file
            (true, true, Some(file_config)) => {
                let (writer, guard) = file_writer(file_config)?;
                let console_layer = tracing_subscriber::fmt::layer()
                    .with_ansi(console.ansi)
                    .with_target(true)
                    .with_writer(std::io::stderr);
                registry
                    .with(console_layer)
                    .with(jsonl_layer(writer, jsonl))
                    .try_init()?;
                Ok(Some(guard))
            }

            // JSONL console + file
            (true, false, Some(file_config)) => {
                let (writer, guard) = file_writer(file_config)?;
                registry
                    .with(jsonl_layer(std::io::stderr, jsonl))
                    .with(jsonl_layer(writer, jsonl))
                    .try_init()?;
                Ok(Some(guard))
            }

            // Pretty console only
            (true, true, None) => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .with_ansi(console.ansi)
                    .with_target(true)
                    .with_writer(std::io::stderr);
                registry.with(console_layer).try_init()?;
                Ok(None)
            }

            // JSONL console only (DEFAULT)
            (true, false, None) => {
                registry.with(jsonl_layer(std::io::stderr, jsonl)).try_init()?;
                Ok(None)
            }

            // File only
            (false, _, Some(file_config)) => {
                let (writer, guard) = file_writer(file_config)?;
                registry.with(jsonl_layer(writer, jsonl)).try_init()?;
                Ok(Some(guard))
            }

            // Nothing enabled
            (false, _, None) => {
                registry.try_init()?;
                Ok(None)
            }
        }
    }
}

/// Non-blocking writer for file output
///
/// `Never` truncates a single `<prefix>.log`; the rotating strategies append.
fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&config.directory)?;
    let rotation = match config.rotation {
        RotationStrategy::Never => {
            let file = File::create(config.directory.join(format!("{}.log", config.prefix)))?;
            return Ok(tracing_appender::non_blocking(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };
    let appender = RollingFileAppender::new(rotation, &config.directory, &config.prefix);
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging with default settings (JSONL to stderr)
pub fn init_default() -> Option<WorkerGuard> {
    SeferSubscriberBuilder::new().init()
}

/// Initialize logging for development (verbose, pretty console output)
pub fn init_development() -> Option<WorkerGuard> {
    SeferSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init()
}

/// Initialize logging for testing (minimal output); repeated calls are ignored
pub fn init_testing() {
    let _ = SeferSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_creation() {
        let builder = SeferSubscriberBuilder::new();
        assert_eq!(builder.config().default_level, "info");
        assert!(!builder.config().console.pretty); // JSONL by default
    }

    #[test]
    fn test_builder_with_config() {
        let builder = SeferSubscriberBuilder::new().with_config(LogConfig::development());
        assert_eq!(builder.config().default_level, "debug");
        assert!(builder.config().console.pretty);
    }

    #[test]
    fn test_builder_setters() {
        let builder = SeferSubscriberBuilder::new()
            .with_level("trace")
            .with_console(false)
            .with_file_output(FileConfig::default());
        assert_eq!(builder.config().default_level, "trace");
        assert!(!builder.config().console.enabled);
        assert!(builder.config().file.is_some());
    }

    #[test]
    fn test_never_rotation_truncates_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig {
            directory: dir.path().join("nested"),
            prefix: "run".to_string(),
            rotation: RotationStrategy::Never,
        };
        let path = config.directory.join("run.log");

        fs::create_dir_all(&config.directory).unwrap();
        fs::write(&path, "stale").unwrap();

        let (_writer, guard) = file_writer(&config).unwrap();
        drop(guard);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_second_init_reports_error() {
        init_testing();
        let err = SeferSubscriberBuilder::new()
            .with_config(LogConfig::testing())
            .try_init()
            .unwrap_err();
        assert!(matches!(err, LoggingError::AlreadyInitialized(_)));
    }
}
