//! Structured JSONL logging with picker-session context for the NFT picker
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines format for log aggregation (default)
//! - **Picker Attribution**: `picker_id`, `source` and `instance_id` span fields via [`PickerContext`]
//! - **Cycle Correlation**: Follow one fetch cycle across its batches via [`CycleContext`]
//! - **File Rotation**: Daily/hourly log rotation via tracing-appender
//!
//! # Quick Start
//!
//! ```ignore
//! use nft_picker_logging::{LogConfig, PickerSubscriberBuilder};
//!
//! // Simple setup with defaults (JSONL to console)
//! let _guard = PickerSubscriberBuilder::new().init()?;
//!
//! // Development mode with pretty human-readable output
//! let _guard = PickerSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init()?;
//! ```

pub mod config;
pub mod context;
pub mod correlation;
pub mod layers;

pub use config::{ConsoleOutput, FileConfig, JsonlConfig, LogConfig, RotationStrategy};
pub use context::{PickerContext, SourceKind};
pub use correlation::CycleContext;

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Registry, layer::Layered, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::layers::{BoxedLayer, jsonl_layer, pretty_console_layer};

/// Subscriber stack the output layers are attached to
type BaseSubscriber = Layered<EnvFilter, Registry>;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to prepare log output: {0}")]
    Io(#[from] std::io::Error),

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Keeps non-blocking file writers alive
///
/// Dropping the guard flushes buffered log lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
}

/// Builder for configuring and initializing the picker logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::development()`
/// for human-readable pretty output during development.
pub struct PickerSubscriberBuilder {
    config: LogConfig,
}

impl PickerSubscriberBuilder {
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

    /// Set the console output format
    pub fn with_console(mut self, console: ConsoleOutput) -> Self {
        self.config.console = console;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// The configuration the subscriber will be built from
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Install the subscriber globally
    ///
    /// `RUST_LOG`, when set, takes precedence over the configured levels.
    pub fn init(self) -> Result<LogGuard, LoggingError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.filter_directives()));

        let mut guards = Vec::new();
        let mut outputs: Vec<BoxedLayer<BaseSubscriber>> = Vec::new();

        match self.config.console {
            ConsoleOutput::Off => {}
            ConsoleOutput::Jsonl => outputs.push(jsonl_layer(std::io::stdout, &self.config.jsonl)),
            ConsoleOutput::Pretty { ansi } => outputs.push(pretty_console_layer(ansi)),
        }

        if let Some(file_config) = &self.config.file {
            let (writer, guard) = file_writer(file_config)?;
            guards.push(guard);
            outputs.push(jsonl_layer(writer, &self.config.jsonl));
        }

        Registry::default()
            .with(env_filter)
            .with(outputs)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

        Ok(LogGuard { _guards: guards })
    }
}

impl Default for PickerSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking writer for the configured file output
///
/// `Never` truncates a single file; the rotating strategies append.
fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&config.directory)?;

    let pair = match config.rotation {
        RotationStrategy::Never => {
            let path = config.directory.join(format!("{}.log", config.prefix));
            tracing_appender::non_blocking(File::create(path)?)
        }
        RotationStrategy::Daily => tracing_appender::non_blocking(RollingFileAppender::new(
            Rotation::DAILY,
            &config.directory,
            &config.prefix,
        )),
        RotationStrategy::Hourly => tracing_appender::non_blocking(RollingFileAppender::new(
            Rotation::HOURLY,
            &config.directory,
            &config.prefix,
        )),
    };

    Ok(pair)
}

/// Initialize logging for development (verbose, pretty console output)
pub fn init_development() -> Result<LogGuard, LoggingError> {
    PickerSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init()
}

/// Initialize logging for testing (minimal output)
///
/// Safe to call from several tests; only the first call installs anything.
pub fn init_testing() {
    let _ = PickerSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .init();
}
