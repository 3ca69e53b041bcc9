//! # Logging Utilities
//!
//! Logging infrastructure for Vantage using `tracing`.
//!
//! Verbosity is explicit configuration: the CLI translates its `-v`/`-q`/`-d`
//! flags into a [`LogLevel`] and hands it to one of the init functions here.
//! Nothing in the workspace consults a global verbosity flag.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vantage_utils::init_logging;
//!
//! init_logging().expect("Failed to initialize logging");
//! tracing::info!("launcher started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: level filter (e.g. `debug`, `vantage_core=trace`)
//! - `VANTAGE_LOG_FORMAT`: output format (`json` or `pretty`, default: `pretty`)

use std::path::PathBuf;
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default for development)
    Pretty,
    /// JSON format (default for production)
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Initialize logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: level filter
/// - `VANTAGE_LOG_FORMAT`: output format (`json` or `pretty`, default: `pretty`)
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = env::var("VANTAGE_LOG_FORMAT")
        .ok()
        .and_then(|s| LogFormat::from_str(&s).ok())
        .unwrap_or(LogFormat::Pretty);

    let default_level = env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse::<LogLevel>()
        .map(Into::into)
        .unwrap_or(Level::INFO);

    init_logging_internal(format, default_level)
}

/// Initialize logging with explicit level and format
///
/// This is the path the CLI takes: `-q`/`-v`/`-d` become a [`LogLevel`]
/// carried through the option bag rather than a process-wide flag.
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    init_logging_internal(format, level.into())
}

/// Initialize logging for TUI mode (file-only, no stdout)
///
/// Writes only to a file so log lines never corrupt the alternate-screen
/// display. The file lands at `~/.vantage/YYYY-MM-DD-vantage.log`, or under
/// `/tmp` when the home directory is not accessible.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file creation fails.
pub fn init_logging_for_tui(level: Option<LogLevel>) -> Result<PathBuf, LoggingError>
{
    let today = Utc::now().format("%Y-%m-%d");
    let log_file = if let Ok(home) = env::var("HOME") {
        let vantage_dir = PathBuf::from(home).join(".vantage");
        std::fs::create_dir_all(&vantage_dir).map_err(LoggingError::FileError)?;
        vantage_dir.join(format!("{today}-vantage.log"))
    } else {
        PathBuf::from("/tmp").join(format!("{today}-vantage.log"))
    };

    init_logging_file_only(log_file.clone(), level.map(Into::into))?;
    Ok(log_file)
}

/// Build the environment filter used by the file-only path.
///
/// An explicit level (from the CLI) takes precedence over `RUST_LOG`, which
/// in turn beats the built-in default.
fn build_env_filter(explicit_level: Option<Level>, default_level: Level) -> EnvFilter
{
    if let Some(level) = explicit_level {
        EnvFilter::new(level.to_string())
    } else if let Ok(rust_log) = env::var("RUST_LOG") {
        EnvFilter::try_new(&rust_log).unwrap_or_else(|_| EnvFilter::new(default_level.to_string()))
    } else {
        EnvFilter::new(default_level.to_string())
    }
}

#[allow(clippy::unnecessary_wraps)]
fn init_logging_internal(format: LogFormat, default_level: Level) -> Result<(), LoggingError>
{
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    match format {
        LogFormat::Pretty => {
            let console_layer = fmt::layer()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(true)
                .with_writer(io::stderr)
                .with_filter(env_filter);
            Registry::default().with(console_layer).init();
        }
        LogFormat::Json => {
            let console_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_writer(io::stderr)
                .with_filter(env_filter);
            Registry::default().with(console_layer).init();
        }
    }

    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn init_logging_file_only(log_file: PathBuf, explicit_level: Option<Level>) -> Result<(), LoggingError>
{
    let env_filter = build_env_filter(explicit_level, Level::INFO);

    // The date is already in the filename, so never rotate.
    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(&PathBuf::from(".")),
        log_file.file_name().unwrap_or_default(),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the flush guard alive for the lifetime of the process.
    std::mem::forget(guard);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false)
        .with_filter(env_filter);

    Registry::default().with(file_layer).init();

    Ok(())
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
