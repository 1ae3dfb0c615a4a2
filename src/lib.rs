//! # runlog
//!
//! Small helpers for scripts and tools that want readable logs without much
//! setup:
//!
//! - [`logger`] - named loggers writing to the console and/or a file, handed
//!   out by an explicit [`LoggerRegistry`]
//! - [`capture`] - scopes that tee everything written to stdout into a log
//!   file or a logger (Unix only)
//! - [`common`] - directory, file name and timestamp helpers
//! - [`config_loader`] - YAML description of loggers and capture defaults
//!
//! ```rust,no_run
//! use runlog::{CaptureConfig, LoggerConfig, LoggerRegistry, LogLevel};
//!
//! # fn main() -> runlog::Result<()> {
//! let registry = LoggerRegistry::new();
//! let logger = registry.setup_logger(
//!     &LoggerConfig::new("train")
//!         .with_log_file("train.log")
//!         .with_level(LogLevel::Info),
//! )?;
//! logger.info("starting");
//!
//! runlog::with_capture(&CaptureConfig::titled("epoch 1"), || {
//!     println!("this line also lands in logs/<timestamp>_epoch_1.log");
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod app_config;
#[cfg(unix)]
pub mod capture;
pub mod common;
pub mod config_loader;
pub mod errors;
pub mod logger;

pub use app_config::{CaptureConfig, LoggerConfig, LoggingConfig};
#[cfg(unix)]
pub use capture::{with_capture, with_capture_to_logger, CaptureSession};
pub use common::file_utils::{
    clean_title, ensure_directory_exists, generate_timestamped_filename, safe_filename,
    timestamped_log_name,
};
pub use common::logging_setup::{initialize_logging, install_global};
pub use config_loader::load_config;
pub use errors::{HelperError, Result};
pub use logger::{LogLevel, Logger, LoggerRegistry};
