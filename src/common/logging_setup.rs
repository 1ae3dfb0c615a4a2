use crate::errors::{HelperError, Result};
use crate::logger::Logger;
use env_logger::Builder;
use log::LevelFilter;
use std::sync::Arc;

// Unknown names fall back to info.
pub fn parse_level_filter(log_level_str: &str) -> LevelFilter {
    match log_level_str.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" | "critical" | "fatal" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        s => {
            log::warn!("Unrecognized log level '{}', defaulting to info.", s);
            LevelFilter::Info
        }
    }
}

/// Installs `env_logger` as the process-wide `log` backend.
///
/// `RUST_LOG` still refines the filter. A second call is harmless and only
/// reports on stderr that a logger was already set.
pub fn initialize_logging(log_level: Option<&str>) {
    let mut builder = Builder::new();
    builder.filter_level(parse_level_filter(log_level.unwrap_or("info")));
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.try_init().unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {}. Logging might not work as expected.", e);
    });
}

/// Routes every `log` macro call in the process into a named [`Logger`].
///
/// Fails if another `log` backend (for example [`initialize_logging`]) is
/// already installed. Later `set_level` calls on the logger keep
/// `log::max_level` in step.
pub fn install_global(logger: Arc<Logger>) -> Result<()> {
    log::set_boxed_logger(Box::new(GlobalLogger(logger.clone())))
        .map_err(|e| HelperError::Config(format!("Failed to install global logger: {}", e)))?;
    logger.mark_global();
    Ok(())
}

struct GlobalLogger(Arc<Logger>);

impl log::Log for GlobalLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        log::Log::enabled(&*self.0, metadata)
    }

    fn log(&self, record: &log::Record) {
        log::Log::log(&*self.0, record)
    }

    fn flush(&self) {
        log::Log::flush(&*self.0)
    }
}
