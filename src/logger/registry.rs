//! Registry of named loggers
//!
//! The registry is an ordinary value: create one at startup and pass it to
//! whatever needs loggers. Tests build their own, usually with an in-memory
//! console writer.

use super::format::RecordFormatter;
use super::handler::{stderr_factory, ConsoleHandler, ConsoleWriterFactory, FileHandler, Handler};
use super::level::LogLevel;
use super::named_logger::Logger;
use crate::app_config::{LoggerConfig, LoggingConfig};
use crate::common::file_utils;
use crate::common::timestamp_utils::DEFAULT_FILENAME_TIMESTAMP_FORMAT;
use crate::errors::Result;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct LoggerRegistry {
    loggers: Mutex<HashMap<String, Arc<Logger>>>,
    console: ConsoleWriterFactory,
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("loggers", &self.names())
            .finish_non_exhaustive()
    }
}

impl LoggerRegistry {
    /// Registry whose console handlers write to stderr.
    pub fn new() -> Self {
        Self {
            loggers: Mutex::new(HashMap::new()),
            console: stderr_factory(),
        }
    }

    /// Registry whose console handlers write wherever `factory` says.
    pub fn with_console_writer<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn Write + Send> + Send + Sync + 'static,
    {
        Self {
            loggers: Mutex::new(HashMap::new()),
            console: Arc::new(factory),
        }
    }

    fn loggers(&self) -> MutexGuard<'_, HashMap<String, Arc<Logger>>> {
        self.loggers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Configure the logger called `config.name` and return it.
    ///
    /// Asking again for a name that already exists reuses the same logger
    /// and replaces its handlers, so output is never duplicated. If the log
    /// directory or file cannot be prepared, the error is returned and any
    /// existing logger of that name keeps its previous setup.
    pub fn setup_logger(&self, config: &LoggerConfig) -> Result<Arc<Logger>> {
        let formatter = match &config.log_format {
            Some(template) => RecordFormatter::new(template),
            None => RecordFormatter::default(),
        };

        let mut handlers: Vec<Box<dyn Handler>> = Vec::new();
        if config.console {
            handlers.push(Box::new(ConsoleHandler::with_writer((self.console)())));
        }

        let file_path = match &config.log_file {
            Some(log_file) => {
                let path = self.resolve_log_path(config, log_file)?;
                handlers.push(Box::new(FileHandler::open(&path)?));
                Some(path)
            }
            None => None,
        };

        let logger = self
            .loggers()
            .entry(config.name.clone())
            .or_insert_with(|| Arc::new(Logger::new(config.name.clone(), config.log_level)))
            .clone();
        logger.reconfigure(config.log_level, formatter, handlers);
        debug!(
            "Configured logger '{}' at {} with {} handler(s)",
            config.name,
            config.log_level,
            logger.handler_count()
        );

        if let Some(path) = file_path {
            logger.info(&format!("Logging to file: {}", path.display()));
        }
        Ok(logger)
    }

    fn resolve_log_path(&self, config: &LoggerConfig, log_file: &Path) -> Result<PathBuf> {
        let log_dir = file_utils::ensure_directory_exists(&config.log_dir)?;
        let file_name = if config.timestamp {
            file_utils::timestamped_log_name(log_file, DEFAULT_FILENAME_TIMESTAMP_FORMAT)?
        } else {
            log_file.to_path_buf()
        };
        let path = log_dir.join(file_name);
        // log_file may itself carry subdirectories
        if let Some(parent) = path.parent() {
            file_utils::ensure_directory_exists(parent)?;
        }
        Ok(path)
    }

    /// Return the logger called `name`, creating a console-only INFO logger
    /// if none exists yet. A registered logger left without any handler gets
    /// the same console-at-INFO setup instead of staying silent.
    pub fn get_logger(&self, name: &str) -> Arc<Logger> {
        let mut loggers = self.loggers();
        if let Some(existing) = loggers.get(name) {
            if existing.handler_count() == 0 {
                existing.add_handler(Box::new(ConsoleHandler::with_writer((self.console)())));
                existing.set_level(LogLevel::Info);
            }
            return existing.clone();
        }
        let logger = Arc::new(Logger::new(name, LogLevel::Info));
        logger.add_handler(Box::new(ConsoleHandler::with_writer((self.console)())));
        loggers.insert(name.to_string(), logger.clone());
        logger
    }

    /// Set up every logger listed in a loaded config, in order.
    pub fn setup_from_config(&self, config: &LoggingConfig) -> Result<Vec<Arc<Logger>>> {
        config.loggers.iter().map(|c| self.setup_logger(c)).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers().contains_key(name)
    }

    /// Forget a logger. Clones already handed out keep working.
    pub fn remove(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers().remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.loggers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers().is_empty()
    }

    /// Flush every handler of every registered logger.
    pub fn flush_all(&self) {
        for logger in self.loggers().values() {
            logger.flush();
        }
    }
}
