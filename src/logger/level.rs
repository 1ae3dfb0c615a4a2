//! Severity levels for named loggers

use crate::errors::HelperError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message severity, ordered from least to most severe.
///
/// The numeric values follow the usual 10/20/30/40/50 ladder so levels can be
/// compared directly and shown in configs as numbers if needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Debug = 10,
    #[default]
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Closest `log` crate filter. `log` has no critical level, so
    /// `Critical` and `Error` both map to `Error`.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => log::LevelFilter::Error,
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => LogLevel::Debug,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Error => LogLevel::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" | "10" => Ok(LogLevel::Debug),
            "info" | "20" => Ok(LogLevel::Info),
            "warning" | "warn" | "30" => Ok(LogLevel::Warning),
            "error" | "40" => Ok(LogLevel::Error),
            "critical" | "fatal" | "50" => Ok(LogLevel::Critical),
            _ => Err(HelperError::InvalidLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = HelperError;

    fn try_from(value: String) -> Result<Self, HelperError> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}
