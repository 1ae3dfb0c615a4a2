use crate::common::timestamp_utils::DEFAULT_FILENAME_TIMESTAMP_FORMAT;
use crate::logger::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_true() -> bool {
    true
}

fn default_timestamp_format() -> String {
    DEFAULT_FILENAME_TIMESTAMP_FORMAT.to_string()
}

/// How one named logger should be built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub name: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>, // relative to log_dir; None means console only
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub log_format: Option<String>, // "{asctime} - {name} - {levelname} - {message}" when unset
    #[serde(default)]
    pub timestamp: bool, // append _<timestamp> to the log file stem
    #[serde(default = "default_true")]
    pub console: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            name: String::new(),
            log_file: None,
            log_level: LogLevel::Info,
            log_dir: default_log_dir(),
            log_format: None,
            timestamp: false,
            console: true,
        }
    }
}

impl LoggerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_log_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = Some(log_file.into());
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    pub fn with_format(mut self, template: impl Into<String>) -> Self {
        self.log_format = Some(template.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn without_console(mut self) -> Self {
        self.console = false;
        self
    }
}

/// Settings for a print capture scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub title: Option<String>,
    pub description: Option<String>, // extra banner line under the title
    pub logs_dir: PathBuf,
    pub to_file: bool,
    pub echo: bool, // keep writing to the terminal while capturing
    pub banner: bool,
    pub timestamp_format: String, // strftime, used for the file name and banners
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            title: None,
            description: None,
            logs_dir: default_log_dir(),
            to_file: true,
            echo: true,
            banner: true,
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl CaptureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_logs_dir(mut self, logs_dir: impl Into<PathBuf>) -> Self {
        self.logs_dir = logs_dir.into();
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_banner(mut self, banner: bool) -> Self {
        self.banner = banner;
        self
    }

    pub fn without_file(mut self) -> Self {
        self.to_file = false;
        self
    }
}

/// Top-level YAML document: loggers to build plus capture defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub loggers: Vec<LoggerConfig>,
    #[serde(default)]
    pub capture: CaptureConfig,
}
