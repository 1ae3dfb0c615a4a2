use crate::app_config::LoggingConfig;
use crate::common::timestamp_utils;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Instant;

pub fn load_config(path: impl AsRef<Path>) -> Result<LoggingConfig> {
    let path = path.as_ref();
    debug!("Attempting to load logging config from: {}", path.display());
    let start_time = Instant::now();

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file '{}'", path.display()))?;

    let config = parse_config(&config_str)
        .with_context(|| format!("Invalid configuration in '{}'", path.display()))?;

    info!(
        "Loaded logging config from '{}' ({} logger(s)) in {:?}",
        path.display(),
        config.loggers.len(),
        start_time.elapsed()
    );
    Ok(config)
}

/// Parse and validate a YAML document.
pub fn parse_config(yaml: &str) -> Result<LoggingConfig> {
    let config: LoggingConfig =
        serde_yaml::from_str(yaml).context("Failed to parse YAML logging configuration")?;
    validate_config(&config).context("Logging configuration validation failed")?;
    Ok(config)
}

fn validate_config(config: &LoggingConfig) -> Result<()> {
    let mut names = HashSet::new();
    for (idx, logger) in config.loggers.iter().enumerate() {
        if logger.name.trim().is_empty() {
            bail!("Logger name cannot be empty for logger #{}.", idx + 1);
        }
        if !names.insert(logger.name.as_str()) {
            bail!("Duplicate logger name found: {}", logger.name);
        }
        if let Some(file) = &logger.log_file {
            if file.as_os_str().is_empty() {
                bail!("log_file for logger '{}' cannot be empty.", logger.name);
            }
        }
        if logger.log_dir.as_os_str().is_empty() {
            bail!("log_dir for logger '{}' cannot be empty.", logger.name);
        }
    }

    if config.capture.logs_dir.as_os_str().is_empty() {
        bail!("capture.logs_dir cannot be empty.");
    }
    timestamp_utils::validate_timestamp_format(&config.capture.timestamp_format)
        .context("capture.timestamp_format is not a valid strftime format")?;
    debug!("Logging configuration validated ({} logger(s)).", config.loggers.len());
    Ok(())
}
