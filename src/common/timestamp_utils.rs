use crate::errors::{HelperError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

/// Format used for log file names and capture banners.
pub const DEFAULT_FILENAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Format used for `{asctime}` in log records.
pub const DEFAULT_ASCTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

// Get current local timestamp as a formatted string.
// Only call this with formats known to be valid; chrono panics on bad specifiers.
pub fn current_local_timestamp_str(format_str: &str) -> String {
    let now: DateTime<Local> = Local::now();
    now.format(format_str).to_string()
}

/// Checks a strftime format string without rendering it.
pub fn validate_timestamp_format(format_str: &str) -> Result<()> {
    if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
        return Err(HelperError::InvalidTimestampFormat(format_str.to_string()));
    }
    Ok(())
}

/// Like [`current_local_timestamp_str`], but rejects invalid formats instead of panicking.
pub fn format_local_timestamp(format_str: &str) -> Result<String> {
    validate_timestamp_format(format_str)?;
    Ok(current_local_timestamp_str(format_str))
}
