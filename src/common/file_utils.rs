use crate::common::timestamp_utils;
use crate::errors::{HelperError, Result};
use log::debug;
use std::path::{Path, PathBuf};

/// Builds `base_<timestamp>[.ext]`. A leading dot on `extension` is tolerated.
pub fn generate_timestamped_filename(
    base_name: &str,
    timestamp_format: &str,
    extension: Option<&str>,
) -> Result<String> {
    let timestamp = timestamp_utils::format_local_timestamp(timestamp_format)?;
    Ok(match extension.map(|e| e.trim_start_matches('.')) {
        Some(ext) if !ext.is_empty() => format!("{}_{}.{}", base_name, timestamp, ext),
        _ => format!("{}_{}", base_name, timestamp),
    })
}

/// Inserts `_<timestamp>` between a file's stem and its extension.
///
/// `run.log` becomes `run_2024-01-31_12-00-00.log`; any leading directories
/// of `file` are kept.
pub fn timestamped_log_name(file: &Path, timestamp_format: &str) -> Result<PathBuf> {
    let timestamp = timestamp_utils::format_local_timestamp(timestamp_format)?;
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match file.extension() {
        Some(ext) => format!("{}_{}.{}", stem, timestamp, ext.to_string_lossy()),
        None => format!("{}_{}", stem, timestamp),
    };
    Ok(file.with_file_name(name))
}

pub fn ensure_directory_exists(dir_path: impl AsRef<Path>) -> Result<PathBuf> {
    let dir_path = dir_path.as_ref().to_path_buf();
    if !dir_path.exists() {
        debug!("Directory '{}' does not exist, attempting to create it.", dir_path.display());
        std::fs::create_dir_all(&dir_path).map_err(|source| HelperError::DirectoryCreate {
            path: dir_path.clone(),
            source,
        })?;
    } else if !dir_path.is_dir() {
        return Err(HelperError::NotADirectory(dir_path));
    }
    Ok(dir_path)
}

/// Makes an arbitrary string usable as a file name.
pub fn safe_filename(filename: &str) -> String {
    let mut out = String::with_capacity(filename.len());
    let mut in_gap = false;
    for c in filename.chars() {
        if matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|') {
            continue;
        }
        if c.is_whitespace() || c == '_' {
            if !in_gap {
                out.push('_');
            }
            in_gap = true;
        } else {
            out.push(c);
            in_gap = false;
        }
    }
    out.trim_matches(|c| c == '_' || c == '.').to_string()
}

// Capture log names: every non-alphanumeric becomes '_', trailing '_' dropped.
pub fn clean_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    cleaned.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::timestamp_utils::DEFAULT_FILENAME_TIMESTAMP_FORMAT;

    #[test]
    fn timestamped_filename_handles_extension_forms() {
        let fmt = "%Y";
        let year = timestamp_utils::current_local_timestamp_str(fmt);
        assert_eq!(
            generate_timestamped_filename("run", fmt, Some("log")).unwrap(),
            format!("run_{}.log", year)
        );
        assert_eq!(
            generate_timestamped_filename("run", fmt, Some(".csv")).unwrap(),
            format!("run_{}.csv", year)
        );
        assert_eq!(
            generate_timestamped_filename("run", fmt, None).unwrap(),
            format!("run_{}", year)
        );
    }

    #[test]
    fn timestamped_log_name_keeps_extension_and_parent() {
        let name = timestamped_log_name(Path::new("sub/train.log"), DEFAULT_FILENAME_TIMESTAMP_FORMAT).unwrap();
        let file = name.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name.parent(), Some(Path::new("sub")));
        assert!(file.starts_with("train_"));
        assert!(file.ends_with(".log"));

        let bare = timestamped_log_name(Path::new("train"), "%Y").unwrap();
        assert!(bare.extension().is_none());
    }

    #[test]
    fn safe_filename_strips_and_collapses() {
        assert_eq!(safe_filename("my: report?  v2"), "my_report_v2");
        assert_eq!(safe_filename("__a__b__"), "a_b");
        assert_eq!(safe_filename(".hidden file."), "hidden_file");
        assert_eq!(safe_filename("a/b\\c|d"), "abcd");
    }

    #[test]
    fn clean_title_matches_capture_naming() {
        assert_eq!(clean_title("Epoch 1: warmup!"), "Epoch_1__warmup");
        assert_eq!(clean_title("plain"), "plain");
        assert_eq!(clean_title("!!"), "");
    }

    #[test]
    fn ensure_directory_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        let created = ensure_directory_exists(&nested).unwrap();
        assert!(created.is_dir());
        // second call is a no-op
        ensure_directory_exists(&nested).unwrap();
    }

    #[test]
    fn ensure_directory_rejects_files() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not_a_dir");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            ensure_directory_exists(&file),
            Err(HelperError::NotADirectory(_))
        ));
    }
}
