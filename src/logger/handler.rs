//! Output handlers attached to a named logger

use crate::errors::{HelperError, Result};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One destination for formatted log lines.
///
/// Implementations:
/// - `ConsoleHandler`: stderr, or any injected writer
/// - `FileHandler`: appends to a plain-text file
pub trait Handler: Send {
    /// Write one already-formatted line. The handler adds the newline.
    fn emit(&mut self, line: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Short label used when a write fails.
    fn describe(&self) -> String;

    /// Whether lines land on the terminal rather than in a record kept on disk.
    fn is_console(&self) -> bool {
        false
    }
}

/// Builds the writer for each new console handler.
pub type ConsoleWriterFactory = Arc<dyn Fn() -> Box<dyn Write + Send> + Send + Sync>;

pub(crate) fn stderr_factory() -> ConsoleWriterFactory {
    Arc::new(|| Box::new(io::stderr()) as Box<dyn Write + Send>)
}

/// Console output. Writes to stderr unless built with another writer.
pub struct ConsoleHandler {
    writer: Box<dyn Write + Send>,
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleHandler {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stderr()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }
}

impl fmt::Debug for ConsoleHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleHandler").finish_non_exhaustive()
    }
}

impl Handler for ConsoleHandler {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn describe(&self) -> String {
        "console".to_string()
    }

    fn is_console(&self) -> bool {
        true
    }
}

/// Appends lines to a file, flushing after every record.
#[derive(Debug)]
pub struct FileHandler {
    path: PathBuf,
    file: File,
}

impl FileHandler {
    /// Opens `path` for appending. The parent directory must already exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| HelperError::LogFileOpen {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Handler for FileHandler {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.file, "{}", line)?;
        self.file.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn describe(&self) -> String {
        format!("file '{}'", self.path.display())
    }
}
