use super::redirect::{self, StdoutRedirect};
use crate::app_config::CaptureConfig;
use crate::common::{file_utils, timestamp_utils};
use crate::errors::{HelperError, Result};
use crate::logger::Logger;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

static ACTIVE: AtomicBool = AtomicBool::new(false);

// Held for as long as a session owns stdout.
struct ActiveFlag;

impl ActiveFlag {
    fn acquire() -> Result<Self> {
        ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ActiveFlag)
            .map_err(|_| HelperError::CaptureActive)
    }
}

impl Drop for ActiveFlag {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::Release);
    }
}

/// A live print capture scope.
///
/// While the session exists, everything the process writes to fd 1 goes
/// through a pipe into the configured sinks: the log file, a [`Logger`]
/// (one INFO record per line, written to its file handlers whatever the
/// logger's level), and optionally the original terminal. The logger's console
/// handlers are skipped: the echo already shows the text, and a console on
/// stdout would write it back into the pipe.
/// Dropping the session restores stdout; [`CaptureSession::finish`] does the
/// same but reports sink errors.
///
/// Only one session may be active per process.
pub struct CaptureSession {
    log_path: Option<PathBuf>,
    banner: bool,
    timestamp_format: String,
    redirect: Option<StdoutRedirect>,
    pump: Option<JoinHandle<io::Result<()>>>,
    finished: bool,
    active: Option<ActiveFlag>,
}

impl CaptureSession {
    /// Start capturing into a timestamped file under `config.logs_dir`.
    pub fn start(config: &CaptureConfig) -> Result<Self> {
        Self::begin(config, None)
    }

    /// Start capturing, forwarding every captured line to `logger` as well.
    pub fn start_with_logger(config: &CaptureConfig, logger: Arc<Logger>) -> Result<Self> {
        Self::begin(config, Some(logger))
    }

    /// Whether any session currently owns stdout in this process.
    pub fn is_active() -> bool {
        ACTIVE.load(Ordering::Acquire)
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    fn begin(config: &CaptureConfig, logger: Option<Arc<Logger>>) -> Result<Self> {
        let logger_records = logger.as_ref().is_some_and(|l| l.has_record_handler());
        if !config.to_file && !logger_records {
            return Err(HelperError::Capture(
                "no sink configured: enable to_file or attach a logger with a file handler"
                    .to_string(),
            ));
        }
        let started_at = timestamp_utils::format_local_timestamp(&config.timestamp_format)?;
        let active = ActiveFlag::acquire()?;

        let (file, log_path) = if config.to_file {
            let (file, path) = open_capture_file(config, &started_at)?;
            write_stdout(&format!("Logging to: {}\n", path.display()))?;
            (Some(file), Some(path))
        } else {
            (None, None)
        };

        let (reader, writer) = redirect::pipe()?;
        let redirect = StdoutRedirect::to(&writer)?;
        // fd 1 now holds the only write end; the pump sees EOF once it is restored.
        drop(writer);

        let echo = if config.echo {
            Some(redirect.terminal()?)
        } else {
            None
        };
        let pump = Pump {
            file,
            echo,
            logger,
            pending: Vec::new(),
        };
        let handle = thread::Builder::new()
            .name("runlog-capture".to_string())
            .spawn(move || pump.run(reader))?;

        let session = CaptureSession {
            log_path,
            banner: config.banner,
            timestamp_format: config.timestamp_format.clone(),
            redirect: Some(redirect),
            pump: Some(handle),
            finished: false,
            active: Some(active),
        };
        debug!("Print capture started (log file: {:?})", session.log_path);

        if config.banner {
            let mut header = format!("=== Log started at {} ===\n", started_at);
            if let Some(title) = &config.title {
                header.push_str(&format!("=== {} ===\n", title));
            }
            if let Some(description) = &config.description {
                header.push_str(description);
                header.push('\n');
            }
            header.push('\n');
            write_stdout(&header)?;
        }
        Ok(session)
    }

    /// End the scope: write the closing banner, restore stdout, wait for the
    /// sinks to drain. Returns the log file path, if any.
    pub fn finish(mut self) -> Result<Option<PathBuf>> {
        self.release()
    }

    fn release(&mut self) -> Result<Option<PathBuf>> {
        if self.finished {
            return Ok(self.log_path.clone());
        }
        self.finished = true;
        let mut first_error: Option<HelperError> = None;

        if self.banner {
            let ended_at = timestamp_utils::current_local_timestamp_str(&self.timestamp_format);
            if let Err(e) = write_stdout(&format!("\n=== Log ended at {} ===\n", ended_at)) {
                first_error.get_or_insert(e.into());
            }
        }

        let restored = match self.redirect.take() {
            Some(mut redirect) => match redirect.restore() {
                Ok(()) => true,
                Err(e) => {
                    first_error.get_or_insert(HelperError::Capture(format!(
                        "failed to restore stdout: {}",
                        e
                    )));
                    false
                }
            },
            None => true,
        };

        // Without a restored stdout the pipe never closes, so joining would hang.
        if let Some(pump) = self.pump.take() {
            if restored {
                match pump.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        first_error.get_or_insert(HelperError::Io(format!(
                            "capture sink write failed: {}",
                            e
                        )));
                    }
                    Err(_) => {
                        first_error
                            .get_or_insert(HelperError::Capture("capture thread panicked".to_string()));
                    }
                }
            }
        }
        settle_active(self.active.take(), restored);

        if let Some(path) = &self.log_path {
            let _ = write_stdout(&format!("Logging completed. Log saved to {}\n", path.display()));
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(self.log_path.clone()),
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Print capture did not close cleanly: {}", e);
        }
    }
}

/// Run `f` inside a capture scope. Stdout is restored even if `f` panics.
pub fn with_capture<T>(config: &CaptureConfig, f: impl FnOnce() -> T) -> Result<T> {
    let session = CaptureSession::start(config)?;
    let value = f();
    session.finish()?;
    Ok(value)
}

/// Like [`with_capture`], also forwarding captured lines to `logger`.
pub fn with_capture_to_logger<T>(
    config: &CaptureConfig,
    logger: Arc<Logger>,
    f: impl FnOnce() -> T,
) -> Result<T> {
    let session = CaptureSession::start_with_logger(config, logger)?;
    let value = f();
    session.finish()?;
    Ok(value)
}

// Stdout still pointing into the pipe keeps the scope marked active for good,
// so no later scope stacks on top of it.
fn settle_active(flag: Option<ActiveFlag>, restored: bool) {
    match flag {
        Some(flag) if !restored => std::mem::forget(flag),
        _ => {}
    }
}

fn capture_file_name(title: Option<&str>, timestamp: &str) -> String {
    match title.map(file_utils::clean_title) {
        Some(clean) if !clean.is_empty() => format!("{}_{}.log", timestamp, clean),
        _ => format!("{}.log", timestamp),
    }
}

fn open_capture_file(config: &CaptureConfig, timestamp: &str) -> Result<(File, PathBuf)> {
    let dir = file_utils::ensure_directory_exists(&config.logs_dir)?;
    let path = dir.join(capture_file_name(config.title.as_deref(), timestamp));
    let file = File::create(&path).map_err(|source| HelperError::LogFileOpen {
        path: path.clone(),
        source,
    })?;
    Ok((file, path))
}

fn write_stdout(text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// Drains the redirect pipe into the sinks until every write end is closed.
struct Pump {
    file: Option<File>,
    echo: Option<File>,
    logger: Option<Arc<Logger>>,
    pending: Vec<u8>,
}

impl Pump {
    fn run(mut self, mut reader: File) -> io::Result<()> {
        let mut buf = [0u8; 8192];
        let mut first_error: Option<io::Error> = None;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let chunk = &buf[..n];

            // Keep draining after a sink fails, or writers to stdout would block.
            if let Some(echo) = self.echo.as_mut() {
                if echo.write_all(chunk).is_err() {
                    self.echo = None;
                }
            }
            if let Some(file) = self.file.as_mut() {
                if let Err(e) = file.write_all(chunk).and_then(|_| file.flush()) {
                    first_error.get_or_insert(e);
                    self.file = None;
                }
            }
            self.forward_lines(chunk);
        }
        self.forward_rest();
        if let Some(logger) = &self.logger {
            logger.flush();
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn forward_lines(&mut self, chunk: &[u8]) {
        let Some(logger) = &self.logger else {
            return;
        };
        self.pending.extend_from_slice(chunk);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]);
            logger.record_captured(text.trim_end_matches('\r'));
        }
    }

    fn forward_rest(&mut self) {
        if let Some(logger) = &self.logger {
            if !self.pending.is_empty() {
                let text = String::from_utf8_lossy(&self.pending);
                logger.record_captured(text.trim_end_matches('\r'));
                self.pending.clear();
            }
        }
    }
}
