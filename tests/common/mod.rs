// Shared helpers for the integration tests.
#![allow(dead_code)]

use runlog::LoggerRegistry;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// In-memory console writer that every clone appends to.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Registry whose console handlers all write into one buffer.
pub fn registry_with_console() -> (LoggerRegistry, SharedBuffer) {
    let console = SharedBuffer::default();
    let writer = console.clone();
    let registry = LoggerRegistry::with_console_writer(move || Box::new(writer.clone()));
    (registry, console)
}

/// Lines of `text` containing `needle`.
pub fn count_lines_containing(text: &str, needle: &str) -> usize {
    text.lines().filter(|l| l.contains(needle)).count()
}

/// Device and inode behind fd 1, to tell whether stdout was swapped.
#[cfg(unix)]
pub fn stdout_identity() -> (u64, u64) {
    // SAFETY: fstat fills a zeroed stat struct for a valid descriptor.
    let mut st: libc::stat = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::fstat(libc::STDOUT_FILENO, &mut st) };
    assert_eq!(rc, 0, "fstat(1) failed");
    (st.st_dev as u64, st.st_ino as u64)
}

/// Write straight to fd 1, bypassing libtest's print capture.
pub fn emit(text: &str) {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes()).unwrap();
    out.flush().unwrap();
}

/// Like [`emit`], flushing after each part while holding the stdout lock so
/// nothing else interleaves between them.
pub fn emit_parts(parts: &[&str]) {
    let mut out = io::stdout().lock();
    for part in parts {
        out.write_all(part.as_bytes()).unwrap();
        out.flush().unwrap();
    }
}
