//! Print capture scopes
//!
//! Redirection happens at the file-descriptor level, so output from `print!`,
//! `std::io::stdout()` and C code alike is captured. The libtest harness
//! intercepts `print!` before it reaches fd 1; tests write through
//! `std::io::stdout()` instead.

mod redirect;
mod session;

pub use session::{with_capture, with_capture_to_logger, CaptureSession};
