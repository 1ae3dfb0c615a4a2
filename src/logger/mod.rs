//! Named loggers writing to the console and/or a file

mod format;
mod handler;
mod level;
mod named_logger;
mod registry;

pub use format::{RecordFormatter, DEFAULT_LOG_FORMAT};
pub use handler::{ConsoleHandler, ConsoleWriterFactory, FileHandler, Handler};
pub use level::LogLevel;
pub use named_logger::Logger;
pub use registry::LoggerRegistry;
