//! The named logger handed out by the registry

use super::format::RecordFormatter;
use super::handler::Handler;
use super::level::LogLevel;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

struct LoggerState {
    level: LogLevel,
    formatter: RecordFormatter,
    handlers: Vec<Box<dyn Handler>>,
}

/// A named logger with a level threshold and a set of handlers.
///
/// Loggers are shared as `Arc<Logger>`; the registry swaps their handlers in
/// place when the same name is configured again, so every clone sees the new
/// setup.
pub struct Logger {
    name: String,
    state: Mutex<LoggerState>,
    // set once the logger backs the `log` facade
    global: AtomicBool,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("handlers", &self.handler_count())
            .finish()
    }
}

impl Logger {
    /// A logger with no handlers. Messages are filtered but go nowhere until
    /// handlers are attached.
    pub fn new(name: impl Into<String>, level: LogLevel) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(LoggerState {
                level,
                formatter: RecordFormatter::default(),
                handlers: Vec::new(),
            }),
            global: AtomicBool::new(false),
        }
    }

    // A handler panicking mid-write must not disable the logger for good.
    fn state(&self) -> MutexGuard<'_, LoggerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.state().level
    }

    pub fn set_level(&self, level: LogLevel) {
        self.state().level = level;
        self.sync_max_level(level);
    }

    /// Marks the logger as the `log` backend so level changes reach
    /// `log::max_level` too.
    pub(crate) fn mark_global(&self) {
        self.global.store(true, Ordering::Release);
        self.sync_max_level(self.level());
    }

    fn sync_max_level(&self, level: LogLevel) {
        if self.global.load(Ordering::Acquire) {
            log::set_max_level(level.to_level_filter());
        }
    }

    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level >= self.state().level
    }

    pub fn handler_count(&self) -> usize {
        self.state().handlers.len()
    }

    pub fn add_handler(&self, handler: Box<dyn Handler>) {
        self.state().handlers.push(handler);
    }

    /// Replace level, format and every handler at once.
    pub(crate) fn reconfigure(
        &self,
        level: LogLevel,
        formatter: RecordFormatter,
        handlers: Vec<Box<dyn Handler>>,
    ) {
        let mut state = self.state();
        for handler in state.handlers.iter_mut() {
            let _ = handler.flush();
        }
        state.level = level;
        state.formatter = formatter;
        state.handlers = handlers;
        drop(state);
        self.sync_max_level(level);
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        let mut state = self.state();
        if level < state.level || state.handlers.is_empty() {
            return;
        }
        self.write_record(&mut state, level, message, false);
    }

    /// Writes captured program output as an INFO record to the handlers that
    /// keep a record, skipping the level threshold and console handlers.
    pub(crate) fn record_captured(&self, message: &str) {
        let mut state = self.state();
        self.write_record(&mut state, LogLevel::Info, message, true);
    }

    /// At least one handler is not a console.
    pub(crate) fn has_record_handler(&self) -> bool {
        self.state().handlers.iter().any(|h| !h.is_console())
    }

    fn write_record(&self, state: &mut LoggerState, level: LogLevel, message: &str, skip_console: bool) {
        let line = state.formatter.format(&self.name, level, message);
        for handler in state.handlers.iter_mut() {
            if skip_console && handler.is_console() {
                continue;
            }
            if let Err(e) = handler.emit(&line) {
                eprintln!(
                    "--- Logging error in '{}' ({}): {} ---",
                    self.name,
                    handler.describe(),
                    e
                );
            }
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }

    pub fn flush(&self) {
        for handler in self.state().handlers.iter_mut() {
            let _ = handler.flush();
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.is_enabled_for(metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        if log::Log::enabled(self, record.metadata()) {
            Logger::log(self, record.level().into(), &record.args().to_string());
        }
    }

    fn flush(&self) {
        Logger::flush(self);
    }
}

/// Format-args variants of the level methods.
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warning(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_critical {
    ($logger:expr, $($arg:tt)*) => {
        $logger.critical(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<String>>>);

    impl Handler for Collect {
        fn emit(&mut self, line: &str) -> io::Result<()> {
            self.0.lock().unwrap().push(line.to_string());
            Ok(())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn describe(&self) -> String {
            "collect".to_string()
        }
    }

    struct Broken;

    impl Handler for Broken {
        fn emit(&mut self, _line: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[test]
    fn test_level_filtering() {
        let sink = Collect::default();
        let logger = Logger::new("filter", LogLevel::Warning);
        logger.add_handler(Box::new(sink.clone()));

        logger.debug("d");
        logger.info("i");
        logger.warning("w");
        logger.critical("c");

        let lines = sink.0.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("WARNING - w"));
        assert!(lines[1].ends_with("CRITICAL - c"));
    }

    #[test]
    fn test_failing_handler_does_not_block_others() {
        let sink = Collect::default();
        let logger = Logger::new("mixed", LogLevel::Debug);
        logger.add_handler(Box::new(Broken));
        logger.add_handler(Box::new(sink.clone()));

        logger.error("still delivered");
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_log_crate_records() {
        let sink = Collect::default();
        let logger = Logger::new("facade", LogLevel::Info);
        logger.add_handler(Box::new(sink.clone()));

        log::Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("via facade {}", 1))
                .level(log::Level::Warn)
                .build(),
        );
        log::Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("too quiet"))
                .level(log::Level::Trace)
                .build(),
        );

        let lines = sink.0.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("facade - WARNING - via facade 1"));
    }

    #[test]
    fn test_macros_format_arguments() {
        let sink = Collect::default();
        let logger = Logger::new("macro", LogLevel::Debug);
        logger.add_handler(Box::new(sink.clone()));

        crate::log_info!(logger, "epoch {} done", 3);
        crate::log_debug!(logger, "{:.2}", 0.5);
        crate::log_warning!(logger, "slow step {}", "load");
        crate::log_error!(logger, "code {}", 7);
        crate::log_critical!(logger, "giving up after {} tries", 5);

        let lines = sink.0.lock().unwrap();
        assert!(lines[0].ends_with("INFO - epoch 3 done"));
        assert!(lines[1].ends_with("DEBUG - 0.50"));
        assert!(lines[2].ends_with("WARNING - slow step load"));
        assert!(lines[3].ends_with("ERROR - code 7"));
        assert!(lines[4].ends_with("CRITICAL - giving up after 5 tries"));
    }

    struct FakeConsole(Arc<Mutex<Vec<String>>>);

    impl Handler for FakeConsole {
        fn emit(&mut self, line: &str) -> io::Result<()> {
            self.0.lock().unwrap().push(line.to_string());
            Ok(())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn describe(&self) -> String {
            "fake console".to_string()
        }
        fn is_console(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_captured_text_ignores_level_and_console() {
        let sink = Collect::default();
        let console = Collect::default();
        let logger = Logger::new("quiet", LogLevel::Warning);
        logger.add_handler(Box::new(FakeConsole(console.0.clone())));
        assert!(!logger.has_record_handler());
        logger.add_handler(Box::new(sink.clone()));
        assert!(logger.has_record_handler());

        logger.record_captured("printed-inside");
        logger.info("regular info");

        let lines = sink.0.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("quiet - INFO - printed-inside"));
        assert!(console.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_set_level_and_reconfigure() {
        let logger = Logger::new("lvl", LogLevel::Info);
        assert!(!logger.is_enabled_for(LogLevel::Debug));
        logger.set_level(LogLevel::Debug);
        assert!(logger.is_enabled_for(LogLevel::Debug));

        logger.add_handler(Box::new(Collect::default()));
        logger.add_handler(Box::new(Collect::default()));
        logger.reconfigure(LogLevel::Error, RecordFormatter::default(), vec![Box::new(Collect::default())]);
        assert_eq!(logger.handler_count(), 1);
        assert_eq!(logger.level(), LogLevel::Error);
    }
}
