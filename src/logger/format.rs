//! Line formatting for log records

use super::level::LogLevel;
use crate::common::timestamp_utils::{self, DEFAULT_ASCTIME_FORMAT};
use crate::errors::Result;

pub const DEFAULT_LOG_FORMAT: &str = "{asctime} - {name} - {levelname} - {message}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    AscTime,
    Name,
    LevelName,
    LevelNo,
    Message,
}

/// Renders a record through a `{placeholder}` template.
///
/// Recognised placeholders are `{asctime}`, `{name}`, `{levelname}`,
/// `{levelno}` and `{message}`. Anything else in braces is copied verbatim.
/// The template is parsed once, so braces inside a message are never
/// substituted.
#[derive(Debug, Clone)]
pub struct RecordFormatter {
    segments: Vec<Segment>,
    datefmt: String,
}

impl Default for RecordFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FORMAT)
    }
}

impl RecordFormatter {
    pub fn new(template: &str) -> Self {
        Self {
            segments: parse_template(template),
            datefmt: DEFAULT_ASCTIME_FORMAT.to_string(),
        }
    }

    /// Use a custom strftime format for `{asctime}`.
    pub fn with_datefmt(mut self, datefmt: &str) -> Result<Self> {
        timestamp_utils::validate_timestamp_format(datefmt)?;
        self.datefmt = datefmt.to_string();
        Ok(self)
    }

    pub fn format(&self, name: &str, level: LogLevel, message: &str) -> String {
        let mut line = String::with_capacity(64 + message.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::AscTime => {
                    line.push_str(&timestamp_utils::current_local_timestamp_str(&self.datefmt))
                }
                Segment::Name => line.push_str(name),
                Segment::LevelName => line.push_str(level.as_str()),
                Segment::LevelNo => line.push_str(&level.value().to_string()),
                Segment::Message => line.push_str(message),
            }
        }
        line
    }
}

fn parse_template(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after = &rest[open..];
        let placeholder = after.find('}').and_then(|close| {
            let segment = match &after[1..close] {
                "asctime" => Segment::AscTime,
                "name" => Segment::Name,
                "levelname" => Segment::LevelName,
                "levelno" => Segment::LevelNo,
                "message" => Segment::Message,
                _ => return None,
            };
            Some((segment, close + 1))
        });

        match placeholder {
            Some((segment, len)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
                rest = &after[len..];
            }
            None => {
                literal.push('{');
                rest = &after[1..];
            }
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}
