//! Rendering entries into the lines handed to sinks

use super::error::Result;
use super::log_entry::{ErrorCause, LogEntry};
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};

/// Output format for sink lines
///
/// # Example
///
/// ```
/// use log_pipeline::{LineFormat, LogEntry, LogLevel};
///
/// let entry = LogEntry::new(LogLevel::Information, "hello");
/// let line = LineFormat::Text.format(&entry).unwrap();
/// assert!(line.ends_with("[Information]:\nhello"));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineFormat {
    /// `[HH:MM:SS][Level]:` header followed by the message on the next line
    #[default]
    Text,
    /// One JSON object per entry
    Json,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    level: LogLevel,
    message: String,
    repeat_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<&'a ErrorCause>,
}

pub fn repeat_suffix(count: u32) -> String {
    format!("(repeated {} times in 5 minutes)", count)
}

impl LineFormat {
    pub fn format(&self, entry: &LogEntry) -> Result<String> {
        match self {
            LineFormat::Text => Ok(Self::format_text(entry)),
            LineFormat::Json => Self::format_json(entry),
        }
    }

    fn format_text(entry: &LogEntry) -> String {
        let mut line = format!(
            "[{}][{}]:\n{}",
            entry.timestamp.format("%H:%M:%S"),
            entry.level,
            entry.full_message()
        );
        if entry.repeat_count > 0 {
            line.push_str(&repeat_suffix(entry.repeat_count));
        }
        line
    }

    fn format_json(entry: &LogEntry) -> Result<String> {
        let line = JsonLine {
            timestamp: entry.timestamp.to_rfc3339(),
            level: entry.level,
            message: entry.message.clone(),
            repeat_count: entry.repeat_count,
            cause: entry.cause.as_ref(),
        };
        Ok(serde_json::to_string(&line)?)
    }
}
