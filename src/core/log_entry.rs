//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::error::Error;

/// Structured error attached to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCause {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorCause {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Capture an error and its `source()` chain
    ///
    /// Each source becomes one `caused by:` line of the stack description.
    pub fn from_error<E: Error + ?Sized>(err: &E) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(inner) = source {
            chain.push(format!("caused by: {}", inner));
            source = inner.source();
        }

        Self {
            message: err.to_string(),
            stack: if chain.is_empty() {
                None
            } else {
                Some(chain.join("\n"))
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Local>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<ErrorCause>,
    pub repeat_count: u32,
    /// Set on entries the pipeline writes about its own sink failures
    #[serde(skip)]
    self_log: bool,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Local::now(),
            message: message.into(),
            cause: None,
            repeat_count: 0,
            self_log: false,
        }
    }

    /// Exception entry; an absent or empty caption falls back to the cause message
    pub fn exception(cause: ErrorCause, caption: Option<&str>) -> Self {
        let caption = match caption {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => cause.message.clone(),
        };
        Self::new(LogLevel::Exception, caption).with_cause(cause)
    }

    pub(crate) fn self_log(sink: &str, error: &str) -> Self {
        let mut entry = Self::new(
            LogLevel::Exception,
            format!("Log sink '{}' failed", sink),
        )
        .with_cause(ErrorCause::new(error));
        entry.self_log = true;
        entry
    }

    #[must_use]
    pub fn with_cause(mut self, cause: ErrorCause) -> Self {
        self.cause = Some(cause);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_self_log(&self) -> bool {
        self.self_log
    }

    /// Message with the cause appended, as it is written to sinks
    pub fn full_message(&self) -> String {
        let Some(cause) = &self.cause else {
            return self.message.clone();
        };

        let mut out = if self.message.is_empty() {
            cause.message.clone()
        } else {
            format!("{}\nError: {}", self.message, cause.message)
        };

        if let Some(stack) = &cause.stack {
            if self.message.is_empty() {
                out.push('\n');
            } else {
                out.push_str("\nStack: ");
            }
            out.push_str(stack);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
            && self
                .cause
                .as_ref()
                .map_or(true, |c| c.message.is_empty() && c.stack.is_none())
    }
}
