//! Pipeline configuration
//!
//! The configuration is read by the consumer once per cycle, so changes made
//! through [`Pipeline::update_config`](crate::Pipeline::update_config) take
//! effect from the next cycle on.

use super::error::{LoggerError, Result};
use super::line_format::LineFormat;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Window during which identical entries are coalesced
pub const SUPPRESSION_WINDOW: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Entries below this level are dropped before fan-out
    pub min_level: LogLevel,

    /// Consumer wake period in milliseconds
    pub poll_interval_ms: u64,

    /// Directory of the log file
    pub log_path: PathBuf,

    /// File name template, `{yyyyMMdd}` style date tokens are expanded
    pub log_file_name: String,

    pub add_console: bool,
    pub add_debug: bool,

    /// Forward to the operating system event log where supported
    pub write_to_event_log: bool,

    /// Disables the file sink
    pub no_local_file: bool,

    /// Enables repeat suppression
    pub suppress_repeats: bool,

    /// Lowest level routed through repeat suppression.
    /// Entries carrying a cause are always eligible.
    pub dedup_min_level: LogLevel,

    /// Sessions whose total duration is below this are discarded on flush
    pub min_commit_interval_ms: u64,

    pub line_format: LineFormat,

    /// Identifier used in event log records
    pub event_source: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Information,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_path: PathBuf::from("Temp/Log"),
            log_file_name: "{yyyyMMdd}.log".to_string(),
            add_console: false,
            add_debug: false,
            write_to_event_log: false,
            no_local_file: false,
            suppress_repeats: true,
            dedup_min_level: LogLevel::Exception,
            min_commit_interval_ms: 1,
            line_format: LineFormat::Text,
            event_source: "log_pipeline".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(LoggerError::config(
                "PipelineConfig",
                "poll_interval_ms must be greater than zero",
            ));
        }
        if self.file_enabled() && self.log_file_name.trim().is_empty() {
            return Err(LoggerError::config(
                "PipelineConfig",
                "log_file_name is empty while the file sink is enabled",
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn min_commit_interval(&self) -> Duration {
        Duration::from_millis(self.min_commit_interval_ms)
    }

    pub fn file_enabled(&self) -> bool {
        !self.no_local_file
    }

    /// Full path of the log file for the given moment
    pub fn resolve_log_file(&self, now: &DateTime<Local>) -> PathBuf {
        self.log_path
            .join(expand_file_name(&self.log_file_name, now))
    }
}

/// Expand brace-delimited date tokens in a file name template.
///
/// Inside braces `yyyy`, `yy`, `MM`, `dd`, `HH`, `mm` and `ss` are replaced by
/// the matching date part; other characters inside braces are copied as-is.
/// Text outside braces is literal, and an unclosed brace is kept verbatim.
pub fn expand_file_name(template: &str, now: &DateTime<Local>) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                out.push_str(&now.format(&date_pattern(&after[..close])).to_string());
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}

fn date_pattern(token: &str) -> String {
    const TOKENS: [(&str, &str); 7] = [
        ("yyyy", "%Y"),
        ("yy", "%y"),
        ("MM", "%m"),
        ("dd", "%d"),
        ("HH", "%H"),
        ("mm", "%M"),
        ("ss", "%S"),
    ];

    let mut pattern = String::new();
    let mut rest = token;
    'outer: while !rest.is_empty() {
        for (token, strftime) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                pattern.push_str(strftime);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            if c == '%' {
                pattern.push_str("%%");
            } else {
                pattern.push(c);
            }
        }
        rest = chars.as_str();
    }
    pattern
}
