//! Timed logging sessions
//!
//! A [`Session`] narrates one operation across several steps. Every commit
//! records how long the step took and the running total, and buffers an
//! entry. [`Session::flush`] hands the buffered entries to the pipeline,
//! unless the whole operation finished faster than the minimum commit
//! interval, in which case they are discarded.
//!
//! # Example
//!
//! ```
//! use log_pipeline::prelude::*;
//!
//! let (handle, _consumer) = Pipeline::builder()
//!     .no_local_file(true)
//!     .build_detached()
//!     .unwrap();
//!
//! let mut session = handle.session(Some("import"));
//! session.commit_information("read {} rows", &[&120]);
//! session.commit_information("wrote batch", &[]);
//! session.flush();
//! ```

use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::pipeline::PipelineHandle;
use super::template::format_message;
use std::fmt::Display;
use std::time::{Duration, Instant};

const TITLE_RULE: &str = "-----------------------------";

pub struct Session {
    handle: PipelineHandle,
    min_commit_interval: Duration,
    start: Instant,
    last_commit: Instant,
    increment: Duration,
    total: Duration,
    pending_text: String,
    buffered: Vec<LogEntry>,
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl Session {
    pub fn new(handle: PipelineHandle, title: Option<&str>) -> Self {
        let min_commit_interval = handle.config().min_commit_interval();
        let now = Instant::now();
        let mut session = Self {
            handle,
            min_commit_interval,
            start: now,
            last_commit: now,
            increment: Duration::ZERO,
            total: Duration::ZERO,
            pending_text: String::new(),
            buffered: Vec::new(),
        };
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            session.pending_text = format!("{}{}{}", TITLE_RULE, title, TITLE_RULE);
        }
        session
    }

    #[must_use]
    pub fn with_min_commit_interval(mut self, interval: Duration) -> Self {
        self.min_commit_interval = interval;
        self
    }

    /// Update the timing state without recording anything
    pub fn tick(&mut self) {
        let now = Instant::now();
        let total = now.duration_since(self.start);
        self.increment = total.saturating_sub(self.total);
        self.total = total;
        self.last_commit = now;
    }

    /// Record a step. The template is rendered with `args`, falling back to
    /// the raw template if it does not fit them.
    pub fn commit(&mut self, level: LogLevel, template: &str, args: &[&dyn Display]) {
        let message = format_message(template, args);
        self.commit_message(level, &message);
    }

    /// Record a step with an already formatted message.
    /// An empty message only updates the timing state.
    pub fn commit_message(&mut self, level: LogLevel, message: &str) {
        self.tick();
        if message.is_empty() {
            return;
        }

        self.pending_text.push_str(&format!(
            "{}. (took {:.2}ms, total {:.2}ms).",
            message,
            millis(self.increment),
            millis(self.total)
        ));
        let text = std::mem::take(&mut self.pending_text);
        self.buffered.push(LogEntry::new(level, text));
    }

    pub fn commit_track(&mut self, template: &str, args: &[&dyn Display]) {
        self.commit(LogLevel::Track, template, args);
    }

    pub fn commit_information(&mut self, template: &str, args: &[&dyn Display]) {
        self.commit(LogLevel::Information, template, args);
    }

    pub fn commit_warning(&mut self, template: &str, args: &[&dyn Display]) {
        self.commit(LogLevel::Warning, template, args);
    }

    pub fn commit_exception(&mut self, template: &str, args: &[&dyn Display]) {
        self.commit(LogLevel::Exception, template, args);
    }

    /// Submit buffered entries and reset the session.
    ///
    /// Returns the number of entries submitted, zero when the session's
    /// total time is below the minimum commit interval.
    pub fn flush(&mut self) -> usize {
        let entries = std::mem::take(&mut self.buffered);
        let submitted = if self.total < self.min_commit_interval {
            if !entries.is_empty() {
                self.handle.metrics().record_session_discarded();
            }
            0
        } else {
            let count = entries.len();
            for entry in entries {
                self.handle.submit(entry);
            }
            count
        };

        self.reset();
        submitted
    }

    fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last_commit = now;
        self.increment = Duration::ZERO;
        self.total = Duration::ZERO;
        self.pending_text.clear();
        self.buffered.clear();
    }

    /// Total time at the last commit
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Time between the last two commits
    pub fn last_increment(&self) -> Duration {
        self.increment
    }

    pub fn last_commit(&self) -> Instant {
        self.last_commit
    }

    pub fn buffered(&self) -> usize {
        self.buffered.len()
    }

    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }
}
