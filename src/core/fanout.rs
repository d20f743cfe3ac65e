//! Sink fan-out
//!
//! Writes one formatted line to every enabled sink in a fixed order
//! (console, debug, file, event log, custom sinks) and then notifies the
//! write callback. Each sink is isolated: an error or a panic in one sink is
//! collected as a [`SinkFailure`] and the remaining sinks still run.

use super::config::PipelineConfig;
use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::sink::Sink;
use crate::sinks::{ConsoleSink, DebugSink, EventLogSink, FileSink};
use crate::sinks::event_log::DEFAULT_SYSLOG_SOCKET;
use chrono::{DateTime, Local};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

/// Callback invoked on the consumer thread after every dispatched line
///
/// It must return promptly: while it runs, no other entry is dispatched.
pub type WriteCallback = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

#[derive(Debug)]
pub struct SinkFailure {
    pub sink: String,
    pub error: LoggerError,
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn isolate(name: &str, call: impl FnOnce() -> Result<()>) -> Option<SinkFailure> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => None,
        Ok(Err(error)) => Some(SinkFailure {
            sink: name.to_string(),
            error,
        }),
        Err(panic_info) => Some(SinkFailure {
            sink: name.to_string(),
            error: LoggerError::sink_panicked(name, panic_message(&*panic_info)),
        }),
    }
}

fn write_to(sink: &mut dyn Sink, level: LogLevel, line: &str) -> Option<SinkFailure> {
    let name = sink.name().to_string();
    isolate(&name, || sink.write(level, line))
}

fn end_cycle_of(sink: &mut dyn Sink) -> Option<SinkFailure> {
    let name = sink.name().to_string();
    isolate(&name, || sink.end_cycle())
}

pub struct SinkFanout {
    console: ConsoleSink,
    debug: DebugSink,
    file: Option<FileSink>,
    event_log: Option<EventLogSink>,
    event_log_socket: PathBuf,
    custom: Vec<Box<dyn Sink>>,
    callback: Option<WriteCallback>,
}

impl SinkFanout {
    pub fn new() -> Self {
        Self {
            console: ConsoleSink::new(),
            debug: DebugSink::new(),
            file: None,
            event_log: None,
            event_log_socket: PathBuf::from(DEFAULT_SYSLOG_SOCKET),
            custom: Vec::new(),
            callback: None,
        }
    }

    pub fn set_console(&mut self, console: ConsoleSink) {
        self.console = console;
    }

    pub fn set_debug(&mut self, debug: DebugSink) {
        self.debug = debug;
    }

    pub fn add_sink(&mut self, sink: Box<dyn Sink>) {
        self.custom.push(sink);
    }

    pub fn set_callback(&mut self, callback: Option<WriteCallback>) {
        self.callback = callback;
    }

    /// Syslog socket used when the event log is enabled
    pub fn set_event_log_socket(&mut self, path: impl Into<PathBuf>) {
        self.event_log_socket = path.into();
        self.event_log = None;
    }

    /// Prepare the per-cycle sinks for `config`
    pub fn begin_cycle(&mut self, config: &PipelineConfig, now: &DateTime<Local>) {
        self.file = config
            .file_enabled()
            .then(|| FileSink::new(config.resolve_log_file(now)));

        if !config.write_to_event_log {
            return;
        }
        let stale = self
            .event_log
            .as_ref()
            .map_or(true, |sink| sink.source() != config.event_source);
        if stale && EventLogSink::is_available(&self.event_log_socket) {
            self.event_log = Some(EventLogSink::with_socket_path(
                config.event_source.clone(),
                self.event_log_socket.clone(),
            ));
        }
    }

    /// Sinks enabled for this cycle, in dispatch order
    fn active_sinks(&mut self, config: &PipelineConfig) -> Vec<&mut (dyn Sink + 'static)> {
        let mut sinks: Vec<&mut (dyn Sink + 'static)> = Vec::new();

        if config.add_console {
            sinks.push(&mut self.console);
        }
        if config.add_debug {
            sinks.push(&mut self.debug);
        }
        if let Some(file) = self.file.as_mut() {
            sinks.push(file);
        }
        if config.write_to_event_log {
            if let Some(event_log) = self.event_log.as_mut() {
                sinks.push(event_log);
            }
        }
        for sink in self.custom.iter_mut() {
            sinks.push(sink.as_mut());
        }

        sinks
    }

    pub fn dispatch(&mut self, config: &PipelineConfig, level: LogLevel, line: &str) -> Vec<SinkFailure> {
        let mut failures = Vec::new();

        for sink in self.active_sinks(config) {
            failures.extend(write_to(sink, level, line));
        }

        if let Some(callback) = &self.callback {
            failures.extend(isolate("callback", || {
                callback(level, line);
                Ok(())
            }));
        }

        failures
    }

    /// Release per-cycle resources; the file handle is closed here
    pub fn end_cycle(&mut self, config: &PipelineConfig) -> Vec<SinkFailure> {
        let mut failures = Vec::new();

        for sink in self.active_sinks(config) {
            failures.extend(end_cycle_of(sink));
        }
        self.file = None;

        failures
    }
}

impl Default for SinkFanout {
    fn default() -> Self {
        Self::new()
    }
}
