//! # Log Pipeline
//!
//! An asynchronous logging pipeline. Producers on any thread submit entries
//! without blocking on I/O; a single background consumer drains them in
//! batches and writes each line to the enabled sinks.
//!
//! ## Features
//!
//! - **Non-blocking producers**: submission is a push into a shared queue
//! - **Repeat suppression**: identical errors are written once per five minutes,
//!   followed by a summary of how often they repeated
//! - **Multiple sinks**: console, debug stream, daily log file, system event log
//!   and custom [`Sink`] implementations
//! - **Timed sessions**: narrate multi-step operations with per-step timings
//!
//! ## Example
//!
//! ```no_run
//! use log_pipeline::prelude::*;
//! use log_pipeline::information;
//!
//! let mut pipeline = Pipeline::builder()
//!     .log_path("logs")
//!     .console(true)
//!     .build()
//!     .unwrap();
//!
//! let log = pipeline.handle();
//! information!(log, "listening on port {}", 8080);
//!
//! pipeline.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        ErrorCause, LineFormat, LogEntry, LogLevel, LoggerError, Pipeline, PipelineBuilder,
        PipelineConfig, PipelineHandle, PipelineMetrics, Result, Session, Sink, WriteCallback,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::sinks::{ConsoleSink, DebugSink, EventLogSink, FileSink};
}

pub use self::core::{
    expand_file_name, format_message, repeat_suffix, try_format, ConsumerLoop, CycleReport,
    DedupAction, DedupCache, ErrorCause, EventSeverity, Fingerprint, IngestionQueue, LineFormat,
    LogEntry, LogLevel, LoggerError, Pipeline, PipelineBuilder, PipelineConfig, PipelineHandle,
    PipelineMetrics, Result, Session, Sink, SinkFailure, WriteCallback, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_SHUTDOWN_TIMEOUT, SUPPRESSION_WINDOW,
};
pub use self::sinks::{ConsoleSink, DebugSink, EventLogSink, FileSink};
