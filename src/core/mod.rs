//! Core pipeline types and traits

pub mod config;
pub mod consumer;
pub mod dedup;
pub mod error;
pub mod fanout;
pub mod line_format;
pub mod log_entry;
pub mod log_level;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod session;
pub mod sink;
pub mod template;

pub use config::{expand_file_name, PipelineConfig, DEFAULT_POLL_INTERVAL_MS, SUPPRESSION_WINDOW};
pub use consumer::{ConsumerLoop, CycleReport};
pub use dedup::{DedupAction, DedupCache, Fingerprint};
pub use error::{LoggerError, Result};
pub use fanout::{SinkFailure, SinkFanout, WriteCallback};
pub use line_format::{repeat_suffix, LineFormat};
pub use log_entry::{ErrorCause, LogEntry};
pub use log_level::{EventSeverity, LogLevel};
pub use metrics::PipelineMetrics;
pub use pipeline::{Pipeline, PipelineBuilder, PipelineHandle, DEFAULT_SHUTDOWN_TIMEOUT};
pub use queue::IngestionQueue;
pub use session::Session;
pub use sink::Sink;
pub use template::{format_message, try_format};
