//! Sink implementations

pub mod console;
pub mod debug;
pub mod event_log;
pub mod file;

pub use console::ConsoleSink;
pub use debug::DebugSink;
pub use event_log::EventLogSink;
pub use file::FileSink;

pub use crate::core::Sink;
