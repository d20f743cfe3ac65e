//! Sink trait for log output destinations

use super::{error::Result, log_level::LogLevel};

/// A destination for formatted log lines.
///
/// Sinks are owned and driven by the consumer thread only, so they need
/// `Send` but not `Sync`.
pub trait Sink: Send {
    fn write(&mut self, level: LogLevel, line: &str) -> Result<()>;

    /// Called once at the end of every non-empty consumer cycle
    fn end_cycle(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
