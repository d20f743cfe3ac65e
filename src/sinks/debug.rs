//! Debug stream sink
//!
//! Writes every line to a diagnostic stream, stderr unless another writer is
//! supplied. Kept separate from the console sink so that tooling can attach
//! to it without also capturing normal program output.

use crate::core::{LogLevel, LoggerError, Result, Sink};
use std::io::Write;

pub struct DebugSink {
    writer: Box<dyn Write + Send>,
}

impl DebugSink {
    pub fn new() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }
}

impl Default for DebugSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for DebugSink {
    fn write(&mut self, _level: LogLevel, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)
            .map_err(|e| LoggerError::io_operation("writing debug stream", "line dropped", e))
    }

    fn end_cycle(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "debug"
    }
}
