//! File sink implementation
//!
//! A `FileSink` lives for one consumer cycle. The file (and its directory)
//! is created on the first write, held under an exclusive advisory lock, and
//! flushed, unlocked and closed by `end_cycle` or when the sink is dropped.
//! Lines are only ever appended.

use crate::core::{LogLevel, LoggerError, Result, Sink};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn open(&self) -> Result<BufWriter<File>> {
        let display = self.path.display().to_string();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::io_operation("creating log directory", parent.display().to_string(), e)
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LoggerError::io_operation("opening log file", display.clone(), e))?;

        file.lock_exclusive()
            .map_err(|_| LoggerError::file_lock(display))?;

        Ok(BufWriter::new(file))
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };

        let flushed = writer.flush();
        // Unlock even when the flush failed
        let _ = writer.get_ref().unlock();
        flushed.map_err(|e| LoggerError::file_sink(self.path.display().to_string(), e.to_string()))
    }
}

impl Sink for FileSink {
    fn write(&mut self, _level: LogLevel, line: &str) -> Result<()> {
        if self.writer.is_none() {
            self.writer = Some(self.open()?);
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::file_sink(self.path.display().to_string(), "writer not initialized"))?;

        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn end_cycle(&mut self) -> Result<()> {
        self.close()
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
