//! Operating system event log sink
//!
//! On unix hosts records go to the local syslog socket as RFC 3164
//! datagrams with the `user` facility. Track entries are never forwarded.
//! Other platforms report the sink as unsupported and the pipeline skips it.
//!
//! Records carry `<PRI>TIMESTAMP TAG[PID]: MSG` with no HOSTNAME field; the
//! local daemon fills in the host when it stores the record.

use crate::core::{LogLevel, LoggerError, Result, Sink};
use chrono::Local;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::net::UnixDatagram;

pub const DEFAULT_SYSLOG_SOCKET: &str = "/dev/log";

const FACILITY_USER: u8 = 1;

pub struct EventLogSink {
    source: String,
    socket_path: PathBuf,
    #[cfg(unix)]
    socket: Option<UnixDatagram>,
}

impl EventLogSink {
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_socket_path(source, DEFAULT_SYSLOG_SOCKET)
    }

    pub fn with_socket_path(source: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            socket_path: path.into(),
            #[cfg(unix)]
            socket: None,
        }
    }

    /// Whether this host has an event log the sink can reach
    pub fn is_supported() -> bool {
        Self::is_available(Path::new(DEFAULT_SYSLOG_SOCKET))
    }

    /// Whether a syslog socket exists at `path`
    pub fn is_available(path: &Path) -> bool {
        cfg!(unix) && path.exists()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Render one syslog record, or `None` for levels that are not forwarded
    pub fn record(&self, level: LogLevel, line: &str) -> Option<String> {
        let severity = level.event_severity()?;
        let priority = FACILITY_USER * 8 + severity.syslog_code();
        Some(format!(
            "<{}>{} {}[{}]: {}",
            priority,
            Local::now().format("%b %e %H:%M:%S"),
            self.source,
            std::process::id(),
            line.replace(['\r', '\n'], " ")
        ))
    }

    #[cfg(unix)]
    fn send(&mut self, record: &str) -> Result<()> {
        if self.socket.is_none() {
            let socket = UnixDatagram::unbound()
                .map_err(|e| LoggerError::io_operation("creating event log socket", self.source.clone(), e))?;
            socket.connect(&self.socket_path).map_err(|e| {
                LoggerError::event_log(format!("{}: {}", self.socket_path.display(), e))
            })?;
            self.socket = Some(socket);
        }

        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| LoggerError::event_log("socket not initialized"))?;

        if let Err(e) = socket.send(record.as_bytes()) {
            // Reconnect on the next record, syslog daemons restart
            self.socket = None;
            return Err(LoggerError::io_operation("sending to event log", self.socket_path.display().to_string(), e));
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn send(&mut self, _record: &str) -> Result<()> {
        Err(LoggerError::event_log("no event log on this platform"))
    }
}

impl Sink for EventLogSink {
    fn write(&mut self, level: LogLevel, line: &str) -> Result<()> {
        match self.record(level, line) {
            Some(record) => self.send(&record),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "event_log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_priority() {
        let sink = EventLogSink::new("app");
        let info = sink.record(LogLevel::Information, "[10:00:00][Information]:\nready").unwrap();
        assert!(info.starts_with("<14>"));
        // No hostname between the 15 character timestamp and the tag
        assert!(info[19..].starts_with(" app["));
        assert!(info.ends_with("[10:00:00][Information]: ready"));

        assert!(sink.record(LogLevel::Warning, "w").unwrap().starts_with("<12>"));
        assert!(sink.record(LogLevel::Exception, "e").unwrap().starts_with("<11>"));
        assert!(sink.record(LogLevel::Track, "t").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_sends_to_socket() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("log.sock");
        let receiver = UnixDatagram::bind(&path).unwrap();
        receiver
            .set_read_timeout(Some(std::time::Duration::from_secs(2)))
            .unwrap();

        let mut sink = EventLogSink::with_socket_path("app", &path);
        sink.write(LogLevel::Track, "skipped").unwrap();
        sink.write(LogLevel::Exception, "broken pipe").unwrap();

        let mut buf = [0u8; 1024];
        let n = receiver.recv(&mut buf).unwrap();
        let record = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(record.starts_with("<11>"));
        assert!(record.ends_with("broken pipe"));
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_socket_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut sink = EventLogSink::with_socket_path("app", dir.path().join("absent.sock"));
        let err = sink.write(LogLevel::Warning, "nobody listens").unwrap_err();
        assert!(matches!(err, LoggerError::EventLogUnavailable(_)));
    }
}
