//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    /// Step-by-step narration, mostly useful during development
    Track = 0,
    #[default]
    Information = 1,
    Warning = 2,
    Exception = 3,
}

/// Severity understood by the operating system event log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
}

impl EventSeverity {
    /// Syslog severity code (RFC 3164)
    pub fn syslog_code(&self) -> u8 {
        match self {
            EventSeverity::Info => 6,
            EventSeverity::Warning => 4,
            EventSeverity::Error => 3,
        }
    }
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Track,
        LogLevel::Information,
        LogLevel::Warning,
        LogLevel::Exception,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Track => "Track",
            LogLevel::Information => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Exception => "Exception",
        }
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Track => BrightBlack,
            LogLevel::Information => Green,
            LogLevel::Warning => Yellow,
            LogLevel::Exception => Red,
        }
    }

    /// Event log severity for this level; Track is never forwarded
    pub fn event_severity(&self) -> Option<EventSeverity> {
        match self {
            LogLevel::Track => None,
            LogLevel::Information => Some(EventSeverity::Info),
            LogLevel::Warning => Some(EventSeverity::Warning),
            LogLevel::Exception => Some(EventSeverity::Error),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACK" | "TRACE" => Ok(LogLevel::Track),
            "INFORMATION" | "INFO" => Ok(LogLevel::Information),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "EXCEPTION" | "ERROR" => Ok(LogLevel::Exception),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Track < LogLevel::Information);
        assert!(LogLevel::Information < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Exception);
        assert_eq!(LogLevel::default(), LogLevel::Information);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("Exception".parse::<LogLevel>(), Ok(LogLevel::Exception));
        assert_eq!("error".parse::<LogLevel>(), Ok(LogLevel::Exception));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_event_severity_mapping() {
        assert_eq!(LogLevel::Track.event_severity(), None);
        assert_eq!(LogLevel::Information.event_severity(), Some(EventSeverity::Info));
        assert_eq!(LogLevel::Warning.event_severity(), Some(EventSeverity::Warning));
        assert_eq!(LogLevel::Exception.event_severity(), Some(EventSeverity::Error));
        assert_eq!(EventSeverity::Error.syslog_code(), 3);
    }
}
