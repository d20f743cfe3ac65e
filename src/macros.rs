//! Logging macros for ergonomic message formatting.
//!
//! These macros accept the same format strings as `format!` and submit
//! through a [`PipelineHandle`](crate::PipelineHandle). Unlike the
//! `write_*` methods, format errors are caught at compile time.
//!
//! # Examples
//!
//! ```
//! use log_pipeline::prelude::*;
//! use log_pipeline::{information, warning};
//!
//! let (log, _consumer) = Pipeline::builder().no_local_file(true).build_detached().unwrap();
//!
//! information!(log, "Server started");
//!
//! let port = 8080;
//! information!(log, "Server listening on port {}", port);
//! warning!(log, "Retry attempt {} of {}", 3, 5);
//! ```

/// Submit a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use log_pipeline::prelude::*;
/// # let (log, _consumer) = Pipeline::builder().no_local_file(true).build_detached().unwrap();
/// use log_pipeline::write_log;
/// write_log!(log, LogLevel::Information, "Simple message");
/// write_log!(log, LogLevel::Exception, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! write_log {
    ($handle:expr, $level:expr, $($arg:tt)+) => {
        $handle.write_log($level, format!($($arg)+), None)
    };
}

/// Submit a track-level message.
#[macro_export]
macro_rules! track {
    ($handle:expr, $($arg:tt)+) => {
        $crate::write_log!($handle, $crate::LogLevel::Track, $($arg)+)
    };
}

/// Submit an information-level message.
#[macro_export]
macro_rules! information {
    ($handle:expr, $($arg:tt)+) => {
        $crate::write_log!($handle, $crate::LogLevel::Information, $($arg)+)
    };
}

/// Submit a warning, optionally with a cause.
///
/// # Examples
///
/// ```
/// # use log_pipeline::prelude::*;
/// # let (log, _consumer) = Pipeline::builder().no_local_file(true).build_detached().unwrap();
/// use log_pipeline::warning;
/// warning!(log, "Low disk space");
/// warning!(log, cause = ErrorCause::new("quota exceeded"); "Upload of {} skipped", "a.bin");
/// ```
#[macro_export]
macro_rules! warning {
    ($handle:expr, cause = $cause:expr; $($arg:tt)+) => {
        $handle.write_log($crate::LogLevel::Warning, format!($($arg)+), Some($cause))
    };
    ($handle:expr, $($arg:tt)+) => {
        $crate::write_log!($handle, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Submit an error cause, with an optional formatted caption.
///
/// # Examples
///
/// ```
/// # use log_pipeline::prelude::*;
/// # let (log, _consumer) = Pipeline::builder().no_local_file(true).build_detached().unwrap();
/// use log_pipeline::exception;
/// let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
/// exception!(log, ErrorCause::from_error(&err));
/// exception!(log, ErrorCause::new("timeout"), "Request {} failed", 17);
/// ```
#[macro_export]
macro_rules! exception {
    ($handle:expr, $cause:expr) => {
        $handle.write_exception($cause, None)
    };
    ($handle:expr, $cause:expr, $($arg:tt)+) => {
        $handle.write_exception($cause, Some(format!($($arg)+).as_str()))
    };
}

/// Record a session step with a formatted message.
///
/// # Examples
///
/// ```
/// # use log_pipeline::prelude::*;
/// # let (log, _consumer) = Pipeline::builder().no_local_file(true).build_detached().unwrap();
/// use log_pipeline::commit;
/// let mut session = log.session(Some("sync"));
/// commit!(session, LogLevel::Information, "fetched {} records", 12);
/// session.flush();
/// ```
#[macro_export]
macro_rules! commit {
    ($session:expr, $level:expr, $($arg:tt)+) => {
        $session.commit_message($level, &format!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{ErrorCause, LogLevel, Pipeline, PipelineHandle};

    fn handle() -> PipelineHandle {
        let (handle, _consumer) = Pipeline::builder().no_local_file(true).build_detached().unwrap();
        handle
    }

    #[test]
    fn test_write_log_macro() {
        let log = handle();
        write_log!(log, LogLevel::Information, "Test message");
        write_log!(log, LogLevel::Information, "Formatted: {}", 42);
        assert_eq!(log.pending(), 2);
    }

    #[test]
    fn test_level_macros() {
        let log = handle();
        track!(log, "Entering {}", "parse");
        information!(log, "Items: {}", 100);
        warning!(log, "Retry {} of {}", 1, 3);
        warning!(log, cause = ErrorCause::new("slow disk"); "flush took {}ms", 900);
        assert_eq!(log.pending(), 4);
    }

    #[test]
    fn test_exception_macro() {
        let log = handle();
        exception!(log, ErrorCause::new("boom"));
        exception!(log, ErrorCause::new("boom"), "Job {} failed", 7);
        assert_eq!(log.pending(), 2);
    }

    #[test]
    fn test_commit_macro() {
        let log = handle();
        let mut session = log.session(None);
        commit!(session, LogLevel::Track, "step {}", 1);
        assert_eq!(session.buffered(), 1);
    }
}
