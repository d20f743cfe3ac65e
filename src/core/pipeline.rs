//! Pipeline object, producer handle and builder

use super::{
    config::PipelineConfig,
    consumer::ConsumerLoop,
    error::{LoggerError, Result},
    fanout::{WriteCallback, SinkFanout},
    log_entry::{ErrorCause, LogEntry},
    log_level::LogLevel,
    metrics::PipelineMetrics,
    queue::IngestionQueue,
    session::Session,
    sink::Sink,
    template::format_message,
};
use crate::sinks::{ConsoleSink, DebugSink};
use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for pipeline cleanup (5 seconds)
///
/// This timeout is used when the pipeline is dropped without explicit shutdown.
/// For custom timeout control, use the `shutdown()` method instead.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Cheap, cloneable producer side of a pipeline.
///
/// Every submission only takes the queue lock for a push and never fails;
/// entries show up in the sinks within about one poll interval.
#[derive(Clone)]
pub struct PipelineHandle {
    queue: Arc<IngestionQueue>,
    config: Arc<RwLock<PipelineConfig>>,
    metrics: Arc<PipelineMetrics>,
}

impl PipelineHandle {
    pub fn submit(&self, entry: LogEntry) {
        self.queue.push(entry);
        self.metrics.record_submitted();
    }

    pub fn write_log(&self, level: LogLevel, message: impl Into<String>, cause: Option<ErrorCause>) {
        let mut entry = LogEntry::new(level, message);
        entry.cause = cause;
        self.submit(entry);
    }

    pub fn write_track(&self, template: &str, args: &[&dyn Display]) {
        self.write_log(LogLevel::Track, format_message(template, args), None);
    }

    pub fn write_information(&self, template: &str, args: &[&dyn Display]) {
        self.write_log(LogLevel::Information, format_message(template, args), None);
    }

    pub fn write_warning(&self, cause: Option<ErrorCause>, template: &str, args: &[&dyn Display]) {
        self.write_log(LogLevel::Warning, format_message(template, args), cause);
    }

    /// Log an error; the caption defaults to the cause message
    pub fn write_exception(&self, cause: ErrorCause, caption: Option<&str>) {
        self.submit(LogEntry::exception(cause, caption));
    }

    /// Start a timed session that submits through this handle
    pub fn session(&self, title: Option<&str>) -> Session {
        Session::new(self.clone(), title)
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> PipelineConfig {
        self.config.read().clone()
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Entries waiting for the next consumer cycle
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

pub struct Pipeline {
    handle: PipelineHandle,
    shutdown: Option<Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Pipeline {
    /// Start a pipeline with default sinks for `config`
    pub fn start(config: PipelineConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn handle(&self) -> PipelineHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> PipelineConfig {
        self.handle.config()
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.handle.config.write().min_level = level;
    }

    /// Change the configuration; the consumer picks it up on its next cycle.
    ///
    /// The update runs under the write lock, so concurrent updates are not
    /// lost; `update` must not read the pipeline configuration itself. An
    /// update that fails validation leaves the configuration as it was.
    pub fn update_config(&self, update: impl FnOnce(&mut PipelineConfig)) -> Result<()> {
        let mut config = self.handle.config.write();
        let mut next = config.clone();
        update(&mut next);
        next.validate()?;
        *config = next;
        Ok(())
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        self.handle.metrics()
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stop the consumer after a final drain of everything already submitted
    ///
    /// # Arguments
    ///
    /// * `timeout` - Maximum time to wait for the final cycle
    ///
    /// # Returns
    ///
    /// `true` if the consumer finished within the timeout, `false` otherwise
    ///
    /// # Example
    ///
    /// ```no_run
    /// use log_pipeline::{Pipeline, PipelineConfig};
    /// use std::time::Duration;
    ///
    /// let mut pipeline = Pipeline::start(PipelineConfig::default()).unwrap();
    /// pipeline.handle().write_information("shutting down", &[]);
    ///
    /// if !pipeline.shutdown(Duration::from_secs(10)) {
    ///     eprintln!("Warning: log pipeline shutdown timed out");
    /// }
    /// ```
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        // Closing the channel wakes the consumer immediately
        drop(self.shutdown.take());

        let Some(worker) = self.worker.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if worker.is_finished() {
                if let Err(e) = worker.join() {
                    eprintln!("[PIPELINE ERROR] Consumer thread panicked during shutdown: {:?}", e);
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[PIPELINE WARNING] Consumer thread did not finish within {:?}. \
                     {} queued entries may be lost.",
                    timeout,
                    self.handle.pending()
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

/// Builder for constructing a [`Pipeline`] with a fluent API
///
/// # Example
/// ```
/// use log_pipeline::prelude::*;
/// use std::sync::Arc;
///
/// let pipeline = Pipeline::builder()
///     .min_level(LogLevel::Warning)
///     .no_local_file(true)
///     .on_write(Arc::new(|level, line: &str| {
///         println!("{}: {}", level, line);
///     }))
///     .build()
///     .unwrap();
/// ```
pub struct PipelineBuilder {
    config: PipelineConfig,
    sinks: Vec<Box<dyn Sink>>,
    console: Option<ConsoleSink>,
    debug: Option<DebugSink>,
    event_log_socket: Option<PathBuf>,
    callback: Option<WriteCallback>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            sinks: Vec::new(),
            console: None,
            debug: None,
            event_log_socket: None,
            callback: None,
        }
    }

    /// Replace the whole configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_file_name(mut self, template: impl Into<String>) -> Self {
        self.config.log_file_name = template.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, enabled: bool) -> Self {
        self.config.add_console = enabled;
        self
    }

    /// Console sink to use when the console is enabled
    #[must_use = "builder methods return a new value"]
    pub fn console_sink(mut self, sink: ConsoleSink) -> Self {
        self.console = Some(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.add_debug = enabled;
        self
    }

    /// Debug stream sink to use when the debug stream is enabled
    #[must_use = "builder methods return a new value"]
    pub fn debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug = Some(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn event_log(mut self, enabled: bool) -> Self {
        self.config.write_to_event_log = enabled;
        self
    }

    /// Syslog socket for the event log, `/dev/log` by default
    #[must_use = "builder methods return a new value"]
    pub fn event_log_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.event_log_socket = Some(path.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn no_local_file(mut self, disabled: bool) -> Self {
        self.config.no_local_file = disabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn suppress_repeats(mut self, enabled: bool) -> Self {
        self.config.suppress_repeats = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_commit_interval(mut self, interval: Duration) -> Self {
        self.config.min_commit_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Add a custom sink, written after the built-in sinks
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Set the callback notified after each dispatched line
    #[must_use = "builder methods return a new value"]
    pub fn on_write(mut self, callback: WriteCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Build the producer handle and consumer without starting a thread.
    ///
    /// The caller drives the consumer with
    /// [`ConsumerLoop::run_cycle`] or [`ConsumerLoop::run`].
    pub fn build_detached(self) -> Result<(PipelineHandle, ConsumerLoop)> {
        self.config.validate()?;

        let mut fanout = SinkFanout::new();
        if let Some(console) = self.console {
            fanout.set_console(console);
        }
        if let Some(debug) = self.debug {
            fanout.set_debug(debug);
        }
        if let Some(socket) = self.event_log_socket {
            fanout.set_event_log_socket(socket);
        }
        for sink in self.sinks {
            fanout.add_sink(sink);
        }
        fanout.set_callback(self.callback);

        let handle = PipelineHandle {
            queue: Arc::new(IngestionQueue::new()),
            config: Arc::new(RwLock::new(self.config)),
            metrics: Arc::new(PipelineMetrics::new()),
        };
        let consumer = ConsumerLoop::new(
            Arc::clone(&handle.queue),
            Arc::clone(&handle.config),
            Arc::clone(&handle.metrics),
            fanout,
        );
        Ok((handle, consumer))
    }

    /// Build the pipeline and start its consumer thread
    pub fn build(self) -> Result<Pipeline> {
        let (handle, consumer) = self.build_detached()?;
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let worker = thread::Builder::new()
            .name("log-pipeline-consumer".to_string())
            .spawn(move || consumer.run(shutdown_rx))
            .map_err(|e| LoggerError::io_operation("spawning consumer thread", "pipeline not started", e))?;

        Ok(Pipeline {
            handle,
            shutdown: Some(shutdown_tx),
            worker: Some(worker),
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
