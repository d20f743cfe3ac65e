//! Consumer loop
//!
//! The consumer is the only reader of the ingestion queue and the only owner
//! of sink state and the dedup cache. Every cycle it waits one poll
//! interval, detaches the whole queue and runs each entry through level
//! filtering, repeat suppression, formatting and the sink fan-out.

use super::config::PipelineConfig;
use super::dedup::{DedupAction, DedupCache};
use super::fanout::{panic_message, SinkFailure, SinkFanout};
use super::log_entry::LogEntry;
use super::metrics::PipelineMetrics;
use super::queue::IngestionQueue;
use chrono::Local;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Upper bound on drain cycles run after shutdown is signalled
const MAX_SHUTDOWN_PASSES: usize = 16;

/// What one consumer cycle did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub drained: usize,
    pub dispatched: usize,
    pub filtered: usize,
    pub suppressed: usize,
    pub failures: usize,
}

enum Outcome {
    Filtered,
    Suppressed,
    Dispatched { failures: usize },
    FormatFailed,
}

pub struct ConsumerLoop {
    queue: Arc<IngestionQueue>,
    config: Arc<RwLock<PipelineConfig>>,
    metrics: Arc<PipelineMetrics>,
    cache: DedupCache,
    fanout: SinkFanout,
}

impl ConsumerLoop {
    pub(crate) fn new(
        queue: Arc<IngestionQueue>,
        config: Arc<RwLock<PipelineConfig>>,
        metrics: Arc<PipelineMetrics>,
        fanout: SinkFanout,
    ) -> Self {
        Self {
            queue,
            config,
            metrics,
            cache: DedupCache::new(),
            fanout,
        }
    }

    /// Run cycles until `shutdown` receives a message or is disconnected.
    ///
    /// The wait between cycles observes the shutdown channel, so stopping
    /// never waits out a full poll interval. Before returning, cycles keep
    /// running until the queue is empty, so everything submitted before
    /// shutdown is written, including failure reports raised by those
    /// final cycles.
    pub fn run(mut self, shutdown: Receiver<()>) {
        loop {
            let interval = self.config.read().poll_interval();
            match shutdown.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => self.guarded_cycle(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    self.drain_on_shutdown();
                    break;
                }
            }
        }
    }

    fn drain_on_shutdown(&mut self) {
        self.guarded_cycle();

        // Failure reports raised by the previous pass are still queued
        let mut passes = 1;
        while !self.queue.is_empty() {
            if passes >= MAX_SHUTDOWN_PASSES {
                eprintln!(
                    "[PIPELINE WARNING] {} entries still queued after {} shutdown passes, giving up.",
                    self.queue.len(),
                    passes
                );
                break;
            }
            self.guarded_cycle();
            passes += 1;
        }
    }

    fn guarded_cycle(&mut self) {
        if let Err(panic_info) = catch_unwind(AssertUnwindSafe(|| self.run_cycle())) {
            eprintln!(
                "[PIPELINE ERROR] Consumer cycle panicked: {}. The loop keeps running.",
                panic_message(&*panic_info)
            );
        }
    }

    /// Drain the queue once and dispatch everything in it
    pub fn run_cycle(&mut self) -> CycleReport {
        let batch = self.queue.drain_all();
        let mut report = CycleReport {
            drained: batch.len(),
            ..Default::default()
        };
        if batch.is_empty() {
            return report;
        }

        self.metrics.record_cycle();
        let config = self.config.read().clone();
        let now = Local::now();
        let only_self_logs = batch.iter().all(LogEntry::is_self_log);

        self.fanout.begin_cycle(&config, &now);

        for entry in batch {
            match catch_unwind(AssertUnwindSafe(|| self.process(&config, entry))) {
                Ok(Outcome::Filtered) => report.filtered += 1,
                Ok(Outcome::Suppressed) => report.suppressed += 1,
                Ok(Outcome::Dispatched { failures }) => {
                    report.dispatched += 1;
                    report.failures += failures;
                }
                Ok(Outcome::FormatFailed) => report.failures += 1,
                Err(panic_info) => {
                    report.failures += 1;
                    self.metrics.record_sink_failure();
                    eprintln!(
                        "[PIPELINE ERROR] Entry processing panicked: {}. Continuing with the batch.",
                        panic_message(&*panic_info)
                    );
                }
            }
        }

        for failure in self.fanout.end_cycle(&config) {
            report.failures += 1;
            self.report_failure(only_self_logs, failure);
        }

        self.cache.sweep();
        report
    }

    pub fn dedup_cache(&self) -> &DedupCache {
        &self.cache
    }

    fn dedup_applies(config: &PipelineConfig, entry: &LogEntry) -> bool {
        config.suppress_repeats && (entry.cause.is_some() || entry.level >= config.dedup_min_level)
    }

    fn process(&mut self, config: &PipelineConfig, entry: LogEntry) -> Outcome {
        if entry.level < config.min_level || entry.is_empty() {
            self.metrics.record_filtered();
            return Outcome::Filtered;
        }

        let entry = if Self::dedup_applies(config, &entry) {
            match self.cache.check(entry) {
                DedupAction::Emit(entry) | DedupAction::EmitWithSuffix(entry) => entry,
                DedupAction::Suppress => {
                    self.metrics.record_suppressed();
                    return Outcome::Suppressed;
                }
            }
        } else {
            entry
        };

        let line = match config.line_format.format(&entry) {
            Ok(line) => line,
            Err(error) => {
                self.report_failure(
                    entry.is_self_log(),
                    SinkFailure {
                        sink: "formatter".to_string(),
                        error,
                    },
                );
                return Outcome::FormatFailed;
            }
        };

        self.metrics.record_dispatched();
        let failures = self.fanout.dispatch(config, entry.level, &line);
        let count = failures.len();
        for failure in failures {
            self.report_failure(entry.is_self_log(), failure);
        }
        Outcome::Dispatched { failures: count }
    }

    /// Route a sink failure back through the pipeline as an Exception entry.
    /// Failures that happen while writing such a report are dropped.
    fn report_failure(&self, origin_is_self_log: bool, failure: SinkFailure) {
        self.metrics.record_sink_failure();

        if origin_is_self_log {
            self.metrics.record_self_log_dropped();
            eprintln!(
                "[PIPELINE ERROR] Sink '{}' failed while reporting a sink failure: {}",
                failure.sink, failure.error
            );
            return;
        }

        self.queue
            .push(LogEntry::self_log(&failure.sink, &failure.error.to_string()));
        self.metrics.record_submitted();
    }
}
