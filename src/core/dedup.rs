//! Repeat suppression for bursts of identical entries
//!
//! Entries are keyed by an MD5 fingerprint of level, message and cause
//! message. A fingerprint stays live while occurrences keep arriving within
//! [`SUPPRESSION_WINDOW`] of the previous one. While live, duplicates are
//! swallowed, except that once a full window has passed since the last entry
//! actually written, the next duplicate is written with the accumulated
//! repeat count and the count starts over.
//!
//! Timing uses the entry timestamps, including the expiry sweep, so the
//! outcome does not depend on how late the consumer gets to a batch.

use super::config::SUPPRESSION_WINDOW;
use super::log_entry::LogEntry;
use chrono::{DateTime, Local};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    pub fn of(entry: &LogEntry) -> Self {
        let mut ctx = md5::Context::new();
        ctx.consume(entry.level.to_str().as_bytes());
        ctx.consume(b"\x1f");
        ctx.consume(entry.message.as_bytes());
        ctx.consume(b"\x1f");
        if let Some(cause) = &entry.cause {
            ctx.consume(cause.message.as_bytes());
        }
        Fingerprint(ctx.compute().0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DedupAction {
    /// First occurrence, write it
    Emit(LogEntry),
    /// Summary of suppressed repeats; `repeat_count` is set on the entry
    EmitWithSuffix(LogEntry),
    /// Duplicate inside the window
    Suppress,
}

#[derive(Debug, Clone, Copy)]
struct CacheRecord {
    last_seen: DateTime<Local>,
    last_emitted: DateTime<Local>,
    repeat_count: u32,
}

#[derive(Debug, Default)]
pub struct DedupCache {
    records: HashMap<Fingerprint, CacheRecord>,
    /// Latest entry timestamp checked so far; the sweep clock
    newest_seen: Option<DateTime<Local>>,
}

fn outside_window(now: &DateTime<Local>, then: &DateTime<Local>) -> bool {
    now.signed_duration_since(*then).num_milliseconds() >= SUPPRESSION_WINDOW.as_millis() as i64
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, mut entry: LogEntry) -> DedupAction {
        let now = entry.timestamp;
        let key = Fingerprint::of(&entry);
        if self.newest_seen.map_or(true, |newest| now > newest) {
            self.newest_seen = Some(now);
        }

        match self.records.get_mut(&key) {
            Some(record) if !outside_window(&now, &record.last_seen) => {
                record.repeat_count += 1;
                record.last_seen = now;

                if outside_window(&now, &record.last_emitted) {
                    entry.repeat_count = record.repeat_count;
                    record.repeat_count = 0;
                    record.last_emitted = now;
                    DedupAction::EmitWithSuffix(entry)
                } else {
                    DedupAction::Suppress
                }
            }
            _ => {
                self.records.insert(
                    key,
                    CacheRecord {
                        last_seen: now,
                        last_emitted: now,
                        repeat_count: 0,
                    },
                );
                entry.repeat_count = 0;
                DedupAction::Emit(entry)
            }
        }
    }

    /// Drop fingerprints whose last occurrence is outside the window, measured
    /// back from the newest entry timestamp checked so far.
    /// Returns the number of records removed.
    pub fn sweep(&mut self) -> usize {
        let Some(newest) = self.newest_seen else {
            return 0;
        };
        let before = self.records.len();
        self.records
            .retain(|_, record| !outside_window(&newest, &record.last_seen));
        before - self.records.len()
    }

    pub fn newest_seen(&self) -> Option<DateTime<Local>> {
        self.newest_seen
    }

    /// Suppressed repeats currently accumulated for the entry's fingerprint
    pub fn pending_repeats(&self, entry: &LogEntry) -> u32 {
        self.records
            .get(&Fingerprint::of(entry))
            .map_or(0, |record| record.repeat_count)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.newest_seen = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorCause, LogLevel};
    use chrono::Duration;

    fn failure_at(base: DateTime<Local>, offset: Duration) -> LogEntry {
        LogEntry::new(LogLevel::Exception, "sync failed")
            .with_cause(ErrorCause::new("connection refused"))
            .with_timestamp(base + offset)
    }

    #[test]
    fn test_first_occurrence_emits() {
        let mut cache = DedupCache::new();
        let entry = failure_at(Local::now(), Duration::zero());
        assert!(matches!(cache.check(entry), DedupAction::Emit(_)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_burst_is_suppressed() {
        let mut cache = DedupCache::new();
        let base = Local::now();

        assert!(matches!(cache.check(failure_at(base, Duration::zero())), DedupAction::Emit(_)));
        for ms in [100, 200, 300] {
            assert_eq!(
                cache.check(failure_at(base, Duration::milliseconds(ms))),
                DedupAction::Suppress
            );
        }
        assert_eq!(cache.pending_repeats(&failure_at(base, Duration::zero())), 3);
    }

    #[test]
    fn test_summary_after_window_of_continuous_repeats() {
        let mut cache = DedupCache::new();
        let base = Local::now();

        assert!(matches!(cache.check(failure_at(base, Duration::zero())), DedupAction::Emit(_)));
        for minute in 1..5 {
            assert_eq!(
                cache.check(failure_at(base, Duration::minutes(minute))),
                DedupAction::Suppress
            );
        }

        match cache.check(failure_at(base, Duration::minutes(5))) {
            DedupAction::EmitWithSuffix(entry) => assert_eq!(entry.repeat_count, 5),
            other => panic!("expected summary, got {:?}", other),
        }

        // Counter restarts after the summary
        assert_eq!(
            cache.check(failure_at(base, Duration::minutes(6))),
            DedupAction::Suppress
        );
    }

    #[test]
    fn test_gap_longer_than_window_starts_fresh() {
        let mut cache = DedupCache::new();
        let base = Local::now();

        cache.check(failure_at(base, Duration::zero()));
        cache.check(failure_at(base, Duration::milliseconds(500)));

        match cache.check(failure_at(base, Duration::minutes(6))) {
            DedupAction::Emit(entry) => assert_eq!(entry.repeat_count, 0),
            other => panic!("expected fresh emit, got {:?}", other),
        }
    }

    #[test]
    fn test_different_causes_are_distinct() {
        let mut cache = DedupCache::new();
        let base = Local::now();

        let a = failure_at(base, Duration::zero());
        let b = LogEntry::new(LogLevel::Exception, "sync failed")
            .with_cause(ErrorCause::new("timeout"))
            .with_timestamp(base);

        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
        assert!(matches!(cache.check(a), DedupAction::Emit(_)));
        assert!(matches!(cache.check(b), DedupAction::Emit(_)));
    }

    #[test]
    fn test_sweep_removes_stale_records() {
        let mut cache = DedupCache::new();
        let base = Local::now();

        cache.check(failure_at(base, Duration::zero()));
        cache.check(LogEntry::new(LogLevel::Exception, "other").with_timestamp(base + Duration::minutes(4)));
        assert_eq!(cache.sweep(), 0);

        cache.check(LogEntry::new(LogLevel::Exception, "third").with_timestamp(base + Duration::minutes(6)));
        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.newest_seen(), Some(base + Duration::minutes(6)));
    }

    #[test]
    fn test_sweep_ignores_wall_clock_for_old_entries() {
        let mut cache = DedupCache::new();
        let base = Local::now() - Duration::minutes(10);

        assert!(matches!(cache.check(failure_at(base, Duration::zero())), DedupAction::Emit(_)));
        assert_eq!(cache.sweep(), 0);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.check(failure_at(base, Duration::seconds(1))), DedupAction::Suppress);
    }

    #[test]
    fn test_out_of_order_timestamp_keeps_newest() {
        let mut cache = DedupCache::new();
        let base = Local::now();

        cache.check(failure_at(base, Duration::seconds(5)));
        cache.check(LogEntry::new(LogLevel::Warning, "late").with_timestamp(base));
        assert_eq!(cache.newest_seen(), Some(base + Duration::seconds(5)));

        cache.clear();
        assert!(cache.newest_seen().is_none());
        assert_eq!(cache.sweep(), 0);
    }
}
