//! Property-based tests for log_pipeline using proptest

use chrono::{Duration as ChronoDuration, Local};
use log_pipeline::prelude::*;
use log_pipeline::{format_message, try_format, DedupAction, DedupCache, Fingerprint, IngestionQueue};
use proptest::prelude::*;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Track),
        Just(LogLevel::Information),
        Just(LogLevel::Warning),
        Just(LogLevel::Exception),
    ]
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// LogLevel string conversions roundtrip
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Ordering follows the numeric representation
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        let val1 = level1 as u8;
        let val2 = level2 as u8;

        prop_assert_eq!(level1 <= level2, val1 <= val2);
        prop_assert_eq!(level1 < level2, val1 < val2);
    }
}

// ============================================================================
// Template Tests
// ============================================================================

proptest! {
    /// Templates without braces are returned unchanged
    #[test]
    fn test_plain_template_is_identity(template in "[^{}]{0,64}") {
        prop_assert_eq!(format_message(&template, &[]), template);
    }

    /// Formatting never panics and falls back to the template on error
    #[test]
    fn test_format_never_panics(template in ".{0,64}", arg in any::<i64>()) {
        let rendered = format_message(&template, &[&arg]);
        if try_format(&template, &[&arg]).is_err() {
            prop_assert_eq!(rendered, template);
        }
    }

    /// Positional and sequential placeholders agree
    #[test]
    fn test_positional_matches_sequential(a in any::<u32>(), b in "[a-z]{1,8}") {
        let sequential = format_message("{} and {}", &[&a, &b]);
        let positional = format_message("{0} and {1}", &[&a, &b]);
        prop_assert_eq!(&sequential, &positional);
        prop_assert_eq!(sequential, format!("{} and {}", a, b));
    }
}

// ============================================================================
// Dedup Tests
// ============================================================================

proptest! {
    /// Identical entries in a short burst produce exactly one emission
    #[test]
    fn test_burst_emits_once(message in "[a-z ]{1,32}", count in 1usize..50) {
        let mut cache = DedupCache::new();
        let start = Local::now();
        let mut emitted = 0;

        for i in 0..count {
            let entry = LogEntry::new(LogLevel::Exception, message.clone())
                .with_timestamp(start + ChronoDuration::milliseconds(i as i64));
            if !matches!(cache.check(entry), DedupAction::Suppress) {
                emitted += 1;
            }
        }

        prop_assert_eq!(emitted, 1);
        prop_assert_eq!(cache.pending_repeats(&LogEntry::new(LogLevel::Exception, message)), count as u32 - 1);
    }

    /// Fingerprints separate entries that differ in level or message
    #[test]
    fn test_fingerprint_distinguishes(
        level1 in any_level(),
        level2 in any_level(),
        message1 in "[a-z]{1,16}",
        message2 in "[a-z]{1,16}",
    ) {
        let a = Fingerprint::of(&LogEntry::new(level1, message1.clone()));
        let b = Fingerprint::of(&LogEntry::new(level2, message2.clone()));
        prop_assert_eq!(a == b, level1 == level2 && message1 == message2);
    }
}

// ============================================================================
// Queue Tests
// ============================================================================

proptest! {
    /// Draining returns everything in submission order and empties the queue
    #[test]
    fn test_queue_drain_preserves_order(messages in prop::collection::vec("[a-z0-9]{0,12}", 0..100)) {
        let queue = IngestionQueue::new();
        for message in &messages {
            queue.push(LogEntry::new(LogLevel::Information, message.clone()));
        }

        let drained: Vec<String> = queue.drain_all().into_iter().map(|e| e.message).collect();
        prop_assert_eq!(drained, messages);
        prop_assert!(queue.is_empty());
    }
}

// ============================================================================
// Filtering Tests
// ============================================================================

proptest! {
    /// Exactly the entries at or above the minimum level are dispatched
    #[test]
    fn test_level_filtering(min_level in any_level(), levels in prop::collection::vec(any_level(), 0..40)) {
        let (handle, mut consumer) = Pipeline::builder()
            .no_local_file(true)
            .suppress_repeats(false)
            .min_level(min_level)
            .build_detached()
            .unwrap();

        for (i, level) in levels.iter().enumerate() {
            handle.write_log(*level, format!("entry {}", i), None);
        }

        let report = consumer.run_cycle();
        let expected = levels.iter().filter(|level| **level >= min_level).count();
        prop_assert_eq!(report.dispatched, expected);
        prop_assert_eq!(report.filtered, levels.len() - expected);
    }
}
