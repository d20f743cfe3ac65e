//! Ingestion queue shared by producers and the consumer
//!
//! Producers push without waiting on anything but a short critical section;
//! the single consumer detaches the whole backlog at once.

use super::log_entry::LogEntry;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct IngestionQueue {
    entries: Mutex<Vec<LogEntry>>,
}

impl IngestionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries from one thread keep their relative order.
    pub fn push(&self, entry: LogEntry) {
        self.entries.lock().push(entry);
    }

    /// Detach every queued entry in insertion order, leaving the queue empty
    pub fn drain_all(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_drain_preserves_order() {
        let queue = IngestionQueue::new();
        for i in 0..5 {
            queue.push(LogEntry::new(LogLevel::Information, format!("m{}", i)));
        }
        assert_eq!(queue.len(), 5);

        let drained: Vec<String> = queue.drain_all().into_iter().map(|e| e.message).collect();
        assert_eq!(drained, vec!["m0", "m1", "m2", "m3", "m4"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_second_drain_is_empty() {
        let queue = IngestionQueue::new();
        queue.push(LogEntry::new(LogLevel::Warning, "once"));
        assert_eq!(queue.drain_all().len(), 1);
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn test_concurrent_push() {
        let queue = Arc::new(IngestionQueue::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..250 {
                        queue.push(LogEntry::new(LogLevel::Information, format!("{}:{}", t, i)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.drain_all().len(), 1000);
    }
}
