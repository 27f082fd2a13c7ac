//! In-memory ring buffer target
//!
//! Keeps the most recent `capacity` events. Storing happens synchronously in
//! `enqueue`; there is no worker thread.

use crate::core::{LogEvent, LogLevel, OverflowPolicy, Target, TargetMetrics, TargetSettings};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Default number of events retained
pub const DEFAULT_MEMORY_CAPACITY: usize = 1000;

// Storage beyond this grows on demand
const PREALLOCATED_SLOTS: usize = 1024;

/// Fixed-capacity buffer of recent events with drop-oldest overflow
///
/// # Example
///
/// ```
/// use rust_log_pipeline::{LogEvent, LogLevel, MemoryTarget, Target};
/// use std::sync::Arc;
///
/// let memory = MemoryTarget::with_capacity(2);
/// for i in 0..3 {
///     memory.enqueue(Arc::new(LogEvent::new(LogLevel::Info, "App", format!("event {}", i), vec![])));
/// }
///
/// let recent = memory.get_recent();
/// assert_eq!(recent.len(), 2);
/// assert_eq!(recent[0].template(), "event 1");
/// ```
pub struct MemoryTarget {
    settings: TargetSettings,
    capacity: usize,
    buffer: Mutex<VecDeque<Arc<LogEvent>>>,
    metrics: TargetMetrics,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    /// Zero capacity is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_settings("memory", LogLevel::Debug, capacity)
    }

    pub fn with_settings(name: impl Into<String>, minimum_level: LogLevel, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            settings: TargetSettings::new(name, minimum_level),
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity.min(PREALLOCATED_SLOTS))),
            metrics: TargetMetrics::new(),
        }
    }

    /// Snapshot of retained events, oldest first
    ///
    /// Taken under the buffer lock, so it never contains a partial update
    /// and leaves the buffer unchanged.
    pub fn get_recent(&self) -> Vec<Arc<LogEvent>> {
        self.buffer.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MemoryTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl Target for MemoryTarget {
    fn enqueue(&self, event: Arc<LogEvent>) {
        if !self.settings.accepts(event.level()) {
            return;
        }

        let mut buffer = self.buffer.lock();
        if buffer.len() >= self.capacity {
            buffer.pop_front();
            self.metrics.record_dropped();
        }
        buffer.push_back(event);
        self.metrics.record_enqueued();
        self.metrics.record_written(1);
    }

    fn name(&self) -> &str {
        self.settings.name()
    }

    fn minimum_level(&self) -> LogLevel {
        self.settings.minimum_level()
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_enabled()
    }

    fn set_enabled(&self, enabled: bool) {
        self.settings.set_enabled(enabled);
    }

    fn overflow_policy(&self) -> OverflowPolicy {
        OverflowPolicy::DropOldest
    }

    fn metrics(&self) -> &TargetMetrics {
        &self.metrics
    }

    /// Nothing to drain; retained events stay readable
    fn shutdown(&self, _timeout: Duration) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn event(i: usize) -> Arc<LogEvent> {
        Arc::new(LogEvent::new(LogLevel::Info, "Test", format!("event {}", i), Vec::new()))
    }

    fn templates(events: &[Arc<LogEvent>]) -> Vec<String> {
        events.iter().map(|e| e.template().to_string()).collect()
    }

    #[test]
    fn test_keeps_most_recent_oldest_first() {
        let memory = MemoryTarget::with_capacity(3);
        for i in 0..5 {
            memory.enqueue(event(i));
        }

        let first = memory.get_recent();
        assert_eq!(templates(&first), vec!["event 2", "event 3", "event 4"]);

        let second = memory.get_recent();
        assert_eq!(templates(&first), templates(&second));
        assert_eq!(memory.metrics().dropped(), 2);
    }

    #[test]
    fn test_below_capacity() {
        let memory = MemoryTarget::with_capacity(10);
        memory.enqueue(event(0));
        memory.enqueue(event(1));
        assert_eq!(memory.len(), 2);
        assert_eq!(templates(&memory.get_recent()), vec!["event 0", "event 1"]);
    }

    #[test]
    fn test_level_filter_and_clear() {
        let memory = MemoryTarget::with_settings("audit", LogLevel::Error, 5);
        memory.enqueue(event(0));
        assert!(memory.is_empty());

        memory.enqueue(Arc::new(LogEvent::new(LogLevel::Error, "Test", "kept", Vec::new())));
        assert_eq!(memory.len(), 1);

        memory.clear();
        assert!(memory.get_recent().is_empty());
        assert_eq!(memory.name(), "audit");
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let memory = MemoryTarget::with_capacity(0);
        memory.enqueue(event(0));
        memory.enqueue(event(1));
        assert_eq!(templates(&memory.get_recent()), vec!["event 1"]);
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let memory = MemoryTarget::with_capacity(usize::MAX);
        assert_eq!(memory.capacity(), usize::MAX);
        for i in 0..3 {
            memory.enqueue(event(i));
        }
        assert_eq!(templates(&memory.get_recent()), vec!["event 0", "event 1", "event 2"]);
        assert_eq!(memory.metrics().dropped(), 0);
    }

    #[test]
    fn test_concurrent_writers_never_exceed_capacity() {
        let memory = Arc::new(MemoryTarget::with_capacity(50));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let memory = Arc::clone(&memory);
                thread::spawn(move || {
                    for i in 0..500 {
                        memory.enqueue(event(t * 1000 + i));
                        if i % 50 == 0 {
                            assert!(memory.get_recent().len() <= 50);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer panicked");
        }

        let recent = memory.get_recent();
        assert_eq!(recent.len(), 50);
        let mut unique = templates(&recent);
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 50);
    }
}
