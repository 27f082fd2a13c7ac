//! Target trait for log output destinations

use super::{
    log_event::LogEvent, log_level::LogLevel, metrics::TargetMetrics,
    overflow_policy::OverflowPolicy,
};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A configured destination for log events
///
/// `enqueue` must return without waiting on sink I/O. Each implementation
/// owns its queue and decides what to do when it is full (see
/// [`OverflowPolicy`]). `shutdown` is idempotent and bounded by `timeout`.
pub trait Target: Send + Sync {
    fn enqueue(&self, event: Arc<LogEvent>);

    fn name(&self) -> &str;

    fn minimum_level(&self) -> LogLevel;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&self, enabled: bool);

    fn overflow_policy(&self) -> OverflowPolicy;

    fn metrics(&self) -> &TargetMetrics;

    /// Stop accepting events and release the sink
    ///
    /// Returns `false` if pending work could not be finished within `timeout`.
    fn shutdown(&self, timeout: Duration) -> bool;

    fn as_any(&self) -> &dyn Any;

    /// Whether an event at `level` would be accepted right now
    fn accepts(&self, level: LogLevel) -> bool {
        self.is_enabled() && level >= self.minimum_level()
    }
}

/// Name, level filter and enable switch shared by all targets
#[derive(Debug)]
pub struct TargetSettings {
    name: String,
    minimum_level: LogLevel,
    enabled: AtomicBool,
}

impl TargetSettings {
    pub fn new(name: impl Into<String>, minimum_level: LogLevel) -> Self {
        Self {
            name: name.into(),
            minimum_level,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn minimum_level(&self) -> LogLevel {
        self.minimum_level
    }

    /// Checked once per enqueue; toggling does not affect queued events
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn accepts(&self, level: LogLevel) -> bool {
        self.is_enabled() && level >= self.minimum_level
    }
}
