//! Dispatcher: level filtering, caller capture and fan-out to targets

use super::{
    arg_value::ArgValue,
    caller::{CallerInfo, CallerInfoPolicy},
    diagnostics::{panic_message, Diagnostics},
    log_event::{ExceptionInfo, LogEvent, UNKNOWN_SOURCE},
    log_level::LogLevel,
    target::Target,
};
use parking_lot::RwLock;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default shutdown timeout for target cleanup (5 seconds)
///
/// Used when a pipeline or target is dropped without explicit shutdown.
/// For custom timeout control, use the `shutdown()` methods instead.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Slot holding the active pipeline; shared by every logger handle of a
/// service so reconfiguration redirects them all.
pub(crate) type PipelineSlot = Arc<RwLock<Arc<LogPipeline>>>;

/// The configured dispatch state: level filter, caller policy, targets
pub struct LogPipeline {
    min_level: LogLevel,
    caller_policy: CallerInfoPolicy,
    targets: Vec<Arc<dyn Target>>,
    diagnostics: Diagnostics,
    shut_down: AtomicBool,
}

impl LogPipeline {
    pub fn new(
        min_level: LogLevel,
        caller_policy: CallerInfoPolicy,
        targets: Vec<Arc<dyn Target>>,
    ) -> Self {
        Self {
            min_level,
            caller_policy,
            targets,
            diagnostics: Diagnostics::stderr(),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Pipeline with no targets; every event is discarded
    pub fn empty() -> Self {
        Self::new(LogLevel::Info, CallerInfoPolicy::default(), Vec::new())
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn caller_policy(&self) -> CallerInfoPolicy {
        self.caller_policy
    }

    pub fn targets(&self) -> &[Arc<dyn Target>] {
        &self.targets
    }

    /// Look up a target by name and concrete type
    pub fn find_target<T: Target + 'static>(&self, name: &str) -> Option<&T> {
        self.targets
            .iter()
            .filter(|target| target.name() == name)
            .find_map(|target| target.as_any().downcast_ref::<T>())
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Hand one event to every target
    ///
    /// Each `enqueue` returns immediately. A panicking target is reported
    /// and skipped so the others still receive the event.
    pub fn dispatch(&self, event: LogEvent) {
        let event = Arc::new(event);
        for (idx, target) in self.targets.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                target.enqueue(Arc::clone(&event))
            }));
            if let Err(panic_info) = result {
                self.diagnostics.critical(&format!(
                    "Target #{} ('{}') panicked in enqueue: {}. \
                     Other targets continue to function.",
                    idx,
                    target.name(),
                    panic_message(panic_info.as_ref())
                ));
            }
        }
    }

    /// Shut every target down within `timeout` overall
    ///
    /// Returns `true` if every target finished cleanly. Only the first call
    /// does any work.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return true;
        }

        let deadline = Instant::now() + timeout;
        let mut clean = true;
        for target in &self.targets {
            let remaining = deadline.saturating_duration_since(Instant::now());
            clean &= target.shutdown(remaining);
        }
        clean
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

impl Drop for LogPipeline {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

/// Handle used by application code to emit events
///
/// Cheap to clone. All handles derived from one builder or service share a
/// pipeline; `create_child` only changes the source name.
#[derive(Clone)]
pub struct Logger {
    slot: PipelineSlot,
    source: Arc<str>,
}

impl Logger {
    pub fn new(pipeline: LogPipeline, source: impl Into<String>) -> Self {
        Self::attached(Arc::new(RwLock::new(Arc::new(pipeline))), source)
    }

    pub(crate) fn attached(slot: PipelineSlot, source: impl Into<String>) -> Self {
        Self {
            slot,
            source: Arc::from(source.into()),
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_log_pipeline::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Debug)
    ///     .source("App")
    ///     .target(MemoryTarget::with_capacity(100))
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Logger for `parent.child`
    ///
    /// A root logger (empty source or `<Unknown>`) uses the child name as-is.
    pub fn create_child(&self, child_name: &str) -> Logger {
        let source = if self.source.is_empty() || &*self.source == UNKNOWN_SOURCE {
            child_name.to_string()
        } else {
            format!("{}.{}", self.source, child_name)
        };
        Self::attached(Arc::clone(&self.slot), source)
    }

    /// Currently active pipeline
    pub fn pipeline(&self) -> Arc<LogPipeline> {
        Arc::clone(&self.slot.read())
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.slot.read().is_enabled(level)
    }

    #[track_caller]
    pub fn log(
        &self,
        level: LogLevel,
        template: impl Into<String>,
        args: Vec<ArgValue>,
        exception: Option<ExceptionInfo>,
    ) {
        self.log_at(level, template, args, exception, None);
    }

    /// `log` with an explicit caller member name (used by the macros)
    #[track_caller]
    pub fn log_at(
        &self,
        level: LogLevel,
        template: impl Into<String>,
        args: Vec<ArgValue>,
        exception: Option<ExceptionInfo>,
        member: Option<&str>,
    ) {
        // Dispatch can reach user callbacks, so the slot lock is not held
        let pipeline = self.pipeline();
        if level < pipeline.min_level() {
            return;
        }

        let mut event = LogEvent::new(level, &*self.source, template, args);
        if pipeline.caller_policy().should_capture(level) {
            event = event.with_caller(CallerInfo::from_location(Location::caller(), member));
        }
        if let Some(exception) = exception {
            event = event.with_exception(exception);
        }

        pipeline.dispatch(event);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, template: impl Into<String>, args: Vec<ArgValue>) {
        self.log(LogLevel::Debug, template, args, None);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, template: impl Into<String>, args: Vec<ArgValue>) {
        self.log(LogLevel::Info, template, args, None);
    }

    #[inline]
    #[track_caller]
    pub fn warning(&self, template: impl Into<String>, args: Vec<ArgValue>) {
        self.log(LogLevel::Warning, template, args, None);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, template: impl Into<String>, args: Vec<ArgValue>) {
        self.log(LogLevel::Error, template, args, None);
    }

    #[inline]
    #[track_caller]
    pub fn critical(&self, template: impl Into<String>, args: Vec<ArgValue>) {
        self.log(LogLevel::Critical, template, args, None);
    }

    /// Log at `Error` with an attached error and its cause chain
    #[track_caller]
    pub fn error_with(
        &self,
        template: impl Into<String>,
        args: Vec<ArgValue>,
        error: &(dyn std::error::Error + 'static),
    ) {
        self.log(LogLevel::Error, template, args, Some(ExceptionInfo::from_error(error)));
    }

    /// Gracefully shut down the active pipeline with a custom timeout
    ///
    /// Pending events are drained where the target supports it.
    ///
    /// # Returns
    ///
    /// `true` if shutdown completed within timeout, `false` otherwise
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_log_pipeline::prelude::*;
    /// use std::time::Duration;
    ///
    /// let logger = Logger::builder()
    ///     .target(FileTarget::new("app.log").unwrap())
    ///     .build();
    /// logger.info("Important message", vec![]);
    ///
    /// if !logger.shutdown(Duration::from_secs(10)) {
    ///     eprintln!("Warning: logger shutdown timed out");
    /// }
    /// ```
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.pipeline().shutdown(timeout)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_log_pipeline::prelude::*;
///
/// let memory = std::sync::Arc::new(MemoryTarget::with_capacity(10));
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .caller_info(CallerInfoPolicy::new(LogLevel::Warning, true))
///     .shared_target(memory.clone())
///     .build();
///
/// logger.info("Started {Name}", vec![NamedArgs::new().with("Name", "api").into()]);
/// assert_eq!(memory.len(), 1);
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    caller_policy: CallerInfoPolicy,
    source: String,
    targets: Vec<Arc<dyn Target>>,
    diagnostics: Diagnostics,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            caller_policy: CallerInfoPolicy::default(),
            source: String::new(),
            targets: Vec::new(),
            diagnostics: Diagnostics::stderr(),
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set which levels capture caller location
    #[must_use = "builder methods return a new value"]
    pub fn caller_info(mut self, policy: CallerInfoPolicy) -> Self {
        self.caller_policy = policy;
        self
    }

    /// Source name of the root logger
    #[must_use = "builder methods return a new value"]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Add a target owned by the pipeline
    #[must_use = "builder methods return a new value"]
    pub fn target<T: Target + 'static>(mut self, target: T) -> Self {
        self.targets.push(Arc::new(target));
        self
    }

    /// Add a target the caller keeps a handle to
    #[must_use = "builder methods return a new value"]
    pub fn shared_target(mut self, target: Arc<dyn Target>) -> Self {
        self.targets.push(target);
        self
    }

    /// Where dispatch-time failures are reported
    #[must_use = "builder methods return a new value"]
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn build_pipeline(self) -> LogPipeline {
        LogPipeline::new(self.min_level, self.caller_policy, self.targets)
            .with_diagnostics(self.diagnostics)
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let source = self.source.clone();
        Logger::new(self.build_pipeline(), source)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
