//! Host-owned logging entry point
//!
//! A [`LoggingService`] hands out [`Logger`] handles and moves through
//! `Uninitialized -> DefaultActive -> Configured`, never backwards. The first
//! logger request activates the default configuration; one explicit
//! `configure` call may replace it. Loggers handed out earlier follow the
//! replacement because they share the service's pipeline slot.

use super::{
    config::LoggingConfig,
    diagnostics::Diagnostics,
    error::{LoggerError, Result},
    logger::{LogPipeline, Logger, PipelineSlot, DEFAULT_SHUTDOWN_TIMEOUT},
};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// No pipeline yet; events are discarded
    Uninitialized,
    /// Running `LoggingConfig::default()`
    DefaultActive,
    /// Running a configuration supplied by the host
    Configured,
}

pub struct LoggingService {
    state: Mutex<ServiceState>,
    slot: PipelineSlot,
    default_config: LoggingConfig,
    diagnostics: Diagnostics,
}

impl LoggingService {
    pub fn new() -> Self {
        Self::with_default_config(LoggingConfig::default())
    }

    /// Service whose `DefaultActive` state runs `config` instead of the
    /// built-in default
    pub fn with_default_config(config: LoggingConfig) -> Self {
        Self {
            state: Mutex::new(ServiceState::Uninitialized),
            slot: Arc::new(RwLock::new(Arc::new(LogPipeline::empty()))),
            default_config: config,
            diagnostics: Diagnostics::stderr(),
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn state(&self) -> ServiceState {
        *self.state.lock()
    }

    /// Logger for `source`, activating the default pipeline on first use
    pub fn logger(&self, source: impl Into<String>) -> Logger {
        self.ensure_active();
        Logger::attached(Arc::clone(&self.slot), source)
    }

    /// Apply `config` as the one explicit configuration
    ///
    /// # Errors
    ///
    /// `AlreadyConfigured` on a second call; otherwise whatever building the
    /// targets reports. A failed call leaves the current state untouched.
    pub fn configure(&self, config: &LoggingConfig) -> Result<()> {
        self.install(|| config.build_pipeline_with(self.diagnostics.clone()))
    }

    /// Apply a pipeline assembled with `LoggerBuilder::build_pipeline`
    pub fn configure_pipeline(&self, pipeline: LogPipeline) -> Result<()> {
        self.install(move || Ok(pipeline))
    }

    fn install(&self, build: impl FnOnce() -> Result<LogPipeline>) -> Result<()> {
        let mut state = self.state.lock();
        if *state == ServiceState::Configured {
            return Err(LoggerError::already_configured());
        }

        let pipeline = Arc::new(build()?);
        let previous = std::mem::replace(&mut *self.slot.write(), pipeline);
        *state = ServiceState::Configured;
        drop(state);

        if !previous.shutdown(DEFAULT_SHUTDOWN_TIMEOUT) {
            self.diagnostics
                .warning("Previous logging pipeline did not shut down cleanly");
        }
        Ok(())
    }

    fn ensure_active(&self) {
        let mut state = self.state.lock();
        if *state != ServiceState::Uninitialized {
            return;
        }

        match self
            .default_config
            .build_pipeline_with(self.diagnostics.clone())
        {
            Ok(pipeline) => *self.slot.write() = Arc::new(pipeline),
            Err(e) => self.diagnostics.error(&format!(
                "Failed to start default logging pipeline: {}. Events will be discarded.",
                e
            )),
        }
        *state = ServiceState::DefaultActive;
    }

    /// Currently active pipeline
    pub fn pipeline(&self) -> Arc<LogPipeline> {
        Arc::clone(&self.slot.read())
    }

    /// Drain and stop the active pipeline's targets
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.pipeline().shutdown(timeout)
    }
}

impl Default for LoggingService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoggingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingService")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{MemoryConfig, TargetConfig};
    use crate::core::LogLevel;
    use crate::targets::MemoryTarget;

    fn memory_config(name: &str) -> LoggingConfig {
        LoggingConfig {
            minimum_level: LogLevel::Debug,
            targets: vec![TargetConfig::Memory(MemoryConfig {
                name: name.to_string(),
                ..MemoryConfig::default()
            })],
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn test_lifecycle_transitions() {
        let service = LoggingService::with_default_config(memory_config("default"));
        assert_eq!(service.state(), ServiceState::Uninitialized);

        let _logger = service.logger("App");
        assert_eq!(service.state(), ServiceState::DefaultActive);

        service.configure(&memory_config("configured")).unwrap();
        assert_eq!(service.state(), ServiceState::Configured);

        let err = service.configure(&memory_config("again")).unwrap_err();
        assert!(matches!(err, LoggerError::AlreadyConfigured));
        assert_eq!(service.state(), ServiceState::Configured);
    }

    #[test]
    fn test_configure_without_default_phase() {
        let service = LoggingService::with_default_config(memory_config("default"));
        service.configure(&memory_config("configured")).unwrap();

        service.logger("App").info("hello", vec![]);

        let pipeline = service.pipeline();
        assert_eq!(
            pipeline.find_target::<MemoryTarget>("configured").unwrap().len(),
            1
        );
    }

    #[test]
    fn test_existing_loggers_follow_reconfiguration() {
        let service = LoggingService::with_default_config(memory_config("default"));
        let logger = service.logger("App");
        logger.info("before", vec![]);
        let default_pipeline = service.pipeline();

        service.configure(&memory_config("configured")).unwrap();
        logger.info("after", vec![]);

        let default_memory = default_pipeline.find_target::<MemoryTarget>("default").unwrap();
        assert_eq!(default_memory.get_recent()[0].template(), "before");
        assert_eq!(default_memory.len(), 1);
        assert!(default_pipeline.is_shut_down());

        let configured = service.pipeline();
        let memory = configured.find_target::<MemoryTarget>("configured").unwrap();
        assert_eq!(memory.get_recent()[0].template(), "after");
    }

    #[test]
    fn test_failed_configure_keeps_state() {
        let service = LoggingService::with_default_config(memory_config("default"));
        let _logger = service.logger("App");

        let mut bad = memory_config("bad");
        bad.targets.push(TargetConfig::Memory(MemoryConfig {
            capacity: 0,
            ..MemoryConfig::default()
        }));
        assert!(service.configure(&bad).is_err());
        assert_eq!(service.state(), ServiceState::DefaultActive);

        service.configure(&memory_config("good")).unwrap();
        assert_eq!(service.state(), ServiceState::Configured);
    }

    #[test]
    fn test_configure_pipeline_from_builder() {
        let memory = Arc::new(MemoryTarget::with_capacity(8));
        let pipeline = Logger::builder()
            .min_level(LogLevel::Warning)
            .shared_target(memory.clone())
            .build_pipeline();

        let service = LoggingService::new();
        service.configure_pipeline(pipeline).unwrap();

        let logger = service.logger("Api");
        logger.info("filtered", vec![]);
        logger.warning("kept", vec![]);
        assert_eq!(memory.len(), 1);
        assert!(service.shutdown(Duration::from_secs(1)));
    }
}
