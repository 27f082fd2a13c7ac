//! Declarative pipeline configuration
//!
//! A [`LoggingConfig`] is plain data (serde) that can be loaded from JSON and
//! turned into a [`LogPipeline`]. Every field has a default, so `{}` is a
//! valid document describing one console target at `Info`.
//!
//! ```
//! use rust_log_pipeline::core::config::{LoggingConfig, TargetConfig};
//! use rust_log_pipeline::LogLevel;
//!
//! let config = LoggingConfig::from_json_str(r#"{
//!     "minimum_level": "debug",
//!     "targets": [
//!         { "kind": "memory", "name": "recent", "capacity": 50 }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.minimum_level, LogLevel::Debug);
//! assert!(matches!(config.targets[0], TargetConfig::Memory(_)));
//! ```

use super::{
    caller::CallerInfoPolicy,
    diagnostics::Diagnostics,
    error::{LoggerError, Result},
    formatter::{Formatter, TemplateFormatter, DEFAULT_TIME_FORMAT},
    log_level::LogLevel,
    logger::{LogPipeline, Logger},
    target::Target,
};
use crate::targets::{
    ConsoleTarget, FileTarget, MemoryTarget, DEFAULT_BATCH_SIZE, DEFAULT_CONSOLE_CAPACITY,
    DEFAULT_FLUSH_INTERVAL, DEFAULT_MEMORY_CAPACITY, MAX_QUEUE_CAPACITY,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Events below this level are discarded before dispatch
    pub minimum_level: LogLevel,
    pub caller_info: CallerInfoPolicy,
    /// Whether rendered lines carry the caller suffix
    pub include_caller_info: bool,
    /// chrono format string for the header timestamp
    pub time_format: String,
    pub targets: Vec<TargetConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            minimum_level: LogLevel::Info,
            caller_info: CallerInfoPolicy::default(),
            include_caller_info: true,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            targets: vec![TargetConfig::Console(ConsoleConfig::default())],
        }
    }
}

impl LoggingConfig {
    /// Parse and validate a JSON document
    ///
    /// # Errors
    ///
    /// `ConfigParse` for malformed JSON, `InvalidConfiguration` for values
    /// that fail validation
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoggingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading config file",
                format!("cannot read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_format.is_empty() {
            return Err(LoggerError::config("LoggingConfig", "time_format must not be empty"));
        }

        let mut names = HashSet::new();
        for target in &self.targets {
            target.validate()?;
            if !names.insert(target.name()) {
                return Err(LoggerError::config(
                    "LoggingConfig",
                    format!("duplicate target name '{}'", target.name()),
                ));
            }
        }
        Ok(())
    }

    /// Formatter shared by every target of this config
    pub fn formatter(&self) -> Arc<dyn Formatter> {
        Arc::new(
            TemplateFormatter::new()
                .with_caller_info(self.include_caller_info)
                .with_time_format(self.time_format.clone()),
        )
    }

    pub fn build_pipeline(&self) -> Result<LogPipeline> {
        self.build_pipeline_with(Diagnostics::stderr())
    }

    /// Build every target and wrap them in a pipeline
    ///
    /// Targets already started are shut down again if a later one fails.
    pub fn build_pipeline_with(&self, diagnostics: Diagnostics) -> Result<LogPipeline> {
        self.validate()?;

        let formatter = self.formatter();
        let mut targets: Vec<Arc<dyn Target>> = Vec::with_capacity(self.targets.len());
        for config in &self.targets {
            targets.push(config.build(Arc::clone(&formatter), diagnostics.clone())?);
        }

        Ok(LogPipeline::new(self.minimum_level, self.caller_info, targets)
            .with_diagnostics(diagnostics))
    }

    pub fn build_logger(&self, source: impl Into<String>) -> Result<Logger> {
        Ok(Logger::new(self.build_pipeline()?, source))
    }
}

fn check_capacity(component: String, capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(LoggerError::config(component, "capacity must be greater than zero"));
    }
    if capacity > MAX_QUEUE_CAPACITY {
        return Err(LoggerError::config(
            component,
            format!("capacity must not exceed {}", MAX_QUEUE_CAPACITY),
        ));
    }
    Ok(())
}

/// One sink entry, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TargetConfig {
    Console(ConsoleConfig),
    File(FileConfig),
    Memory(MemoryConfig),
}

impl TargetConfig {
    pub fn name(&self) -> &str {
        match self {
            TargetConfig::Console(c) => &c.name,
            TargetConfig::File(c) => &c.name,
            TargetConfig::Memory(c) => &c.name,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name().is_empty() {
            return Err(LoggerError::config("TargetConfig", "target name must not be empty"));
        }
        match self {
            TargetConfig::Console(c) => {
                check_capacity(format!("console target '{}'", c.name), c.capacity)
            }
            TargetConfig::Memory(c) => {
                check_capacity(format!("memory target '{}'", c.name), c.capacity)
            }
            TargetConfig::File(c) if c.path.as_os_str().is_empty() => Err(LoggerError::config(
                format!("file target '{}'", c.name),
                "path must not be empty",
            )),
            TargetConfig::File(c) if c.batch_size == 0 => Err(LoggerError::config(
                format!("file target '{}'", c.name),
                "batch_size must be greater than zero",
            )),
            TargetConfig::File(c) if c.flush_interval_ms == 0 => Err(LoggerError::config(
                format!("file target '{}'", c.name),
                "flush_interval_ms must be greater than zero",
            )),
            _ => Ok(()),
        }
    }

    /// Start the described target
    pub fn build(
        &self,
        formatter: Arc<dyn Formatter>,
        diagnostics: Diagnostics,
    ) -> Result<Arc<dyn Target>> {
        let target: Arc<dyn Target> = match self {
            TargetConfig::Console(c) => Arc::new(
                ConsoleTarget::builder()
                    .name(c.name.clone())
                    .minimum_level(c.minimum_level)
                    .capacity(c.capacity)
                    .use_colors(c.use_colors)
                    .formatter(formatter)
                    .diagnostics(diagnostics)
                    .build()?,
            ),
            TargetConfig::File(c) => Arc::new(
                FileTarget::builder(c.path.clone())
                    .name(c.name.clone())
                    .minimum_level(c.minimum_level)
                    .batch_size(c.batch_size)
                    .flush_interval(Duration::from_millis(c.flush_interval_ms))
                    .formatter(formatter)
                    .diagnostics(diagnostics)
                    .build()?,
            ),
            TargetConfig::Memory(c) => Arc::new(MemoryTarget::with_settings(
                c.name.clone(),
                c.minimum_level,
                c.capacity,
            )),
        };
        Ok(target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub name: String,
    pub minimum_level: LogLevel,
    pub capacity: usize,
    pub use_colors: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            name: "console".to_string(),
            minimum_level: LogLevel::Debug,
            capacity: DEFAULT_CONSOLE_CAPACITY,
            use_colors: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub name: String,
    pub path: PathBuf,
    pub minimum_level: LogLevel,
    pub batch_size: usize,
    pub flush_interval_ms: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            name: "file".to_string(),
            path: PathBuf::new(),
            minimum_level: LogLevel::Debug,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub name: String,
    pub minimum_level: LogLevel,
    pub capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            name: "memory".to_string(),
            minimum_level: LogLevel::Debug,
            capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}
