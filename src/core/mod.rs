//! Core pipeline types and traits

pub mod arg_value;
pub mod caller;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod formatter;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod service;
pub mod target;
pub mod template;

pub use arg_value::{ArgValue, NamedArgs};
pub use caller::{CallerInfo, CallerInfoPolicy};
pub use config::{ConsoleConfig, FileConfig, LoggingConfig, MemoryConfig, TargetConfig};
pub use diagnostics::{DiagnosticCallback, DiagnosticLevel, Diagnostics};
pub use error::{LoggerError, Result};
pub use formatter::{Formatter, TemplateFormatter, DEFAULT_TIME_FORMAT};
pub use log_event::{ExceptionInfo, LogEvent, UNKNOWN_SOURCE};
pub use log_level::LogLevel;
pub use logger::{LogPipeline, Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::TargetMetrics;
pub use overflow_policy::OverflowPolicy;
pub use service::{LoggingService, ServiceState};
pub use target::{Target, TargetSettings};
pub use template::render_template;
