//! # Rust Log Pipeline
//!
//! Structured, template-based logging with asynchronous fan-out to
//! independently configured targets.
//!
//! ## Features
//!
//! - **Message templates**: positional `{0}` and named `{UserId}` placeholders,
//!   rendered lazily by each target
//! - **Non-blocking dispatch**: every target owns a queue and a worker; a slow
//!   or failing sink never stalls the caller
//! - **Built-in targets**: colored console (bounded, drop-newest), batched
//!   file (unbounded, never drops) and in-memory ring buffer
//! - **Caller info**: file, line and module captured for the levels you choose
//!
//! ## Example
//!
//! ```
//! use rust_log_pipeline::prelude::*;
//! use rust_log_pipeline::{info, named};
//! use std::sync::Arc;
//!
//! let recent = Arc::new(MemoryTarget::with_capacity(100));
//! let logger = Logger::builder()
//!     .min_level(LogLevel::Debug)
//!     .source("App")
//!     .shared_target(recent.clone())
//!     .build();
//!
//! let orders = logger.create_child("Orders");
//! info!(orders, "Order {OrderId} placed by {0}", "alice", named! { OrderId = 1001 });
//!
//! let formatter = TemplateFormatter::new();
//! let line = formatter.render(&recent.get_recent()[0], false);
//! assert!(line.ends_with("[INF] [App.Orders] Order 1001 placed by alice"));
//! ```

pub mod core;
pub mod macros;
pub mod targets;

pub mod prelude {
    pub use crate::core::{
        ArgValue, CallerInfo, CallerInfoPolicy, DiagnosticLevel, Diagnostics, ExceptionInfo,
        Formatter, LogEvent, LogLevel, LogPipeline, Logger, LoggerBuilder, LoggerError,
        LoggingConfig, LoggingService, NamedArgs, OverflowPolicy, Result, ServiceState, Target,
        TargetMetrics, TemplateFormatter, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::targets::{ConsoleTarget, FileTarget, MemoryTarget};
}

pub use crate::core::{
    render_template, ArgValue, CallerInfo, CallerInfoPolicy, DiagnosticCallback,
    DiagnosticLevel, Diagnostics, ExceptionInfo, Formatter, LogEvent, LogLevel, LogPipeline,
    Logger, LoggerBuilder, LoggerError, LoggingConfig, LoggingService, NamedArgs,
    OverflowPolicy, Result, ServiceState, Target, TargetConfig, TargetMetrics,
    TemplateFormatter, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::targets::{
    ConsoleTarget, ConsoleTargetBuilder, FileTarget, FileTargetBuilder, MemoryTarget,
    MAX_QUEUE_CAPACITY,
};
