//! Logging macros
//!
//! The level macros take a logger, a message template and any number of
//! arguments convertible into [`ArgValue`](crate::ArgValue). They record the
//! calling module as the caller member, so caller info reads
//! `(at my_app::handlers in handlers.rs:42)`.
//!
//! # Examples
//!
//! ```
//! use rust_log_pipeline::prelude::*;
//! use rust_log_pipeline::{info, named, warning};
//!
//! let memory = std::sync::Arc::new(MemoryTarget::new());
//! let logger = Logger::builder().shared_target(memory.clone()).build();
//!
//! // Positional placeholders
//! info!(logger, "Server listening on port {0}", 8080);
//!
//! // Named placeholders from a bag passed last
//! warning!(logger, "User {UserId} retried {Count} times", named! { UserId = 42, Count = 3 });
//!
//! assert_eq!(memory.len(), 2);
//! ```

/// Log at an explicit level.
///
/// An `exception = err,` prefix attaches an error and its cause chain.
///
/// # Examples
///
/// ```
/// # use rust_log_pipeline::prelude::*;
/// # let logger = Logger::builder().target(MemoryTarget::new()).build();
/// use rust_log_pipeline::{log, named};
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {0}", 500);
///
/// let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
/// log!(logger, LogLevel::Error, exception = err, "Write to {Path} failed", named! { Path = "/var/data" });
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, exception = $ex:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.log_at(
            $level,
            $template,
            ::std::vec![$($crate::ArgValue::from($arg)),*],
            ::std::option::Option::Some($crate::ExceptionInfo::from_error(&$ex)),
            ::std::option::Option::Some(::std::module_path!()),
        )
    };
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.log_at(
            $level,
            $template,
            ::std::vec![$($crate::ArgValue::from($arg)),*],
            ::std::option::Option::None,
            ::std::option::Option::Some(::std::module_path!()),
        )
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_pipeline::prelude::*;
/// # let logger = Logger::builder().min_level(LogLevel::Debug).target(MemoryTarget::new()).build();
/// use rust_log_pipeline::debug;
/// debug!(logger, "Cache miss for {0}", "user:42");
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($rest)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($rest)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($rest)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_pipeline::prelude::*;
/// # let logger = Logger::builder().target(MemoryTarget::new()).build();
/// use rust_log_pipeline::error;
/// error!(logger, "Connection to {0} refused", "db-1");
///
/// let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
/// error!(logger, exception = err, "Query failed");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($rest)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($rest)+)
    };
}

/// Build a [`NamedArgs`](crate::NamedArgs) bag, keeping insertion order.
///
/// # Examples
///
/// ```
/// use rust_log_pipeline::named;
///
/// let args = named! { UserId = 42, Name = "alice" };
/// assert_eq!(args.get("userid").map(ToString::to_string), Some("42".to_string()));
///
/// let quoted = named! { "Request-Id" => "abc" };
/// assert_eq!(quoted.len(), 1);
/// ```
#[macro_export]
macro_rules! named {
    () => {
        $crate::NamedArgs::new()
    };
    ($($key:ident = $value:expr),+ $(,)?) => {
        $crate::NamedArgs::new()$(.with(::std::stringify!($key), $value))+
    };
    ($($key:literal => $value:expr),+ $(,)?) => {
        $crate::NamedArgs::new()$(.with($key, $value))+
    };
}
