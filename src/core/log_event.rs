//! Log event structure

use super::arg_value::ArgValue;
use super::caller::CallerInfo;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::fmt;

/// Source name used when the caller does not supply one
pub const UNKNOWN_SOURCE: &str = "<Unknown>";

/// Error payload carried by an event
///
/// `message` is the one-line summary used by console output; `detail` is the
/// multi-line block written to files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    message: String,
    detail: String,
}

impl ExceptionInfo {
    pub fn new(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// Capture an error and its `source()` chain
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let message = error.to_string();
        let mut detail = message.clone();
        let mut source = error.source();
        while let Some(cause) = source {
            detail.push_str("\n  caused by: ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message, detail }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl<E: std::error::Error + 'static> From<&E> for ExceptionInfo {
    fn from(error: &E) -> Self {
        Self::from_error(error)
    }
}

/// One logging occurrence
///
/// Fields are fixed at construction. The dispatcher wraps each event in an
/// `Arc` and every target reads the same instance.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    timestamp: DateTime<Utc>,
    level: LogLevel,
    source: String,
    template: String,
    args: Vec<ArgValue>,
    exception: Option<ExceptionInfo>,
    caller: Option<CallerInfo>,
}

impl LogEvent {
    pub fn new(
        level: LogLevel,
        source: impl Into<String>,
        template: impl Into<String>,
        args: Vec<ArgValue>,
    ) -> Self {
        let source = source.into();
        Self {
            timestamp: Utc::now(),
            level,
            source: if source.is_empty() {
                UNKNOWN_SOURCE.to_string()
            } else {
                source
            },
            template: template.into(),
            args,
            exception: None,
            caller: None,
        }
    }

    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    pub fn with_caller(mut self, caller: CallerInfo) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn args(&self) -> &[ArgValue] {
        &self.args
    }

    pub fn exception(&self) -> Option<&ExceptionInfo> {
        self.exception.as_ref()
    }

    pub fn caller(&self) -> Option<&CallerInfo> {
        self.caller.as_ref()
    }
}
