//! Final line rendering for log events
//!
//! A rendered event is
//! `[HH:MM:SS.fff] [LVL] [source] <template body>[ (Extra args: ...)]`
//! followed by the exception and caller suffixes when present. In file mode
//! the caller suffix stays on the first line and the stack trace block comes
//! last, so its closing marker is always a line of its own.

use super::log_event::LogEvent;
use super::template::render_template_into;
use chrono::Local;
use std::fmt::Write;

/// Default header time format (local time, milliseconds)
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S%.3f";

pub const STACK_TRACE_BEGIN: &str = "--- STACK TRACE ---";
pub const STACK_TRACE_END: &str = "-------------------";

/// Turns an event into its output text
///
/// Implementations must not depend on anything but the event and their own
/// configuration; targets call them from their worker threads.
pub trait Formatter: Send + Sync {
    fn render(&self, event: &LogEvent, for_file_output: bool) -> String;
}

/// Formatter for message templates
///
/// # Example
///
/// ```
/// use rust_log_pipeline::core::{Formatter, LogEvent, LogLevel, TemplateFormatter};
///
/// let formatter = TemplateFormatter::new();
/// let event = LogEvent::new(LogLevel::Warning, "App.Db", "Slow query {Ms}", vec![250.into()]);
/// let line = formatter.render(&event, false);
/// assert!(line.ends_with("[WRN] [App.Db] Slow query 250"));
/// ```
#[derive(Debug, Clone)]
pub struct TemplateFormatter {
    include_caller_info: bool,
    time_format: String,
}

impl TemplateFormatter {
    pub fn new() -> Self {
        Self {
            include_caller_info: true,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    /// Whether caller info attached to an event is rendered
    #[must_use]
    pub fn with_caller_info(mut self, include: bool) -> Self {
        self.include_caller_info = include;
        self
    }

    /// strftime-compatible format for the header timestamp
    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    pub fn includes_caller_info(&self) -> bool {
        self.include_caller_info
    }

    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    fn write_header(&self, out: &mut String, event: &LogEvent) {
        let local = event.timestamp().with_timezone(&Local);
        let _ = write!(
            out,
            "[{}] [{}] [{}] ",
            local.format(&self.time_format),
            event.level().code(),
            event.source()
        );
    }

    fn write_exception(out: &mut String, event: &LogEvent, for_file_output: bool) {
        let Some(exception) = event.exception() else {
            return;
        };
        if for_file_output {
            out.push('\n');
            out.push_str(STACK_TRACE_BEGIN);
            out.push('\n');
            out.push_str(exception.detail());
            out.push('\n');
            out.push_str(STACK_TRACE_END);
        } else {
            out.push_str(" | Exception: ");
            out.push_str(exception.message());
        }
    }

    fn write_caller(&self, out: &mut String, event: &LogEvent) {
        if !self.include_caller_info {
            return;
        }
        let Some(caller) = event.caller() else {
            return;
        };

        out.push_str(" (at ");
        out.push_str(caller.member.as_deref().unwrap_or("<unknown>"));
        if let Some(file) = caller.file_name() {
            out.push_str(" in ");
            out.push_str(file);
            if let Some(line) = caller.line {
                let _ = write!(out, ":{}", line);
            }
        }
        out.push(')');
    }
}

impl Default for TemplateFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for TemplateFormatter {
    fn render(&self, event: &LogEvent, for_file_output: bool) -> String {
        let mut out = String::with_capacity(64 + event.template().len());
        self.write_header(&mut out, event);
        render_template_into(&mut out, event.template(), event.args());
        if for_file_output {
            self.write_caller(&mut out, event);
            Self::write_exception(&mut out, event, true);
        } else {
            Self::write_exception(&mut out, event, false);
            self.write_caller(&mut out, event);
        }
        out
    }
}
