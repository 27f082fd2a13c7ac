//! Fallback diagnostic channel
//!
//! Sink failures, worker panics and shutdown timeouts cannot be returned to
//! the code that logged the event, since `enqueue` has already returned.
//! They are written to stderr with a `[LOGGER ...]` prefix and, if a
//! callback is installed, forwarded to it.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warning,
    Error,
    Critical,
}

impl DiagnosticLevel {
    fn prefix(&self) -> &'static str {
        match self {
            DiagnosticLevel::Warning => "[LOGGER WARNING]",
            DiagnosticLevel::Error => "[LOGGER ERROR]",
            DiagnosticLevel::Critical => "[LOGGER CRITICAL]",
        }
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Callback receiving internal diagnostics
pub type DiagnosticCallback = Arc<dyn Fn(DiagnosticLevel, &str) + Send + Sync>;

/// Where a target reports failures it cannot propagate
#[derive(Clone, Default)]
pub struct Diagnostics {
    callback: Option<DiagnosticCallback>,
    quiet: bool,
}

impl Diagnostics {
    /// Report to stderr only
    pub fn stderr() -> Self {
        Self::default()
    }

    /// Report to stderr and to `callback`
    pub fn with_callback(callback: DiagnosticCallback) -> Self {
        Self {
            callback: Some(callback),
            quiet: false,
        }
    }

    /// Report only to `callback`, leaving stderr untouched
    pub fn callback_only(callback: DiagnosticCallback) -> Self {
        Self {
            callback: Some(callback),
            quiet: true,
        }
    }

    pub fn report(&self, level: DiagnosticLevel, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", level, message);
        }
        if let Some(ref callback) = self.callback {
            callback(level, message);
        }
    }

    pub fn warning(&self, message: &str) {
        self.report(DiagnosticLevel::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.report(DiagnosticLevel::Error, message);
    }

    pub fn critical(&self, message: &str) {
        self.report(DiagnosticLevel::Critical, message);
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("callback", &self.callback.is_some())
            .field("quiet", &self.quiet)
            .finish()
    }
}

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
