//! Caller location data and the policy deciding when to capture it

use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::panic::Location;
use std::path::Path;

/// Call-site diagnostics attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerInfo {
    pub member: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl CallerInfo {
    pub fn new(member: Option<&str>, file: Option<&str>, line: Option<u32>) -> Self {
        Self {
            member: member.map(str::to_string),
            file: file.map(str::to_string),
            line,
        }
    }

    /// Build from a `#[track_caller]` location
    pub fn from_location(location: &Location<'_>, member: Option<&str>) -> Self {
        Self::new(member, Some(location.file()), Some(location.line()))
    }

    /// Base name of the source file, without directories
    pub fn file_name(&self) -> Option<&str> {
        self.file.as_deref().map(|file| {
            Path::new(file)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(file)
        })
    }
}

/// Which levels pay for caller-location capture
///
/// Capture happens when the event level is at least `level`, or when the
/// event is `Debug` and `include_debug` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerInfoPolicy {
    pub level: LogLevel,
    pub include_debug: bool,
}

impl CallerInfoPolicy {
    pub fn new(level: LogLevel, include_debug: bool) -> Self {
        Self {
            level,
            include_debug,
        }
    }

    pub fn should_capture(&self, level: LogLevel) -> bool {
        level >= self.level || (level == LogLevel::Debug && self.include_debug)
    }
}

impl Default for CallerInfoPolicy {
    fn default() -> Self {
        Self {
            level: LogLevel::Error,
            include_debug: false,
        }
    }
}
