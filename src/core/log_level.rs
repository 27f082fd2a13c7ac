//! Log level definitions

use colored::{ColoredString, Colorize};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[derive(Default)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warning = 2,
    Error = 3,
    Critical = 4,
}

impl LogLevel {
    /// All levels in ascending severity
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Three-letter code used in rendered headers
    pub fn code(&self) -> &'static str {
        level_code(*self as u8)
    }

    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        LogLevel::ALL.get(ordinal as usize).copied()
    }

    /// Console style for this level; Info keeps the terminal default
    pub fn paint(&self, text: &str) -> ColoredString {
        match self {
            LogLevel::Debug => text.dimmed(),
            LogLevel::Info => text.normal(),
            LogLevel::Warning => text.yellow(),
            LogLevel::Error => text.red(),
            LogLevel::Critical => text.bright_red().bold(),
        }
    }
}

/// Header code for a raw level ordinal. Unknown ordinals render as `???`.
pub fn level_code(ordinal: u8) -> &'static str {
    match ordinal {
        0 => "DBG",
        1 => "INF",
        2 => "WRN",
        3 => "ERR",
        4 => "CRT",
        _ => "???",
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" | "DBG" => Ok(LogLevel::Debug),
            "INFO" | "INF" | "INFORMATION" => Ok(LogLevel::Info),
            "WARN" | "WARNING" | "WRN" => Ok(LogLevel::Warning),
            "ERROR" | "ERR" => Ok(LogLevel::Error),
            "CRITICAL" | "CRT" | "FATAL" => Ok(LogLevel::Critical),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Accepts any spelling `FromStr` accepts, so config files may use `"warn"`
impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
