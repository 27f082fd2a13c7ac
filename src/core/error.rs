//! Error types for the logging pipeline
//!
//! Nothing on the dispatch path returns these; they surface only from
//! construction and configuration calls.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration document could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// The logging service was already explicitly configured
    #[error("Logging service is already configured")]
    AlreadyConfigured,

    /// File target error with path
    #[error("File target error for '{path}': {message}")]
    FileTargetError { path: String, message: String },

    /// Worker thread could not be started
    #[error("Failed to start worker for target '{target}': {message}")]
    WorkerSpawn { target: String, message: String },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file target error
    pub fn file_target(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileTargetError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn already_configured() -> Self {
        LoggerError::AlreadyConfigured
    }

    pub fn worker_spawn(target: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::WorkerSpawn {
            target: target.into(),
            message: message.into(),
        }
    }
}
