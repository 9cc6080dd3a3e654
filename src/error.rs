//! Error types for doc-analytics.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for doc-analytics operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Fatal startup errors (embedded engine failed to open, schema or seed failed).
    #[error("Initialization error: {0}")]
    Init(String),

    /// Local query errors (syntax errors, constraint violations, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Remote analytics errors (HTTP failures, Cube.js error bodies, timeouts).
    #[error("Remote error: {0}")]
    Remote(String),

    /// Configuration errors (invalid config file, bad CLI values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (terminal I/O, unexpected states).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Creates an initialization error with the given message.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a remote analytics error with the given message.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Init(_) => "Initialization Error",
            Self::Query(_) => "Query Error",
            Self::Remote(_) => "Remote Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the bare message without the category prefix.
    ///
    /// The view shows this text to the user behind its own localized prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Init(msg)
            | Self::Query(msg)
            | Self::Remote(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
