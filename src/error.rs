//! Error types for archive-dl
//!
//! This module provides the error taxonomy for the library, including:
//! - Request-side errors (validation, lookup, conflict, capacity, media type)
//! - Pipeline-side errors (transport, storage) that are recorded on a task
//! - HTTP status code mapping for API integration
//! - The JSON error body returned by the REST API

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for archive-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for archive-dl
///
/// Request handlers surface these as an HTTP status plus a JSON body. The
/// pipeline never returns them to a caller; it stores their display string
/// on the task record instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "port")
        key: Option<String>,
    },

    /// Bad or empty request body
    #[error("{0}")]
    Validation(String),

    /// Unknown task id or missing archive
    #[error("{0}")]
    NotFound(String),

    /// Mutation of a task that is not in a state that accepts it
    #[error("{0}")]
    Conflict(String),

    /// Admission ceiling reached
    #[error("server busy")]
    Busy {
        /// Number of tasks currently waiting or in progress
        active: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// No submitted URL matched an allowed extension
    #[error("only {} allowed", .allowed.join(", "))]
    UnsupportedMediaType {
        /// The configured allow-list
        allowed: Vec<String>,
        /// Extensions of the rejected URLs, in input order
        rejected: Vec<String>,
    },

    /// Download of a remote file failed
    #[error("can't download {url}: {reason}")]
    Transport {
        /// The offending URL
        url: String,
        /// Why the fetch failed
        reason: String,
    },

    /// Local write or archive failure
    #[error("storage error at {}: {reason}", .path.display())]
    Storage {
        /// File or directory the operation targeted
        path: PathBuf,
        /// Why the operation failed
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request method not supported on an existing path
    #[error("method is not allowed")]
    MethodNotAllowed,

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Shutdown in progress - not accepting new work
    #[error("shutdown in progress: not accepting new tasks")]
    ShuttingDown,
}

impl Error {
    /// Shorthand for a storage error on `path`
    pub fn storage(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Error::Storage {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a transport error on `url`
    pub fn transport(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "server busy",
///   "code": "server_busy"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
        }
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Validation(_) => 400,
            Error::Config { .. } => 400,

            Error::NotFound(_) => 404,
            Error::MethodNotAllowed => 405,
            Error::Conflict(_) => 409,
            Error::UnsupportedMediaType { .. } => 415,
            Error::Busy { .. } => 429,

            // 500 Internal Server Error - Server-side issues
            Error::Storage { .. } => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,

            // 502 Bad Gateway - Remote file server errors
            Error::Transport { .. } => 502,

            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::Busy { .. } => "server_busy",
            Error::UnsupportedMediaType { .. } => "unsupported_media_type",
            Error::Transport { .. } => "transport_error",
            Error::Storage { .. } => "storage_error",
            Error::Io(_) => "io_error",
            Error::MethodNotAllowed => "method_not_allowed",
            Error::ApiServerError(_) => "api_server_error",
            Error::ShuttingDown => "shutting_down",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError::new(error.error_code(), error.to_string())
    }
}
