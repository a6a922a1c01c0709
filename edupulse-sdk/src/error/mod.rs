//! Error handling for the EduPulse SDK
//!
//! This module provides the error system used by every layer of the client:
//! - Categorizes failures by origin (transport, HTTP status, local processing)
//! - Adds context (endpoint, status, attempts) for debugging
//! - Feeds the normalization in [`mapping`] that turns errors into user-facing messages
//! - Provides a convenient Result type alias

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub mod mapping;

/// Result type for EduPulse SDK operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Main error type for the EduPulse SDK
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No response was received from the server
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded its deadline before a response arrived
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// The server answered with a non-success status
    #[error("HTTP error {status}")]
    Http {
        status: u16,
        payload: Option<Value>,
    },

    /// Request validation errors detected on the client
    #[error("Validation error: {0}")]
    Validation(String),

    /// Response parsing errors
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Persisted client state could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Image decode/encode failures
    #[error("Image error: {0}")]
    Image(String),

    /// File download failures
    #[error("Download error: {0}")]
    Download(String),

    /// Unexpected or internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Errors with additional context
    #[error("{inner}")]
    WithContext {
        inner: Box<ServiceError>,
        context: ErrorContext,
    },
}

impl ServiceError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        ServiceError::Network(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        ServiceError::Timeout(message.into())
    }

    /// Create an HTTP status error with an optional JSON payload
    pub fn http(status: u16, payload: Option<Value>) -> Self {
        ServiceError::Http { status, payload }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    /// Create a parsing error
    pub fn parsing(message: impl Into<String>) -> Self {
        ServiceError::Parsing(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        ServiceError::Configuration(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        ServiceError::Storage(message.into())
    }

    /// Create an image processing error
    pub fn image(message: impl Into<String>) -> Self {
        ServiceError::Image(message.into())
    }

    /// Create a download error
    pub fn download(message: impl Into<String>) -> Self {
        ServiceError::Download(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::Internal(message.into())
    }

    /// Add context to an existing error
    pub fn with_context(self, context: ErrorContext) -> Self {
        ServiceError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// Add a single context key/value to an existing error
    pub fn with_context_value(self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        let mut context = ErrorContext::new();
        context.add(key, value);
        self.with_context(context)
    }

    /// The innermost error, with all context layers removed
    pub fn root(&self) -> &ServiceError {
        match self {
            ServiceError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Get the HTTP status code if the server responded
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceError::Http { status, .. } => Some(*status),
            ServiceError::WithContext { inner, context } => {
                inner.status_code().or(context.status_code)
            }
            _ => None,
        }
    }

    /// Get the server payload attached to an HTTP error
    pub fn payload(&self) -> Option<&Value> {
        match self.root() {
            ServiceError::Http { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// Get the endpoint recorded in the error context, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ServiceError::WithContext { inner, context } => {
                context.endpoint.as_deref().or_else(|| inner.endpoint())
            }
            _ => None,
        }
    }

    /// True when no response was received (connect failure or timeout)
    pub fn is_no_response(&self) -> bool {
        matches!(self.root(), ServiceError::Network(_) | ServiceError::Timeout(_))
    }

    /// Check if this error is worth retrying
    ///
    /// Transient failures are missing responses and gateway statuses
    /// (502, 503, 504).
    pub fn is_transient(&self) -> bool {
        match self.root() {
            ServiceError::Network(_) | ServiceError::Timeout(_) => true,
            ServiceError::Http { status, .. } => mapping::is_transient_status(*status),
            _ => false,
        }
    }

    /// Check if this is a permanent error (not retryable)
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

/// Error context information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Component that generated the error
    pub service: String,

    /// Time the error was recorded
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// HTTP status code if applicable
    pub status_code: Option<u16>,

    /// Request ID for tracing
    pub request_id: Option<String>,

    /// Endpoint that was called
    pub endpoint: Option<String>,

    /// Additional context data
    pub data: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            service: "edupulse".to_string(),
            timestamp: Some(chrono::Utc::now()),
            status_code: None,
            request_id: None,
            endpoint: None,
            data: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new error context for a specific component
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    /// Add an HTTP status code
    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Add a request ID
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Add an endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add a context value
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.data.insert(key.into(), value.to_string());
    }

    /// Add a context value and return self (builder pattern)
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.add(key, value);
        self
    }
}

/// Convert reqwest errors to ServiceError
impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() || err.is_request() || err.is_redirect() || err.is_body() {
            ServiceError::network(format!("Connection error: {}", err))
        } else if err.is_decode() {
            ServiceError::parsing(format!("Response decode error: {}", err))
        } else if let Some(status) = err.status() {
            ServiceError::http(status.as_u16(), None)
        } else {
            ServiceError::internal(format!("HTTP client error: {}", err))
        }
    }
}

/// Convert serde_json errors to ServiceError
impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::parsing(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::storage(err.to_string())
    }
}

impl From<image::ImageError> for ServiceError {
    fn from(err: image::ImageError) -> Self {
        ServiceError::image(err.to_string())
    }
}
