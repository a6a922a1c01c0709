//! Resilience patterns for backend calls
//!
//! This module provides:
//! - Retry with exponential backoff ([`RetryExecutor`])
//! - The normalized response envelope returned by every call ([`ApiResponse`])
//! - The persisted offline-fallback state machine ([`OfflineFallback`])

mod fallback;
mod retry;

pub use fallback::{
    FallbackSnapshot, FallbackState, OfflineFallback, DEFAULT_FAILURE_THRESHOLD,
    FAILURE_COUNT_KEY, MOCK_MODE_KEY,
};
pub use retry::{call, call_with, RetryExecutor, RetryPolicy};

use serde::Serialize;

/// The uniform outcome of a backend call
///
/// Exactly one of `data` and `error` is populated, and `ok` is true exactly
/// when `data` is. The constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful outcome carrying `data`
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// A failed outcome carrying a user-facing message
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Whether the call succeeded
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Transform the payload of a successful outcome
    pub fn map<U, F>(self, f: F) -> ApiResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        match self.into_result() {
            Ok(data) => ApiResponse::success(f(data)),
            Err(error) => ApiResponse::failure(error),
        }
    }

    /// Convert into a standard `Result` with the normalized message as error
    pub fn into_result(self) -> std::result::Result<T, String> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(error),
            (None, None) => Err("Request failed".to_string()),
        }
    }
}

impl<T> From<std::result::Result<T, String>> for ApiResponse<T> {
    fn from(result: std::result::Result<T, String>) -> Self {
        match result {
            Ok(data) => ApiResponse::success(data),
            Err(error) => ApiResponse::failure(error),
        }
    }
}
