//! # EduPulse SDK
//!
//! Client library for the EduPulse teacher-support backend.
//!
//! This crate provides:
//!
//! - A typed client for the teacher, DIET and LFA endpoints
//! - Bounded retry with exponential backoff and error normalization into a
//!   uniform [`ApiResponse`] envelope
//! - An offline-fallback state machine that switches to bundled demo data
//!   after repeated failures
//! - Phone number hashing and photo compression before upload
//! - Configuration management utilities
//!
//! ## Architecture
//!
//! - `ServiceClient` / `RequestExecutor`: the single-attempt HTTP layer
//! - `RetryExecutor`: retries transient failures and normalizes the outcome
//! - `OfflineFallback`: persisted failure counter and mock-mode flag
//! - `EduPulse`: the session facade most applications use

// Re-export core modules
pub mod core;
pub use core::{ClientBuilder, RequestExecutor, ServiceClient};

// Re-export service-specific modules
pub mod services;
pub use services::{diet, lfa, teacher, EduPulseClient};

// Re-export error handling
pub mod error;
pub use error::{ErrorContext, Result, ServiceError};

// Re-export resilience patterns
pub mod resilience;
pub use resilience::{ApiResponse, FallbackState, OfflineFallback, RetryExecutor, RetryPolicy};

// Re-export configuration management
pub mod config;
pub use config::{ConfigProvider, EduPulseConfig};

pub mod media;
pub mod mock;
pub mod privacy;
pub mod session;
pub mod store;
pub mod topics;

pub use session::{DataSource, EduPulse, QueryDraft, Served};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, SharedStore};

// Utility module for common functionality
mod util;

#[cfg(test)]
mod tests;

/// Create a new default client builder
pub fn client() -> core::ClientBuilder {
    core::ClientBuilder::new()
}
