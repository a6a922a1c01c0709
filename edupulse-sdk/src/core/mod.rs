//! Core abstractions for the EduPulse SDK
//!
//! This module provides the trait interfaces the backend client implements:
//!
//! - `ServiceClient`: identity and health of a backend
//! - `RequestExecutor`: single-attempt typed HTTP requests
//! - `ClientBuilder`: Builder pattern for creating clients

pub mod builder;
pub use builder::ClientBuilder;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Base trait for service clients
#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// The client name/identifier
    fn name(&self) -> &str;

    /// The base URL for the service
    fn base_url(&self) -> &str;

    /// Service version
    fn version(&self) -> &str;

    /// Health check for the service
    async fn health_check(&self) -> Result<bool>;
}

/// Executes one HTTP request with strong typing
///
/// Implementations make exactly one attempt; retrying is the caller's job.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Execute a GET request
    async fn get<R>(&self, endpoint: &str, query_params: Option<HashMap<String, String>>) -> Result<R>
    where
        R: DeserializeOwned + Send;

    /// Execute a POST request with a JSON body
    async fn post<T, R>(&self, endpoint: &str, body: &T) -> Result<R>
    where
        T: Serialize + Send + Sync,
        R: DeserializeOwned + Send;

    /// Execute a DELETE request
    async fn delete<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned + Send;
}
