//! Common utilities for the backend client
//!
//! This module provides shared HTTP plumbing for every API group.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::{ErrorContext, Result, ServiceError};
use crate::util::{sanitize_for_logging, truncate_string};

/// Name used in error contexts and logs
pub const SERVICE_NAME: &str = "edupulse";

/// UserAgent structure for identifying the client to the backend
#[derive(Debug, Clone)]
pub struct UserAgent {
    /// Application name
    pub app_name: String,

    /// Version string
    pub version: String,

    /// Optional extra info
    pub extra: Option<String>,
}

impl Default for UserAgent {
    fn default() -> Self {
        Self {
            app_name: "EduPulse".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            extra: Some("edupulse-sdk".to_string()),
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_name, self.version)?;

        if let Some(ref extra) = self.extra {
            write!(f, " ({})", extra)?;
        }

        Ok(())
    }
}

/// Build an HTTP client with the standard headers and the given timeout
pub fn build_http_client(
    user_agent: &UserAgent,
    timeout: Duration,
    custom_headers: &HashMap<String, String>,
    compression: bool,
) -> Result<Client> {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(&user_agent.to_string())
            .map_err(|e| ServiceError::configuration(format!("Invalid user agent: {}", e)))?,
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    for (key, value) in custom_headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ServiceError::configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ServiceError::configuration(format!("Invalid header value: {}", e)))?;
        headers.insert(name, value);
    }

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .gzip(compression)
        .build()
        .map_err(|e| ServiceError::configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Create error context for an HTTP request
pub fn create_error_context(endpoint: &str, status: Option<StatusCode>) -> ErrorContext {
    let mut context = ErrorContext::for_service(SERVICE_NAME).endpoint(endpoint);

    if let Some(status) = status {
        context = context.status_code(status.as_u16());
    }

    context
}

/// Turn a non-success response into a [`ServiceError::Http`], keeping the
/// JSON body (if any) for message normalization
pub async fn parse_error_response(endpoint: &str, response: reqwest::Response) -> ServiceError {
    let status = response.status();
    let context = create_error_context(endpoint, Some(status));

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            log::debug!("Failed to read error body from {}: {}", endpoint, e);
            String::new()
        }
    };

    let payload = serde_json::from_str::<Value>(&body).ok();

    log::debug!(
        "{} answered {}: {}",
        sanitize_for_logging(endpoint),
        status,
        truncate_string(&sanitize_for_logging(&body), 200)
    );

    ServiceError::http(status.as_u16(), payload).with_context(context)
}

/// Attach the endpoint to a transport error
pub fn transport_error(endpoint: &str, err: reqwest::Error) -> ServiceError {
    ServiceError::from(err).with_context(create_error_context(endpoint, None))
}
