//! Client builder implementation
//!
//! Provides the builder used to create and configure an [`EduPulseClient`].

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::config::EduPulseConfig;
use crate::error::{Result, ServiceError};
use crate::privacy::PhoneHasher;
use crate::resilience::{RetryExecutor, RetryPolicy};
use crate::services::common::{build_http_client, UserAgent};
use crate::services::EduPulseClient;
use crate::store::Preferences;

/// Builder for [`EduPulseClient`]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    /// Base URL for the backend
    base_url: String,

    /// Custom headers to include with all requests
    custom_headers: HashMap<String, String>,

    /// Timeout for API calls
    timeout: Duration,

    /// Timeout for file downloads
    download_timeout: Duration,

    /// Retry policy for every call
    retry_policy: RetryPolicy,

    /// Salt for phone hashing
    demo_salt: String,

    /// User agent
    user_agent: UserAgent,

    /// Enable response compression
    compression: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::from_config(&EduPulseConfig::default())
    }
}

impl ClientBuilder {
    /// Create a new client builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration
    pub fn from_config(config: &EduPulseConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            custom_headers: HashMap::new(),
            timeout: config.timeout(),
            download_timeout: config.download_timeout(),
            retry_policy: config.retry_policy(),
            demo_salt: config.demo_salt.clone(),
            user_agent: UserAgent::default(),
            compression: true,
        }
    }

    /// Set the base URL for the backend
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Use the saved base URL override, when there is one
    pub async fn with_saved_base_url(mut self, preferences: &Preferences) -> Result<Self> {
        if let Some(url) = preferences.api_base_url().await? {
            log::debug!("Using saved API base URL {}", url);
            self.base_url = url;
        }
        Ok(self)
    }

    /// Add a custom header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set file download timeout
    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Configure retry behavior
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Set the phone hashing salt
    pub fn demo_salt(mut self, salt: impl Into<String>) -> Self {
        self.demo_salt = salt.into();
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: UserAgent) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Enable or disable compression
    pub fn compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<EduPulseClient> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            ServiceError::configuration(format!("Invalid API base URL {}: {}", self.base_url, e))
        })?;

        let http_client =
            build_http_client(&self.user_agent, self.timeout, &self.custom_headers, self.compression)?;
        let download_client = build_http_client(
            &self.user_agent,
            self.download_timeout,
            &self.custom_headers,
            self.compression,
        )?;

        log::debug!("Building EduPulse client for {} ({})", base_url, self.retry_policy);

        Ok(EduPulseClient::from_parts(
            http_client,
            download_client,
            base_url,
            RetryExecutor::new(self.retry_policy),
            PhoneHasher::new(self.demo_salt),
        ))
    }
}
