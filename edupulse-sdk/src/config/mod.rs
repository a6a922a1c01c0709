//! Configuration management for the EduPulse client
//!
//! This module provides utilities for loading and validating client
//! configuration, with support for environment variables.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ServiceError};
use crate::privacy::DEFAULT_DEMO_SALT;
use crate::resilience::{RetryPolicy, DEFAULT_FAILURE_THRESHOLD};

/// Default backend location
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse::<i64>()
            .map_err(|e| ServiceError::configuration(format!("Invalid integer for key {}: {}", key, e)))
    }

    /// Get a boolean configuration value
    fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get_string(key)?;
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(ServiceError::configuration(format!(
                "Invalid boolean value for key {}: {}",
                key, value
            ))),
        }
    }

    /// Get a typed configuration value by parsing from string
    fn get_parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ServiceError::configuration(format!("Invalid value for key {}: {}", key, e)))
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get a boolean configuration value with a default
    fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// Get a parsed value, falling back to `default` only when the key is
    /// absent; a present but malformed value is an error
    fn get_parsed_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        match self.get_string(key) {
            Ok(_) => self.get_parsed(key),
            Err(_) => Ok(default),
        }
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));
        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                ServiceError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => ServiceError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider with initial values
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// A composite config provider that tries multiple providers in order
#[derive(Default)]
pub struct CompositeConfigProvider {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider to the end of the chain
    pub fn add_provider(&mut self, provider: impl ConfigProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// Builder-style variant of [`add_provider`](Self::add_provider)
    pub fn with_provider(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.add_provider(provider);
        self
    }
}

impl ConfigProvider for CompositeConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.providers
            .iter()
            .find_map(|provider| provider.get_string(key).ok())
            .ok_or_else(|| {
                ServiceError::configuration(format!(
                    "Configuration key not found in any provider: {}",
                    key
                ))
            })
    }
}

/// Global default configuration provider (`EDUPULSE_*` environment variables)
pub static DEFAULT_PROVIDER: Lazy<Arc<EnvConfigProvider>> =
    Lazy::new(|| Arc::new(EnvConfigProvider::new().with_prefix("EDUPULSE")));

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EduPulseConfig {
    /// Backend base URL
    pub base_url: String,

    /// Timeout for ordinary API calls
    pub timeout_seconds: u64,

    /// Timeout for file downloads
    pub download_timeout_seconds: u64,

    /// Salt mixed into phone numbers before hashing
    pub demo_salt: String,

    /// Retries after the first attempt on transient failures
    pub retries: u32,

    /// Delay before the first retry
    pub initial_delay_ms: u64,

    /// Consecutive failures that switch the client into mock mode
    pub failure_threshold: u32,
}

impl Default for EduPulseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 10,
            download_timeout_seconds: 30,
            demo_salt: DEFAULT_DEMO_SALT.to_string(),
            retries: 1,
            initial_delay_ms: 500,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

impl EduPulseConfig {
    /// Load configuration from a config provider; absent keys take defaults
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            base_url: provider.get_string_or("api_base_url", &defaults.base_url),
            timeout_seconds: provider.get_parsed_or("timeout_seconds", defaults.timeout_seconds)?,
            download_timeout_seconds: provider
                .get_parsed_or("download_timeout_seconds", defaults.download_timeout_seconds)?,
            demo_salt: provider.get_string_or("demo_salt", &defaults.demo_salt),
            retries: provider.get_parsed_or("retries", defaults.retries)?,
            initial_delay_ms: provider.get_parsed_or("initial_delay_ms", defaults.initial_delay_ms)?,
            failure_threshold: provider
                .get_parsed_or("failure_threshold", defaults.failure_threshold)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `EDUPULSE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&**DEFAULT_PROVIDER)
    }

    /// Validate this configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ServiceError::configuration("API base URL is required"));
        }

        Url::parse(&self.base_url).map_err(|e| {
            ServiceError::configuration(format!("Invalid API base URL {}: {}", self.base_url, e))
        })?;

        if self.timeout_seconds == 0 || self.download_timeout_seconds == 0 {
            return Err(ServiceError::configuration("Timeouts must be at least one second"));
        }

        if self.failure_threshold == 0 {
            return Err(ServiceError::configuration("Failure threshold must be at least 1"));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_seconds)
    }

    /// The retry policy described by this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_retries(self.retries).initial_delay(Duration::from_millis(self.initial_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("key1", "value1");
        provider.set("key2", "123");

        assert_eq!(provider.get_string("key1").unwrap(), "value1");
        assert_eq!(provider.get_int("key2").unwrap(), 123);
        assert!(provider.get_string("key3").is_err());
    }

    #[test]
    fn test_env_config_provider_key_format() {
        let provider = EnvConfigProvider::new().with_prefix("EDUPULSE");

        assert_eq!(provider.format_key("api_base_url"), "EDUPULSE_API_BASE_URL");
        assert_eq!(provider.format_key("demo-salt"), "EDUPULSE_DEMO_SALT");
    }

    #[test]
    fn test_composite_config_provider() {
        let mut mem1 = MemoryConfigProvider::new();
        mem1.set("key1", "value1");

        let mut mem2 = MemoryConfigProvider::new();
        mem2.set("key1", "shadowed");
        mem2.set("key2", "value2");

        let provider = CompositeConfigProvider::new().with_provider(mem1).with_provider(mem2);

        assert_eq!(provider.get_string("key1").unwrap(), "value1");
        assert_eq!(provider.get_string("key2").unwrap(), "value2");
        assert!(provider.get_string("key3").is_err());
    }

    #[test]
    fn test_edupulse_config_defaults() {
        let config = EduPulseConfig::from_provider(&MemoryConfigProvider::new()).unwrap();
        assert_eq!(config, EduPulseConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.download_timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }
}
