//! Tests for configuration management functionality
//!
//! These tests verify the configuration providers and the client
//! configuration loaded from them.

#[cfg(test)]
mod tests {
    use std::env;
    use std::time::Duration;

    use crate::config::{
        CompositeConfigProvider, ConfigProvider, ConfigProviderExt, EduPulseConfig, EnvConfigProvider,
        MemoryConfigProvider,
    };
    use crate::error::ServiceError;

    #[test]
    fn test_memory_config_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("demo_salt", "classroom-salt");
        provider.set("timeout_seconds", "30");
        provider.set("offline_demo", "yes");

        assert_eq!(provider.get_string("demo_salt").unwrap(), "classroom-salt");
        assert_eq!(provider.get_int("timeout_seconds").unwrap(), 30);
        assert!(provider.get_bool("offline_demo").unwrap());

        assert_eq!(provider.get_string_or("missing", "default"), "default");
        assert!(!provider.get_bool_or("missing", false));

        assert!(provider.get_string("missing").is_err());
        assert!(provider.get_int("demo_salt").is_err());
    }

    #[test]
    fn test_env_config_provider() {
        env::set_var("EDUPULSE_CFGTEST_API_BASE_URL", "http://10.1.1.1:8000");
        env::set_var("EDUPULSE_CFGTEST_RETRIES", "3");

        let provider = EnvConfigProvider::new().with_prefix("EDUPULSE_CFGTEST");

        assert_eq!(provider.get_string("api_base_url").unwrap(), "http://10.1.1.1:8000");
        assert_eq!(provider.get_int("retries").unwrap(), 3);
        assert!(provider.get_string("demo_salt").is_err());

        let config = EduPulseConfig::from_provider(&provider).unwrap();
        assert_eq!(config.base_url, "http://10.1.1.1:8000");
        assert_eq!(config.retries, 3);
        assert_eq!(config.timeout_seconds, 10);

        env::remove_var("EDUPULSE_CFGTEST_API_BASE_URL");
        env::remove_var("EDUPULSE_CFGTEST_RETRIES");
    }

    #[test]
    fn test_composite_provider_precedence() {
        let mut overrides = MemoryConfigProvider::new();
        overrides.set("failure_threshold", "5");

        let mut base = MemoryConfigProvider::new();
        base.set("failure_threshold", "3");
        base.set("initial_delay_ms", "250");

        let mut composite = CompositeConfigProvider::new();
        composite.add_provider(overrides);
        composite.add_provider(base);

        let config = EduPulseConfig::from_provider(&composite).unwrap();
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.retry_policy().initial_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("timeout_seconds", "ten");

        let err = EduPulseConfig::from_provider(&provider).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[test]
    fn test_validation() {
        assert!(EduPulseConfig::default().validate().is_ok());

        let config = EduPulseConfig {
            base_url: "   ".to_string(),
            ..EduPulseConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EduPulseConfig {
            base_url: "127.0.0.1:8000/api".to_string(),
            ..EduPulseConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EduPulseConfig {
            download_timeout_seconds: 0,
            ..EduPulseConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EduPulseConfig {
            failure_threshold: 0,
            ..EduPulseConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
