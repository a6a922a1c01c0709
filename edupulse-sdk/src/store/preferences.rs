//! User preferences that outlive a session

use url::Url;

use super::{KeyValueStore, KeyValueStoreExt, SharedStore};
use crate::error::{Result, ServiceError};

/// Store key holding the user-entered API base URL
pub const API_URL_KEY: &str = "apiUrl";

#[derive(Clone)]
pub struct Preferences {
    store: SharedStore,
}

impl Preferences {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The saved base URL override, if any
    pub async fn api_base_url(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get_typed::<String>(API_URL_KEY)
            .await?
            .filter(|url| !url.trim().is_empty()))
    }

    /// Save a base URL override after checking it parses
    pub async fn set_api_base_url(&self, url: &str) -> Result<()> {
        let trimmed = url.trim().trim_end_matches('/');
        Url::parse(trimmed)
            .map_err(|e| ServiceError::configuration(format!("Invalid API URL {}: {}", url, e)))?;
        self.store.set_typed(API_URL_KEY, &trimmed.to_string()).await
    }

    /// Forget the override and fall back to configuration
    pub async fn clear_api_base_url(&self) -> Result<()> {
        self.store.remove(API_URL_KEY).await
    }
}
