//! The EduPulse backend client
//!
//! [`EduPulseClient`] owns the HTTP clients, the retry policy and the phone
//! hasher. Endpoint-specific operations live in the `teacher`, `diet` and
//! `lfa` groups, which borrow the client.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::core::{ClientBuilder, RequestExecutor, ServiceClient};
use crate::error::{Result, ServiceError};
use crate::privacy::PhoneHasher;
use crate::resilience::{ApiResponse, RetryExecutor};
use crate::util::sanitize_for_logging;

use super::common::{create_error_context, parse_error_response, transport_error, SERVICE_NAME};
use super::diet::DietApi;
use super::lfa::LfaApi;
use super::teacher::TeacherApi;

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// A downloaded file held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DownloadedFile {
    /// Write the file into `dir` under its own name
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// Client for the EduPulse backend
#[derive(Debug, Clone)]
pub struct EduPulseClient {
    /// HTTP client for API calls
    http_client: Client,

    /// HTTP client with the longer download timeout
    download_client: Client,

    /// Base URL without a trailing slash
    base_url: String,

    /// Retry policy applied to every API call
    retry: RetryExecutor,

    /// Phone hasher for teacher queries
    phone_hasher: PhoneHasher,
}

impl EduPulseClient {
    /// Create a client from `EDUPULSE_*` environment configuration
    pub fn from_env() -> Result<Self> {
        let config = crate::config::EduPulseConfig::from_env()?;
        ClientBuilder::from_config(&config).build()
    }

    /// Create a new builder for the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(
        http_client: Client,
        download_client: Client,
        base_url: String,
        retry: RetryExecutor,
        phone_hasher: PhoneHasher,
    ) -> Self {
        Self {
            http_client,
            download_client,
            base_url,
            retry,
            phone_hasher,
        }
    }

    /// Teacher query operations
    pub fn teacher(&self) -> TeacherApi<'_> {
        TeacherApi::new(self)
    }

    /// DIET dashboard and module operations
    pub fn diet(&self) -> DietApi<'_> {
        DietApi::new(self)
    }

    /// LFA export operations
    pub fn lfa(&self) -> LfaApi<'_> {
        LfaApi::new(self)
    }

    pub fn retry(&self) -> &RetryExecutor {
        &self.retry
    }

    pub fn phone_hasher(&self) -> &PhoneHasher {
        &self.phone_hasher
    }

    /// Absolute URL for a backend path
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Run `operation` under the client's retry policy
    pub async fn call<F, Fut, T>(&self, operation: F) -> ApiResponse<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.retry.call(operation).await
    }

    /// `GET /health`, normalized
    pub async fn health(&self) -> ApiResponse<HealthStatus> {
        self.call(|| self.get::<HealthStatus>("/health", None)).await
    }

    /// POST a multipart form
    ///
    /// Forms cannot be cloned, so retrying callers rebuild the form for
    /// every attempt.
    pub async fn post_multipart<R>(&self, endpoint: &str, form: Form) -> Result<R>
    where
        R: DeserializeOwned + Send,
    {
        let url = self.endpoint_url(endpoint);
        log::debug!("POST (multipart) {}", sanitize_for_logging(&url));

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        self.handle_response(endpoint, response).await
    }

    /// Fetch an absolute URL with the download timeout
    pub async fn download_file(&self, url: &str) -> Result<DownloadedFile> {
        log::debug!("Downloading {}", sanitize_for_logging(url));

        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::download(format!(
                "Download of {} failed with status {}",
                url, status
            ))
            .with_context(create_error_context(url, Some(status))));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| transport_error(url, e))?;

        Ok(DownloadedFile {
            filename: filename_from_url(url).unwrap_or_else(|| "download".to_string()),
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    async fn handle_response<R>(&self, endpoint: &str, response: Response) -> Result<R>
    where
        R: DeserializeOwned + Send,
    {
        let status = response.status();

        if !status.is_success() {
            return Err(parse_error_response(endpoint, response).await);
        }

        // A stalled or reset body is a transport failure, not a parse failure
        let body = response.bytes().await.map_err(|e| transport_error(endpoint, e))?;

        serde_json::from_slice::<R>(&body).map_err(|e| {
            ServiceError::parsing(format!("Failed to parse response: {}", e))
                .with_context(create_error_context(endpoint, None))
        })
    }
}

/// Last path segment of a URL, if it has one
pub(crate) fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.last()?;
    (!segment.is_empty()).then(|| segment.to_string())
}

#[async_trait]
impl ServiceClient for EduPulseClient {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn version(&self) -> &str {
        "v1"
    }

    async fn health_check(&self) -> Result<bool> {
        match self.get::<HealthStatus>("/health", None).await {
            Ok(status) => Ok(status.is_healthy()),
            Err(e) => {
                log::warn!("EduPulse health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl RequestExecutor for EduPulseClient {
    async fn get<R>(&self, endpoint: &str, query_params: Option<HashMap<String, String>>) -> Result<R>
    where
        R: DeserializeOwned + Send,
    {
        let url = self.endpoint_url(endpoint);
        log::debug!("GET {}", sanitize_for_logging(&url));

        let mut builder = self.http_client.get(&url);
        if let Some(params) = query_params {
            builder = builder.query(&params);
        }

        let response = builder.send().await.map_err(|e| transport_error(endpoint, e))?;
        self.handle_response(endpoint, response).await
    }

    async fn post<T, R>(&self, endpoint: &str, body: &T) -> Result<R>
    where
        T: Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let url = self.endpoint_url(endpoint);
        log::debug!("POST {}", sanitize_for_logging(&url));

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        self.handle_response(endpoint, response).await
    }

    async fn delete<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned + Send,
    {
        let url = self.endpoint_url(endpoint);
        log::debug!("DELETE {}", sanitize_for_logging(&url));

        let response = self
            .http_client
            .delete(&url)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        self.handle_response(endpoint, response).await
    }
}
