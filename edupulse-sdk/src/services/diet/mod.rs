//! DIET endpoints
//!
//! Aggregated query statistics for District Institute of Education and
//! Training officials, and generation of teaching micro-modules.

mod models;
pub use models::*;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::core::RequestExecutor;
use crate::error::{Result, ServiceError};
use crate::resilience::ApiResponse;

use super::client::filename_from_url;
use super::{DownloadedFile, EduPulseClient};

const AGGREGATE_ENDPOINT: &str = "/api/diet/aggregate";
const GENERATE_MODULE_ENDPOINT: &str = "/api/diet/generate-module";

/// DIET API group, borrowed from an [`EduPulseClient`]
#[derive(Debug, Clone, Copy)]
pub struct DietApi<'a> {
    client: &'a EduPulseClient,
}

impl<'a> DietApi<'a> {
    pub(crate) fn new(client: &'a EduPulseClient) -> Self {
        Self { client }
    }

    /// Query statistics, optionally filtered
    pub async fn aggregate(&self, filter: &AggregateFilter) -> ApiResponse<AggregateResponse> {
        let params = filter.to_query_params();
        self.client
            .call(|| self.client.get(AGGREGATE_ENDPOINT, Some(params.clone())))
            .await
    }

    /// Generate a module; an empty template is sent as `default`
    pub async fn generate_module(&self, request: &ModuleGenerateRequest) -> ApiResponse<ModuleGenerateResponse> {
        let body = request.with_default_template();
        self.client
            .call(|| self.client.post(GENERATE_MODULE_ENDPOINT, &body))
            .await
    }

    /// Fetch a file by absolute URL with the download timeout
    pub async fn download_file(&self, url: &str) -> Result<DownloadedFile> {
        self.client.download_file(url).await
    }

    /// Materialize a generated module
    ///
    /// An inline base64 payload wins over a link. `filename` overrides the
    /// derived name.
    pub async fn download_module(
        &self,
        module: &ModuleGenerateResponse,
        filename: Option<&str>,
    ) -> Result<DownloadedFile> {
        if let Some(encoded) = module.pptx_base64.as_deref().filter(|b| !b.is_empty()) {
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|e| ServiceError::download(format!("Module payload is not valid base64: {}", e)))?;

            return Ok(DownloadedFile {
                filename: filename
                    .map(str::to_string)
                    .unwrap_or_else(|| module.default_filename()),
                content_type: Some(PPTX_MIME_TYPE.to_string()),
                bytes,
            });
        }

        if let Some(link) = module.pptx_link.as_deref().filter(|l| !l.is_empty()) {
            let mut file = self.client.download_file(link).await.map_err(|e| {
                log::error!("Module download from {} failed: {}", link, e);
                ServiceError::download("Failed to download module file")
            })?;

            file.filename = filename
                .map(str::to_string)
                .or_else(|| filename_from_url(link))
                .unwrap_or_else(|| "module.pptx".to_string());
            return Ok(file);
        }

        Err(ServiceError::download("No download link or base64 data available"))
    }
}
