//! LFA endpoints

mod models;
pub use models::*;

use crate::core::RequestExecutor;
use crate::error::{Result, ServiceError};
use crate::resilience::ApiResponse;

use super::client::filename_from_url;
use super::{DownloadedFile, EduPulseClient};

const EXPORT_ENDPOINT: &str = "/api/lfa/export";

/// LFA API group, borrowed from an [`EduPulseClient`]
#[derive(Debug, Clone, Copy)]
pub struct LfaApi<'a> {
    client: &'a EduPulseClient,
}

impl<'a> LfaApi<'a> {
    pub(crate) fn new(client: &'a EduPulseClient) -> Self {
        Self { client }
    }

    /// Export an LFA as a slide deck
    pub async fn export(&self, request: &LfaExportRequest) -> ApiResponse<LfaExportResponse> {
        self.client
            .call(|| self.client.post(EXPORT_ENDPOINT, request))
            .await
    }

    /// Fetch the exported deck
    pub async fn download_export(&self, export: &LfaExportResponse) -> Result<DownloadedFile> {
        if export.export_url.trim().is_empty() {
            return Err(ServiceError::download("Export has no download link"));
        }

        let mut file = self.client.download_file(&export.export_url).await?;
        file.filename =
            filename_from_url(&export.export_url).unwrap_or_else(|| "lfa-export.pptx".to_string());
        Ok(file)
    }
}
