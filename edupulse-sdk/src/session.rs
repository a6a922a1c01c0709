//! High-level session tying the client to offline fallback
//!
//! [`EduPulse`] is what an application holds on to. It routes every
//! operation either to the backend or, in offline mock mode, to the bundled
//! demo data, and it feeds call outcomes into the fallback state machine.
//!
//! Operations return `Err` only for local problems (invalid input, image
//! processing, persisted state). Backend failures come back as a failed
//! [`ApiResponse`] carrying the user-facing message.

use std::fmt;

use serde::Serialize;

use crate::config::EduPulseConfig;
use crate::core::{ClientBuilder, ServiceClient};
use crate::error::{Result, ServiceError};
use crate::media::{compress_image_if_needed, ImageFile, DEFAULT_MAX_SIZE_KB, DEFAULT_QUALITY};
use crate::mock::MockData;
use crate::resilience::{ApiResponse, FallbackState, OfflineFallback};
use crate::services::diet::{AggregateFilter, AggregateResponse, ModuleGenerateRequest, ModuleGenerateResponse};
use crate::services::lfa::{LfaExportRequest, LfaExportResponse};
use crate::services::teacher::{FlagResponse, TeacherQueryRequest, TeacherQueryResponse, DEFAULT_CLUSTER};
use crate::services::{DownloadedFile, EduPulseClient};
use crate::store::{JsonFileStore, NoteBook, Preferences, SharedStore, TeacherNote};
use crate::topics::primary_topic;

/// Where served data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataSource {
    Live,
    Mock,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// Data together with its origin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Served<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Served<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            source: DataSource::Live,
        }
    }

    pub fn mock(data: T) -> Self {
        Self {
            data,
            source: DataSource::Mock,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.source == DataSource::Mock
    }
}

/// What a teacher typed (and optionally photographed)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDraft {
    pub text: String,
    pub attachment: Option<ImageFile>,
    pub phone: Option<String>,
    pub cluster: Option<String>,
}

impl QueryDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn attachment(mut self, attachment: ImageFile) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// Drafts without a phone, photo or contact address are demo traffic
    fn is_demo(&self) -> bool {
        self.phone.as_deref().map_or(true, |p| p.trim().is_empty())
            && self.attachment.is_none()
            && !self.text.contains('@')
    }
}

/// An EduPulse session
pub struct EduPulse {
    config: EduPulseConfig,
    client: EduPulseClient,
    fallback: OfflineFallback,
    mock: MockData,
    notes: NoteBook,
    preferences: Preferences,
}

impl EduPulse {
    /// Open a session over `store`
    ///
    /// A base URL saved in the store takes precedence over `config`.
    pub async fn open(config: EduPulseConfig, store: SharedStore) -> Result<Self> {
        config.validate()?;

        let preferences = Preferences::new(store.clone());
        let client = ClientBuilder::from_config(&config)
            .with_saved_base_url(&preferences)
            .await?
            .build()?;
        let fallback = OfflineFallback::load(store.clone(), config.failure_threshold).await?;

        log::info!(
            "EduPulse session for {} ({})",
            client.base_url(),
            fallback.state().await
        );

        Ok(Self {
            config,
            client,
            fallback,
            mock: MockData::builtin()?,
            notes: NoteBook::new(store),
            preferences,
        })
    }

    /// Open a session from `EDUPULSE_*` variables, persisting state in the
    /// platform data directory
    pub async fn open_default() -> Result<Self> {
        let config = EduPulseConfig::from_env()?;
        let store: SharedStore = std::sync::Arc::new(JsonFileStore::in_data_dir()?);
        Self::open(config, store).await
    }

    pub fn client(&self) -> &EduPulseClient {
        &self.client
    }

    pub fn fallback(&self) -> &OfflineFallback {
        &self.fallback
    }

    pub fn mock_data(&self) -> &MockData {
        &self.mock
    }

    pub async fn state(&self) -> FallbackState {
        self.fallback.state().await
    }

    pub async fn is_mock_mode(&self) -> bool {
        self.fallback.is_mock_mode().await
    }

    pub async fn enable_mock_mode(&self) -> Result<FallbackState> {
        self.fallback.enable_mock_mode().await
    }

    pub async fn disable_mock_mode(&self) -> Result<FallbackState> {
        self.fallback.disable_mock_mode().await
    }

    /// Ask for advice on a classroom problem
    ///
    /// The topic is detected from the text and a photo is compressed before
    /// upload. In mock mode canned advice is served; a live failure that
    /// trips mock mode is answered with canned advice as well.
    pub async fn submit_query(&self, draft: QueryDraft) -> Result<ApiResponse<Served<TeacherQueryResponse>>> {
        let text = draft.text.trim();
        if text.is_empty() {
            return Err(ServiceError::validation("Please describe your classroom problem"));
        }

        let topic = primary_topic(text);

        if self.fallback.is_mock_mode().await {
            log::debug!("Mock mode, serving canned advice for {}", topic);
            return Ok(ApiResponse::success(Served::mock(self.mock.advice(topic))));
        }

        let is_demo = draft.is_demo();
        let mut request = TeacherQueryRequest::new(text)
            .cluster(draft.cluster.as_deref().unwrap_or(DEFAULT_CLUSTER))
            .topic(topic)
            .demo(is_demo);

        if let Some(phone) = draft.phone {
            request = request.phone(phone);
        }
        if let Some(attachment) = draft.attachment {
            request = request.attachment(prepare_attachment(attachment).await?);
        }

        let response = self.client.teacher().create_query(&request).await;
        let state = self.fallback.record(&response).await?;

        match response.into_result() {
            Ok(advice) => Ok(ApiResponse::success(Served::live(advice))),
            Err(_) if state == FallbackState::OfflineMock => {
                log::warn!("Backend unreachable, offline demo mode now serving cached advice");
                Ok(ApiResponse::success(Served::mock(self.mock.advice(topic))))
            }
            Err(message) => Ok(ApiResponse::failure(message)),
        }
    }

    /// Dashboard statistics, falling back to the demo data set on failure
    pub async fn load_dashboard(&self, filter: &AggregateFilter) -> Result<Served<AggregateResponse>> {
        if self.fallback.is_mock_mode().await {
            return Ok(Served::mock(self.mock.aggregate()));
        }

        let response = self.client.diet().aggregate(filter).await;
        self.fallback.record(&response).await?;

        match response.into_result() {
            Ok(aggregate) => Ok(Served::live(aggregate)),
            Err(message) => {
                log::warn!("Dashboard unavailable ({}), showing demo data", message);
                Ok(Served::mock(self.mock.aggregate()))
            }
        }
    }

    /// Generate a teaching module
    pub async fn generate_module(
        &self,
        request: &ModuleGenerateRequest,
    ) -> Result<ApiResponse<Served<ModuleGenerateResponse>>> {
        if self.fallback.is_mock_mode().await {
            return Ok(ApiResponse::success(Served::mock(self.mock.module(request))));
        }

        let response = self.client.diet().generate_module(request).await;
        self.fallback.record(&response).await?;
        Ok(response.map(Served::live))
    }

    /// Download a generated module
    pub async fn download_module(
        &self,
        module: &ModuleGenerateResponse,
        filename: Option<&str>,
    ) -> Result<DownloadedFile> {
        self.client.diet().download_module(module, filename).await
    }

    /// Export an LFA; blank list entries are dropped first
    pub async fn export_lfa(&self, request: &LfaExportRequest) -> Result<ApiResponse<Served<LfaExportResponse>>> {
        if self.fallback.is_mock_mode().await {
            return Ok(ApiResponse::success(Served::mock(self.mock.lfa_export())));
        }

        let request = request.without_blank_entries();
        let response = self.client.lfa().export(&request).await;
        self.fallback.record(&response).await?;
        Ok(response.map(Served::live))
    }

    /// Flag a query for CRP follow-up
    pub async fn flag_query(&self, query_id: &str, reason: &str) -> Result<ApiResponse<Served<FlagResponse>>> {
        if self.fallback.is_mock_mode().await {
            return Ok(ApiResponse::success(Served::mock(self.mock.flag(query_id))));
        }

        let response = self.client.teacher().flag_to_crp(query_id, reason).await;
        self.fallback.record(&response).await?;
        Ok(response.map(Served::live))
    }

    /// Keep a piece of advice
    pub async fn save_note(
        &self,
        advice: impl Into<String>,
        topic: Option<&str>,
        query_id: Option<&str>,
    ) -> Result<TeacherNote> {
        self.notes.save(advice, topic, query_id).await
    }

    /// All saved notes, oldest first
    pub async fn notes(&self) -> Result<Vec<TeacherNote>> {
        self.notes.list().await
    }

    /// The backend base URL in use
    pub fn api_base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Save a new base URL and point the client at it
    pub async fn set_api_base_url(&mut self, url: &str) -> Result<()> {
        self.preferences.set_api_base_url(url).await?;
        self.rebuild_client().await
    }

    /// Forget the saved base URL and return to the configured one
    pub async fn clear_api_base_url(&mut self) -> Result<()> {
        self.preferences.clear_api_base_url().await?;
        self.rebuild_client().await
    }

    async fn rebuild_client(&mut self) -> Result<()> {
        self.client = ClientBuilder::from_config(&self.config)
            .with_saved_base_url(&self.preferences)
            .await?
            .build()?;
        log::info!("API base URL is now {}", self.client.base_url());
        Ok(())
    }
}

async fn prepare_attachment(file: ImageFile) -> Result<ImageFile> {
    if !file.is_image() {
        return Err(ServiceError::validation(format!(
            "Only photos can be attached, got {}",
            file.mime_type
        )));
    }

    tokio::task::spawn_blocking(move || compress_image_if_needed(file, DEFAULT_MAX_SIZE_KB, DEFAULT_QUALITY))
        .await
        .map_err(|e| ServiceError::internal(format!("Image compression task failed: {}", e)))?
}
