//! Canned data for offline demo mode
//!
//! When the backend is unreachable the client keeps working from a small
//! seed bundled into the crate.

use serde::Deserialize;

use crate::config::DEFAULT_BASE_URL;
use crate::error::{Result, ServiceError};
use crate::services::diet::{AggregateResponse, ModuleGenerateRequest, ModuleGenerateResponse};
use crate::services::lfa::LfaExportResponse;
use crate::services::teacher::{FlagResponse, TeacherQueryResponse};
use crate::topics::topic_display_name;

const SEED: &str = include_str!("../data/seed.json");

/// One canned advice entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MockAdvice {
    pub id: String,
    pub topic: String,
    pub advice: String,
    pub module_sample_link: String,
}

impl From<&MockAdvice> for TeacherQueryResponse {
    fn from(mock: &MockAdvice) -> Self {
        TeacherQueryResponse {
            id: mock.id.clone(),
            advice: mock.advice.clone(),
            module_sample_link: mock.module_sample_link.clone(),
            consent_required: false,
        }
    }
}

/// The offline data set
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockData {
    teacher_queries: Vec<MockAdvice>,
    aggregate_data: AggregateResponse,
}

impl MockData {
    /// The data set bundled with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(SEED)
    }

    /// Parse a data set in the seed format
    pub fn from_json(json: &str) -> Result<Self> {
        let data: Self = serde_json::from_str(json)
            .map_err(|e| ServiceError::parsing(format!("Invalid mock data: {}", e)))?;

        if data.teacher_queries.is_empty() {
            return Err(ServiceError::parsing("Mock data has no teacher queries"));
        }

        Ok(data)
    }

    pub fn teacher_queries(&self) -> &[MockAdvice] {
        &self.teacher_queries
    }

    /// Canned advice for `topic`, or the first entry when none matches
    pub fn advice(&self, topic: &str) -> TeacherQueryResponse {
        self.teacher_queries
            .iter()
            .find(|entry| entry.topic == topic)
            .or_else(|| self.teacher_queries.first())
            .map(TeacherQueryResponse::from)
            .unwrap_or_else(|| TeacherQueryResponse {
                id: "mock-query".to_string(),
                advice: String::new(),
                module_sample_link: String::new(),
                consent_required: false,
            })
    }

    /// Canned dashboard statistics
    pub fn aggregate(&self) -> AggregateResponse {
        self.aggregate_data.clone()
    }

    /// A module pointing at the sample deck for the requested topic
    pub fn module(&self, request: &ModuleGenerateRequest) -> ModuleGenerateResponse {
        ModuleGenerateResponse {
            module_id: "mock-module-1".to_string(),
            title: format!("{} - Micro Module", topic_display_name(&request.topic)),
            pptx_link: Some(format!(
                "{}/templates/samples/{}-module.pptx",
                DEFAULT_BASE_URL, request.topic
            )),
            pptx_base64: None,
            preview_url: None,
        }
    }

    pub fn lfa_export(&self) -> LfaExportResponse {
        LfaExportResponse {
            export_url: format!("{}/exports/lfa_mock.pptx", DEFAULT_BASE_URL),
            lfa_id: "mock-lfa-1".to_string(),
            preview_url: None,
        }
    }

    pub fn flag(&self, query_id: &str) -> FlagResponse {
        FlagResponse {
            success: true,
            message: Some("Query flagged for CRP (offline demo)".to_string()),
            query_id: Some(query_id.to_string()),
        }
    }
}
