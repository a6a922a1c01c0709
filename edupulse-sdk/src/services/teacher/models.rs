//! Teacher query data models
//!
//! This module contains type definitions for the teacher endpoints.

use serde::{Deserialize, Serialize};

use crate::media::ImageFile;

/// Cluster sent when the teacher gives none
pub const DEFAULT_CLUSTER: &str = "Default Cluster";

/// Topic sent when none was given or detected
pub const DEFAULT_TOPIC: &str = "general";

/// Topic used for sample responses
pub const DEFAULT_SAMPLE_TOPIC: &str = "subtraction-borrowing";

/// Reason used when flagging without one
pub const DEFAULT_FLAG_REASON: &str = "Teacher flagged for CRP follow-up";

/// A classroom problem submitted by a teacher
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeacherQueryRequest {
    /// Problem narrative
    pub text: String,

    /// Raw phone number; hashed before sending
    pub phone: Option<String>,

    /// Cluster name
    pub cluster: Option<String>,

    /// Topic slug
    pub topic: Option<String>,

    /// Photo of the problem; switches the request to multipart
    pub attachment: Option<ImageFile>,

    /// Demo submissions send a placeholder instead of a phone hash
    pub is_demo: bool,

    /// Explicit consent flag, defaults to true
    pub consent_given: Option<bool>,
}

impl TeacherQueryRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn attachment(mut self, attachment: ImageFile) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn demo(mut self, is_demo: bool) -> Self {
        self.is_demo = is_demo;
        self
    }

    pub fn consent(mut self, consent_given: bool) -> Self {
        self.consent_given = Some(consent_given);
        self
    }

    pub(crate) fn consent_or_default(&self) -> bool {
        self.consent_given.unwrap_or(true)
    }

    pub(crate) fn cluster_or_default(&self) -> &str {
        non_blank(self.cluster.as_deref()).unwrap_or(DEFAULT_CLUSTER)
    }

    pub(crate) fn topic_or_default(&self) -> &str {
        non_blank(self.topic.as_deref()).unwrap_or(DEFAULT_TOPIC)
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// JSON body of `POST /api/teacher/query`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct QueryPayload<'a> {
    pub phone: String,
    pub cluster: &'a str,
    pub topic: &'a str,
    pub text: &'a str,
    pub is_demo: bool,
    pub consent_given: bool,
}

/// Advice returned for a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherQueryResponse {
    pub id: String,
    pub advice: String,
    pub module_sample_link: String,

    /// True when the backend wants consent before answering
    #[serde(default)]
    pub consent_required: bool,
}

/// Body of `POST /api/teacher/flag`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRequest {
    pub query_id: String,
    pub reason: String,
}

impl FlagRequest {
    /// Flag `query_id`; a blank reason uses the default one
    pub fn new(query_id: impl Into<String>, reason: &str) -> Self {
        let reason = if reason.trim().is_empty() {
            DEFAULT_FLAG_REASON
        } else {
            reason
        };

        Self {
            query_id: query_id.into(),
            reason: reason.to_string(),
        }
    }
}

/// Acknowledgement of a flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

/// A stored query as the backend reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherQueryDetail {
    pub id: String,
    pub cluster_id: String,
    pub topic_tag: String,
    pub narrative_text: String,

    /// Creation time as sent by the backend (ISO 8601)
    pub created_at: String,

    #[serde(default)]
    pub resolved: bool,

    #[serde(default)]
    pub flagged_for_crp: bool,
}

/// Acknowledgement of a deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: String,
}
