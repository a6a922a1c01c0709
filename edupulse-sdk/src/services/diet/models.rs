//! DIET data models
//!
//! This module contains type definitions for the dashboard and module
//! generation endpoints.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::services::teacher::TeacherQueryDetail;

/// Template used when none is requested
pub const DEFAULT_TEMPLATE: &str = "default";

/// MIME type of generated slide decks
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Filters for `GET /api/diet/aggregate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// Inclusive start date (YYYY-MM-DD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,

    /// Inclusive end date (YYYY-MM-DD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl AggregateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn date_range(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.date_from = Some(from.into());
        self.date_to = Some(to.into());
        self
    }

    /// Query parameters for the request; empty filters are left out
    pub fn to_query_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();

        let fields = [
            ("cluster", &self.cluster),
            ("topic", &self.topic),
            ("date_from", &self.date_from),
            ("date_to", &self.date_to),
        ];

        for (key, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                params.insert(key.to_string(), value.to_string());
            }
        }

        params
    }
}

/// Aggregated query statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResponse {
    pub total_queries: u64,

    #[serde(default)]
    pub by_topic: BTreeMap<String, u64>,

    #[serde(default)]
    pub by_cluster: BTreeMap<String, u64>,

    #[serde(default)]
    pub sample_queries: Vec<TeacherQueryDetail>,
}

impl AggregateResponse {
    /// Number of distinct topics with queries
    pub fn active_topics(&self) -> usize {
        self.by_topic.len()
    }

    /// Number of distinct clusters with queries
    pub fn active_clusters(&self) -> usize {
        self.by_cluster.len()
    }

    /// The topic with the most queries; ties go to the alphabetically first
    pub fn top_topic(&self) -> Option<(&str, u64)> {
        self.by_topic
            .iter()
            .fold(None, |best: Option<(&str, u64)>, (topic, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((topic.as_str(), count)),
            })
    }

    /// Sample queries tagged with `topic`
    pub fn queries_for_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a TeacherQueryDetail> + 'a {
        self.sample_queries.iter().filter(move |q| q.topic_tag == topic)
    }
}

/// Body of `POST /api/diet/generate-module`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGenerateRequest {
    pub cluster: String,
    pub topic: String,

    /// Template identifier, `default` when empty
    #[serde(default)]
    pub template: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ModuleGenerateRequest {
    pub fn new(cluster: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            topic: topic.into(),
            template: DEFAULT_TEMPLATE.to_string(),
            grade: None,
            language: None,
        }
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn grade(mut self, grade: impl Into<String>) -> Self {
        self.grade = Some(grade.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Copy of this request with an empty template replaced by `default`
    pub(crate) fn with_default_template(&self) -> Self {
        let mut request = self.clone();
        if request.template.trim().is_empty() {
            request.template = DEFAULT_TEMPLATE.to_string();
        }
        request
    }
}

/// A generated teaching module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGenerateResponse {
    pub module_id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pptx_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pptx_base64: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

impl ModuleGenerateResponse {
    /// File name derived from the title, whitespace runs become `_`
    pub fn default_filename(&self) -> String {
        let stem = self.title.split_whitespace().collect::<Vec<_>>().join("_");
        format!("{}.pptx", stem)
    }
}
