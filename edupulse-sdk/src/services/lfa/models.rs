//! LFA data models

use serde::{Deserialize, Serialize};

/// A logical framework analysis to export as a slide deck
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LfaExportRequest {
    pub title: String,
    pub problem_statement: String,
    pub student_change: String,
    pub stakeholders: Vec<String>,
    pub practice_changes: Vec<String>,
    pub indicators: Vec<String>,
}

impl LfaExportRequest {
    /// Copy with blank list entries dropped
    pub fn without_blank_entries(&self) -> Self {
        fn keep(items: &[String]) -> Vec<String> {
            items.iter().filter(|s| !s.trim().is_empty()).cloned().collect()
        }

        Self {
            title: self.title.clone(),
            problem_statement: self.problem_statement.clone(),
            student_change: self.student_change.clone(),
            stakeholders: keep(&self.stakeholders),
            practice_changes: keep(&self.practice_changes),
            indicators: keep(&self.indicators),
        }
    }
}

/// Location of an exported deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LfaExportResponse {
    pub export_url: String,
    pub lfa_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}
