//! Saved teacher notes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{KeyValueStore, KeyValueStoreExt, SharedStore};
use crate::error::Result;

/// Store key holding the notes list
pub const NOTES_KEY: &str = "teacherNotes";

/// A piece of advice a teacher chose to keep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherNote {
    pub id: String,
    pub advice: String,
    pub topic: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

/// Append-only list of notes persisted under [`NOTES_KEY`]
#[derive(Clone)]
pub struct NoteBook {
    store: SharedStore,
}

impl NoteBook {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// All saved notes, oldest first
    pub async fn list(&self) -> Result<Vec<TeacherNote>> {
        Ok(self
            .store
            .get_typed::<Vec<TeacherNote>>(NOTES_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Save a note; an empty topic is stored as `general`
    pub async fn save(
        &self,
        advice: impl Into<String>,
        topic: Option<&str>,
        query_id: Option<&str>,
    ) -> Result<TeacherNote> {
        let note = TeacherNote {
            id: crate::util::generate_request_id(),
            advice: advice.into(),
            topic: topic
                .filter(|t| !t.trim().is_empty())
                .unwrap_or("general")
                .to_string(),
            saved_at: Utc::now(),
            query_id: query_id.map(str::to_string),
        };

        let mut notes = self.list().await?;
        notes.push(note.clone());
        self.store.set_typed(NOTES_KEY, &notes).await?;

        log::debug!("Saved note {} ({} total)", note.id, notes.len());
        Ok(note)
    }

    /// Delete every saved note
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(NOTES_KEY).await
    }
}
