use super::{Document, Label, NewDocument, NewLabel, ProjectStore, StoreError};
use crate::types::ProjectId;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct ProjectData {
    documents: Vec<Document>,
    labels: Vec<Label>,
}

/// In-memory [`ProjectStore`] used by the standalone binary and tests.
#[derive(Default)]
pub struct InMemoryStore {
    projects: RwLock<HashMap<ProjectId, ProjectData>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn add_documents(&self, project: ProjectId, docs: Vec<NewDocument>) -> Result<usize, StoreError> {
        let mut projects = self.projects.write().await;
        let data = projects.entry(project).or_default();
        let count = docs.len();
        let now = Utc::now();
        data.documents.extend(docs.into_iter().map(|doc| Document {
            id: Uuid::new_v4(),
            text: doc.text,
            annotations: doc.annotations,
            meta: doc.meta,
            created_at: now,
        }));
        Ok(count)
    }

    async fn list_documents(&self, project: ProjectId) -> Result<Vec<Document>, StoreError> {
        let projects = self.projects.read().await;
        Ok(projects.get(&project).map(|data| data.documents.clone()).unwrap_or_default())
    }

    async fn add_labels(&self, project: ProjectId, labels: Vec<NewLabel>) -> Result<usize, StoreError> {
        let mut projects = self.projects.write().await;
        let data = projects.entry(project).or_default();

        // Validate the whole batch before touching anything, so a conflict
        // midway through leaves no partial import behind.
        let mut names: Vec<&str> = data.labels.iter().map(|l| l.text.as_str()).collect();
        let mut shortcuts: Vec<&str> = data.labels.iter().filter_map(|l| l.shortcut.as_deref()).collect();
        for label in &labels {
            let shortcut_taken = label.shortcut.as_deref().is_some_and(|s| shortcuts.contains(&s));
            if names.contains(&label.text.as_str()) || shortcut_taken {
                return Err(StoreError::DuplicateLabel { name: label.text.clone() });
            }
            names.push(&label.text);
            if let Some(shortcut) = label.shortcut.as_deref() {
                shortcuts.push(shortcut);
            }
        }

        let count = labels.len();
        data.labels.extend(labels.into_iter().map(|label| Label {
            id: Uuid::new_v4(),
            text: label.text,
            shortcut: label.shortcut,
            background_color: label.background_color,
            text_color: label.text_color,
        }));
        Ok(count)
    }

    async fn list_labels(&self, project: ProjectId) -> Result<Vec<Label>, StoreError> {
        let projects = self.projects.read().await;
        Ok(projects.get(&project).map(|data| data.labels.clone()).unwrap_or_default())
    }
}
