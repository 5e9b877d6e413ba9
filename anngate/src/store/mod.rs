//! Document and label storage seam.
//!
//! The platform's real datastore lives behind an external service, so this
//! module only defines the repository interface the import/export endpoints
//! need, plus the in-memory implementation backing the standalone binary and
//! the tests. Each entity operation is scoped to a project; an unknown
//! project id behaves as an empty project, since project lifecycle is the
//! external service's concern.

mod memory;

pub use memory::InMemoryStore;

use crate::types::{DocumentId, LabelId, ProjectId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// A labeled region or document-level tag attached to a document.
///
/// Span annotations (sequence labeling) carry character offsets into the
/// document text; document-level annotations (classification) leave the
/// offsets unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<usize>,
    /// Username of the annotator, when known. Imported annotations have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Annotation {
    /// Document-level annotation with no offsets.
    pub fn document_level(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start_offset: None,
            end_offset: None,
            user: None,
        }
    }

    /// Span annotation over `[start, end)` character offsets.
    pub fn span(label: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            start_offset: Some(start),
            end_offset: Some(end),
            user: None,
        }
    }
}

/// A document to be inserted into a project.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub text: String,
    pub annotations: Vec<Annotation>,
    pub meta: serde_json::Value,
}

/// A stored document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub text: String,
    pub annotations: Vec<Annotation>,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A label definition to be inserted into a project.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLabel {
    pub text: String,
    #[serde(default)]
    pub shortcut: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
}

/// A stored label definition.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub id: LabelId,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

#[derive(Debug, ThisError)]
pub enum StoreError {
    /// A label in the batch collides with an existing label (or another
    /// label in the same batch) on name or shortcut.
    #[error("you cannot create a label with same name or shortkey: {name}")]
    DuplicateLabel { name: String },

    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

/// Repository interface for a project's documents and labels.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Insert a batch of documents, returning how many were stored.
    async fn add_documents(&self, project: ProjectId, docs: Vec<NewDocument>) -> Result<usize, StoreError>;

    /// All documents of a project, in insertion order.
    async fn list_documents(&self, project: ProjectId) -> Result<Vec<Document>, StoreError>;

    /// Insert label definitions all-or-nothing. A duplicate name or shortcut
    /// anywhere in the batch fails the whole insert with
    /// [`StoreError::DuplicateLabel`].
    async fn add_labels(&self, project: ProjectId, labels: Vec<NewLabel>) -> Result<usize, StoreError>;

    /// All label definitions of a project.
    async fn list_labels(&self, project: ProjectId) -> Result<Vec<Label>, StoreError>;
}
