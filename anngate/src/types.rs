//! Common type definitions.
//!
//! Entity identifiers used across the API, store, and client layers:
//!
//! - [`ProjectId`]: Annotation project identifier. Projects are managed by an
//!   external service and addressed by their integral id in URLs
//!   (`/v1/projects/{project_id}/...`).
//! - [`DocumentId`]: Imported document identifier.
//! - [`LabelId`]: Label definition identifier.

use uuid::Uuid;

/// Annotation project identifier, assigned by the external project service.
pub type ProjectId = i64;
/// Imported document identifier.
pub type DocumentId = Uuid;
/// Label definition identifier.
pub type LabelId = Uuid;
