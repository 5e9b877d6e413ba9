use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Summary returned after a successful dataset import.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Identifier of this import run
    pub id: Uuid,
    /// Number of documents stored
    pub documents: usize,
    /// Format the dataset was parsed as
    pub format: String,
}

/// Confirmation returned after an export was written to cloud storage.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CloudExportResponse {
    pub message: String,
}

/// Liveness response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
