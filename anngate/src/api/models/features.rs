use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Server capability flags, fetched once per client session.
///
/// Flags gate client-side affordances only; the server enforces the
/// corresponding checks on every request regardless.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeaturesResponse {
    /// Whether datasets can be imported from / exported to cloud buckets
    pub cloud_upload: bool,
}
