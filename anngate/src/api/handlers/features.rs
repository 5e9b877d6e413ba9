//! Server capability flags for clients.

use crate::AppState;
use crate::api::models::features::FeaturesResponse;
use axum::{Json, extract::State};

#[utoipa::path(
    get,
    path = "/v1/features",
    tag = "features",
    summary = "Get feature flags",
    description = "Capability switches gating optional client affordances. Fetched once per \
                   client session.",
    responses(
        (status = 200, description = "Current feature flags", body = FeaturesResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_features(State(state): State<AppState>) -> Json<FeaturesResponse> {
    Json(FeaturesResponse {
        cloud_upload: state.cloud.is_some(),
    })
}
