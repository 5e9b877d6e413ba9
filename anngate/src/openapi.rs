//! OpenAPI document assembly.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "anngate",
        description = "Dataset import/export gateway for collaborative text annotation projects"
    ),
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::features::get_features,
        crate::api::handlers::docs::upload_docs,
        crate::api::handlers::docs::download_docs,
        crate::api::handlers::labels::upload_labels,
    ),
    components(schemas(
        crate::api::models::docs::UploadResponse,
        crate::api::models::docs::CloudExportResponse,
        crate::api::models::docs::HealthResponse,
        crate::api::models::features::FeaturesResponse,
    )),
    tags(
        (name = "docs", description = "Dataset import and export"),
        (name = "labels", description = "Label definition import"),
        (name = "features", description = "Server capability flags"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
