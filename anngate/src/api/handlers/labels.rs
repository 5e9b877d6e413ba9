use crate::AppState;
use crate::errors::{Error, Result};
use crate::store::NewLabel;
use crate::types::ProjectId;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
};

#[utoipa::path(
    post,
    path = "/v1/projects/{project_id}/labels/upload",
    tag = "labels",
    summary = "Import label definitions",
    description = "Import a JSON array of label definitions ({text, shortcut?, background_color?, \
                   text_color?}) from the multipart `file` field. The import is all-or-nothing: a \
                   duplicate name or shortcut rejects the whole batch.",
    params(
        ("project_id" = i64, Path, description = "Target project")
    ),
    request_body(
        content_type = "multipart/form-data",
        description = "JSON file with label definitions"
    ),
    responses(
        (status = 201, description = "Labels imported"),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Duplicate label name or shortcut"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_labels(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    mut multipart: Multipart,
) -> Result<StatusCode> {
    let mut file: Option<Vec<u8>> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
                message: format!("Failed to read file: {e}"),
            })?;
            file = Some(bytes.to_vec());
        }
    }

    let file = file.ok_or_else(|| Error::BadRequest {
        message: "Empty content".to_string(),
    })?;
    let labels: Vec<NewLabel> = serde_json::from_slice(&file).map_err(|e| Error::BadRequest {
        message: format!("invalid label file: {e}"),
    })?;

    let imported = state.store.add_labels(project_id, labels).await?;
    tracing::info!(project_id, imported, "Label definitions imported");

    Ok(StatusCode::CREATED)
}
