use crate::AppState;
use crate::api::models::docs::{CloudExportResponse, UploadResponse};
use crate::cloud::BucketPath;
use crate::errors::{Error, Result};
use crate::formats::{self, ExportFormat, Format};
use crate::types::ProjectId;
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::Field},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use uuid::Uuid;

/// Multipart fields shared by the upload and download endpoints.
#[derive(Default)]
struct DatasetForm {
    file: Option<Vec<u8>>,
    filename: Option<String>,
    bucket: Option<String>,
    format: Option<String>,
}

impl DatasetForm {
    async fn from_multipart(mut multipart: Multipart, max_file_bytes: usize) -> Result<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to parse multipart data: {e}"),
        })? {
            match field.name().unwrap_or("") {
                "file" => {
                    form.filename = field.file_name().map(|s| s.to_string());
                    form.file = Some(read_capped(field, max_file_bytes).await?);
                }
                "bucket" => {
                    form.bucket = Some(read_text(field, "bucket").await?);
                }
                "format" => {
                    form.format = Some(read_text(field, "format").await?);
                }
                _ => {
                    // Ignore unknown fields (forward compatibility)
                }
            }
        }
        Ok(form)
    }

    /// The `format` field, which every dataset request must carry.
    fn format_selector(&self) -> Result<&str> {
        self.format.as_deref().filter(|f| !f.is_empty()).ok_or_else(|| Error::BadRequest {
            message: "query parameter 'format' is missing".to_string(),
        })
    }

    /// The `bucket` field, treating an empty string the same as absent: local
    /// uploads always send `bucket=""` alongside the file part.
    fn bucket_path(&self) -> Result<Option<BucketPath>> {
        match self.bucket.as_deref().filter(|b| !b.is_empty()) {
            Some(raw) => {
                let path = raw.parse::<BucketPath>().map_err(|e| Error::BadRequest { message: e.to_string() })?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }
}

/// Stream a file part into memory, aborting as soon as the size limit is
/// exceeded rather than buffering the whole body first.
async fn read_capped(mut field: Field<'_>, max_file_bytes: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to read file chunk: {e}"),
    })? {
        if buf.len() + chunk.len() > max_file_bytes {
            tracing::warn!(
                received = buf.len() + chunk.len(),
                max_file_bytes,
                "File size limit exceeded, aborting upload"
            );
            return Err(Error::PayloadTooLarge {
                message: format!(
                    "File size exceeds maximum allowed size of {} bytes ({} MB)",
                    max_file_bytes,
                    max_file_bytes / (1024 * 1024)
                ),
            });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

async fn read_text(field: Field<'_>, name: &str) -> Result<String> {
    field.text().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to read {name}: {e}"),
    })
}

#[utoipa::path(
    post,
    path = "/v1/projects/{project_id}/docs/upload",
    tag = "docs",
    summary = "Import a dataset",
    description = "Import a dataset into a project, either from an uploaded file or from a cloud \
                   bucket object. Multipart fields: `file` (binary, optional), `bucket` \
                   (`<bucket>/<object-key>`, optional), `format` (required). Exactly one of \
                   `file` / `bucket` must be populated.",
    params(
        ("project_id" = i64, Path, description = "Target project")
    ),
    request_body(
        content_type = "multipart/form-data",
        description = "Dataset file or bucket reference plus format selector"
    ),
    responses(
        (status = 201, description = "Dataset imported", body = UploadResponse),
        (status = 400, description = "Invalid request, or per-record parse problems as an array of {detail}"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_docs(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let form = DatasetForm::from_multipart(multipart, state.config.limits.max_upload_bytes).await?;

    let format: Format = form
        .format_selector()?
        .parse()
        .map_err(|e: formats::UnknownFormat| Error::BadRequest { message: e.to_string() })?;

    let bucket = form.bucket_path()?;
    let bytes = match (form.file, bucket) {
        (Some(_), Some(_)) => {
            return Err(Error::BadRequest {
                message: "provide either an uploaded file or a bucket path, not both".to_string(),
            });
        }
        (None, None) => {
            return Err(Error::BadRequest {
                message: "Empty content".to_string(),
            });
        }
        (Some(file), None) => {
            if file.is_empty() {
                return Err(Error::BadRequest {
                    message: "File cannot be empty".to_string(),
                });
            }
            Bytes::from(file)
        }
        (None, Some(path)) => {
            let cloud = state.cloud.as_ref().ok_or_else(|| Error::BadRequest {
                message: "cloud upload is not configured".to_string(),
            })?;
            cloud.fetch(&path.bucket, &path.key).await?
        }
    };

    // Concurrent imports into the same project are serialized; imports into
    // different projects proceed independently.
    let lock = state.upload_lock(project_id);
    let _guard = lock.lock().await;

    let records = formats::parse(format, &bytes).map_err(|problems| Error::Validation { problems })?;
    if records.is_empty() {
        return Err(Error::BadRequest {
            message: "file contains no records".to_string(),
        });
    }

    let documents = state.store.add_documents(project_id, records).await?;
    let upload_id = Uuid::new_v4();

    tracing::info!(
        upload_id = %upload_id,
        project_id,
        documents,
        filename = ?form.filename,
        %format,
        "Dataset imported"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: upload_id,
            documents,
            format: format.to_string(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/v1/projects/{project_id}/docs/download",
    tag = "docs",
    summary = "Export a project's documents",
    description = "Render all documents of a project with the selected painter. With an empty \
                   `bucket` field the rendered export is returned as the response body; with a \
                   `<bucket>/<object-key>` path it is written to cloud storage instead.",
    params(
        ("project_id" = i64, Path, description = "Source project")
    ),
    request_body(
        content_type = "multipart/form-data",
        description = "Export format selector and optional bucket destination"
    ),
    responses(
        (status = 200, description = "Rendered export, or a confirmation message for cloud exports", body = CloudExportResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn download_docs(State(state): State<AppState>, Path(project_id): Path<ProjectId>, multipart: Multipart) -> Result<Response> {
    let form = DatasetForm::from_multipart(multipart, state.config.limits.max_upload_bytes).await?;

    let format: ExportFormat = form
        .format_selector()?
        .parse()
        .map_err(|e: formats::UnknownFormat| Error::BadRequest { message: e.to_string() })?;

    let documents = state.store.list_documents(project_id).await?;
    let (body, content_type) = formats::render(&documents, format)?;

    match form.bucket_path()? {
        None => Ok(([(header::CONTENT_TYPE, content_type)], body).into_response()),
        Some(path) => {
            let cloud = state.cloud.as_ref().ok_or_else(|| Error::BadRequest {
                message: "cloud upload is not configured".to_string(),
            })?;

            // Replace any previous export at the same key. A failed delete is
            // not fatal; the subsequent put overwrites the object anyway.
            if let Err(e) = cloud.delete(&path.bucket, &path.key).await {
                tracing::debug!(path = %path, "ignoring delete of previous export: {e}");
            }
            cloud.put(&path.bucket, &path.key, Bytes::from(body)).await?;

            tracing::info!(project_id, documents = documents.len(), path = %path, %format, "Export written to cloud storage");

            Ok(Json(CloudExportResponse {
                message: format!("Uploaded {} documents to \"{}\" bucket.", documents.len(), path.bucket),
            })
            .into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::store::ProjectStore;
    use crate::test_utils::{create_test_app, create_test_app_with_config, create_test_app_without_cloud};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use bytes::Bytes;
    use serde_json::Value;

    fn upload_form(file: Option<(&str, &[u8])>, bucket: &str, format: &str) -> MultipartForm {
        let mut form = MultipartForm::new().add_text("bucket", bucket.to_string()).add_text("format", format.to_string());
        if let Some((name, bytes)) = file {
            form = form.add_part("file", Part::bytes(bytes.to_vec()).file_name(name.to_string()));
        }
        form
    }

    #[tokio::test]
    async fn upload_local_json_dataset() {
        let (server, store, _cloud) = create_test_app();

        let dataset = br#"{"text": "great movie", "labels": ["positive"]}"#;
        let response = server
            .post("/v1/projects/42/docs/upload")
            .multipart(upload_form(Some(("data.json", dataset)), "", "json"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let json: Value = response.json();
        assert_eq!(json["documents"], 1);
        assert_eq!(json["format"], "json");

        let docs = store.list_documents(42).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "great movie");
    }

    #[tokio::test]
    async fn upload_requires_exactly_one_source() {
        let (server, _store, _cloud) = create_test_app();

        let response = server
            .post("/v1/projects/42/docs/upload")
            .multipart(upload_form(Some(("data.json", b"{}")), "corpora/data.json", "json"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["detail"], "provide either an uploaded file or a bucket path, not both");

        let response = server
            .post("/v1/projects/42/docs/upload")
            .multipart(upload_form(None, "", "json"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["detail"], "Empty content");
    }

    #[tokio::test]
    async fn upload_rejects_unknown_format() {
        let (server, _store, _cloud) = create_test_app();

        let response = server
            .post("/v1/projects/42/docs/upload")
            .multipart(upload_form(Some(("data.xlsx", b"text")), "", "excel"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["detail"], "format excel is invalid.");
    }

    #[test_log::test(tokio::test)]
    async fn upload_reports_each_invalid_line_as_detail_array() {
        let (server, _store, _cloud) = create_test_app();

        let dataset = b"{\"text\": \"ok\"}\nnot json\nalso not json\n";
        let response = server
            .post("/v1/projects/42/docs/upload")
            .multipart(upload_form(Some(("data.json", dataset)), "", "json"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        let problems = json.as_array().expect("array of problems");
        assert_eq!(problems.len(), 2);
        assert!(problems[0]["detail"].as_str().unwrap().starts_with("Invalid JSON on line 2:"));
        assert!(problems[1]["detail"].as_str().unwrap().starts_with("Invalid JSON on line 3:"));
    }

    #[tokio::test]
    async fn upload_enforces_size_limit() {
        let config = crate::config::Config {
            limits: crate::config::LimitsConfig { max_upload_bytes: 16 },
            ..Default::default()
        };
        let (server, _store, _cloud) = create_test_app_with_config(config);

        let response = server
            .post("/v1/projects/42/docs/upload")
            .multipart(upload_form(Some(("data.txt", b"this line is longer than sixteen bytes")), "", "plain"))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn upload_from_cloud_bucket() {
        let (server, store, cloud) = create_test_app();
        cloud.insert("corpora", "reviews.csv", Bytes::from_static(b"text,label\ngreat movie,positive\n"));

        let response = server
            .post("/v1/projects/7/docs/upload")
            .multipart(upload_form(None, "corpora/reviews.csv", "csv"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let docs = store.list_documents(7).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].annotations[0].label, "positive");
    }

    #[tokio::test]
    async fn upload_from_missing_cloud_object_is_client_error() {
        let (server, _store, _cloud) = create_test_app();

        let response = server
            .post("/v1/projects/7/docs/upload")
            .multipart(upload_form(None, "corpora/nope.csv", "csv"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert!(json["detail"].as_str().unwrap().contains("nope.csv"));
    }

    #[tokio::test]
    async fn upload_from_cloud_requires_configuration() {
        let (server, _store) = create_test_app_without_cloud();

        let response = server
            .post("/v1/projects/7/docs/upload")
            .multipart(upload_form(None, "corpora/reviews.csv", "csv"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["detail"], "cloud upload is not configured");
    }

    #[tokio::test]
    async fn download_returns_rendered_export() {
        let (server, _store, _cloud) = create_test_app();

        server
            .post("/v1/projects/9/docs/upload")
            .multipart(upload_form(Some(("data.csv", b"text,label\ngreat movie,positive\n")), "", "csv"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/v1/projects/9/docs/download")
            .multipart(upload_form(None, "", "csv"))
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.header("content-type"), "text/csv");
        let body = response.text();
        assert!(body.starts_with("id,text,label"));
        assert!(body.contains("great movie"));
    }

    #[tokio::test]
    async fn download_to_cloud_writes_object() {
        let (server, _store, cloud) = create_test_app();

        server
            .post("/v1/projects/9/docs/upload")
            .multipart(upload_form(Some(("data.txt", b"one document\n")), "", "plain"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/v1/projects/9/docs/download")
            .multipart(upload_form(None, "exports/project-9.jsonl", "json"))
            .await;

        response.assert_status(StatusCode::OK);
        let json: Value = response.json();
        assert_eq!(json["message"], "Uploaded 1 documents to \"exports\" bucket.");

        let object = cloud.get("exports", "project-9.jsonl").expect("export object written");
        let line: Value = serde_json::from_slice(object.split(|&b| b == b'\n').next().unwrap()).unwrap();
        assert_eq!(line["text"], "one document");
    }

    #[tokio::test]
    async fn download_rejects_import_only_format() {
        let (server, _store, _cloud) = create_test_app();

        let response = server
            .post("/v1/projects/9/docs/download")
            .multipart(upload_form(None, "", "conll"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["detail"], "format conll is invalid.");
    }
}
