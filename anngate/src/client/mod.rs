//! Client-side upload/export gateway.
//!
//! [`Gateway`] is the programmatic counterpart of the platform's dataset
//! upload screen: it submits dataset files (or cloud bucket references) to a
//! project's import endpoint, triggers exports, and folds backend error
//! payloads into a list of user-facing messages via [`problems`].
//!
//! A gateway instance owns its feedback state outright: `messages` and the
//! loading flag are component-local, mutated only by the operation that is
//! currently running. Requests are fire-and-observe: no retries, no
//! cancellation, and whatever timeout the transport defaults to.
//!
//! ```no_run
//! use anngate::client::Gateway;
//! use anngate::formats::Format;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut gateway = Gateway::new("http://localhost:3002".parse()?, 42)?;
//! gateway.fetch_features().await;
//!
//! let outcome = gateway
//!     .upload_local(std::fs::read("data.json")?, "data.json", Format::Json)
//!     .await;
//! for message in gateway.messages() {
//!     eprintln!("{message}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod problems;

use crate::formats::{ExportFormat, Format};
use crate::types::ProjectId;
use bytes::Bytes;
use reqwest::multipart;
use serde::Deserialize;
use url::Url;

/// Result of an upload submission.
///
/// Success is explicit here rather than implied by an empty message list;
/// the message-clearing side effect still happens for rendering purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The dataset was accepted by the backend.
    Accepted,
    /// The submission failed; the message list holds the reasons.
    Rejected,
}

/// Result of a download submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// A local export: the rendered bytes.
    File(Bytes),
    /// A cloud export was written to the requested bucket.
    SentToCloud,
    /// The submission failed; the message list holds the reasons.
    Rejected,
}

#[derive(Deserialize)]
struct FeaturesBody {
    cloud_upload: bool,
}

/// Dataset import/export gateway for one annotation project.
pub struct Gateway {
    http: reqwest::Client,
    upload_url: Url,
    download_url: Url,
    features_url: Url,
    messages: Vec<String>,
    is_loading: bool,
    cloud_upload_enabled: bool,
}

impl Gateway {
    /// Create a gateway for `project_id` on the platform at `base_url`.
    pub fn new(mut base_url: Url, project_id: ProjectId) -> Result<Self, url::ParseError> {
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            upload_url: base_url.join(&format!("v1/projects/{project_id}/docs/upload"))?,
            download_url: base_url.join(&format!("v1/projects/{project_id}/docs/download"))?,
            features_url: base_url.join("v1/features")?,
            messages: Vec::new(),
            is_loading: false,
            cloud_upload_enabled: false,
        })
    }

    /// User-facing feedback from the most recent submission. Empty after a
    /// successful one.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Whether a submission is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether the backend reports cloud upload as available. Gates the
    /// bucket-based affordances only; the server enforces regardless.
    pub fn cloud_upload_enabled(&self) -> bool {
        self.cloud_upload_enabled
    }

    /// Upload a local dataset file into the project.
    ///
    /// The request carries the file part, an empty `bucket` field, and the
    /// format selector; a local upload never names a bucket.
    pub async fn upload_local(&mut self, bytes: Vec<u8>, filename: &str, format: Format) -> UploadOutcome {
        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(filename.to_string()))
            .text("bucket", "")
            .text("format", format.to_string());

        match self.submit(self.upload_url.clone(), form).await {
            Some(_) => UploadOutcome::Accepted,
            None => UploadOutcome::Rejected,
        }
    }

    /// Import a dataset from a cloud object (`<bucket>/<object-key>`)
    /// instead of uploading bytes. The request carries no file part.
    pub async fn upload_from_cloud(&mut self, bucket: &str, format: Format) -> UploadOutcome {
        let form = multipart::Form::new()
            .text("bucket", bucket.to_string())
            .text("format", format.to_string());

        match self.submit(self.upload_url.clone(), form).await {
            Some(_) => UploadOutcome::Accepted,
            None => UploadOutcome::Rejected,
        }
    }

    /// Export the project's annotated documents to a cloud object.
    pub async fn download_to_cloud(&mut self, bucket: &str, format: ExportFormat) -> DownloadOutcome {
        let form = multipart::Form::new()
            .text("bucket", bucket.to_string())
            .text("format", format.to_string());

        match self.submit(self.download_url.clone(), form).await {
            Some(_) => DownloadOutcome::SentToCloud,
            None => DownloadOutcome::Rejected,
        }
    }

    /// Export the project's annotated documents and return the rendered
    /// bytes.
    pub async fn download_local(&mut self, format: ExportFormat) -> DownloadOutcome {
        let form = multipart::Form::new().text("bucket", "").text("format", format.to_string());

        match self.submit(self.download_url.clone(), form).await {
            Some(response) => match response.bytes().await {
                Ok(bytes) => DownloadOutcome::File(bytes),
                Err(e) => {
                    self.messages.push(format!("failed to read the exported file: {e}"));
                    DownloadOutcome::Rejected
                }
            },
            None => DownloadOutcome::Rejected,
        }
    }

    /// Refresh the feature flags, typically once on session start.
    ///
    /// Any failure (transport, non-2xx, undecodable body) reports cloud
    /// upload as disabled rather than leaving the flag indeterminate.
    pub async fn fetch_features(&mut self) {
        let fetched = async {
            let response = self.http.get(self.features_url.clone()).send().await.ok()?;
            let response = response.error_for_status().ok()?;
            response.json::<FeaturesBody>().await.ok()
        }
        .await;

        self.cloud_upload_enabled = match fetched {
            Some(body) => body.cloud_upload,
            None => {
                tracing::warn!("failed to fetch feature flags, disabling cloud upload");
                false
            }
        };
    }

    /// Submit a multipart form, maintaining the loading flag and the message
    /// list. Returns the response on success, `None` on any failure; both
    /// application errors and transport failures end up as messages.
    async fn submit(&mut self, url: Url, form: multipart::Form) -> Option<reqwest::Response> {
        self.is_loading = true;
        let result = self.http.post(url).multipart(form).send().await;
        let response = match result {
            Ok(response) if response.status().is_success() => {
                self.messages.clear();
                Some(response)
            }
            Ok(response) => {
                let body = response.bytes().await.unwrap_or_default();
                match serde_json::from_slice::<serde_json::Value>(&body) {
                    Ok(value) => problems::extend_messages(&mut self.messages, &value),
                    Err(_) => self.messages.push("the server returned an unreadable error response".to_string()),
                }
                None
            }
            Err(e) => {
                self.messages.push(format!("request failed: {e}"));
                None
            }
        };
        self.is_loading = false;
        response
    }
}
