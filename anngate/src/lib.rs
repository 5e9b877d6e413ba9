//! # anngate: Dataset Import/Export Gateway
//!
//! `anngate` is the dataset gateway of a collaborative text-annotation
//! platform. It mediates between user-supplied dataset files and the
//! platform's document store: uploads are parsed (plain text, CSV,
//! JSON-lines, CoNLL) into documents and annotations, exports render a
//! project's documents back out (CSV or JSON-lines), and both directions can
//! go through cloud object storage instead of the request body.
//!
//! ## Overview
//!
//! Annotation projects themselves (CRUD, membership, the labeling UI) live
//! in other services; this crate owns the import/export workflow only. The
//! HTTP surface is deliberately small:
//!
//! - `POST /v1/projects/{project_id}/docs/upload` — import a dataset from an
//!   uploaded file or a cloud bucket object
//! - `POST /v1/projects/{project_id}/docs/download` — export a project,
//!   either as the response body or into a cloud bucket
//! - `POST /v1/projects/{project_id}/labels/upload` — import label definitions
//! - `GET /v1/features` — capability flags for clients (`cloud_upload`)
//! - `GET /v1/health` — liveness
//!
//! Error responses keep the `{"detail": ...}` body shape (single object, or
//! an array with one entry per invalid record), which the bundled
//! [`client::Gateway`] normalizes into user-facing message lists exactly the
//! way the platform's upload screen renders them.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer. Persistence is behind the [`store::ProjectStore`] seam
//! (the platform's datastore is an external service; the standalone binary
//! runs on the in-memory implementation), and cloud object storage is behind
//! [`cloud::BucketStore`] with an S3 implementation. Concurrent imports into
//! the same project are serialized with a per-project async lock so
//! interleaved uploads cannot interleave their document batches.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use anngate::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = anngate::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     anngate::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod client;
pub mod cloud;
pub mod config;
pub mod errors;
pub mod formats;
mod openapi;
pub mod store;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::cloud::{BucketStore, S3BucketStore};
use crate::openapi::ApiDoc;
use crate::store::{InMemoryStore, ProjectStore};
use crate::types::ProjectId;
use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `config`: Application configuration loaded from file/environment
/// - `store`: Document and label repository
/// - `cloud`: Object storage, present only when the `cloud` config section is set
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ProjectStore>,
    pub cloud: Option<Arc<dyn BucketStore>>,
    #[builder(default)]
    upload_locks: Arc<DashMap<ProjectId, Arc<Mutex<()>>>>,
}

impl AppState {
    /// The import lock for a project. Uploads hold it while parsing and
    /// storing so concurrent imports into one project are serialized.
    pub fn upload_lock(&self, project: ProjectId) -> Arc<Mutex<()>> {
        self.upload_locks.entry(project).or_default().clone()
    }
}

/// Assemble the full application router.
pub fn build_router(state: AppState) -> Router {
    // Leave some slack above the dataset limit for the surrounding multipart
    // framing; the handlers enforce the precise per-file cap while streaming.
    let body_limit = state.config.limits.max_upload_bytes.saturating_add(64 * 1024);

    let api_routes = Router::new()
        .route("/health", get(api::handlers::health::health))
        .route("/features", get(api::handlers::features::get_features))
        .route("/projects/{project_id}/docs/upload", post(api::handlers::docs::upload_docs))
        .route("/projects/{project_id}/docs/download", post(api::handlers::docs::download_docs))
        .route("/projects/{project_id}/labels/upload", post(api::handlers::labels::upload_labels))
        .with_state(state);

    Router::new()
        .nest("/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(CorsLayer::permissive())
}

/// The assembled application: state, router, and server lifecycle.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn ProjectStore> = Arc::new(InMemoryStore::new());

        let cloud: Option<Arc<dyn BucketStore>> = match &config.cloud {
            Some(cloud_config) => {
                info!("Cloud storage configured, bucket import/export enabled");
                Some(Arc::new(S3BucketStore::from_config(cloud_config).await))
            }
            None => None,
        };

        let state = AppState::builder().config(config.clone()).store(store).maybe_cloud(cloud).build();

        Ok(Self {
            router: build_router(state),
            config,
        })
    }

    /// Start serving the application.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Dataset gateway listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
