//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Health** (`/v1/health`): Liveness probe
//! - **Features** (`/v1/features`): Server capability flags for clients
//! - **Documents** (`/v1/projects/{project_id}/docs/*`): Dataset import and export
//! - **Labels** (`/v1/projects/{project_id}/labels/*`): Label definition import
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
