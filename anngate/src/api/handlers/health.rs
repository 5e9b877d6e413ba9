use crate::api::models::docs::HealthResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "health",
    summary = "Liveness probe",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "green".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;
    use serde_json::Value;

    #[tokio::test]
    async fn health_is_green() {
        let (server, _store, _cloud) = create_test_app();

        let response = server.get("/v1/health").await;
        response.assert_status(StatusCode::OK);
        let json: Value = response.json();
        assert_eq!(json["status"], "green");
    }
}
