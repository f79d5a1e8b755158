use crate::api::MgmtState;
use crate::api::schemas::health::HealthResponse;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

pub async fn root() -> impl IntoResponse {
    "OK"
}

pub async fn robots() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "Disallow: /\n")
}

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe: checks that the queue is reachable.
pub async fn readyz(State(state): State<MgmtState>) -> impl IntoResponse {
    match state.health_service.check_queue().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok".into(), queue: "ok".into() })),
        Err(e) => {
            tracing::warn!(error = %e, component = "queue", "Readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse { status: "error".into(), queue: "error".into() }),
            )
        }
    }
}
