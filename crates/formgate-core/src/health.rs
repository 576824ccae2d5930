use axum::http::StatusCode;

/// Handler for `GET /healthz` — liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz` — readiness check. The relay holds no warm
/// state beyond its connection pools, so ready as soon as the router is up.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
