use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::quotes::AppState;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "transport-pricing",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Ready once a catalog with global modifiers is loaded
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog.load();
    if catalog.global().is_none() {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({
            "status": "not_ready",
            "service": "transport-pricing",
            "reason": "global modifiers not loaded",
        })));
    }

    (StatusCode::OK, Json(json!({
        "status": "ready",
        "service": "transport-pricing",
        "tenants": catalog.tenant_ids().len(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{Catalog, GlobalModifiers};

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_requires_global_modifiers() {
        let state = AppState::for_tests(Catalog::default());
        let response = readiness_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let state = AppState::for_tests(Catalog::new(GlobalModifiers::default()));
        let response = readiness_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
