use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration or catalog error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// No global modifier document is configured
    #[error("Global modifiers are not configured")]
    MissingGlobalModifiers,
    #[error("Tenant not found: {0}")]
    TenantNotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The tenant's rate source has no rate for the requested distance
    #[error("No rate available: {0}")]
    NoRateAvailable(String),
    /// Carrier service answered with a non-success status
    #[error("Upstream error ({status}): {message}")]
    UpstreamError { status: StatusCode, message: String },
    /// Carrier service answered with a body we could not use
    #[error("Invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),
    /// HTTP request error (preserves reqwest::Error for failure classification)
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("Rate lookup timed out after {0}s")]
    Timeout(u64),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Whether the error came from resolving a vehicle's base carrier rate.
    ///
    /// Any such failure is fatal for the whole quote; a partially priced quote
    /// is never returned.
    pub fn is_rate_lookup_failure(&self) -> bool {
        match self {
            AppError::UpstreamError { .. }
            | AppError::InvalidUpstreamResponse(_)
            | AppError::HttpRequest(_)
            | AppError::Timeout(_) => true,

            AppError::ConfigError(_)
            | AppError::MissingGlobalModifiers
            | AppError::TenantNotFound(_)
            | AppError::InvalidRequest(_)
            | AppError::NoRateAvailable(_)
            | AppError::InternalError(_) => false,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ConfigError(_)
            | AppError::MissingGlobalModifiers
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TenantNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NoRateAvailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UpstreamError { .. } | AppError::InvalidUpstreamResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::HttpRequest(err) if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::HttpRequest(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

pub fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ConfigError(_) => "config_error",
        AppError::MissingGlobalModifiers => "missing_global_modifiers",
        AppError::TenantNotFound(_) => "tenant_not_found",
        AppError::InvalidRequest(_) => "invalid_request",
        AppError::NoRateAvailable(_) => "no_rate_available",
        AppError::UpstreamError { .. } => "upstream_error",
        AppError::InvalidUpstreamResponse(_) => "invalid_upstream_response",
        AppError::HttpRequest(_) => "http_request_error",
        AppError::Timeout(_) => "timeout",
        AppError::InternalError(_) => "internal_error",
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::TenantNotFound("acme".to_string());
        assert_eq!(error.to_string(), "Tenant not found: acme");

        let error = AppError::UpstreamError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "carrier down".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Upstream error (503 Service Unavailable): carrier down"
        );
    }

    #[test]
    fn test_error_type_name() {
        assert_eq!(error_type_name(&AppError::MissingGlobalModifiers), "missing_global_modifiers");
        assert_eq!(error_type_name(&AppError::Timeout(15)), "timeout");
    }

    #[test]
    fn test_rate_lookup_failures() {
        let error = AppError::UpstreamError {
            status: StatusCode::BAD_REQUEST,
            message: "unknown city".to_string(),
        };
        assert!(error.is_rate_lookup_failure());
        assert!(AppError::InvalidUpstreamResponse("missing price".to_string()).is_rate_lookup_failure());
        assert!(AppError::Timeout(15).is_rate_lookup_failure());
    }

    #[test]
    fn test_business_errors_are_not_rate_lookup_failures() {
        assert!(!AppError::MissingGlobalModifiers.is_rate_lookup_failure());
        assert!(!AppError::NoRateAvailable("900 miles".to_string()).is_rate_lookup_failure());
        assert!(!AppError::TenantNotFound("acme".to_string()).is_rate_lookup_failure());
    }

    #[tokio::test]
    async fn test_error_response() {
        let response = AppError::TenantNotFound("acme".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::Timeout(15).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let response = AppError::NoRateAvailable("900 miles".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = AppError::UpstreamError {
            status: StatusCode::BAD_REQUEST,
            message: "bad city".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
