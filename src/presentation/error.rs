// Error responses for HTTP handlers
use crate::domain::filter::FilterError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("log source unavailable: {0:#}")]
    LogSource(anyhow::Error),

    #[error("query backend failed: {0:#}")]
    Backend(anyhow::Error),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::LogSource(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Upstream failures can succeed on retry; bad input cannot.
    fn retryable(&self) -> bool {
        !matches!(self, ApiError::BadRequest(_))
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        let body = json!({
            "error": self.to_string(),
            "retryable": self.retryable(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::LogSource(anyhow::anyhow!("x")).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::Backend(anyhow::anyhow!("x")).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_filter_error_is_bad_request() {
        let err: ApiError = FilterError::InvalidDate("tomorrow".into()).into();

        assert!(!err.retryable());
        assert!(err.to_string().contains("tomorrow"));
    }

    #[test]
    fn test_context_chain_in_message() {
        let source = anyhow::anyhow!("connection refused").context("Query backend request failed");
        let err = ApiError::Backend(source);

        assert_eq!(
            err.to_string(),
            "query backend failed: Query backend request failed: connection refused"
        );
    }
}
