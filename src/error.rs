use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Configuration error
    ConfigError(String),
    /// Upload rejected before any remote call
    InvalidUpload(String),
    /// Upstream API returned a non-success status
    UpstreamError { status: StatusCode, message: String },
    /// Model output did not match the requested schema
    MalformedOutput(String),
    /// Model declined to answer
    Refused(String),
    /// Internal server error
    InternalError(String),
    /// HTTP request error (preserves reqwest::Error for failure classification)
    HttpRequest(reqwest::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InvalidUpload(msg) => write!(f, "Invalid upload: {}", msg),
            Self::UpstreamError { status, message } => {
                write!(f, "Upstream error ({}): {}", status, message)
            }
            Self::MalformedOutput(msg) => write!(f, "Malformed model output: {}", msg),
            Self::Refused(msg) => write!(f, "Model refused: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
            Self::HttpRequest(err) => write!(f, "HTTP request error: {}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::InvalidUpload(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Upstream status is not passed through
            Self::UpstreamError { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            Self::MalformedOutput(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            Self::Refused(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            Self::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::HttpRequest(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

pub(crate) fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ConfigError(_) => "config_error",
        AppError::InvalidUpload(_) => "invalid_upload",
        AppError::UpstreamError { .. } => "upstream_error",
        AppError::MalformedOutput(_) => "malformed_output",
        AppError::Refused(_) => "refused",
        AppError::InternalError(_) => "internal_error",
        AppError::HttpRequest(_) => "http_request_error",
    }
}

// Implement conversions from common error types
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpRequest(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedOutput(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::InvalidUpload("Upload an image file.".to_string());
        assert_eq!(error.to_string(), "Invalid upload: Upload an image file.");
    }

    #[test]
    fn test_error_type_name() {
        assert_eq!(
            error_type_name(&AppError::InvalidUpload("test".to_string())),
            "invalid_upload"
        );
        assert_eq!(
            error_type_name(&AppError::MalformedOutput("test".to_string())),
            "malformed_output"
        );
    }

    #[tokio::test]
    async fn test_invalid_upload_is_client_error() {
        let error = AppError::InvalidUpload("Upload an image file.".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upstream_errors_are_bad_gateway() {
        let error = AppError::UpstreamError {
            status: StatusCode::UNAUTHORIZED,
            message: "bad key".to_string(),
        };
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);

        let error = AppError::MalformedOutput("missing field `brand`".to_string());
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_serde_error_becomes_malformed_output() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(AppError::from(err), AppError::MalformedOutput(_)));
    }
}
