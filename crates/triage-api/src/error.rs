//! API error taxonomy.
//!
//! Every failure the service can report has a stable machine-readable code
//! and an HTTP status. The triage engine itself never fails; all of these
//! come from request validation or the storage and classifier collaborators.
//!
//! | Code                   | Status | When |
//! |------------------------|--------|------|
//! | `UNAUTHORIZED`         | 401    | shared secret missing or wrong |
//! | `BAD_REQUEST`          | 400    | body not JSON, key missing or invalid |
//! | `INVALID_CONTENT_TYPE` | 400    | presign for a non-image type |
//! | `IMAGE_NOT_FOUND`      | 404    | no object under the key |
//! | `HF_INFERENCE_FAILED`  | 502    | classifier call failed |
//! | `UPLOAD_REJECTED`      | 403    | bad or expired upload signature |
//! | `PRESIGN_FAILED`       | 500    | could not sign an upload URL |
//! | `UPLOAD_FAILED`        | 500    | could not store an upload |
//! | `ANALYZE_FAILED`       | 500    | anything else during analyze |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::contracts::ErrorResponse;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing or invalid secret.")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("Only image/png or image/jpeg allowed.")]
    InvalidContentType,
    #[error("Image key not found in storage.")]
    ImageNotFound,
    #[error("HF failed: {0}")]
    InferenceFailed(String),
    #[error("{0}")]
    UploadRejected(String),
    #[error("Failed to generate presigned URL.")]
    PresignFailed,
    #[error("Upload failed.")]
    UploadFailed,
    #[error("Analyze failed.")]
    AnalyzeFailed,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::InvalidContentType => "INVALID_CONTENT_TYPE",
            Self::ImageNotFound => "IMAGE_NOT_FOUND",
            Self::InferenceFailed(_) => "HF_INFERENCE_FAILED",
            Self::UploadRejected(_) => "UPLOAD_REJECTED",
            Self::PresignFailed => "PRESIGN_FAILED",
            Self::UploadFailed => "UPLOAD_FAILED",
            Self::AnalyzeFailed => "ANALYZE_FAILED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::InvalidContentType => StatusCode::BAD_REQUEST,
            Self::ImageNotFound => StatusCode::NOT_FOUND,
            Self::InferenceFailed(_) => StatusCode::BAD_GATEWAY,
            Self::UploadRejected(_) => StatusCode::FORBIDDEN,
            Self::PresignFailed | Self::UploadFailed | Self::AnalyzeFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse::new(self.code(), self.to_string()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            ApiError::Unauthorized,
            ApiError::bad_request("x"),
            ApiError::InvalidContentType,
            ApiError::ImageNotFound,
            ApiError::InferenceFailed("503".into()),
            ApiError::UploadRejected("x".into()),
            ApiError::PresignFailed,
            ApiError::UploadFailed,
            ApiError::AnalyzeFailed,
        ];
        let codes: std::collections::HashSet<_> = all.iter().map(ApiError::code).collect();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_inference_message_carries_status() {
        let e = ApiError::InferenceFailed("503".into());
        assert_eq!(e.to_string(), "HF failed: 503");
        assert_eq!(e.status(), StatusCode::BAD_GATEWAY);
    }
}
