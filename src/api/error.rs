//! Conversion of failures into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tracing::error;

use super::dto::{ErrorResponse, LegacyErrorResponse};
use crate::pipeline::{ErrorKind, PipelineError};
use crate::utils::format_limit_mb;

/// Which error body an endpoint answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{success: false, message}`
    Legacy,
    /// `{error}`
    Plain,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub envelope: Envelope,
}

impl ApiError {
    pub fn new(envelope: Envelope, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            envelope,
        }
    }

    pub fn legacy(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(Envelope::Legacy, status, message)
    }

    pub fn plain(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(Envelope::Plain, status, message)
    }

    /// Map a pipeline failure. Internal errors are logged in full and
    /// answered with a message that carries no filesystem paths.
    pub fn from_pipeline(err: PipelineError, envelope: Envelope) -> Self {
        let (status, message) = match err.kind() {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, validation_message(&err)),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "File does not exist".to_string()),
            ErrorKind::Conflict => (
                StatusCode::CONFLICT,
                "A file with the same name is being processed, please retry".to_string(),
            ),
            ErrorKind::Internal => {
                error!("Request failed: {}", err);
                let message = match &err {
                    PipelineError::Compression(e) => {
                        format!("Image compression failed: {}", e.public_message())
                    }
                    _ => "Failed to save file".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        Self::new(envelope, status, message)
    }
}

fn validation_message(err: &PipelineError) -> String {
    match err {
        PipelineError::FileTooLarge { limit, .. } => {
            format!("File size exceeds the {} limit", format_limit_mb(*limit))
        }
        PipelineError::InvalidFileName(_) => "Invalid file name".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.envelope {
            Envelope::Legacy => (
                self.status,
                Json(LegacyErrorResponse {
                    success: false,
                    message: self.message,
                }),
            )
                .into_response(),
            Envelope::Plain => (
                self.status,
                Json(ErrorResponse {
                    error: self.message,
                }),
            )
                .into_response(),
        }
    }
}
