//! API error handling
//!
//! Client mistakes carry their message through to the response body.
//! Pipeline failures respond with a fixed message per failure class and log
//! the underlying error server-side, so provider responses and filesystem
//! paths never reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docchat_core::DocChatError;
use serde::{Deserialize, Serialize};

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request, message is returned verbatim
    BadRequest(String),
    /// Chat request referenced a pdf_id that is not registered
    InvalidPdfId,
    /// Resource does not exist
    NotFound(String),
    /// Upload pipeline failed while processing the document
    PipelineBuild(DocChatError),
    /// Retrieval or LLM call failed while answering
    Generation(DocChatError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidPdfId => {
                (StatusCode::BAD_REQUEST, "Invalid PDF ID".to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::PipelineBuild(err) => {
                tracing::error!(error = %err, "PDF processing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process the uploaded PDF".to_string(),
                )
            }
            ApiError::Generation(err) => {
                tracing::error!(error = %err, "Answer generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate a response".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
