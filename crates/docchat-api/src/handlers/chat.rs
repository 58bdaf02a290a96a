//! Chat handler

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User question
    pub message: String,
    /// Id returned by the upload endpoint
    pub pdf_id: String,
}

/// Chat response body
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Answer a question against a previously uploaded document
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .registry
        .lookup(&req.pdf_id)
        .await
        .ok_or(ApiError::InvalidPdfId)?;

    tracing::info!(pdf_id = %req.pdf_id, "Answering chat message");
    let answer = entry.qa.ask(&req.message).await.map_err(ApiError::Generation)?;

    Ok(Json(ChatResponse { response: answer }))
}
