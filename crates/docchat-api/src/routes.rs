//! API route definitions

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{chat, documents, health};
use crate::state::AppState;

/// Create the API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(documents::upload_pdf))
        .route("/chat", post(chat::chat_handler))
        .route("/pdfs", get(documents::list_pdfs))
        .route("/pdfs/:id", delete(documents::delete_pdf))
        .route("/health", get(health::health_check))
}
