//! Document management handlers
//!
//! Upload validation mirrors the order clients observe: presence of the
//! `file` part, then a non-empty filename, then the `.pdf` extension. Only
//! after all three pass is anything written to disk.

use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use docchat_core::{PdfDocument, PdfSummary};
use docchat_vector::DiskIndex;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::registry::RegisteredPdf;
use crate::state::AppState;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub pdf_id: String,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub pdf_id: String,
}

/// Upload a PDF and build its retrieval pipeline
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart request: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart request: {e}")))?;
        upload = Some((filename, data.to_vec()));
    }

    let (filename, data) = upload.ok_or_else(|| ApiError::BadRequest("No file part".to_string()))?;
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No selected file".to_string()));
    }
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::BadRequest(
            "Invalid file type. Please upload a PDF.".to_string(),
        ));
    }

    let pdf_id = Uuid::new_v4().to_string();
    let filename = sanitize_filename(&filename);

    let upload_dir = &state.config.storage.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| ApiError::PipelineBuild(e.into()))?;
    let file_path = upload_dir.join(format!("{pdf_id}_{filename}"));
    tokio::fs::write(&file_path, &data)
        .await
        .map_err(|e| ApiError::PipelineBuild(e.into()))?;

    let index_dir = state
        .config
        .storage
        .index_root
        .join(format!("doc_db_{pdf_id}"));

    let qa = match state.pipelines.build(&file_path, &index_dir).await {
        Ok(qa) => qa,
        Err(err) => {
            cleanup_artifacts(&file_path, &index_dir).await;
            return Err(ApiError::PipelineBuild(err));
        }
    };

    let doc = PdfDocument::new(pdf_id.clone(), filename, file_path, index_dir)
        .with_chunk_count(qa.chunk_count());
    tracing::info!(
        pdf_id = %pdf_id,
        filename = %doc.filename,
        chunks = doc.chunk_count,
        "Document registered"
    );
    state
        .registry
        .register(RegisteredPdf {
            doc,
            qa: Arc::new(qa),
        })
        .await;

    Ok(Json(UploadResponse {
        message: "File uploaded and processed successfully".to_string(),
        pdf_id,
    }))
}

/// List registered documents in upload order
pub async fn list_pdfs(State(state): State<Arc<AppState>>) -> Json<Vec<PdfSummary>> {
    Json(state.registry.list().await)
}

/// Delete a document, its uploaded file, and its index
pub async fn delete_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .registry
        .remove(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Invalid PDF ID".to_string()))?;

    cleanup_artifacts(&entry.doc.file_path, &entry.doc.index_dir).await;
    tracing::info!(pdf_id = %id, "Document deleted");

    Ok(Json(DeleteResponse {
        message: "PDF deleted".to_string(),
        pdf_id: id,
    }))
}

/// Remove a document's on-disk artifacts. Failures are logged, not returned,
/// so a half-missing document can still be cleaned up.
async fn cleanup_artifacts(file_path: &std::path::Path, index_dir: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(file_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %file_path.display(), error = %e, "Failed to remove uploaded file");
        }
    }
    if let Err(e) = DiskIndex::remove(index_dir) {
        tracing::warn!(dir = %index_dir.display(), error = %e, "Failed to remove index directory");
    }
}

/// Reduce a client-supplied filename to a safe disk name
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload.pdf".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("Report-2024_v1.pdf"), "Report-2024_v1.pdf");
    }

    #[test]
    fn test_sanitize_replaces_spaces_and_symbols() {
        assert_eq!(sanitize_filename("my report (final).pdf"), "my_report__final_.pdf");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        let name = sanitize_filename("../../etc/passwd.pdf");
        assert!(!name.contains('/'));
        assert!(!name.starts_with('.'));
    }

    #[test]
    fn test_sanitize_unicode() {
        let name = sanitize_filename("보고서.pdf");
        assert!(name.ends_with(".pdf"));
        assert!(name.chars().all(|c| c.is_ascii()));
    }
}
