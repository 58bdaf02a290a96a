//! API Integration Tests
//!
//! These run against a router wired to in-process fakes, so the full
//! upload/chat flow is covered without Ollama or Groq. Tests marked with
//! #[ignore] require the real providers.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use docchat_api::test_utils::CANNED_REPLY;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "------------------------docchat0test";

/// Minimal single-page PDF containing `text`
fn pdf_with_text(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Build a multipart request from (field name, optional filename, content)
fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn create_json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Upload a PDF containing `text` and return the response JSON
async fn upload_pdf(app: &Router, filename: &str, text: &str) -> Value {
    let request = multipart_request("/upload", &[("file", Some(filename), &pdf_with_text(text))]);
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

fn dir_entry_count(path: &std::path::Path) -> usize {
    std::fs::read_dir(path).map(|d| d.count()).unwrap_or(0)
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

// =============================================================================
// Upload Validation Tests
// =============================================================================

#[tokio::test]
async fn test_upload_without_file_part() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let request = multipart_request("/upload", &[("text", None, b"hello")]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "No file part");
}

#[tokio::test]
async fn test_upload_empty_filename() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let request = multipart_request(
        "/upload",
        &[("file", Some(""), &pdf_with_text("The sky is blue."))],
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "No selected file");
}

#[tokio::test]
async fn test_upload_rejects_non_pdf() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let request = multipart_request("/upload", &[("file", Some("notes.txt"), b"plain text")]);
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid file type. Please upload a PDF.");

    // The rejected file must not appear in the listing
    let response = app
        .oneshot(Request::builder().uri("/pdfs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

// =============================================================================
// Upload and Listing Tests
// =============================================================================

#[tokio::test]
async fn test_upload_and_list() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let uploaded = upload_pdf(&app, "test.pdf", "The sky is blue.").await;
    assert_eq!(uploaded["message"], "File uploaded and processed successfully");
    let pdf_id = uploaded["pdf_id"].as_str().unwrap().to_string();
    assert!(!pdf_id.is_empty());

    let response = app
        .oneshot(Request::builder().uri("/pdfs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let listed = json.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], pdf_id.as_str());
    assert_eq!(listed[0]["filename"], "test.pdf");
}

#[tokio::test]
async fn test_upload_uppercase_extension() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let uploaded = upload_pdf(&app, "REPORT.PDF", "Quarterly numbers.").await;
    assert!(uploaded["pdf_id"].is_string());
}

#[tokio::test]
async fn test_list_preserves_upload_order() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let first = upload_pdf(&app, "a.pdf", "First document.").await;
    let second = upload_pdf(&app, "b.pdf", "Second document.").await;
    let third = upload_pdf(&app, "c.pdf", "Third document.").await;

    let ids: Vec<String> = [&first, &second, &third]
        .iter()
        .map(|j| j["pdf_id"].as_str().unwrap().to_string())
        .collect();
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/pdfs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    let listed: Vec<String> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(listed, ids);

    // A second listing returns the identical sequence
    let response = app
        .oneshot(Request::builder().uri("/pdfs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    let again: Vec<String> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(again, ids);
}

#[tokio::test]
async fn test_duplicate_uploads_get_distinct_ids() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let first = upload_pdf(&app, "notes.pdf", "Same content.").await;
    let second = upload_pdf(&app, "notes.pdf", "Same content.").await;
    assert_ne!(first["pdf_id"], second["pdf_id"]);

    let response = app
        .oneshot(Request::builder().uri("/pdfs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

// =============================================================================
// Chat Tests
// =============================================================================

#[tokio::test]
async fn test_chat_unknown_pdf_id() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let request = create_json_request(
        "POST",
        "/chat",
        json!({"message": "What color is the sky?", "pdf_id": "no-such-id"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid PDF ID");
}

#[tokio::test]
async fn test_chat_round_trip() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let uploaded = upload_pdf(&app, "sky.pdf", "The sky is blue.").await;
    let pdf_id = uploaded["pdf_id"].as_str().unwrap();

    let request = create_json_request(
        "POST",
        "/chat",
        json!({"message": "What color is the sky?", "pdf_id": pdf_id}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["response"], CANNED_REPLY);
}

#[tokio::test]
async fn test_chat_missing_pdf_id_field() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let request = create_json_request("POST", "/chat", json!({"message": "hello"}));
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

// =============================================================================
// Deletion and Cleanup Tests
// =============================================================================

#[tokio::test]
async fn test_delete_pdf() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let uploaded = upload_pdf(&app, "doomed.pdf", "Temporary document.").await;
    let pdf_id = uploaded["pdf_id"].as_str().unwrap().to_string();

    let index_dir = data.path().join("indexes").join(format!("doc_db_{pdf_id}"));
    assert_eq!(dir_entry_count(&data.path().join("uploads")), 1);
    assert!(index_dir.exists());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/pdfs/{pdf_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["pdf_id"], pdf_id.as_str());

    // Artifacts are gone and the listing is empty
    assert_eq!(dir_entry_count(&data.path().join("uploads")), 0);
    assert!(!index_dir.exists());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/pdfs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);

    // Deleting again is a 404
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/pdfs/{pdf_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid PDF ID");

    // And the deleted id is no longer chattable
    let request = create_json_request(
        "POST",
        "/chat",
        json!({"message": "still there?", "pdf_id": pdf_id}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_processing_cleans_up() {
    let data = tempfile::tempdir().unwrap();
    let app = docchat_api::create_router_for_testing(data.path());

    let request = multipart_request("/upload", &[("file", Some("broken.pdf"), b"not a pdf")]);
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Failed to process the uploaded PDF");

    // No registry entry and no leftover files
    let response = app
        .oneshot(Request::builder().uri("/pdfs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);

    assert_eq!(dir_entry_count(&data.path().join("uploads")), 0);
    assert_eq!(dir_entry_count(&data.path().join("indexes")), 0);
}

// =============================================================================
// Live Provider Tests
// =============================================================================

#[tokio::test]
#[ignore = "requires a running Ollama instance and GROQ_API_KEY"]
async fn test_live_end_to_end() {
    use docchat_api::{create_router, state::AppState};
    use docchat_core::config::AppConfig;
    use std::sync::Arc;

    let data = tempfile::tempdir().unwrap();
    let mut config = AppConfig::from_env().unwrap();
    config.storage.upload_dir = data.path().join("uploads");
    config.storage.index_root = data.path().join("indexes");

    let state = Arc::new(AppState::new(config).unwrap());
    let app = create_router(state);

    let uploaded = upload_pdf(&app, "sky.pdf", "The sky is blue.").await;
    let pdf_id = uploaded["pdf_id"].as_str().unwrap();

    let request = create_json_request(
        "POST",
        "/chat",
        json!({"message": "What color is the sky?", "pdf_id": pdf_id}),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let answer = json["response"].as_str().unwrap().to_lowercase();
    assert!(answer.contains("blue"), "unexpected answer: {answer}");

    // Questions the document cannot answer should be declined, not invented
    let request = create_json_request(
        "POST",
        "/chat",
        json!({"message": "What is the capital of France?", "pdf_id": pdf_id}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let answer = json["response"].as_str().unwrap().to_lowercase();
    assert!(!answer.contains("paris"), "answered out of scope: {answer}");
}
