//! Router-level tests for the upload / ask / history flow.

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use docqa_server::config::Settings;
use docqa_server::services::{AnswerExtractor, CandidateAnswer, QaService};
use docqa_server::{build_router, AppState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const PARIS: &str = "Paris is the capital of France. It has a population of over two million.";
const BOUNDARY: &str = "docqa-test-boundary";

/// Answers "Paris" to capital questions on the window that mentions it
#[derive(Default)]
struct StubExtractor {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl AnswerExtractor for StubExtractor {
    async fn extract(&self, question: &str, context: &str) -> Result<CandidateAnswer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if question.contains("capital") && context.contains("capital of France") {
            Ok(CandidateAnswer::new("Paris", 0.95))
        } else {
            Ok(CandidateAnswer::new("", 0.0))
        }
    }
}

struct FailingExtractor;

#[async_trait::async_trait]
impl AnswerExtractor for FailingExtractor {
    async fn extract(&self, _question: &str, _context: &str) -> Result<CandidateAnswer> {
        anyhow::bail!("inference server at 10.0.0.7 refused connection")
    }
}

fn test_app(extractor: Arc<dyn AnswerExtractor>) -> (axum::Router, Arc<QaService>) {
    let settings = Settings::default();
    let qa_service = Arc::new(QaService::from_settings(&settings, extractor));
    (build_router(AppState::new(qa_service.clone(), settings)), qa_service)
}

fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn upload(app: &axum::Router, filename: &str, content: &[u8]) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(filename, content)))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, read_json(response).await)
}

async fn ask(app: &axum::Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ask")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, read_json(response).await)
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if body.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_upload_then_ask() {
    let extractor = Arc::new(StubExtractor::default());
    let (app, _) = test_app(extractor.clone());

    let (status, json) = upload(&app, "paris.txt", PARIS.as_bytes()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["history"], serde_json::json!([]));
    let session_id = json["session_id"].as_str().unwrap().to_string();
    assert!(!session_id.is_empty());

    let (status, json) = ask(
        &app,
        serde_json::json!({
            "session_id": session_id,
            "question": "What is the capital of France?"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "Paris");
    let history = json["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["question"], "What is the capital of France?");
    assert_eq!(history[0]["answer"], "Paris");
    assert!(history[0]["timestamp"].is_string());

    // Whole document fits in one 512-char window
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_history_endpoint_and_close() {
    let (app, qa_service) = test_app(Arc::new(StubExtractor::default()));
    let session_id = qa_service
        .intake_text(PARIS.to_string())
        .unwrap()
        .session_id
        .to_string();

    for question in ["What is the capital of France?", "How many people live there?"] {
        let (status, _) = ask(
            &app,
            serde_json::json!({"session_id": session_id, "question": question}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/sessions/{}/history", session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    let history = json["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["answer"], "No relevant answer found in the document.");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{}", session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, json) = ask(
        &app,
        serde_json::json!({"session_id": session_id, "question": "Still there?"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "SessionNotFound");
}

#[tokio::test]
async fn test_empty_document_is_rejected() {
    let (app, qa_service) = test_app(Arc::new(StubExtractor::default()));
    let session_id = qa_service.intake_text(String::new()).unwrap().session_id;

    let (status, json) = ask(
        &app,
        serde_json::json!({"session_id": session_id, "question": "Anything?"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "EmptyDocument");
}

#[tokio::test]
async fn test_blank_question_is_rejected() {
    let (app, qa_service) = test_app(Arc::new(StubExtractor::default()));
    let session_id = qa_service.intake_text(PARIS.to_string()).unwrap().session_id;

    let (status, json) = ask(
        &app,
        serde_json::json!({"session_id": session_id, "question": "   "}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "EmptyQuestion");
}

#[tokio::test]
async fn test_unknown_and_missing_session() {
    let (app, _) = test_app(Arc::new(StubExtractor::default()));

    let (status, json) = ask(
        &app,
        serde_json::json!({"session_id": "no-such-session", "question": "Hello?"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "SessionNotFound");

    let (status, json) = ask(&app, serde_json::json!({"question": "Hello?"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "SessionNotFound");
}

#[tokio::test]
async fn test_malformed_ask_body() {
    let (app, _) = test_app(Arc::new(StubExtractor::default()));

    let (status, json) = ask(&app, serde_json::json!({"session_id": "x"})).await;
    assert!(status.is_client_error());
    assert_eq!(json["error"], "BadRequest");
}

#[tokio::test]
async fn test_unsupported_upload() {
    let (app, qa_service) = test_app(Arc::new(StubExtractor::default()));

    let (status, json) = upload(&app, "budget.xlsx", b"PK\x03\x04binary").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "UnsupportedFormat");

    let (status, json) = upload(&app, "fake.pdf", b"not a pdf at all").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "UnsupportedFormat");

    assert!(qa_service.store().is_empty());
}

#[tokio::test]
async fn test_corrupt_pdf_upload() {
    let (app, _) = test_app(Arc::new(StubExtractor::default()));

    let (status, json) = upload(&app, "broken.pdf", b"%PDF-1.4\ngarbage without xref").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "ExtractionFailure");
}

#[tokio::test]
async fn test_collaborator_failure_is_generic() {
    let (app, qa_service) = test_app(Arc::new(FailingExtractor));
    let session_id = qa_service.intake_text(PARIS.to_string()).unwrap().session_id;

    let (status, json) = ask(
        &app,
        serde_json::json!({"session_id": session_id, "question": "What is the capital of France?"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "CollaboratorFailure");
    assert!(!json["message"].as_str().unwrap().contains("10.0.0.7"));
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app(Arc::new(StubExtractor::default()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["status"], "healthy");
}
