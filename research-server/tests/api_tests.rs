use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use research_agent::ResearchOrchestrator;
use research_model::{Generator, ModelError};
use research_rag::{Document, Embedder, InMemoryVectorIndex, Ingestor, RagError, RagPipeline};
use research_server::{
    AppState, app_router,
    protocol::{ResearchResponse, Status, StatusResponse},
    server::app_router_with_limit,
};
use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};
use serde_json::Value;
use tempfile::TempDir;

const VOCABULARY: [&str; 4] = ["sky", "blue", "grass", "green"];

/// Counts vocabulary terms; text starting with "boom" fails to embed.
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, text: &str) -> research_rag::Result<Vec<f32>> {
        if text.starts_with("boom") {
            return Err(RagError::EmbeddingError {
                provider: "keyword".to_string(),
                message: "connection refused".to_string(),
            });
        }
        let lower = text.to_lowercase();
        let mut v: Vec<f32> =
            VOCABULARY.iter().map(|term| lower.matches(term).count() as f32).collect();
        v.push(0.1);
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        VOCABULARY.len() + 1
    }
}

/// Decomposes into one sub-question and echoes the notes back as the report.
struct EchoGenerator {
    fail: bool,
}

#[async_trait]
impl Generator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, prompt: &str) -> research_model::Result<String> {
        if self.fail {
            return Err(ModelError::GenerationError {
                provider: "echo".to_string(),
                message: "request timed out".to_string(),
            });
        }
        if prompt.starts_with("Decompose") {
            return Ok("What color is the sky?".to_string());
        }
        let notes = prompt.split("Research notes:\n").nth(1).unwrap_or_default().trim();
        Ok(format!("## Executive Summary\n{notes}\n\n## Key Findings\n-\n\n## Conclusion\n-"))
    }
}

struct TestServer {
    base: String,
    ingestor: Arc<Ingestor>,
    upload_dir: TempDir,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(generator: EchoGenerator) -> Self {
        Self::spawn_with(generator, None).await
    }

    async fn spawn_with(generator: EchoGenerator, max_upload_bytes: Option<usize>) -> Self {
        let pipeline = RagPipeline::builder()
            .embedder(Arc::new(KeywordEmbedder))
            .vector_index(Arc::new(InMemoryVectorIndex::new()))
            .build()
            .expect("pipeline");
        let orchestrator = ResearchOrchestrator::new(Arc::new(generator), pipeline.retriever());
        let upload_dir = tempfile::tempdir().expect("upload dir");
        let state = AppState::new(pipeline.ingestor(), Arc::new(orchestrator), upload_dir.path());

        let app = match max_upload_bytes {
            Some(limit) => app_router_with_limit(state, limit),
            None => app_router(state),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server run");
        });

        Self { base: format!("http://{addr}"), ingestor: pipeline.ingestor(), upload_dir, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn staged_files(&self) -> usize {
        count_entries(self.upload_dir.path())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("read upload dir").count()
}

fn file_form(name: &str, contents: &[u8]) -> Form {
    Form::new().part("file", Part::bytes(contents.to_vec()).file_name(name.to_string()))
}

async fn upload(server: &TestServer, form: Form) -> (StatusCode, StatusResponse) {
    let response = reqwest::Client::new()
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .expect("upload response");
    let status = response.status();
    (status, response.json().await.expect("status json"))
}

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::spawn(EchoGenerator { fail: false }).await;

    let response = reqwest::get(server.url("/health")).await.expect("health response");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("health json");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "research-server");
}

#[tokio::test]
async fn upload_indexes_text_and_removes_the_staged_file() {
    let server = TestServer::spawn(EchoGenerator { fail: false }).await;

    let (status, body) = upload(&server, file_form("sky.txt", b"The sky is blue.")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, Status::Success);
    assert_eq!(body.message, "Indexed 1 chunks from sky.txt");
    assert_eq!(server.staged_files(), 0);
}

#[tokio::test]
async fn upload_accepts_markdown_in_any_case() {
    let server = TestServer::spawn(EchoGenerator { fail: false }).await;

    let (status, body) = upload(&server, file_form("NOTES.MD", b"# Grass\n\nGrass is green.")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.message, "Indexed 1 chunks from NOTES.MD");
    assert_eq!(server.staged_files(), 0);
}

#[tokio::test]
async fn upload_rejects_unsupported_extension() {
    let server = TestServer::spawn(EchoGenerator { fail: false }).await;

    let (status, body) = upload(&server, file_form("setup.exe", b"MZ\x90\x00")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.status, Status::Error);
    assert!(body.message.contains("setup.exe"));
    assert!(body.message.contains("pdf, txt, md, markdown"), "{}", body.message);
    assert_eq!(server.staged_files(), 0);
}

#[tokio::test]
async fn upload_without_file_field_is_a_client_error() {
    let server = TestServer::spawn(EchoGenerator { fail: false }).await;

    let form = Form::new().text("comment", "no file here");
    let (status, body) = upload(&server, form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.message.contains("file"));
}

#[tokio::test]
async fn upload_reports_ingestion_failure_and_cleans_up() {
    let server = TestServer::spawn(EchoGenerator { fail: false }).await;

    let (status, body) = upload(&server, file_form("binary.txt", &[0xff, 0xfe, 0x00, 0x81])).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.status, Status::Error);
    assert!(body.message.contains("Ingestion failed"));
    assert_eq!(server.staged_files(), 0);

    let (status, body) = upload(&server, file_form("boom.txt", b"boom goes the embedder")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.message.contains("connection refused"));
    assert_eq!(server.staged_files(), 0);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let server = TestServer::spawn_with(EchoGenerator { fail: false }, Some(1024)).await;

    let response = reqwest::Client::new()
        .post(server.url("/upload"))
        .multipart(file_form("big.txt", &[b'a'; 8 * 1024]))
        .send()
        .await
        .expect("upload response");

    assert!(response.status().is_client_error());
    assert_eq!(server.staged_files(), 0);
}

#[tokio::test]
async fn research_answers_from_uploaded_documents() {
    let server = TestServer::spawn(EchoGenerator { fail: false }).await;
    let (status, _) = upload(&server, file_form("sky.txt", b"The sky is blue.")).await;
    assert_eq!(status, StatusCode::OK);
    server.ingestor.ingest_document(&Document::new("The grass is green.")).await.unwrap();

    let response = reqwest::Client::new()
        .post(server.url("/research"))
        .json(&serde_json::json!({"topic": "sky color"}))
        .send()
        .await
        .expect("research response");

    assert_eq!(response.status(), StatusCode::OK);
    let body: ResearchResponse = response.json().await.expect("research json");
    assert_eq!(body.topic, "sky color");
    assert!(body.report.contains("## Executive Summary"));
    assert!(body.report.contains("blue"));
}

#[tokio::test]
async fn research_with_blank_topic_is_a_client_error() {
    let server = TestServer::spawn(EchoGenerator { fail: false }).await;

    let response = reqwest::Client::new()
        .post(server.url("/research"))
        .json(&serde_json::json!({"topic": "   "}))
        .send()
        .await
        .expect("research response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: StatusResponse = response.json().await.expect("error json");
    assert_eq!(body.status, Status::Error);
}

#[tokio::test]
async fn research_with_malformed_body_gets_error_json() {
    let server = TestServer::spawn(EchoGenerator { fail: false }).await;
    let client = reqwest::Client::new();

    let missing_topic = client
        .post(server.url("/research"))
        .json(&serde_json::json!({"subject": "sky color"}))
        .send()
        .await
        .expect("research response");
    assert_eq!(missing_topic.status(), StatusCode::BAD_REQUEST);
    let body: StatusResponse = missing_topic.json().await.expect("error json");
    assert_eq!(body.status, Status::Error);
    assert!(body.message.contains("topic"), "{}", body.message);

    let not_json = client
        .post(server.url("/research"))
        .header("content-type", "application/json")
        .body("{topic: sky")
        .send()
        .await
        .expect("research response");
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
    let body: StatusResponse = not_json.json().await.expect("error json");
    assert_eq!(body.status, Status::Error);
}

#[tokio::test]
async fn research_reports_generation_failure() {
    let server = TestServer::spawn(EchoGenerator { fail: true }).await;

    let response = reqwest::Client::new()
        .post(server.url("/research"))
        .json(&serde_json::json!({"topic": "sky color"}))
        .send()
        .await
        .expect("research response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: StatusResponse = response.json().await.expect("error json");
    assert!(body.message.contains("request timed out"));
}
