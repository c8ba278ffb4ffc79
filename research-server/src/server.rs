use std::{io::Write, net::SocketAddr, path::PathBuf};

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};
use research_rag::DocumentKind;
use serde_json::json;
use tempfile::NamedTempFile;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::{DEFAULT_MAX_UPLOAD_BYTES, ServerConfig},
    error::ApiError,
    protocol::{ResearchRequest, ResearchResponse, StatusResponse},
    state::AppState,
};

/// The multipart field carrying the uploaded document.
const FILE_FIELD: &str = "file";

/// Router with the default upload size limit.
pub fn app_router(state: AppState) -> Router {
    app_router_with_limit(state, DEFAULT_MAX_UPLOAD_BYTES)
}

pub fn app_router_with_limit(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/research", post(research))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = app_router_with_limit(state, config.max_upload_bytes);
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("invalid host/port '{}'", config.bind_address()))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("research server listening on http://{}", addr);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn health() -> impl IntoResponse {
    Json(json!({"status":"ok","service":"research-server"}))
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StatusResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("uploaded file has no name"))?;
        let kind = DocumentKind::from_path(&file_name).ok_or_else(|| {
            ApiError::bad_request(format!(
                "unsupported file type '{file_name}', expected one of: {}",
                DocumentKind::SUPPORTED_EXTENSIONS.join(", ")
            ))
        })?;
        let bytes = field.bytes().await?;

        info!(file_name = %file_name, bytes = bytes.len(), "received upload");
        let staged = stage_upload(state.upload_dir.clone(), kind, bytes)
            .await
            .map_err(|e| ApiError::internal(format!("failed to stage upload: {e}")))?;

        let outcome = state.ingestor.ingest_named(staged.path(), &file_name).await;
        if let Err(e) = staged.close() {
            warn!(error = %e, "failed to remove staged upload");
        }

        let chunk_count = outcome?;
        return Ok(Json(StatusResponse::success(format!(
            "Indexed {chunk_count} chunks from {file_name}"
        ))));
    }

    Err(ApiError::bad_request(format!("missing multipart field '{FILE_FIELD}'")))
}

/// Write the upload to a temp file in `dir` that is deleted when dropped.
///
/// The file keeps the canonical extension for `kind` so the loader picks
/// the same extractor the name was validated against.
async fn stage_upload(
    dir: PathBuf,
    kind: DocumentKind,
    bytes: Bytes,
) -> std::io::Result<NamedTempFile> {
    tokio::task::spawn_blocking(move || {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&format!(".{}", kind.extension()))
            .tempfile_in(&dir)?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok::<_, std::io::Error>(file)
    })
    .await
    .map_err(std::io::Error::other)?
}

async fn research(
    State(state): State<AppState>,
    request: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let Json(request) = request?;
    let result = state.orchestrator.run(&request.topic).await?;
    Ok(Json(ResearchResponse { topic: result.topic, report: result.report }))
}
