//! HTTP route handlers
//!
//! The route surface mirrors the frontend contract: `/api/ask` for typed
//! questions, `/api/voice-query` for recorded ones, and `/api/audio/{handle}`
//! to fetch the synthesized answer.

use crate::server::state::AppState;
use crate::utils::error::RelayError;
use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Text question request body
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The user's question
    pub message: String,
    /// User-facing language name, e.g. "Hindi"
    pub language: String,
}

/// Response shape shared by both question endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    /// Reply text, verbatim from the completion collaborator
    pub reply: String,
    /// Retrieval path for the synthesized audio
    pub audio_path: String,
}

/// Query parameters for the voice endpoint
#[derive(Debug, Deserialize)]
pub struct VoiceQueryParams {
    /// User-facing language name
    pub language: String,
}

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/ask", web::post().to(ask))
            .route("/voice-query", web::post().to(voice_query))
            .route("/audio/{handle}", web::get().to(get_audio))
            .route("/languages", web::get().to(list_languages)),
    );
}

/// Typed text question
pub async fn ask(
    state: web::Data<AppState>,
    request: web::Json<AskRequest>,
) -> Result<HttpResponse, RelayError> {
    info!(language = %request.language, "Text query received");

    let reply = state
        .orchestrator
        .ask(&request.message, &request.language)
        .await?;

    Ok(HttpResponse::Ok().json(AskResponse {
        reply: reply.reply,
        audio_path: format!("/api/audio/{}", reply.audio_handle),
    }))
}

/// Recorded voice question (multipart upload)
pub async fn voice_query(
    state: web::Data<AppState>,
    query: web::Query<VoiceQueryParams>,
    mut payload: Multipart,
) -> Result<HttpResponse, RelayError> {
    info!(language = %query.language, "Voice query received");

    let mut audio = Vec::new();
    let mut filename = "voice_input.webm".to_string();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| RelayError::bad_request(format!("invalid multipart payload: {}", e)))?
    {
        // the contract names the audio field "file"; anything else is skipped
        let Some(disposition) = field.content_disposition() else {
            continue;
        };
        if disposition.get_name() != Some("file") {
            continue;
        }
        if let Some(name) = disposition.get_filename() {
            filename = name.to_string();
        }
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| RelayError::bad_request(format!("invalid multipart payload: {}", e)))?
        {
            audio.extend_from_slice(&chunk);
        }
        break;
    }

    if audio.is_empty() {
        return Err(RelayError::bad_request("no audio file uploaded"));
    }

    let reply = state
        .orchestrator
        .voice_query(&audio, &filename, &query.language)
        .await?;

    Ok(HttpResponse::Ok().json(AskResponse {
        reply: reply.reply,
        audio_path: format!("/api/audio/{}", reply.audio_handle),
    }))
}

/// Fetch a previously synthesized audio artifact by handle
pub async fn get_audio(
    state: web::Data<AppState>,
    handle: web::Path<String>,
) -> Result<NamedFile, RelayError> {
    let path = state.store.resolve(&handle)?;
    NamedFile::open_async(path)
        .await
        .map_err(|_| RelayError::ArtifactNotFound(handle.to_string()))
}

/// Registered languages, for client language pickers
pub async fn list_languages(state: web::Data<AppState>) -> HttpResponse {
    let mut languages: Vec<&str> = state
        .orchestrator
        .registry()
        .entries()
        .map(|entry| entry.display_name)
        .collect();
    languages.sort_unstable();
    HttpResponse::Ok().json(serde_json::json!({ "languages": languages }))
}

/// Health check endpoint
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
