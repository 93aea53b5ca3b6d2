//! Shared fixtures and collaborator doubles for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use sehat_gateway::config::{DEFAULT_PROMPT_TEMPLATE, PipelineConfig};
use sehat_gateway::core::providers::{Completer, SpeechAudio, Synthesizer, Transcriber};
use sehat_gateway::core::{LanguageRegistry, Orchestrator};
use sehat_gateway::server::AppState;
use sehat_gateway::storage::AudioStore;
use sehat_gateway::utils::error::AdapterError;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const WAV_BYTES: &[u8] = b"RIFF....WAVEtest-audio";

/// Transcriber double returning a fixed transcript
pub struct StaticTranscriber(pub &'static str);

#[async_trait]
impl Transcriber for StaticTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Result<String, AdapterError> {
        Ok(self.0.to_string())
    }
}

/// Completer double returning a fixed reply and counting invocations
pub struct CountingCompleter {
    pub reply: String,
    pub calls: Arc<AtomicUsize>,
}

impl CountingCompleter {
    pub fn new(reply: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                reply: reply.to_string(),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl Completer for CountingCompleter {
    async fn complete(&self, _prompt: &str) -> Result<String, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Completer double that always reports an upstream timeout
pub struct TimeoutCompleter;

#[async_trait]
impl Completer for TimeoutCompleter {
    async fn complete(&self, _prompt: &str) -> Result<String, AdapterError> {
        Err(AdapterError::Timeout("completion timed out".to_string()))
    }
}

/// Synthesizer double producing fixed WAV bytes for any locale
pub struct StaticSynthesizer;

#[async_trait]
impl Synthesizer for StaticSynthesizer {
    fn supports_locale(&self, _locale: &str) -> bool {
        true
    }

    async fn synthesize(&self, _text: &str, _locale: &str) -> Result<SpeechAudio, AdapterError> {
        Ok(SpeechAudio {
            bytes: WAV_BYTES.to_vec(),
            mime_type: "audio/wav",
            extension: "wav",
        })
    }
}

pub fn test_pipeline() -> PipelineConfig {
    PipelineConfig {
        completion_model: "anthropic/claude-3-haiku".into(),
        completion_base_url: String::new(),
        transcription_model: "gemini-2.5-flash".into(),
        transcription_base_url: String::new(),
        synthesis_base_url: String::new(),
        synthesis_speaker: "hitesh".into(),
        prompt_template: DEFAULT_PROMPT_TEMPLATE.into(),
        completion_timeout_secs: 30,
        transcription_timeout_secs: 60,
        synthesis_timeout_secs: 30,
    }
}

/// Wire doubles into an AppState backed by the given scratch directories
pub async fn build_state(
    transcriber: impl Transcriber + 'static,
    completer: impl Completer + 'static,
    synthesizer: impl Synthesizer + 'static,
    store_dir: &Path,
    upload_dir: &Path,
) -> AppState {
    let store = Arc::new(AudioStore::new(store_dir).await.unwrap());
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(transcriber),
        Arc::new(completer),
        Arc::new(synthesizer),
        LanguageRegistry::with_defaults(),
        Arc::clone(&store),
        upload_dir.to_path_buf(),
        &test_pipeline(),
    ));
    AppState::new(orchestrator, store)
}

/// Multipart body where a non-file form field precedes the file field
pub fn multipart_body_with_leading_field(boundary: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Disposition: form-data; name=\"metadata\"\r\n\r\nv1\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(&multipart_body(boundary, filename, bytes));
    body
}

/// Build a multipart/form-data body with one file field
pub fn multipart_body(boundary: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: audio/webm\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
