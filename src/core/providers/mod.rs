//! External collaborator adapters
//!
//! Each capability the pipeline depends on is a narrow trait, and the
//! concrete clients are injected into the orchestrator at construction
//! time so tests can substitute doubles without touching orchestration
//! logic.

mod gemini;
mod openrouter;
mod sarvam;

pub use gemini::GeminiTranscriber;
pub use openrouter::OpenRouterCompleter;
pub use sarvam::{SUPPORTED_SYNTHESIS_LOCALES, SarvamSynthesizer};

use crate::utils::error::AdapterError;
use async_trait::async_trait;
use std::path::Path;

/// Synthesized audio returned by a [`Synthesizer`]
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    /// Raw audio bytes
    pub bytes: Vec<u8>,
    /// Media type of the audio container
    pub mime_type: &'static str,
    /// File extension to store the artifact under
    pub extension: &'static str,
}

/// Speech-to-text capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file at `audio_path` into English text.
    ///
    /// An empty string means the engine produced no usable text; the
    /// orchestrator treats that as a failed transcription.
    async fn transcribe(&self, audio_path: &Path) -> Result<String, AdapterError>;
}

/// Prompt-to-reply completion capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Completer: Send + Sync {
    /// Send a constructed prompt and return the reply text
    async fn complete(&self, prompt: &str) -> Result<String, AdapterError>;
}

/// Text-to-speech capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Whether the backing engine supports this locale. Checked before any
    /// network call is made.
    fn supports_locale(&self, locale: &str) -> bool;

    /// Convert text into spoken audio in the target locale
    async fn synthesize(&self, text: &str, locale: &str) -> Result<SpeechAudio, AdapterError>;
}
