//! Request orchestrator
//!
//! Drives one question through transcription (voice only), completion,
//! sanitization, and synthesis, and owns the audio file lifecycle for the
//! request. Collaborators are injected as trait objects so orchestration
//! logic never knows which vendor is behind them.

use crate::config::PipelineConfig;
use crate::core::languages::{LanguageEntry, LanguageRegistry};
use crate::core::providers::{Completer, Synthesizer, Transcriber};
use crate::core::sanitize;
use crate::storage::{AudioStore, TempUpload};
use crate::utils::error::{RelayError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Fully assembled answer to one request
#[derive(Debug, Clone)]
pub struct RelayReply {
    /// Reply text exactly as the completion collaborator produced it
    pub reply: String,
    /// Handle of the synthesized audio artifact
    pub audio_handle: String,
}

/// The request orchestration core
pub struct Orchestrator {
    transcriber: Arc<dyn Transcriber>,
    completer: Arc<dyn Completer>,
    synthesizer: Arc<dyn Synthesizer>,
    registry: LanguageRegistry,
    store: Arc<AudioStore>,
    upload_dir: PathBuf,
    prompt_template: String,
}

impl Orchestrator {
    /// Assemble the orchestrator from its injected collaborators
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        completer: Arc<dyn Completer>,
        synthesizer: Arc<dyn Synthesizer>,
        registry: LanguageRegistry,
        store: Arc<AudioStore>,
        upload_dir: PathBuf,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self {
            transcriber,
            completer,
            synthesizer,
            registry,
            store,
            upload_dir,
            prompt_template: pipeline.prompt_template.clone(),
        }
    }

    /// Handle a typed text question
    pub async fn ask(&self, message: &str, language: &str) -> Result<RelayReply> {
        let entry = self.registry.resolve(language)?;
        info!(language = %entry.display_name, "Handling text query");

        if message.trim().is_empty() {
            return Err(RelayError::bad_request("message must not be empty"));
        }

        self.respond(message, entry).await
    }

    /// Handle a recorded voice question.
    ///
    /// The upload is persisted to a scoped temporary file whose guard
    /// removes it on every exit path, so a failed or cancelled
    /// transcription never leaks an orphaned file.
    pub async fn voice_query(
        &self,
        audio: &[u8],
        original_filename: &str,
        language: &str,
    ) -> Result<RelayReply> {
        let entry = self.registry.resolve(language)?;
        info!(language = %entry.display_name, bytes = audio.len(), "Handling voice query");

        if audio.is_empty() {
            return Err(RelayError::bad_request("uploaded audio is empty"));
        }

        let upload = TempUpload::write(&self.upload_dir, original_filename, audio).await?;
        let transcript = self
            .transcriber
            .transcribe(upload.path())
            .await
            .map_err(RelayError::Transcription)?;
        drop(upload);

        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(RelayError::EmptyTranscript);
        }
        debug!(transcript_len = transcript.len(), "Transcription complete");

        self.respond(transcript, entry).await
    }

    /// Shared tail of both request modes: complete, sanitize, synthesize,
    /// store. The caller sees the original reply; only the audio path
    /// consumes the sanitized variant.
    async fn respond(&self, message: &str, entry: &LanguageEntry) -> Result<RelayReply> {
        let prompt = self.build_prompt(message, entry.completion_label);
        let reply = self
            .completer
            .complete(&prompt)
            .await
            .map_err(RelayError::Completion)?;

        let spoken = sanitize::clean(&reply);
        let locale = entry.synthesis_locale;
        if !self.synthesizer.supports_locale(locale) {
            return Err(RelayError::UnsupportedLanguage(format!(
                "{} (locale {} not supported by synthesis engine)",
                entry.display_name, locale
            )));
        }

        let audio = self
            .synthesizer
            .synthesize(&spoken, locale)
            .await
            .map_err(RelayError::Synthesis)?;
        let audio_handle = self.store.store(&audio.bytes, audio.extension).await?;

        info!(handle = %audio_handle, "Request complete");
        Ok(RelayReply {
            reply,
            audio_handle,
        })
    }

    fn build_prompt(&self, message: &str, language_label: &str) -> String {
        self.prompt_template
            .replace("{message}", message)
            .replace("{language}", language_label)
    }

    /// Registered languages, for surfacing to clients
    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PROMPT_TEMPLATE;
    use crate::core::providers::{
        MockCompleter, MockSynthesizer, MockTranscriber, SpeechAudio,
    };
    use crate::utils::error::AdapterError;

    struct Fixture {
        transcriber: MockTranscriber,
        completer: MockCompleter,
        synthesizer: MockSynthesizer,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                transcriber: MockTranscriber::new(),
                completer: MockCompleter::new(),
                synthesizer: MockSynthesizer::new(),
            }
        }

        async fn build(self, store_dir: &std::path::Path, upload_dir: &std::path::Path) -> Orchestrator {
            let pipeline = test_pipeline();
            Orchestrator::new(
                Arc::new(self.transcriber),
                Arc::new(self.completer),
                Arc::new(self.synthesizer),
                LanguageRegistry::with_defaults(),
                Arc::new(AudioStore::new(store_dir).await.unwrap()),
                upload_dir.to_path_buf(),
                &pipeline,
            )
        }
    }

    fn test_pipeline() -> crate::config::PipelineConfig {
        crate::config::PipelineConfig {
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

    fn wav() -> SpeechAudio {
        SpeechAudio {
            bytes: b"RIFF....WAVE".to_vec(),
            mime_type: "audio/wav",
            extension: "wav",
        }
    }

    #[tokio::test]
    async fn test_text_request_happy_path() {
        let store_dir = tempfile::tempdir().unwrap();
        let upload_dir = tempfile::tempdir().unwrap();

        let mut fixture = Fixture::new();
        fixture
            .completer
            .expect_complete()
            .withf(|prompt| prompt.contains("I have a fever and headache") && prompt.contains("Hindi"))
            .times(1)
            .returning(|_| Ok("आपको आराम करना चाहिए और पानी पीना चाहिए।".to_string()));
        fixture
            .synthesizer
            .expect_supports_locale()
            .returning(|locale| locale == "hi-IN");
        fixture
            .synthesizer
            .expect_synthesize()
            .times(1)
            .returning(|_, _| Ok(wav()));

        let orchestrator = fixture.build(store_dir.path(), upload_dir.path()).await;
        let reply = orchestrator
            .ask("I have a fever and headache", "Hindi")
            .await
            .unwrap();

        assert_eq!(reply.reply, "आपको आराम करना चाहिए और पानी पीना चाहिए।");
        assert!(store_dir.path().join(&reply.audio_handle).is_file());
    }

    #[tokio::test]
    async fn test_unregistered_language_makes_no_calls() {
        let store_dir = tempfile::tempdir().unwrap();
        let upload_dir = tempfile::tempdir().unwrap();

        let mut fixture = Fixture::new();
        fixture.completer.expect_complete().times(0);
        fixture.synthesizer.expect_synthesize().times(0);

        let orchestrator = fixture.build(store_dir.path(), upload_dir.path()).await;
        let err = orchestrator.ask("hello", "Klingon").await.unwrap_err();
        assert!(matches!(err, RelayError::UnsupportedLanguage(_)));
    }

    #[tokio::test]
    async fn test_synthesis_consumes_sanitized_text_reply_stays_raw() {
        let store_dir = tempfile::tempdir().unwrap();
        let upload_dir = tempfile::tempdir().unwrap();

        let raw = "• Rest: drink water. Please note this is general advice.";
        let mut fixture = Fixture::new();
        fixture
            .completer
            .expect_complete()
            .returning(move |_| Ok(raw.to_string()));
        fixture
            .synthesizer
            .expect_supports_locale()
            .returning(|_| true);
        fixture
            .synthesizer
            .expect_synthesize()
            .withf(|text, _| text == "Rest, drink water." && !text.contains("Please note"))
            .times(1)
            .returning(|_, _| Ok(wav()));

        let orchestrator = fixture.build(store_dir.path(), upload_dir.path()).await;
        let reply = orchestrator.ask("fever", "Hindi").await.unwrap();
        assert_eq!(reply.reply, raw);
    }

    #[tokio::test]
    async fn test_empty_transcript_fails_before_completion() {
        let store_dir = tempfile::tempdir().unwrap();
        let upload_dir = tempfile::tempdir().unwrap();

        let mut fixture = Fixture::new();
        fixture
            .transcriber
            .expect_transcribe()
            .times(1)
            .returning(|_| Ok(String::new()));
        fixture.completer.expect_complete().times(0);

        let orchestrator = fixture.build(store_dir.path(), upload_dir.path()).await;
        let err = orchestrator
            .voice_query(b"webm-bytes", "voice_input.webm", "Hindi")
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::EmptyTranscript));
        // the temporary upload must be gone
        assert_eq!(std::fs::read_dir(upload_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_temp_upload_removed_after_transcription_failure() {
        let store_dir = tempfile::tempdir().unwrap();
        let upload_dir = tempfile::tempdir().unwrap();

        let mut fixture = Fixture::new();
        fixture
            .transcriber
            .expect_transcribe()
            .returning(|_| Err(AdapterError::Network("engine unreachable".into())));

        let orchestrator = fixture.build(store_dir.path(), upload_dir.path()).await;
        let err = orchestrator
            .voice_query(b"webm-bytes", "voice_input.webm", "Hindi")
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Transcription(_)));
        assert_eq!(std::fs::read_dir(upload_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_temp_upload_removed_after_success() {
        let store_dir = tempfile::tempdir().unwrap();
        let upload_dir = tempfile::tempdir().unwrap();

        let mut fixture = Fixture::new();
        fixture
            .transcriber
            .expect_transcribe()
            .returning(|_| Ok("I have a fever".to_string()));
        fixture
            .completer
            .expect_complete()
            .returning(|_| Ok("rest and hydrate".to_string()));
        fixture
            .synthesizer
            .expect_supports_locale()
            .returning(|_| true);
        fixture
            .synthesizer
            .expect_synthesize()
            .returning(|_, _| Ok(wav()));

        let orchestrator = fixture.build(store_dir.path(), upload_dir.path()).await;
        orchestrator
            .voice_query(b"webm-bytes", "voice_input.webm", "Hindi")
            .await
            .unwrap();

        assert_eq!(std::fs::read_dir(upload_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_completion_timeout_creates_no_artifact() {
        let store_dir = tempfile::tempdir().unwrap();
        let upload_dir = tempfile::tempdir().unwrap();

        let mut fixture = Fixture::new();
        fixture
            .completer
            .expect_complete()
            .returning(|_| Err(AdapterError::Timeout("completion timed out".into())));
        fixture.synthesizer.expect_synthesize().times(0);

        let orchestrator = fixture.build(store_dir.path(), upload_dir.path()).await;
        let err = orchestrator.ask("fever", "Hindi").await.unwrap_err();

        assert!(matches!(
            err,
            RelayError::Completion(AdapterError::Timeout(_))
        ));
        assert_eq!(std::fs::read_dir(store_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_synthesis_locale_pre_call() {
        let store_dir = tempfile::tempdir().unwrap();
        let upload_dir = tempfile::tempdir().unwrap();

        let mut fixture = Fixture::new();
        fixture
            .completer
            .expect_complete()
            .returning(|_| Ok("advice".to_string()));
        fixture
            .synthesizer
            .expect_supports_locale()
            .returning(|_| false);
        fixture.synthesizer.expect_synthesize().times(0);

        let orchestrator = fixture.build(store_dir.path(), upload_dir.path()).await;
        let err = orchestrator.ask("fever", "Hindi").await.unwrap_err();
        assert!(matches!(err, RelayError::UnsupportedLanguage(_)));
    }
}
