//! Sarvam speech-synthesis adapter

use crate::utils::error::{AdapterError, RelayError, Result};
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{SpeechAudio, Synthesizer};

/// Locales the backing engine can synthesize. Checked before any network
/// call so an unsupported locale never costs a round trip.
pub const SUPPORTED_SYNTHESIS_LOCALES: &[&str] = &[
    "bn-IN", "en-IN", "gu-IN", "hi-IN", "kn-IN", "ml-IN", "mr-IN", "od-IN", "pa-IN", "ta-IN",
    "te-IN",
];

/// Synthesis client for the Sarvam text-to-speech API
#[derive(Debug, Clone)]
pub struct SarvamSynthesizer {
    client: Client,
    base_url: String,
    speaker: String,
}

#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    /// Base64-encoded WAV payloads, one per input chunk
    audios: Vec<String>,
}

impl SarvamSynthesizer {
    /// Create a new synthesis client with a bounded request timeout
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        speaker: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut key = reqwest::header::HeaderValue::from_str(api_key.trim())
            .map_err(|e| RelayError::config(format!("invalid synthesis API key: {}", e)))?;
        key.set_sensitive(true);
        headers.insert("api-subscription-key", key);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| RelayError::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            speaker: speaker.into(),
        })
    }
}

#[async_trait]
impl Synthesizer for SarvamSynthesizer {
    fn supports_locale(&self, locale: &str) -> bool {
        SUPPORTED_SYNTHESIS_LOCALES.contains(&locale)
    }

    async fn synthesize(
        &self,
        text: &str,
        locale: &str,
    ) -> std::result::Result<SpeechAudio, AdapterError> {
        let url = format!("{}/text-to-speech", self.base_url);
        let body = serde_json::json!({
            "text": text,
            "target_language_code": locale,
            "speaker": self.speaker,
            "enable_preprocessing": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::from_reqwest(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdapterError::Status {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let parsed: SynthesisResponse = response.json().await.map_err(|e| {
            AdapterError::Malformed(format!("failed to parse synthesis response: {}", e))
        })?;

        let encoded = parsed.audios.into_iter().next().ok_or_else(|| {
            AdapterError::Malformed("synthesis response contained no audio".to_string())
        })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| AdapterError::Malformed(format!("invalid audio encoding: {}", e)))?;

        debug!(locale = %locale, bytes = bytes.len(), "Speech synthesized");
        Ok(SpeechAudio {
            bytes,
            mime_type: "audio/wav",
            extension: "wav",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_locale_set() {
        assert!(SUPPORTED_SYNTHESIS_LOCALES.contains(&"hi-IN"));
        assert!(SUPPORTED_SYNTHESIS_LOCALES.contains(&"od-IN"));
        assert!(!SUPPORTED_SYNTHESIS_LOCALES.contains(&"fr-FR"));
    }
}
