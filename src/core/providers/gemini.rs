//! Gemini transcription adapter
//!
//! The Gemini file API wants an upload first, then a generateContent call
//! referencing the uploaded file, and the remote file handle must be
//! released afterwards whether or not generation succeeded. Containers the
//! engine does not accept (browser recordings arrive as webm) are remuxed
//! to WAV with ffmpeg before upload.

use crate::utils::error::{AdapterError, RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use super::Transcriber;

/// Instruction sent alongside the audio; the transcript comes back as the
/// English translation of the spoken content.
const TRANSCRIBE_INSTRUCTION: &str = "Listen to the audio and respond only with the English \
translation of the spoken content. Do not include any explanations.";

/// Container formats the engine accepts without conversion
const ACCEPTED_EXTENSIONS: &[&str] = &["wav", "mp3", "aiff", "aac", "ogg", "flac"];

/// Transcription client for the Gemini generative language API
#[derive(Debug, Clone)]
pub struct GeminiTranscriber {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Deserialize)]
struct RemoteFile {
    /// Resource name, e.g. `files/abc123`
    name: String,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiTranscriber {
    /// Create a new transcription client with a bounded request timeout
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            model: model.into(),
        })
    }

    async fn upload(&self, bytes: Vec<u8>, mime_type: &str) -> std::result::Result<RemoteFile, AdapterError> {
        let url = format!("{}/upload/v1beta/files", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "raw")
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(bytes)
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

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Malformed(format!("failed to parse upload response: {}", e)))?;

        debug!(remote_file = %parsed.file.name, "Audio uploaded for transcription");
        Ok(parsed.file)
    }

    async fn generate(
        &self,
        file_uri: &str,
        mime_type: &str,
    ) -> std::result::Result<String, AdapterError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {"text": TRANSCRIBE_INSTRUCTION},
                    {"file_data": {"mime_type": mime_type, "file_uri": file_uri}},
                ],
            }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            AdapterError::Malformed(format!("failed to parse transcription response: {}", e))
        })?;

        // The engine may split the transcript across several parts
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        Ok(text.trim().to_string())
    }

    /// Delete the uploaded file on the remote side. Failure to release the
    /// handle must not mask the transcription result, so this only warns.
    async fn release(&self, remote_name: &str) {
        let url = format!("{}/v1beta/{}", self.base_url, remote_name);
        match self
            .client
            .delete(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!(remote_file = %remote_name, "Released remote audio file");
            }
            Ok(response) => {
                warn!(remote_file = %remote_name, status = %response.status(),
                    "Failed to release remote audio file");
            }
            Err(e) => {
                warn!(remote_file = %remote_name, error = %e,
                    "Failed to release remote audio file");
            }
        }
    }
}

#[async_trait]
impl Transcriber for GeminiTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> std::result::Result<String, AdapterError> {
        let extension = file_extension(audio_path);
        let (upload_path, remuxed) = if ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            (audio_path.to_path_buf(), false)
        } else {
            (remux_to_wav(audio_path).await?, true)
        };
        let mime_type = mime_for_extension(&file_extension(&upload_path));

        let result = async {
            let bytes = tokio::fs::read(&upload_path)
                .await
                .map_err(|e| AdapterError::Io(format!("failed to read upload: {}", e)))?;

            let remote = self.upload(bytes, mime_type).await?;
            let outcome = self.generate(&remote.uri, mime_type).await;
            // Release the remote handle on success and failure alike
            self.release(&remote.name).await;
            outcome
        }
        .await;

        if remuxed {
            if let Err(e) = tokio::fs::remove_file(&upload_path).await {
                warn!(path = %upload_path.display(), error = %e, "Failed to remove remuxed file");
            }
        }

        result
    }
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "wav" => "audio/wav",
        "mp3" => "audio/mp3",
        "aiff" => "audio/aiff",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Remux an unsupported container to mono 16kHz WAV next to the input file
async fn remux_to_wav(input: &Path) -> std::result::Result<PathBuf, AdapterError> {
    remux_with("ffmpeg", input).await
}

async fn remux_with(program: &str, input: &Path) -> std::result::Result<PathBuf, AdapterError> {
    let output = input.with_extension("wav");

    let status = tokio::process::Command::new(program)
        .arg("-y")
        .arg("-i")
        .arg(input)
        .args(["-ac", "1", "-ar", "16000"])
        .arg(&output)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .map_err(|e| AdapterError::Io(format!("failed to run {}: {}", program, e)))?;

    if !status.success() {
        // a failed conversion can leave a partially written output behind
        let _ = tokio::fs::remove_file(&output).await;
        return Err(AdapterError::Io(format!(
            "{} failed to remux {} (exit {})",
            program,
            input.display(),
            status
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions_skip_remux() {
        for ext in ACCEPTED_EXTENSIONS {
            assert_ne!(mime_for_extension(ext), "application/octet-stream");
        }
    }

    #[test]
    fn test_webm_is_not_accepted() {
        assert!(!ACCEPTED_EXTENSIONS.contains(&"webm"));
    }

    #[test]
    fn test_file_extension_is_lowercased() {
        assert_eq!(file_extension(Path::new("clip.WAV")), "wav");
        assert_eq!(file_extension(Path::new("noext")), "");
    }

    #[tokio::test]
    async fn test_failed_remux_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.webm");
        tokio::fs::write(&input, b"not audio").await.unwrap();
        // stand in for a partial file the converter wrote before failing
        let partial = input.with_extension("wav");
        tokio::fs::write(&partial, b"partial").await.unwrap();

        let err = remux_with("false", &input).await.unwrap_err();
        assert!(matches!(err, AdapterError::Io(_)));
        assert!(!partial.exists());
    }
}
