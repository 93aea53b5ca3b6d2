//! Configuration management for the relay
//!
//! All configuration is environment-driven. The three collaborator API keys
//! are required and their absence fails startup, not the first request.

use crate::utils::error::{RelayError, Result};
use std::path::PathBuf;
use tracing::debug;

/// Default prompt template for the completion collaborator.
///
/// The safety constraints live here as data, not as code branches, so a
/// deployment can replace them through `PROMPT_TEMPLATE` without a rebuild.
/// `{message}` and `{language}` are substituted per request.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "You are a helpful, trustworthy rural health assistant AI. \
A user has asked the following health-related question:\n\n\
\"{message}\"\n\n\
Your job is to:\n\
- Clearly explain the possible causes and symptoms in simple, non-technical language.\n\
- Suggest safe home remedies or first steps the user can take.\n\
- Warn about any serious signs that mean the user should see a doctor or visit a hospital.\n\
- Be concise, friendly, and use {language} for your response.\n\
- Avoid giving any medication names or dosages.\n\
- If you do not know the answer, say so and encourage the user to consult a healthcare professional.\n\
Respond in {language} using simple words, with no mixed-language text.";

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// CORS allowed origins; `*` allows any origin
    pub cors_allowed_origins: Vec<String>,
}

/// API credentials for the three external collaborators
#[derive(Clone)]
pub struct CredentialsConfig {
    /// Completion collaborator API key
    pub completion_api_key: String,
    /// Transcription collaborator API key
    pub transcription_api_key: String,
    /// Synthesis collaborator API key
    pub synthesis_api_key: String,
}

// Keys never appear in logs or error payloads.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("completion_api_key", &"***")
            .field("transcription_api_key", &"***")
            .field("synthesis_api_key", &"***")
            .finish()
    }
}

/// Pipeline configuration: models, endpoints, timeouts, prompt template
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model identifier sent to the completion collaborator
    pub completion_model: String,
    /// Base URL of the completion API
    pub completion_base_url: String,
    /// Model identifier used for transcription
    pub transcription_model: String,
    /// Base URL of the transcription API
    pub transcription_base_url: String,
    /// Base URL of the synthesis API
    pub synthesis_base_url: String,
    /// Voice used by the synthesis collaborator
    pub synthesis_speaker: String,
    /// Prompt template with `{message}` and `{language}` placeholders
    pub prompt_template: String,
    /// Bounded wait for completion requests
    pub completion_timeout_secs: u64,
    /// Bounded wait for transcription requests
    pub transcription_timeout_secs: u64,
    /// Bounded wait for synthesis requests
    pub synthesis_timeout_secs: u64,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding synthesized audio artifacts
    pub audio_dir: PathBuf,
    /// Directory holding transient voice uploads
    pub upload_dir: PathBuf,
}

/// Main configuration struct for the relay
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Collaborator credentials
    pub credentials: CredentialsConfig,
    /// Pipeline configuration
    pub pipeline: PipelineConfig,
    /// Storage configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig {
                host: env_or("HOST", "127.0.0.1"),
                port: env_parse("PORT", 8000)?,
                cors_allowed_origins: env_or("CORS_ALLOWED_ORIGINS", "http://localhost:5173")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            credentials: CredentialsConfig {
                completion_api_key: required_env("COMPLETION_API_KEY")?,
                transcription_api_key: required_env("TRANSCRIPTION_API_KEY")?,
                synthesis_api_key: required_env("SYNTHESIS_API_KEY")?,
            },
            pipeline: PipelineConfig {
                completion_model: env_or("COMPLETION_MODEL", "anthropic/claude-3-haiku"),
                completion_base_url: env_or("COMPLETION_BASE_URL", "https://openrouter.ai/api/v1"),
                transcription_model: env_or("TRANSCRIPTION_MODEL", "gemini-2.5-flash"),
                transcription_base_url: env_or(
                    "TRANSCRIPTION_BASE_URL",
                    "https://generativelanguage.googleapis.com",
                ),
                synthesis_base_url: env_or("SYNTHESIS_BASE_URL", "https://api.sarvam.ai"),
                synthesis_speaker: env_or("SYNTHESIS_SPEAKER", "hitesh"),
                prompt_template: env_or("PROMPT_TEMPLATE", DEFAULT_PROMPT_TEMPLATE),
                completion_timeout_secs: env_parse("COMPLETION_TIMEOUT_SECS", 30)?,
                transcription_timeout_secs: env_parse("TRANSCRIPTION_TIMEOUT_SECS", 60)?,
                synthesis_timeout_secs: env_parse("SYNTHESIS_TIMEOUT_SECS", 30)?,
            },
            storage: StorageConfig {
                audio_dir: PathBuf::from(env_or("AUDIO_DIR", "tts_output")),
                upload_dir: std::env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| std::env::temp_dir()),
            },
        };

        config.validate()?;
        debug!("Configuration loaded from environment");
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(RelayError::config("PORT must be non-zero"));
        }
        for (name, key) in [
            ("COMPLETION_API_KEY", &self.credentials.completion_api_key),
            (
                "TRANSCRIPTION_API_KEY",
                &self.credentials.transcription_api_key,
            ),
            ("SYNTHESIS_API_KEY", &self.credentials.synthesis_api_key),
        ] {
            if key.trim().is_empty() {
                return Err(RelayError::config(format!("{} must not be empty", name)));
            }
        }
        for placeholder in ["{message}", "{language}"] {
            if !self.pipeline.prompt_template.contains(placeholder) {
                return Err(RelayError::config(format!(
                    "prompt template is missing the {} placeholder",
                    placeholder
                )));
            }
        }
        for (name, secs) in [
            (
                "COMPLETION_TIMEOUT_SECS",
                self.pipeline.completion_timeout_secs,
            ),
            (
                "TRANSCRIPTION_TIMEOUT_SECS",
                self.pipeline.transcription_timeout_secs,
            ),
            (
                "SYNTHESIS_TIMEOUT_SECS",
                self.pipeline.synthesis_timeout_secs,
            ),
        ] {
            if secs == 0 {
                return Err(RelayError::config(format!("{} must be non-zero", name)));
            }
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| RelayError::config(format!("{} has an invalid value: {}", key, value))),
        Err(_) => Ok(default),
    }
}

fn required_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        RelayError::config(format!("required environment variable {} is not set", key))
    })
}
