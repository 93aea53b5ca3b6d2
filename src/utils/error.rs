//! Error handling for the relay
//!
//! This module defines all error types used throughout the gateway.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Result type alias for the relay
pub type Result<T> = std::result::Result<T, RelayError>;

/// Failure reported by an external collaborator (transcription, completion
/// or synthesis). The cause is kept so the orchestrator can map it to a
/// distinct HTTP status instead of collapsing everything into one 500.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Connection-level failure before a response was received
    #[error("network error: {0}")]
    Network(String),

    /// The bounded request timeout elapsed
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The collaborator answered with a non-success status
    #[error("upstream returned {status}: {message}")]
    Status {
        /// HTTP status returned by the collaborator
        status: u16,
        /// Response body (or a truncated excerpt of it)
        message: String,
    },

    /// A success status whose payload lacks the expected fields
    #[error("malformed upstream response: {0}")]
    Malformed(String),

    /// Local I/O failure while preparing or handing over media
    #[error("io error: {0}")]
    Io(String),
}

impl AdapterError {
    /// Classify a reqwest transport error against the URL it targeted
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout(format!("request to {} timed out", url))
        } else if err.is_connect() {
            AdapterError::Network(format!("connection failed to {}: {}", url, err))
        } else {
            AdapterError::Network(format!("request to {} failed: {}", url, err))
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AdapterError::Network(_) | AdapterError::Status { .. } => StatusCode::BAD_GATEWAY,
            AdapterError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AdapterError::Malformed(_) | AdapterError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Main error type for the relay
#[derive(Error, Debug)]
pub enum RelayError {
    /// Configuration errors (missing keys, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested language is not in the registry, or its locale is not
    /// supported by the synthesis collaborator
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Transcription completed but produced no usable text
    #[error("Transcription produced no usable text")]
    EmptyTranscript,

    /// The transcription collaborator failed
    #[error("Transcription failed: {0}")]
    Transcription(AdapterError),

    /// The completion collaborator failed
    #[error("Completion failed: {0}")]
    Completion(AdapterError),

    /// The synthesis collaborator failed
    #[error("Speech synthesis failed: {0}")]
    Synthesis(AdapterError),

    /// Retrieval of an unknown audio handle
    #[error("Audio artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Client input errors other than language resolution
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Machine-readable error kind included in every error response
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "CONFIG_ERROR",
            RelayError::UnsupportedLanguage(_) => "UNSUPPORTED_LANGUAGE",
            RelayError::EmptyTranscript | RelayError::Transcription(_) => "TRANSCRIPTION_FAILED",
            RelayError::Completion(_) => "COMPLETION_FAILED",
            RelayError::Synthesis(_) => "SYNTHESIS_FAILED",
            RelayError::ArtifactNotFound(_) => "ARTIFACT_NOT_FOUND",
            RelayError::BadRequest(_) => "BAD_REQUEST",
            RelayError::Io(_) => "IO_ERROR",
            RelayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            RelayError::UnsupportedLanguage(_)
            | RelayError::EmptyTranscript
            | RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::ArtifactNotFound(_) => StatusCode::NOT_FOUND,
            RelayError::Transcription(cause)
            | RelayError::Completion(cause)
            | RelayError::Synthesis(cause) => cause.status_code(),
            RelayError::Config(_) | RelayError::Io(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.kind().to_string(),
                message: self.to_string(),
                timestamp: chrono::Utc::now().timestamp(),
                request_id: None,
            },
        };
        HttpResponse::build(self.http_status()).json(body)
    }
}

/// Standard error response format
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
    pub request_id: Option<String>,
}
