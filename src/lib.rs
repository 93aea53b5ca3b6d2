//! # Sehat Gateway
//!
//! A multilingual voice/text health-assistant relay. One HTTP gateway glues
//! three external collaborators into a single request/response cycle:
//! transcription (speech to text), completion (text to reply), and
//! synthesis (reply to spoken audio in the user's language).
//!
//! ## Pipeline
//!
//! ```text
//! [audio upload?] -> Transcriber -> Completer -> sanitize -> Synthesizer
//!                                                -> {reply text, audio handle}
//! ```
//!
//! Text requests skip transcription. Each request is stateless; the only
//! thing that outlives it is the synthesized audio artifact, retrievable by
//! handle until an external retention policy removes it.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use sehat_gateway::{Config, server::HttpServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let server = HttpServer::new(&config).await?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use self::core::{LanguageEntry, LanguageRegistry, Orchestrator, RelayReply};
pub use storage::AudioStore;
pub use utils::error::{AdapterError, RelayError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
