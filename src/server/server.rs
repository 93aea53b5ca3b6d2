//! HTTP server core implementation

use crate::config::Config;
use crate::core::languages::LanguageRegistry;
use crate::core::orchestrator::Orchestrator;
use crate::core::providers::{GeminiTranscriber, OpenRouterCompleter, SarvamSynthesizer};
use crate::server::routes;
use crate::server::state::AppState;
use crate::storage::AudioStore;
use crate::utils::error::{RelayError, Result};
use actix_cors::Cors;
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// HTTP server
pub struct HttpServer {
    host: String,
    port: u16,
    cors_allowed_origins: Vec<String>,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server, wiring concrete collaborator clients into
    /// the orchestrator
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let completer = Arc::new(OpenRouterCompleter::new(
            &config.credentials.completion_api_key,
            &config.pipeline.completion_base_url,
            &config.pipeline.completion_model,
            Duration::from_secs(config.pipeline.completion_timeout_secs),
        )?);
        let transcriber = Arc::new(GeminiTranscriber::new(
            &config.credentials.transcription_api_key,
            &config.pipeline.transcription_base_url,
            &config.pipeline.transcription_model,
            Duration::from_secs(config.pipeline.transcription_timeout_secs),
        )?);
        let synthesizer = Arc::new(SarvamSynthesizer::new(
            &config.credentials.synthesis_api_key,
            &config.pipeline.synthesis_base_url,
            &config.pipeline.synthesis_speaker,
            Duration::from_secs(config.pipeline.synthesis_timeout_secs),
        )?);

        let store = Arc::new(AudioStore::new(config.storage.audio_dir.clone()).await?);
        let orchestrator = Arc::new(Orchestrator::new(
            transcriber,
            completer,
            synthesizer,
            LanguageRegistry::with_defaults(),
            Arc::clone(&store),
            config.storage.upload_dir.clone(),
            &config.pipeline,
        ));

        Ok(Self {
            host: config.server.host.clone(),
            port: config.server.port,
            cors_allowed_origins: config.server.cors_allowed_origins.clone(),
            state: AppState::new(orchestrator, store),
        })
    }

    fn build_cors(allowed_origins: &[String]) -> Cors {
        if allowed_origins.iter().any(|origin| origin == "*") {
            // credentials cannot be combined with a wildcard origin
            return Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);
        }

        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        cors
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);
        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);
        let allowed_origins = self.cors_allowed_origins;

        let server = ActixHttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(Self::build_cors(&allowed_origins))
                .wrap(Logger::default())
                .wrap(DefaultHeaders::new().add(("Server", "Sehat-Gateway")))
                .route("/health", web::get().to(routes::health_check))
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .map_err(|e| RelayError::config(format!("failed to bind {}: {}", bind_addr, e)))?
        .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| RelayError::internal(format!("server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
