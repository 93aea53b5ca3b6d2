//! Server startup with automatic configuration loading

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use tracing::info;

/// Load configuration from the environment and run the server.
///
/// Missing collaborator API keys fail here, at startup, not at first use.
pub async fn run_server() -> Result<()> {
    info!("Starting Sehat Gateway");

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let server = HttpServer::new(&config).await?;
    info!(
        "Server starting at: http://{}:{}",
        config.server.host, config.server.port
    );
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   GET  /api/languages - Registered languages");
    info!("   POST /api/ask - Text question");
    info!("   POST /api/voice-query - Recorded voice question");
    info!("   GET  /api/audio/{{handle}} - Synthesized audio retrieval");

    server.start().await
}
