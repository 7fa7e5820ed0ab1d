use tracing::{error, info, Level};

use brick_volley_server::config::ServerConfig;
use brick_volley_server::net::room;
use brick_volley_server::net::server::GameServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Brick Volley Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ServerConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg)?;
    info!(
        "Configuration loaded: {}:{}, mode={:?}",
        config.bind_address, config.port, config.mode
    );

    // The room task owns all game state; everything else talks to it over
    // the command channel
    let commands = room::start_room(config.mode);
    let server = GameServer::new(config.clone(), commands);

    info!(
        "Server ready on ws://{}:{}",
        config.bind_address, config.port
    );

    // Shutdown signal handler
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received");
    };

    // Run server with graceful shutdown
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown => {
            info!("Shutting down...");
        }
    }

    info!("Server stopped");
    Ok(())
}
