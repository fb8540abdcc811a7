//! Minimal Chat Server - Entry Point
//!
//! Starts the TCP listener and ChatServer actor, accepting connections.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wirechat::{handle_connection, ChatServer, Config, Router};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=wirechat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wirechat=info")),
        )
        .init();

    let config = Config::from_env();

    // Start TCP listener
    let listener = TcpListener::bind(config.addr()).await?;
    info!("Chat server listening on {}", config.addr());

    // Route table, built once
    let router = Arc::new(Router::new());

    // Create ChatServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let server = ChatServer::new(cmd_rx, &config.main_chat_name, config.batch_size);
    tokio::spawn(server.run());

    info!("ChatServer actor started");

    // Connection accept loop; each connection is one request/response
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();
                let router = router.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx, router).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
