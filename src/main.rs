//! Multiplayer Bingo Server - Entry Point
//!
//! Starts the TCP listener and BingoServer actor, accepting connections
//! until a ctrl-c shutdown.

use std::env;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bingo_server::{handle_connection, BingoServer, Config, ServerCommand};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=bingo_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bingo_server=info")),
        )
        .init();

    // Bind address from command line or default
    let mut config = Config::default();
    if let Some(addr) = env::args().nth(1) {
        config.addr = addr;
    }

    // Start TCP listener
    let listener = TcpListener::bind(&config.addr).await?;
    info!("Bingo server listening on {}", config.addr);
    info!(
        "Waiting for players (min: {}, max: {})",
        config.min_players, config.max_players
    );

    // Create BingoServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let server = BingoServer::new(config, cmd_rx, cmd_tx.clone());
    let server_task = tokio::spawn(server.run());

    info!("BingoServer actor started");

    // Accept until ctrl-c, then tell the actor to shut the game down
    tokio::select! {
        _ = accept_loop(listener, cmd_tx.clone()) => {}
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            let _ = cmd_tx.send(ServerCommand::Shutdown).await;
        }
    }

    drop(cmd_tx);
    let _ = server_task.await;

    Ok(())
}

/// Connection accept loop
///
/// Spawns a handler task per connection; accept errors are logged and the
/// loop keeps going.
async fn accept_loop(listener: TcpListener, cmd_tx: mpsc::Sender<ServerCommand>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx).await {
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
