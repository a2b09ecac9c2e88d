//! Multiplayer Bingo Server Library
//!
//! An authoritative bingo server over line-delimited TCP, built with
//! tokio using the Actor pattern for state management.
//!
//! # Features
//! - Player admission with capacity and game-in-progress policy
//! - Unique 25-number cards sampled from [1,99]
//! - Readiness barrier: the game starts once every present player is ready
//! - Periodic unique number draws broadcast to all players
//! - Line and full-card claim validation against server-held ground truth
//! - Disconnection and shutdown handling
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `BingoServer` is the central actor owning all game state
//! - Each connection has a `handler` task communicating with the server
//! - The draw scheduler feeds ticks into the same command channel
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use bingo_server::{handle_connection, BingoServer, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let listener = TcpListener::bind(&config.addr).await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(BingoServer::new(config, cmd_rx, cmd_tx.clone()).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx));
//!     }
//! }
//! ```

pub mod card;
pub mod config;
pub mod error;
pub mod game;
pub mod handler;
pub mod message;
pub mod player;
pub mod server;
pub mod types;
pub mod validator;

// Re-export main types for convenience
pub use card::Card;
pub use config::Config;
pub use error::{GameError, SendError};
pub use game::{GamePhase, GameState};
pub use handler::handle_connection;
pub use message::{ClientMessage, ServerMessage};
pub use player::Player;
pub use server::{BingoServer, ServerCommand};
pub use types::{CardId, PlayerId};
