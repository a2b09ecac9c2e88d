//! TCP connection handler
//!
//! Handles individual player connections: admission handshake, line-by-line
//! message parsing, and bidirectional communication with the BingoServer.
//! Whatever ends the connection - EOF, I/O failure, server shutdown - the
//! handler unregisters the player exactly once on its single exit path.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::error::GameError;
use crate::message::{ClientMessage, ServerMessage};
use crate::server::ServerCommand;
use crate::types::PlayerId;

/// Buffer size for the per-player outbound message channel
const PLAYER_CHANNEL_SIZE: usize = 32;

/// Handle a new TCP connection
///
/// Asks the BingoServer for admission first; a rejected connection gets
/// the `ERRO:` reason written synchronously and is closed without ever
/// being registered. Admitted connections get a read task (lines →
/// commands) and a write task (server messages → lines).
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), GameError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let player_id = PlayerId::new();
    debug!("New TCP connection from {} as {}", peer_addr, player_id);

    let (read_half, write_half) = stream.into_split();
    let mut writer = BufWriter::new(write_half);

    // Create channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(PLAYER_CHANNEL_SIZE);

    // Admission handshake with the BingoServer
    let (reply_tx, reply_rx) = oneshot::channel();
    cmd_tx
        .send(ServerCommand::Admit {
            player_id,
            sender: msg_tx,
            reply: reply_tx,
        })
        .await
        .map_err(|_| GameError::ChannelSend)?;

    let decision = reply_rx.await.map_err(|_| GameError::ChannelSend)?;

    if let Err(reason) = decision {
        warn!("Connection from {} rejected: {}", peer_addr, reason);
        let line = format!("{}\n", ServerMessage::from(&reason));
        let _ = writer.write_all(line.as_bytes()).await;
        let _ = writer.flush().await;
        let _ = writer.shutdown().await;
        return Ok(());
    }

    info!("Player {} connected from {}", player_id, peer_addr);

    // Clone cmd_tx for the read task. The server holds the only sender of
    // the player's message channel, so dropping the player there closes
    // the write task and with it the socket.
    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (socket lines -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match ClientMessage::parse(&line) {
                        Ok(msg) => {
                            let cmd = client_message_to_command(player_id, msg);
                            if cmd_tx_read.send(cmd).await.is_err() {
                                debug!("Server closed, ending read task for {}", player_id);
                                break;
                            }
                        }
                        Err(e) => {
                            // malformed input gets an ERRO reply, the
                            // connection stays open
                            warn!("Protocol error from {}: {}", player_id, e);
                            let cmd = ServerCommand::ProtocolError {
                                player_id,
                                error: e,
                            };
                            if cmd_tx_read.send(cmd).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                Ok(None) => {
                    debug!("Player {} closed the connection", player_id);
                    break;
                }
                Err(e) => {
                    error!("Read error for {}: {}", player_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", player_id);
    });

    // Spawn write task (ServerMessage -> socket lines)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            let line = format!("{}\n", msg);
            if writer.write_all(line.as_bytes()).await.is_err() {
                debug!("Socket write failed, ending write task");
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
        debug!("Write task ended for {}", player_id);

        // closes the socket once the server drops this player's sender
        let _ = writer.shutdown().await;
    });

    // Wait for either task to complete, then stop the other so the
    // socket halves are dropped on every exit path
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", player_id);
            write_task.abort();
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", player_id);
            read_task.abort();
        }
    }

    // Single exit path: unregister exactly once
    let _ = cmd_tx.send(ServerCommand::Disconnect { player_id }).await;

    info!("Player {} disconnected", player_id);

    Ok(())
}

/// Convert a ClientMessage to a ServerCommand
fn client_message_to_command(player_id: PlayerId, msg: ClientMessage) -> ServerCommand {
    match msg {
        ClientMessage::Ready { name } => ServerCommand::Ready { player_id, name },
        ClientMessage::ClaimLine => ServerCommand::ClaimLine { player_id },
        ClientMessage::ClaimBingo => ServerCommand::ClaimBingo { player_id },
        ClientMessage::Mark { number } => ServerCommand::Mark { player_id, number },
        ClientMessage::Unmark { number } => ServerCommand::Unmark { player_id, number },
    }
}
