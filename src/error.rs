//! Error types for the bingo server
//!
//! Defines game-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.
//!
//! Display texts are the player-facing Portuguese reason strings carried
//! in `ERRO:` wire messages.

use thiserror::Error;

/// Game-level errors
///
/// Covers the four error classes of the protocol: admission errors
/// (notify then close), protocol errors (reply, keep the connection),
/// domain rule violations (reply, no state change), and transport
/// failures (handled locally by the connection handler).
#[derive(Debug, Error)]
pub enum GameError {
    /// Admission: server at player capacity
    #[error("Servidor lotado. Tente novamente mais tarde.")]
    ServerFull,

    /// Admission: a game is already running
    #[error("Jogo já em andamento. Tente novamente mais tarde.")]
    GameInProgress,

    /// Protocol: PRONTO with an empty name
    #[error("Nome não pode estar vazio.")]
    EmptyName,

    /// Protocol: MARCAR/DESMARCAR payload that is not a number in range
    #[error("Número inválido: {0}")]
    InvalidNumber(String),

    /// Protocol: unrecognized message head
    #[error("Mensagem desconhecida: {0}")]
    UnknownMessage(String),

    /// Domain: number is not on the player's card
    #[error("Número {0} não está no seu cartão.")]
    NotOnCard(u8),

    /// Domain: number has not been drawn yet
    #[error("Número {0} ainda não foi sorteado.")]
    NotDrawn(u8),

    /// Domain: claim or mark before the player declared ready
    #[error("Declare-se pronto primeiro.")]
    NotReady,

    /// Domain: claim before the game started
    #[error("O jogo ainda não começou.")]
    GameNotStarted,

    /// Domain: claim after the game ended
    #[error("O jogo já terminou.")]
    GameEnded,

    /// Transport: IO error (fatal for the connection)
    #[error("Erro de comunicação: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Canal interno fechado")]
    ChannelSend,
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
