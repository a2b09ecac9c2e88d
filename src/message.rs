//! Wire protocol definitions
//!
//! Line-delimited text protocol, one message per newline-terminated line.
//! Client lines are `HEAD` or `HEAD:payload`; server lines mirror the
//! same shape. Parsing and formatting live here so the rest of the crate
//! only ever handles typed messages.

use crate::card::Card;
use crate::error::GameError;
use crate::types::CardId;

/// Client → Server message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// `PRONTO:<name>` - declare ready with a display name
    Ready { name: String },
    /// `LINHA` - claim a completed line
    ClaimLine,
    /// `BINGO` - claim a full card
    ClaimBingo,
    /// `MARCAR:<n>` - mark a drawn number on the card
    Mark { number: u8 },
    /// `DESMARCAR:<n>` - unmark a number
    Unmark { number: u8 },
}

impl ClientMessage {
    /// Parse one wire line into a message
    ///
    /// Unknown heads and unparsable numeric payloads are protocol errors;
    /// they must be answered with `ERRO:`, never crash the receive loop.
    pub fn parse(line: &str) -> Result<Self, GameError> {
        let line = line.trim_end_matches('\r');
        if let Some(name) = line.strip_prefix("PRONTO:") {
            return Ok(Self::Ready {
                name: name.trim().to_string(),
            });
        }
        if let Some(raw) = line.strip_prefix("MARCAR:") {
            return Ok(Self::Mark {
                number: parse_number(raw)?,
            });
        }
        if let Some(raw) = line.strip_prefix("DESMARCAR:") {
            return Ok(Self::Unmark {
                number: parse_number(raw)?,
            });
        }
        match line {
            "LINHA" => Ok(Self::ClaimLine),
            "BINGO" => Ok(Self::ClaimBingo),
            _ => Err(GameError::UnknownMessage(line.to_string())),
        }
    }
}

fn parse_number(raw: &str) -> Result<u8, GameError> {
    raw.trim()
        .parse::<u8>()
        .map_err(|_| GameError::InvalidNumber(raw.trim().to_string()))
}

/// Server → Client message
///
/// `Display` produces the exact wire line (without the trailing newline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// `CARTAO:<id>:<n1>,...,<n25>` - assigned card
    CardAssigned { card_id: CardId, card: Card },
    /// `JOGO_INICIADO:<text>` - game has started
    GameStarted { text: String },
    /// `NUMERO_SORTEADO:<n>` - a number was drawn
    NumberDrawn { number: u8 },
    /// `LINHA_VALIDA:<name>` - named player completed a line
    LineValid { winner: String },
    /// `LINHA_INVALIDA` - claimant's line claim was rejected
    LineInvalid,
    /// `BINGO_VALIDO` - claimant won
    BingoValid,
    /// `BINGO_OUTROS:<name>` - named player won (sent to everyone else)
    BingoOthers { winner: String },
    /// `BINGO_INVALIDO` - claimant's full-card claim was rejected
    BingoInvalid,
    /// `FIM_DE_JOGO:<reason>` - game ended without a claimed win
    GameOver { reason: String },
    /// `ERRO:<text>` - error or rejection notice
    Error { message: String },
}

impl std::fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CardAssigned { card_id, card } => write!(f, "CARTAO:{}:{}", card_id, card),
            Self::GameStarted { text } => write!(f, "JOGO_INICIADO:{}", text),
            Self::NumberDrawn { number } => write!(f, "NUMERO_SORTEADO:{}", number),
            Self::LineValid { winner } => write!(f, "LINHA_VALIDA:{}", winner),
            Self::LineInvalid => write!(f, "LINHA_INVALIDA"),
            Self::BingoValid => write!(f, "BINGO_VALIDO"),
            Self::BingoOthers { winner } => write!(f, "BINGO_OUTROS:{}", winner),
            Self::BingoInvalid => write!(f, "BINGO_INVALIDO"),
            Self::GameOver { reason } => write!(f, "FIM_DE_JOGO:{}", reason),
            Self::Error { message } => write!(f, "ERRO:{}", message),
        }
    }
}

/// Convert a GameError into the `ERRO:` notice sent to the offending client
impl From<&GameError> for ServerMessage {
    fn from(err: &GameError) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }
}
