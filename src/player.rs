//! Player struct definition
//!
//! Represents a connected player with their session state and
//! communication channel.

use std::collections::HashSet;

use tokio::sync::mpsc;

use crate::card::Card;
use crate::error::{GameError, SendError};
use crate::message::ServerMessage;
use crate::types::{CardId, PlayerId};

/// Connected player information
///
/// Holds all per-player session state: identity, display name, card,
/// marked numbers, ready flag, and the outbound message channel.
/// Name, card and ready flag are populated together by the player's
/// first PRONTO declaration and never change afterwards.
#[derive(Debug)]
pub struct Player {
    /// Unique identifier for this player
    pub id: PlayerId,
    /// Display name (None before the ready declaration)
    pub name: Option<String>,
    /// Server → Client message channel
    pub sender: mpsc::Sender<ServerMessage>,
    /// Card identifier (assigned with the card)
    pub card_id: Option<CardId>,
    /// The player's 25-number card (None before ready)
    pub card: Option<Card>,
    /// Numbers the player has marked; always a subset of the card
    pub marked: HashSet<u8>,
    /// Ready flag, monotonic false → true
    pub ready: bool,
}

impl Player {
    /// Create a new player with the given ID and sender channel
    pub fn new(id: PlayerId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            name: None,
            sender,
            card_id: None,
            card: None,
            marked: HashSet::new(),
            ready: false,
        }
    }

    /// Send a message to this player
    ///
    /// Returns an error if the channel is closed (player disconnected).
    pub async fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Get the display name for this player
    ///
    /// Returns the name if set, otherwise "Desconhecido".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Desconhecido")
    }

    /// Assign name and card and flip the ready flag
    pub fn declare_ready(&mut self, name: String, card_id: CardId, card: Card) {
        self.name = Some(name);
        self.card_id = Some(card_id);
        self.card = Some(card);
        self.ready = true;
    }

    /// Mark a number on this player's card
    ///
    /// Fails when the player has no card yet or the number is not on it.
    /// The drawn-set check belongs to the coordinator.
    pub fn mark(&mut self, number: u8) -> Result<(), GameError> {
        let card = self.card.as_ref().ok_or(GameError::NotReady)?;
        if !card.contains(number) {
            return Err(GameError::NotOnCard(number));
        }
        self.marked.insert(number);
        Ok(())
    }

    /// Unmark a number; removing an absent number is a no-op
    pub fn unmark(&mut self, number: u8) {
        self.marked.remove(&number);
    }
}
