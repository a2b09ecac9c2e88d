//! Basic type definitions for the bingo server
//!
//! Provides newtype wrappers for type safety:
//! - `PlayerId`: UUID-based unique player identifier
//! - `CardId`: 8-character card identifier token

use uuid::Uuid;

/// Unique player identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe player identification.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Create a new random player ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Card identifier (8-character lowercase hex token)
///
/// An opaque short token, unique per card, taken from the first
/// 8 characters of a UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardId(pub String);

impl CardId {
    /// Generate a new random card ID
    pub fn generate() -> Self {
        let id = Uuid::new_v4().to_string();
        Self(id[..8].to_string())
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
