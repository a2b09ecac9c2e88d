//! Claim validation
//!
//! Pure functions deciding whether a card satisfies "line" or "full card".
//! A number only counts when it is in **both** the player's marked set and
//! the server's drawn set: marking is advisory client intent, the drawn set
//! is ground truth, so a player cannot win on numbers the server never drew.

use std::collections::HashSet;

use crate::card::Card;
use crate::config::GRID_SIDE;

/// True iff some full row or column of the card has all five numbers
/// marked and drawn. Rows are checked before columns, returning on the
/// first complete line.
pub fn has_line(card: &Card, marked: &HashSet<u8>, drawn: &HashSet<u8>) -> bool {
    for r in 0..GRID_SIDE {
        if card
            .row(r)
            .iter()
            .all(|n| marked.contains(n) && drawn.contains(n))
        {
            return true;
        }
    }
    for c in 0..GRID_SIDE {
        if card.column(c).all(|n| marked.contains(&n) && drawn.contains(&n)) {
            return true;
        }
    }
    false
}

/// True iff all 25 numbers of the card are marked and drawn.
pub fn has_full_card(card: &Card, marked: &HashSet<u8>, drawn: &HashSet<u8>) -> bool {
    card.numbers()
        .iter()
        .all(|n| marked.contains(n) && drawn.contains(n))
}
