//! Game session state
//!
//! The phase machine and draw bookkeeping for the single game session.
//! Phase moves one way only: Waiting → InProgress → Ended. The drawn set
//! grows monotonically, capped at the full number range; the history
//! records draw order separately from the set's membership.

use std::collections::HashSet;

use rand::Rng;

use crate::config::NUMBER_RANGE;

/// The three-state lifecycle of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Admitting players, waiting for the readiness barrier
    Waiting,
    /// Numbers are being drawn
    InProgress,
    /// Terminal: won, exhausted, or shut down
    Ended,
}

/// Draw and phase state for the session
#[derive(Debug)]
pub struct GameState {
    phase: GamePhase,
    drawn: HashSet<u8>,
    history: Vec<u8>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Waiting,
            drawn: HashSet::new(),
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Transition Waiting → InProgress
    ///
    /// Returns false (and does nothing) from any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase == GamePhase::Waiting {
            self.phase = GamePhase::InProgress;
            true
        } else {
            false
        }
    }

    /// Transition to Ended from any non-terminal phase
    ///
    /// Returns true only for the transition that actually ended the game,
    /// so callers can guarantee end-of-game effects run exactly once.
    pub fn end(&mut self) -> bool {
        if self.phase == GamePhase::Ended {
            false
        } else {
            self.phase = GamePhase::Ended;
            true
        }
    }

    /// The set of numbers drawn so far
    pub fn drawn(&self) -> &HashSet<u8> {
        &self.drawn
    }

    /// Draw order, oldest first
    pub fn history(&self) -> &[u8] {
        &self.history
    }

    pub fn is_drawn(&self, number: u8) -> bool {
        self.drawn.contains(&number)
    }

    /// Whether every number in the range has been drawn
    pub fn exhausted(&self) -> bool {
        self.drawn.len() >= NUMBER_RANGE as usize
    }

    /// Draw the next number
    ///
    /// Rejection-samples uniformly from the numbers not yet drawn and
    /// records it in both the set and the history. Returns None when the
    /// range is exhausted.
    pub fn draw_next(&mut self) -> Option<u8> {
        if self.exhausted() {
            return None;
        }
        let mut rng = rand::thread_rng();
        loop {
            let candidate: u8 = rng.gen_range(1..=NUMBER_RANGE);
            if self.drawn.insert(candidate) {
                self.history.push(candidate);
                return Some(candidate);
            }
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_starts_waiting() {
        let game = GameState::new();
        assert_eq!(game.phase(), GamePhase::Waiting);
    }

    #[test]
    fn test_phase_one_directional() {
        let mut game = GameState::new();
        assert!(game.start());
        assert_eq!(game.phase(), GamePhase::InProgress);

        // cannot start twice
        assert!(!game.start());
        assert_eq!(game.phase(), GamePhase::InProgress);

        assert!(game.end());
        assert_eq!(game.phase(), GamePhase::Ended);

        // Ended is terminal
        assert!(!game.start());
        assert!(!game.end());
        assert_eq!(game.phase(), GamePhase::Ended);
    }

    #[test]
    fn test_end_from_waiting() {
        let mut game = GameState::new();
        assert!(game.end());
        assert!(!game.start());
    }

    #[test]
    fn test_exactly_one_end_transition() {
        let mut game = GameState::new();
        game.start();
        let first = game.end();
        let second = game.end();
        assert!(first);
        assert!(!second);
    }

    #[test]
    fn test_draws_are_unique_and_in_range() {
        let mut game = GameState::new();
        game.start();

        let mut seen = HashSet::new();
        while let Some(n) = game.draw_next() {
            assert!((1..=NUMBER_RANGE).contains(&n));
            assert!(seen.insert(n), "number {} drawn twice", n);
        }

        assert_eq!(seen.len(), NUMBER_RANGE as usize);
        assert_eq!(game.drawn().len(), NUMBER_RANGE as usize);
        assert!(game.exhausted());
        assert!(game.draw_next().is_none());
    }

    #[test]
    fn test_history_preserves_draw_order() {
        let mut game = GameState::new();
        game.start();

        let first = game.draw_next().unwrap();
        let second = game.draw_next().unwrap();
        let third = game.draw_next().unwrap();

        assert_eq!(game.history(), &[first, second, third]);
    }
}
