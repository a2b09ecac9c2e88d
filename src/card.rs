//! Card generation
//!
//! A bingo card is 25 distinct numbers from [1,99], arranged as a
//! 5x5 grid in row-major order. Cards are sampled uniformly without
//! replacement; duplicates across different players' cards are fine,
//! duplicates within one card are not.

use rand::Rng;

use crate::config::{CARD_SIZE, GRID_SIDE, NUMBER_RANGE};

/// A player's bingo card
///
/// Fixed 25-element sequence of distinct numbers. Index `r * 5 + c`
/// is row `r`, column `c` of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    numbers: [u8; CARD_SIZE],
}

impl Card {
    /// Generate a new random card
    ///
    /// Rejection-samples from [1,99] until 25 distinct numbers are
    /// collected, preserving draw order for the grid layout.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut numbers = [0u8; CARD_SIZE];
        let mut count = 0;
        while count < CARD_SIZE {
            let candidate: u8 = rng.gen_range(1..=NUMBER_RANGE);
            if !numbers[..count].contains(&candidate) {
                numbers[count] = candidate;
                count += 1;
            }
        }
        Self { numbers }
    }

    /// Build a card from explicit numbers (used by tests and the validator)
    pub fn from_numbers(numbers: [u8; CARD_SIZE]) -> Self {
        Self { numbers }
    }

    /// All 25 numbers in row-major order
    pub fn numbers(&self) -> &[u8; CARD_SIZE] {
        &self.numbers
    }

    /// The five numbers of row `r` (0..5)
    pub fn row(&self, r: usize) -> &[u8] {
        &self.numbers[r * GRID_SIDE..(r + 1) * GRID_SIDE]
    }

    /// Iterator over the five numbers of column `c` (0..5)
    pub fn column(&self, c: usize) -> impl Iterator<Item = u8> + '_ {
        (0..GRID_SIDE).map(move |r| self.numbers[r * GRID_SIDE + c])
    }

    /// Check whether a number is on this card
    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }
}

impl std::fmt::Display for Card {
    /// Comma-separated numbers, the wire form used in `CARTAO:` lines
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, n) in self.numbers.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}
