//! Server configuration
//!
//! All tunable constants in one place: listen address, player limits,
//! card geometry, and draw scheduler timing.

use std::time::Duration;

/// Default listen address
pub const DEFAULT_ADDR: &str = "127.0.0.1:12345";

/// Highest drawable number (numbers are sampled from 1..=NUMBER_RANGE)
pub const NUMBER_RANGE: u8 = 99;

/// Numbers per card (laid out as a 5x5 grid)
pub const CARD_SIZE: usize = 25;

/// Side length of the card grid
pub const GRID_SIDE: usize = 5;

/// Server configuration
///
/// `Default` gives the standard game: port 12345, 2-10 players,
/// first draw after 5 seconds then one every 10 seconds.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the TCP listener binds to
    pub addr: String,
    /// Maximum simultaneous players
    pub max_players: usize,
    /// Minimum players required before the game can start
    pub min_players: usize,
    /// Delay before the first number is drawn
    pub first_draw_delay: Duration,
    /// Interval between subsequent draws
    pub draw_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            max_players: 10,
            min_players: 2,
            first_draw_delay: Duration::from_secs(5),
            draw_interval: Duration::from_secs(10),
        }
    }
}
