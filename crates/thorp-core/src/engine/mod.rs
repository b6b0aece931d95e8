pub mod counter;
pub mod state;

pub use counter::CountingEngine;
pub use state::{CountingState, StrategyAdjustments};

pub const CARDS_PER_DECK: u32 = 52;
pub const MIN_DECKS: u8 = 1;
pub const MAX_DECKS: u8 = 8;
pub const MIN_BET_UNITS: u8 = 1;
pub const MAX_BET_UNITS: u8 = 5;

/// Clamp an externally supplied deck count into the supported shoe sizes.
pub fn clamp_deck_count(requested: i64) -> u8 {
    requested.clamp(MIN_DECKS as i64, MAX_DECKS as i64) as u8
}
