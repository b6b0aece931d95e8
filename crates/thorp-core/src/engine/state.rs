use super::{CARDS_PER_DECK, MAX_BET_UNITS, MIN_BET_UNITS, MIN_DECKS};
use serde::{Deserialize, Serialize};

const ADVANTAGE_PER_TRUE_COUNT: f64 = 0.5;
const ADVANTAGE_CAP: f64 = 10.0;
const ADVANTAGE_FLOOR: f64 = -2.0;
const INSURANCE_THRESHOLD: f64 = 0.8;
const DOUBLE_DOWN_THRESHOLD: f64 = 1.0;

/// Play deviations suggested by the current true count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyAdjustments {
    pub insurance: bool,
    pub stand: bool,
    pub draw: bool,
    pub double_down: bool,
    pub split: bool,
}

impl StrategyAdjustments {
    pub fn for_true_count(true_count: f64) -> Self {
        Self {
            insurance: true_count > INSURANCE_THRESHOLD,
            stand: true_count > 0.0,
            draw: true_count < 0.0,
            double_down: true_count > DOUBLE_DOWN_THRESHOLD,
            split: true_count > 0.0,
        }
    }
}

/// Everything the overlay, popup and store know about a count.
///
/// Only `running_count`, `cards_seen` and `deck_count` are inputs; the rest
/// is produced by [`CountingState::derive`] and always moves together with
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountingState {
    pub running_count: i32,
    pub cards_seen: u32,
    pub deck_count: u8,
    pub true_count: f64,
    pub high_low_index: f64,
    pub player_advantage: f64,
    pub bet_recommendation: u8,
    pub strategy_adjustments: StrategyAdjustments,
}

impl Default for CountingState {
    fn default() -> Self {
        Self::derive(0, 0, MIN_DECKS)
    }
}

impl CountingState {
    pub fn derive(running_count: i32, cards_seen: u32, deck_count: u8) -> Self {
        let total_cards = i64::from(deck_count) * i64::from(CARDS_PER_DECK);
        let cards_remaining = total_cards - i64::from(cards_seen);
        let decks_remaining = cards_remaining as f64 / f64::from(CARDS_PER_DECK);

        let (true_count, high_low_index) = if decks_remaining <= 0.0 {
            (0.0, 0.0)
        } else {
            let running = f64::from(running_count);
            (
                running / decks_remaining,
                running / cards_remaining as f64 * 100.0,
            )
        };

        Self {
            running_count,
            cards_seen,
            deck_count,
            true_count,
            high_low_index,
            player_advantage: player_advantage(true_count),
            bet_recommendation: bet_units(true_count),
            strategy_adjustments: StrategyAdjustments::for_true_count(true_count),
        }
    }

    pub fn total_cards(&self) -> u32 {
        u32::from(self.deck_count) * CARDS_PER_DECK
    }

    /// Undealt fraction of the shoe, in decks. Negative once more cards
    /// were reported than the shoe holds.
    pub fn decks_remaining(&self) -> f64 {
        (f64::from(self.total_cards()) - f64::from(self.cards_seen)) / f64::from(CARDS_PER_DECK)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn player_advantage(true_count: f64) -> f64 {
    let edge = true_count * ADVANTAGE_PER_TRUE_COUNT;
    if true_count > 0.0 {
        edge.min(ADVANTAGE_CAP)
    } else {
        edge.max(ADVANTAGE_FLOOR)
    }
}

fn bet_units(true_count: f64) -> u8 {
    let index = true_count.round();
    let units = if index <= 2.0 {
        1
    } else if index <= 4.0 {
        2
    } else if index <= 6.0 {
        3
    } else if index <= 8.0 {
        4
    } else {
        5
    };
    units.clamp(MIN_BET_UNITS, MAX_BET_UNITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_is_neutral_single_deck() {
        let state = CountingState::default();
        assert_eq!(state.deck_count, 1);
        assert_eq!(state.running_count, 0);
        assert_eq!(state.cards_seen, 0);
        assert_eq!(state.bet_recommendation, 1);
        approx(state.true_count, 0.0);
        approx(state.player_advantage, 0.0);
        assert_eq!(state.strategy_adjustments, StrategyAdjustments::default());
    }

    #[test]
    fn positive_true_count_of_three() {
        let state = CountingState::derive(3, 0, 1);
        approx(state.true_count, 3.0);
        approx(state.player_advantage, 1.5);
        assert_eq!(state.bet_recommendation, 2);
        assert!(state.strategy_adjustments.double_down);
        assert!(state.strategy_adjustments.insurance);
        assert!(state.strategy_adjustments.stand);
        assert!(state.strategy_adjustments.split);
        assert!(!state.strategy_adjustments.draw);
    }

    #[test]
    fn negative_true_count_of_three() {
        let state = CountingState::derive(-3, 0, 1);
        approx(state.true_count, -3.0);
        approx(state.player_advantage, -1.5);
        assert_eq!(state.bet_recommendation, 1);
        assert!(state.strategy_adjustments.draw);
        assert!(!state.strategy_adjustments.stand);
        assert!(!state.strategy_adjustments.insurance);
    }

    #[test]
    fn advantage_is_capped_and_floored() {
        approx(CountingState::derive(40, 0, 1).player_advantage, 10.0);
        approx(CountingState::derive(-40, 0, 1).player_advantage, -2.0);
    }

    #[test]
    fn bet_tiers_follow_rounded_true_count() {
        let cases = [
            (2, 1),
            (3, 2),
            (4, 2),
            (5, 3),
            (6, 3),
            (7, 4),
            (8, 4),
            (9, 5),
            (30, 5),
            (-9, 1),
        ];
        for (running, expected) in cases {
            assert_eq!(
                CountingState::derive(running, 0, 1).bet_recommendation,
                expected,
                "running count {running}"
            );
        }
    }

    #[test]
    fn insurance_threshold_is_strict() {
        // 4 decks, nothing dealt: true count is running / 4.
        let below = CountingState::derive(3, 0, 4);
        approx(below.true_count, 0.75);
        assert!(!below.strategy_adjustments.insurance);
        let above = CountingState::derive(4, 0, 4);
        assert!(above.strategy_adjustments.insurance);
        assert!(!above.strategy_adjustments.double_down);
    }

    #[test]
    fn exhausted_shoe_is_neutral() {
        let state = CountingState::derive(7, 52, 1);
        approx(state.true_count, 0.0);
        approx(state.high_low_index, 0.0);
        approx(state.player_advantage, 0.0);
        assert_eq!(state.bet_recommendation, 1);
        assert_eq!(state.strategy_adjustments, StrategyAdjustments::default());

        let overdrawn = CountingState::derive(-5, 60, 1);
        approx(overdrawn.true_count, 0.0);
        assert!(overdrawn.decks_remaining() < 0.0);
    }

    #[test]
    fn high_low_index_is_percent_of_remaining_cards() {
        let state = CountingState::derive(2, 2, 1);
        approx(state.high_low_index, 2.0 / 50.0 * 100.0);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let state = CountingState::derive(3, 0, 1);
        let json = state.to_json().unwrap();
        assert!(json.contains("\"runningCount\": 3"));
        assert!(json.contains("\"betRecommendation\": 2"));
        assert!(json.contains("\"doubleDown\": true"));
        let restored = CountingState::from_json(&json).unwrap();
        assert_eq!(restored, state);
    }
}
