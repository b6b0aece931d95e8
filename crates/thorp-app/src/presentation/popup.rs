use super::format::{
    Tone, advantage_tone, bet_tone, bet_units, index_tone, running_tone, signed_decimal, signed_int,
    signed_percent, true_count_tone,
};
use super::overlay::StatRow;
use crate::store::StoredStatus;
use thorp_core::StrategyAdjustments;

pub const NOT_DETECTED: &str = "Not detected";

/// The toolbar popup: detection status, the full stat list, deck setting
/// and the longer strategy hint list.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub game_label: String,
    pub detected: bool,
    pub rows: Vec<StatRow>,
    pub deck_count: u8,
    pub hints: Vec<&'static str>,
}

impl PopupView {
    pub fn from_status(status: &StoredStatus) -> Self {
        let rows = vec![
            StatRow::new(
                "Cards Seen:",
                status.cards_seen.to_string(),
                Tone::Neutral,
            ),
            StatRow::new(
                "Running:",
                signed_int(status.running_count),
                running_tone(status.running_count),
            ),
            StatRow::new(
                "True Count:",
                signed_decimal(status.true_count),
                true_count_tone(status.true_count),
            ),
            StatRow::new(
                "Index:",
                signed_percent(status.high_low_index),
                index_tone(status.high_low_index),
            ),
            StatRow::new(
                "Advantage:",
                signed_percent(status.player_advantage),
                advantage_tone(status.player_advantage),
            ),
            StatRow::new(
                "Bet:",
                bet_units(status.bet_recommendation),
                bet_tone(status.bet_recommendation),
            ),
        ];
        Self {
            game_label: status
                .detected_game
                .map(|game| game.label().to_string())
                .unwrap_or_else(|| NOT_DETECTED.to_string()),
            detected: status.detected_game.is_some(),
            rows,
            deck_count: status.deck_count,
            hints: popup_hints(&status.strategy_adjustments, status.true_count),
        }
    }

    pub fn render(&self, color: bool) -> String {
        let mut output = String::new();
        output.push_str(&format!("Game: {}\n", self.game_label));
        for row in &self.rows {
            output.push_str(&row.render(color));
            output.push('\n');
        }
        output.push_str(&format!("Decks: {}\n", self.deck_count));
        output.push_str("Strategy:\n");
        for hint in &self.hints {
            output.push_str(&format!("  {hint}\n"));
        }
        output
    }
}

pub fn popup_hints(adjustments: &StrategyAdjustments, true_count: f64) -> Vec<&'static str> {
    let mut hints = Vec::new();
    if adjustments.insurance {
        hints.push("✓ Take Insurance (True Count > 0.8)");
    }

    if true_count > 2.0 {
        hints.extend([
            "Stand more often",
            "Double down more often",
            "Split pairs more often",
        ]);
    } else if true_count > 0.0 {
        hints.push("Slight advantage - use basic strategy");
    } else if true_count < -2.0 {
        hints.extend([
            "Draw more often",
            "Double down less often",
            "Split pairs less often",
        ]);
    } else {
        hints.push("Use Basic Strategy");
    }

    if true_count > 1.0 {
        hints.push("Deck is favorable");
    } else if true_count < -1.0 {
        hints.push("Deck is unfavorable");
    }
    hints
}
