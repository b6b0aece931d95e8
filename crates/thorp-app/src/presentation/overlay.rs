use thorp_core::CountingState;

use super::format::{
    Tone, advantage_tone, bet_tone, bet_units, index_tone, running_tone, signed_decimal,
    signed_int, signed_percent, true_count_tone,
};

pub const OVERLAY_TITLE: &str = "Thorp Counter";
pub const OVERLAY_SUBTITLE: &str = "Hi-Lo System";
const LABEL_WIDTH: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub label: &'static str,
    pub value: String,
    pub tone: Tone,
}

impl StatRow {
    pub fn new(label: &'static str, value: String, tone: Tone) -> Self {
        Self { label, value, tone }
    }

    pub fn render(&self, color: bool) -> String {
        format!(
            "{:<width$}{}",
            self.label,
            self.tone.paint(&self.value, color),
            width = LABEL_WIDTH
        )
    }
}

/// Compact in-page panel: five stats and a short hint list.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub rows: Vec<StatRow>,
    pub hints: Vec<&'static str>,
}

impl OverlayView {
    pub fn from_state(state: &CountingState) -> Self {
        let running = i64::from(state.running_count);
        let rows = vec![
            StatRow::new("Running:", signed_int(running), running_tone(running)),
            StatRow::new(
                "True Count:",
                signed_decimal(state.true_count),
                true_count_tone(state.true_count),
            ),
            StatRow::new(
                "Index:",
                signed_percent(state.high_low_index),
                index_tone(state.high_low_index),
            ),
            StatRow::new(
                "Advantage:",
                signed_percent(state.player_advantage),
                advantage_tone(state.player_advantage),
            ),
            StatRow::new(
                "Bet:",
                bet_units(state.bet_recommendation),
                bet_tone(state.bet_recommendation),
            ),
        ];
        Self {
            rows,
            hints: overlay_hints(state),
        }
    }

    pub fn render(&self, color: bool) -> String {
        let mut output = String::new();
        output.push_str(OVERLAY_TITLE);
        output.push('\n');
        output.push_str(OVERLAY_SUBTITLE);
        output.push('\n');
        for row in &self.rows {
            output.push_str(&row.render(color));
            output.push('\n');
        }
        output.push_str("--\n");
        for hint in &self.hints {
            output.push_str(hint);
            output.push('\n');
        }
        output
    }
}

pub fn overlay_hints(state: &CountingState) -> Vec<&'static str> {
    let mut hints = Vec::new();
    if state.strategy_adjustments.insurance {
        hints.push("✓ Take Insurance");
    }
    if state.true_count > 2.0 {
        hints.push("Stand more, Double more");
    } else if state.true_count < -2.0 {
        hints.push("Draw more, Double less");
    } else {
        hints.push("Use Basic Strategy");
    }
    hints
}
