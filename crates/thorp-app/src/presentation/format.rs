//! Number formatting and colour tones shared by the overlay, popup and badge.

pub const POSITIVE_HEX: &str = "#4CAF50";
pub const NEGATIVE_HEX: &str = "#F44336";
pub const NEUTRAL_HEX: &str = "#666";

const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    /// Positive above `limit`, negative below `-limit`.
    pub fn by_threshold(value: f64, limit: f64) -> Self {
        if value > limit {
            Tone::Positive
        } else if value < -limit {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }

    pub fn by_sign(value: f64) -> Self {
        Self::by_threshold(value, 0.0)
    }

    pub const fn hex(self) -> &'static str {
        match self {
            Tone::Positive => POSITIVE_HEX,
            Tone::Negative => NEGATIVE_HEX,
            Tone::Neutral => NEUTRAL_HEX,
        }
    }

    pub const fn css_class(self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Negative => "negative",
            Tone::Neutral => "neutral",
        }
    }

    const fn ansi(self) -> &'static str {
        match self {
            Tone::Positive => "\x1b[32m",
            Tone::Negative => "\x1b[31m",
            Tone::Neutral => "\x1b[90m",
        }
    }

    pub fn paint(self, text: &str, color: bool) -> String {
        if color {
            format!("{}{text}{ANSI_RESET}", self.ansi())
        } else {
            text.to_string()
        }
    }
}

pub fn signed_int(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// One decimal place with an explicit `+` on positive values.
pub fn signed_decimal(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.1}")
    } else {
        format!("{value:.1}")
    }
}

pub fn signed_percent(value: f64) -> String {
    format!("{}%", signed_decimal(value))
}

pub fn bet_units(units: u8) -> String {
    format!("{units} unit{}", if units > 1 { "s" } else { "" })
}

pub fn running_tone(running_count: i64) -> Tone {
    Tone::by_sign(running_count as f64)
}

pub fn true_count_tone(true_count: f64) -> Tone {
    Tone::by_threshold(true_count, 2.0)
}

pub fn index_tone(high_low_index: f64) -> Tone {
    Tone::by_threshold(high_low_index, 2.0)
}

pub fn advantage_tone(player_advantage: f64) -> Tone {
    Tone::by_threshold(player_advantage, 1.0)
}

pub fn bet_tone(units: u8) -> Tone {
    if units > 1 {
        Tone::Positive
    } else {
        Tone::Neutral
    }
}
