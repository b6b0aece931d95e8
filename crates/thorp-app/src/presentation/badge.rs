use super::format::{NEGATIVE_HEX, POSITIVE_HEX};

pub const DETECTED_MARK: &str = "✓";

/// Toolbar badge for the active tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub color: Option<&'static str>,
}

impl Badge {
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    pub fn mark_detected(&mut self) {
        self.text = DETECTED_MARK.to_string();
        self.color = Some(POSITIVE_HEX);
    }

    /// Show the floored true count once it moves past ±1; otherwise blank
    /// the text and leave the colour as it was.
    pub fn show_true_count(&mut self, true_count: f64) {
        if true_count.abs() > 1.0 {
            let floored = true_count.floor() as i64;
            self.text = if true_count > 0.0 {
                format!("+{floored}")
            } else {
                floored.to_string()
            };
            self.color = Some(if true_count > 0.0 {
                POSITIVE_HEX
            } else {
                NEGATIVE_HEX
            });
        } else {
            self.text.clear();
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_sets_green_check() {
        let mut badge = Badge::default();
        badge.mark_detected();
        assert_eq!(badge.text, "✓");
        assert_eq!(badge.color, Some("#4CAF50"));
    }

    #[test]
    fn true_count_is_floored() {
        let mut badge = Badge::default();
        badge.show_true_count(2.7);
        assert_eq!(badge.text, "+2");
        badge.show_true_count(-1.5);
        assert_eq!(badge.text, "-2");
        assert_eq!(badge.color, Some("#F44336"));
    }

    #[test]
    fn small_counts_blank_the_text_only() {
        let mut badge = Badge::default();
        badge.show_true_count(-4.0);
        badge.show_true_count(0.9);
        assert!(badge.is_blank());
        assert_eq!(badge.color, Some("#F44336"));
    }
}
