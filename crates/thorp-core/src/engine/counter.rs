use super::clamp_deck_count;
use super::state::CountingState;
use crate::model::rank::Rank;

/// Hi-Lo counter for a single page context.
///
/// The engine never fails: unknown tokens count for nothing, deck counts are
/// clamped and an exhausted shoe collapses to a neutral state. Every mutation
/// re-derives the whole [`CountingState`] before returning.
#[derive(Debug, Clone, Default)]
pub struct CountingEngine {
    state: CountingState,
}

impl CountingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deck_count(decks: i64) -> Self {
        let mut engine = Self::new();
        engine.set_deck_count(decks);
        engine
    }

    /// Hi-Lo points for a free-form rank token; unrecognised tokens are 0.
    pub fn card_point_value(token: &str) -> i32 {
        Rank::from_token(token).map(Rank::hi_lo).unwrap_or(0)
    }

    /// Record one revealed card and return the points it contributed.
    pub fn observe_card(&mut self, token: &str) -> i32 {
        let points = Self::card_point_value(token);
        self.apply(points);
        points
    }

    pub fn observe_rank(&mut self, rank: Rank) {
        self.apply(rank.hi_lo());
    }

    pub fn set_deck_count(&mut self, decks: i64) {
        self.state.deck_count = clamp_deck_count(decks);
        self.recompute();
    }

    /// Start a fresh shoe. The configured deck count survives.
    pub fn reset(&mut self) {
        self.state.running_count = 0;
        self.state.cards_seen = 0;
        self.state.bet_recommendation = 1;
        self.recompute();
    }

    pub fn snapshot(&self) -> CountingState {
        self.state
    }

    pub fn state(&self) -> &CountingState {
        &self.state
    }

    fn apply(&mut self, points: i32) {
        self.state.running_count = self.state.running_count.saturating_add(points);
        self.state.cards_seen = self.state.cards_seen.saturating_add(1);
        self.recompute();
    }

    fn recompute(&mut self) {
        let CountingState {
            running_count,
            cards_seen,
            deck_count,
            ..
        } = self.state;
        self.state = CountingState::derive(running_count, cards_seen, deck_count);
    }
}

#[cfg(test)]
mod tests {
    use super::CountingEngine;
    use crate::model::rank::Rank;

    #[test]
    fn point_values_follow_hi_lo() {
        for token in ["A", "K", "Q", "J", "10", "ace", "King", "ten"] {
            assert_eq!(CountingEngine::card_point_value(token), -1, "{token}");
        }
        for token in ["2", "3", "4", "5", "6"] {
            assert_eq!(CountingEngine::card_point_value(token), 1, "{token}");
        }
        for token in ["7", "8", "9", "", "joker", "??", "42"] {
            assert_eq!(CountingEngine::card_point_value(token), 0, "{token}");
        }
    }

    #[test]
    fn observe_card_counts_zero_point_cards() {
        let mut engine = CountingEngine::new();
        assert_eq!(engine.observe_card("8"), 0);
        assert_eq!(engine.observe_card("garbage"), 0);
        let state = engine.snapshot();
        assert_eq!(state.cards_seen, 2);
        assert_eq!(state.running_count, 0);
    }

    #[test]
    fn observe_rank_matches_token_path() {
        let mut by_rank = CountingEngine::new();
        let mut by_token = CountingEngine::new();
        for rank in Rank::ORDERED {
            by_rank.observe_rank(rank);
            by_token.observe_card(&rank.to_string());
        }
        assert_eq!(by_rank.snapshot(), by_token.snapshot());
    }

    #[test]
    fn set_deck_count_keeps_counts() {
        let mut engine = CountingEngine::new();
        engine.observe_card("5");
        engine.observe_card("6");
        engine.set_deck_count(2);
        let state = engine.snapshot();
        assert_eq!(state.deck_count, 2);
        assert_eq!(state.running_count, 2);
        assert_eq!(state.cards_seen, 2);
        assert!((state.true_count - 2.0 / (102.0 / 52.0)).abs() < 1e-9);
    }

    #[test]
    fn reset_preserves_deck_count() {
        let mut engine = CountingEngine::with_deck_count(6);
        engine.observe_card("3");
        engine.reset();
        let state = engine.snapshot();
        assert_eq!(state.deck_count, 6);
        assert_eq!(state.running_count, 0);
        assert_eq!(state.cards_seen, 0);
        assert_eq!(state.bet_recommendation, 1);
    }
}
