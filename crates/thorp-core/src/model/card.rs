use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn hi_lo(self) -> i32 {
        self.rank.hi_lo()
    }

    /// Parse a hand-typed card: `K♠`, `10h`, `Q of spades`.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        let (rank, suit) = match token.split_once(" of ") {
            Some(parts) => parts,
            None => {
                let (split, _) = token.char_indices().last()?;
                token.split_at(split)
            }
        };
        Some(Self::new(Rank::from_token(rank)?, Suit::from_token(suit)?))
    }

    /// Markup a card typically shows on a table page, e.g. `K of spades`.
    pub fn page_label(self) -> String {
        format!("{} of {}", self.rank, self.suit.name())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, Rank, Suit};

    #[test]
    fn display_concatenates_rank_and_suit() {
        let card = Card::new(Rank::Queen, Suit::Spades);
        assert_eq!(card.to_string(), "QS");
        assert_eq!(card.page_label(), "Q of spades");
    }

    #[test]
    fn hi_lo_follows_rank() {
        assert_eq!(Card::new(Rank::Four, Suit::Clubs).hi_lo(), 1);
        assert_eq!(Card::new(Rank::Eight, Suit::Hearts).hi_lo(), 0);
        assert_eq!(Card::new(Rank::Ace, Suit::Diamonds).hi_lo(), -1);
    }

    #[test]
    fn from_token_reads_short_and_long_forms() {
        assert_eq!(
            Card::from_token("K♠"),
            Some(Card::new(Rank::King, Suit::Spades))
        );
        assert_eq!(
            Card::from_token(" 10h "),
            Some(Card::new(Rank::Ten, Suit::Hearts))
        );
        assert_eq!(
            Card::from_token("ace of Diamonds"),
            Some(Card::new(Rank::Ace, Suit::Diamonds))
        );
        let card = Card::new(Rank::Seven, Suit::Clubs);
        assert_eq!(Card::from_token(&card.page_label()), Some(card));
        assert_eq!(Card::from_token("K"), None);
        assert_eq!(Card::from_token("Zs"), None);
        assert_eq!(Card::from_token(""), None);
    }
}
