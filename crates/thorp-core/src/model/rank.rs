use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ORDERED: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            14 => Some(Rank::Ace),
            _ => None,
        }
    }

    /// Parse a rank token scraped from page text.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace. Face
    /// cards and aces accept their full name or single-letter abbreviation,
    /// and `1` is read as an ace. Numeric tokens only cover `1..=10`; a
    /// token like `11` is not a rank.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        match token.to_ascii_lowercase().as_str() {
            "a" | "ace" | "1" => Some(Rank::Ace),
            "k" | "king" => Some(Rank::King),
            "q" | "queen" => Some(Rank::Queen),
            "j" | "jack" => Some(Rank::Jack),
            "ten" => Some(Rank::Ten),
            numeric => match numeric.parse::<u8>() {
                Ok(value @ 2..=10) => Rank::from_value(value),
                _ => None,
            },
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Hi-Lo point value: low cards add, neutral cards are ignored, tens
    /// and aces subtract.
    pub const fn hi_lo(self) -> i32 {
        match self {
            Rank::Two | Rank::Three | Rank::Four | Rank::Five | Rank::Six => 1,
            Rank::Seven | Rank::Eight | Rank::Nine => 0,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King | Rank::Ace => -1,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn from_value_maps() {
        assert_eq!(Rank::from_value(11), Some(Rank::Jack));
        assert_eq!(Rank::from_value(1), None);
    }

    #[test]
    fn display_matches_symbols() {
        assert_eq!(Rank::Queen.to_string(), "Q");
        assert_eq!(Rank::Ten.to_string(), "10");
    }

    #[test]
    fn tokens_are_case_insensitive() {
        assert_eq!(Rank::from_token("ACE"), Some(Rank::Ace));
        assert_eq!(Rank::from_token(" King "), Some(Rank::King));
        assert_eq!(Rank::from_token("q"), Some(Rank::Queen));
        assert_eq!(Rank::from_token("Jack"), Some(Rank::Jack));
        assert_eq!(Rank::from_token("TEN"), Some(Rank::Ten));
    }

    #[test]
    fn numeric_tokens_cover_one_through_ten() {
        assert_eq!(Rank::from_token("1"), Some(Rank::Ace));
        assert_eq!(Rank::from_token("2"), Some(Rank::Two));
        assert_eq!(Rank::from_token("10"), Some(Rank::Ten));
        assert_eq!(Rank::from_token("0"), None);
        assert_eq!(Rank::from_token("11"), None);
        assert_eq!(Rank::from_token("-3"), None);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert_eq!(Rank::from_token(""), None);
        assert_eq!(Rank::from_token("joker"), None);
        assert_eq!(Rank::from_token("5 of hearts"), None);
    }

    #[test]
    fn hi_lo_partitions_every_rank() {
        let total: i32 = Rank::ORDERED.iter().map(|rank| rank.hi_lo()).sum();
        // A full deck is balanced.
        assert_eq!(total, 0);
        assert_eq!(Rank::Six.hi_lo(), 1);
        assert_eq!(Rank::Seven.hi_lo(), 0);
        assert_eq!(Rank::Nine.hi_lo(), 0);
        assert_eq!(Rank::Ten.hi_lo(), -1);
        assert_eq!(Rank::Ace.hi_lo(), -1);
    }
}
