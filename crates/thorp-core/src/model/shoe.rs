use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// One or more 52-card decks dealt from a single shoe.
#[derive(Debug, Clone)]
pub struct Shoe {
    decks: u8,
    cards: Vec<Card>,
}

impl Shoe {
    pub fn standard(decks: u8) -> Self {
        let decks = decks.max(1);
        let mut cards = Vec::with_capacity(decks as usize * 52);
        for _ in 0..decks {
            for suit in Suit::ALL.iter().copied() {
                for rank in Rank::ORDERED.iter().copied() {
                    cards.push(Card::new(rank, suit));
                }
            }
        }
        Self { decks, cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(decks: u8, rng: &mut R) -> Self {
        let mut shoe = Self::standard(decks);
        shoe.shuffle_in_place(rng);
        shoe
    }

    pub fn shuffled_with_seed(decks: u8, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(decks, &mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn decks(&self) -> u8 {
        self.decks
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::Shoe;

    #[test]
    fn standard_shoe_holds_every_deck() {
        assert_eq!(Shoe::standard(1).cards().len(), 52);
        assert_eq!(Shoe::standard(6).cards().len(), 312);
        assert_eq!(Shoe::standard(0).decks(), 1);
    }

    #[test]
    fn full_shoe_counts_to_zero() {
        let shoe = Shoe::shuffled_with_seed(4, 9);
        let total: i32 = shoe.cards().iter().map(|card| card.hi_lo()).sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let shoe_a = Shoe::shuffled_with_seed(2, 42);
        let shoe_b = Shoe::shuffled_with_seed(2, 42);
        assert_eq!(shoe_a.cards(), shoe_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let shoe_a = Shoe::shuffled_with_seed(1, 1);
        let shoe_b = Shoe::shuffled_with_seed(1, 2);
        assert_ne!(shoe_a.cards(), shoe_b.cards());
    }
}
