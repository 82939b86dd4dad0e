use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card, Suit, Variant};

/// Builds the variant's card set and Fisher–Yates shuffles it with `rng`.
pub fn new_deck<R: Rng + ?Sized>(variant: Variant, rng: &mut R) -> Vec<Card> {
    let mut cards = full_deck(variant);
    cards.shuffle(rng);
    cards
}

/// Takes the top card, records its suit as trump and slides the card under
/// the rest of the deck so it stays face up and is drawn last.
///
/// The top of the deck is the end of the vector. Returns `None` on an empty deck.
pub fn draw_trump(cards: &mut Vec<Card>) -> Option<(Card, Suit)> {
    let card = cards.pop()?;
    cards.insert(0, card);
    Some((card, card.suit))
}

#[derive(Debug, Clone)]
pub struct Deck {
    variant: Variant,
    cards: Vec<Card>,
    trump: Option<Card>,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(variant: Variant, seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep initial order until shuffle is called explicitly
        Self {
            variant,
            cards: full_deck(variant),
            trump: None,
            rng,
        }
    }

    /// A deck in an exact order (bottom first) with `trump` already fixed.
    pub fn stacked(variant: Variant, cards: Vec<Card>, trump: Card) -> Self {
        Self {
            variant,
            cards,
            trump: Some(trump),
            rng: ChaCha20Rng::seed_from_u64(0),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn shuffle(&mut self) {
        self.cards = new_deck(self.variant, &mut self.rng);
        self.trump = None;
    }

    /// Fixes the trump card. Calling it twice returns the same card.
    pub fn draw_trump(&mut self) -> Option<Card> {
        if self.trump.is_none() {
            self.trump = draw_trump(&mut self.cards).map(|(card, _)| card);
        }
        self.trump
    }

    pub fn trump_card(&self) -> Option<Card> {
        self.trump
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards still in the deck, bottom first.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
