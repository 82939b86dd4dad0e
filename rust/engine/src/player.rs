use crate::cards::{Card, Suit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides of a session. Attacker and defender are roles that
/// move between seats; the seat itself never changes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    /// Dealt first; attacks first when nobody holds a trump
    First,
    Second,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    pub fn both() -> [Seat; 2] {
        [Seat::First, Seat::Second]
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::First => f.write_str("first seat"),
            Seat::Second => f.write_str("second seat"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Attacker,
    Defender,
}

/// A move submitted on behalf of one seat.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move {
    /// Put a card on the table (opening attack or throw-in)
    Attack(Card),
    /// Beat the attack card in `slot`
    Defend { slot: usize, card: Card },
    /// Pick up everything on the table
    Take,
    /// Attacker declines to throw in more cards
    EndTurn,
}

/// Cards held by one seat. Insertion order is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut hand = Self::new();
        for c in cards {
            hand.add(c);
        }
        hand
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// Adds a card; duplicates are ignored.
    pub fn add(&mut self, card: Card) {
        if !self.contains(card) {
            self.cards.push(card);
        }
    }

    pub fn remove(&mut self, card: Card) -> bool {
        match self.cards.iter().position(|&c| c == card) {
            Some(idx) => {
                self.cards.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn lowest_trump(&self, trump: Suit) -> Option<Card> {
        self.cards
            .iter()
            .copied()
            .filter(|c| c.suit == trump)
            .min_by_key(|c| c.rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Rank;

    #[test]
    fn hand_keeps_insertion_order_and_rejects_duplicates() {
        let a = Card::new(Rank::King, Suit::Clubs);
        let b = Card::new(Rank::Six, Suit::Hearts);
        let mut hand = Hand::from_cards([a, b, a]);
        assert_eq!(hand.cards(), &[a, b]);
        assert!(hand.remove(a));
        assert!(!hand.remove(a));
        assert_eq!(hand.len(), 1);
    }

    #[test]
    fn lowest_trump_ignores_other_suits() {
        let hand = Hand::from_cards([
            Card::new(Rank::Six, Suit::Clubs),
            Card::new(Rank::Queen, Suit::Hearts),
            Card::new(Rank::Nine, Suit::Hearts),
        ]);
        assert_eq!(
            hand.lowest_trump(Suit::Hearts),
            Some(Card::new(Rank::Nine, Suit::Hearts))
        );
        assert_eq!(hand.lowest_trump(Suit::Spades), None);
    }

    #[test]
    fn seats_alternate() {
        assert_eq!(Seat::First.other(), Seat::Second);
        assert_eq!(Seat::Second.other().index(), 0);
    }
}
