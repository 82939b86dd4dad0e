use crate::cards::{Card, Suit};
use crate::player::{Hand, Seat};
use crate::table::Table;

/// Cards each seat is topped up to after a round.
pub const HAND_SIZE: usize = 6;

/// Most attack cards a single round can hold.
pub const MAX_TABLE: usize = 6;

/// Returns whether `defend` beats `attack` under `trump`.
///
/// A card beats a lower card of its own suit. A trump beats any non-trump
/// regardless of rank; trump against trump compares ranks like any other suit.
/// A non-trump never beats a card of another suit.
///
/// # Examples
///
/// ```
/// use durak_engine::cards::Card;
/// use durak_engine::rules::can_beat;
/// use durak_engine::cards::Suit;
///
/// let six_spades: Card = "6S".parse().unwrap();
/// let seven_spades: Card = "7S".parse().unwrap();
/// let king_diamonds: Card = "KD".parse().unwrap();
/// let six_hearts: Card = "6H".parse().unwrap();
///
/// assert!(can_beat(six_spades, seven_spades, Suit::Hearts));
/// assert!(can_beat(king_diamonds, six_hearts, Suit::Hearts));
/// assert!(!can_beat(six_hearts, king_diamonds, Suit::Hearts));
/// ```
pub fn can_beat(attack: Card, defend: Card, trump: Suit) -> bool {
    if attack.suit == defend.suit {
        return defend.rank > attack.rank;
    }
    defend.suit == trump && attack.suit != trump
}

/// Cards from `hand` that may be put on `table`.
///
/// On an empty table every card is an opening move. Otherwise only cards whose
/// rank already shows on the table (attack or defense) may be thrown in; suit
/// does not matter. Capacity is the session's concern, not checked here.
pub fn legal_attacks(hand: &[Card], table: &Table) -> Vec<Card> {
    if table.is_empty() {
        return hand.to_vec();
    }
    let ranks = table.ranks();
    hand.iter()
        .copied()
        .filter(|c| ranks.contains(&c.rank))
        .collect()
}

/// Cards from `hand` that beat `attack`.
pub fn legal_defenses(hand: &[Card], attack: Card, trump: Suit) -> Vec<Card> {
    hand.iter()
        .copied()
        .filter(|&c| can_beat(attack, c, trump))
        .collect()
}

/// Seat that opens the game: whoever holds the lowest trump.
/// When neither hand has a trump the first seat starts.
pub fn first_attacker(first: &Hand, second: &Hand, trump: Suit) -> Seat {
    match (first.lowest_trump(trump), second.lowest_trump(trump)) {
        (Some(a), Some(b)) if b.rank < a.rank => Seat::Second,
        (None, Some(_)) => Seat::Second,
        _ => Seat::First,
    }
}

/// Attack cards allowed in a round opened against a defender holding
/// `defender_hand` cards.
pub fn round_capacity(defender_hand: usize) -> usize {
    defender_hand.min(MAX_TABLE)
}
