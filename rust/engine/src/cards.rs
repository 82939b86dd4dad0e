use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four suits of the Durak deck.
/// Suits carry no order of their own; only the trump suit is special.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Suit {
    /// Clubs suit (♣)
    Clubs,
    /// Diamonds suit (♦)
    Diamonds,
    /// Hearts suit (♥)
    Hearts,
    /// Spades suit (♠)
    Spades,
}

impl Suit {
    pub fn symbol(self) -> char {
        match self {
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
            Suit::Hearts => '♥',
            Suit::Spades => '♠',
        }
    }

    fn from_char(c: char) -> Option<Suit> {
        match c {
            'c' | 'C' | '♣' => Some(Suit::Clubs),
            'd' | 'D' | '♦' => Some(Suit::Diamonds),
            'h' | 'H' | '♥' => Some(Suit::Hearts),
            's' | 'S' | '♠' => Some(Suit::Spades),
            _ => None,
        }
    }
}

/// Rank of a card from Six through Ace.
/// Numeric values follow the conventional face values so `rank as u8` compares naturally.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    /// Rank 6
    Six = 6,
    /// Rank 7
    Seven,
    /// Rank 8
    Eight,
    /// Rank 9
    Nine,
    /// Rank 10
    Ten,
    /// Jack (11)
    Jack,
    /// Queen (12)
    Queen,
    /// King (13)
    King,
    /// Ace (14)
    Ace,
}

impl Rank {
    pub fn from_u8(v: u8) -> Option<Rank> {
        match v {
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

    pub fn label(self) -> &'static str {
        match self {
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

/// A single playing card. Immutable value type shared by the deck, hands and table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Card {
    /// The suit of the card
    pub suit: Suit,
    /// The rank of the card (Six through Ace)
    pub rank: Rank,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }

    pub fn is_trump(&self, trump: Suit) -> bool {
        self.suit == trump
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError(pub String);

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card: {}", self.0)
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses `6S`, `10h`, `Q♦`, `a♠` and friends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseCardError(trimmed.to_string());
        let suit_char = trimmed.chars().last().ok_or_else(err)?;
        let suit = Suit::from_char(suit_char).ok_or_else(err)?;
        let rank_part = &trimmed[..trimmed.len() - suit_char.len_utf8()];
        let rank = match rank_part.to_ascii_uppercase().as_str() {
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            "T" => Rank::Ten,
            digits => digits
                .parse::<u8>()
                .ok()
                .and_then(Rank::from_u8)
                .ok_or_else(err)?,
        };
        Ok(Card { suit, rank })
    }
}

/// Deck size variant. The quick game drops everything below nine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// 36 cards, Six through Ace
    #[default]
    Standard,
    /// 24 cards, Nine through Ace
    Quick,
}

impl Variant {
    pub fn deck_size(self) -> usize {
        self.ranks().len() * all_suits().len()
    }

    pub fn ranks(self) -> &'static [Rank] {
        static ALL: [Rank; 9] = [
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
        match self {
            Variant::Standard => &ALL,
            Variant::Quick => &ALL[3..],
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "36" | "standard" => Ok(Variant::Standard),
            "24" | "quick" => Ok(Variant::Quick),
            other => Err(format!("unknown variant: {other} (expected 36 or 24)")),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Standard => f.write_str("standard"),
            Variant::Quick => f.write_str("quick"),
        }
    }
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
}

/// Unshuffled rank × suit cross product for the variant.
pub fn full_deck(variant: Variant) -> Vec<Card> {
    let mut v = Vec::with_capacity(variant.deck_size());
    for &s in &all_suits() {
        for &r in variant.ranks() {
            v.push(Card { suit: s, rank: r });
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn deck_sizes_match_variant() {
        assert_eq!(full_deck(Variant::Standard).len(), 36);
        assert_eq!(full_deck(Variant::Quick).len(), 24);
        let unique: HashSet<Card> = full_deck(Variant::Standard).into_iter().collect();
        assert_eq!(unique.len(), 36);
    }

    #[test]
    fn quick_deck_starts_at_nine() {
        assert!(full_deck(Variant::Quick)
            .iter()
            .all(|c| c.rank >= Rank::Nine));
    }

    #[test]
    fn parses_ascii_and_symbol_forms() {
        assert_eq!("6S".parse::<Card>(), Ok(Card::new(Rank::Six, Suit::Spades)));
        assert_eq!("10h".parse::<Card>(), Ok(Card::new(Rank::Ten, Suit::Hearts)));
        assert_eq!("Q♦".parse::<Card>(), Ok(Card::new(Rank::Queen, Suit::Diamonds)));
        assert_eq!("a♠".parse::<Card>(), Ok(Card::new(Rank::Ace, Suit::Spades)));
        assert!("5S".parse::<Card>().is_err());
        assert!("".parse::<Card>().is_err());
        assert!("KX".parse::<Card>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for card in full_deck(Variant::Standard) {
            let text = card.to_string();
            assert_eq!(text.parse::<Card>(), Ok(card), "{text}");
        }
    }

    #[test]
    fn variant_parses_from_size() {
        assert_eq!("36".parse::<Variant>(), Ok(Variant::Standard));
        assert_eq!("Quick".parse::<Variant>(), Ok(Variant::Quick));
        assert!("52".parse::<Variant>().is_err());
    }
}
