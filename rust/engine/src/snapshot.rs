use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit, Variant};
use crate::game::{Outcome, Stage};
use crate::player::Seat;
use crate::table::TableSlot;

/// Full read-only copy of a session. Both hands are included; the caller
/// decides what each side gets to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Bumped by every accepted move
    pub version: u64,
    pub variant: Variant,
    pub trump: Suit,
    pub trump_card: Card,
    pub deck_count: usize,
    pub discard_count: usize,
    pub table: Vec<TableSlot>,
    /// Indexed by [`Seat::index`]
    pub hands: [Vec<Card>; 2],
    pub stage: Stage,
    pub attacker: Seat,
    pub defender: Seat,
    pub attack_limit: usize,
    pub round: u32,
    pub winner: Option<Seat>,
    pub outcome: Option<Outcome>,
}

impl SessionSnapshot {
    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat.index()]
    }
}

/// One seat's side of the table: its own hand, the opponent's card count and
/// what it may play next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub seat: Seat,
    pub version: u64,
    pub stage: Stage,
    pub trump_card: Card,
    pub deck_count: usize,
    pub table: Vec<TableSlot>,
    pub hand: Vec<Card>,
    pub opponent_cards: usize,
    pub is_attacker: bool,
    pub to_act: bool,
    pub legal_attacks: Vec<Card>,
    /// First slot still waiting for a defense
    pub pending_slot: Option<usize>,
    pub legal_defenses: Vec<Card>,
    pub winner: Option<Seat>,
}
