use crate::cards::{Card, Rank};
use serde::{Deserialize, Serialize};

/// An attack card and, once beaten, the card that beat it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct TableSlot {
    pub attack: Card,
    pub defense: Option<Card>,
}

impl TableSlot {
    pub fn is_resolved(&self) -> bool {
        self.defense.is_some()
    }
}

/// The cards in play for the current round, in the order they were attacked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    slots: Vec<TableSlot>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: Vec<TableSlot>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[TableSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&TableSlot> {
        self.slots.get(slot)
    }

    pub fn push_attack(&mut self, card: Card) {
        self.slots.push(TableSlot {
            attack: card,
            defense: None,
        });
    }

    /// Fills the defense of `slot`. Callers validate the slot first.
    pub(crate) fn cover(&mut self, slot: usize, card: Card) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.defense = Some(card);
        }
    }

    /// Every rank showing on the table, attack and defense alike.
    pub fn ranks(&self) -> Vec<Rank> {
        let mut ranks = Vec::with_capacity(self.slots.len() * 2);
        for slot in &self.slots {
            ranks.push(slot.attack.rank);
            if let Some(d) = slot.defense {
                ranks.push(d.rank);
            }
        }
        ranks.sort();
        ranks.dedup();
        ranks
    }

    pub fn first_unresolved(&self) -> Option<(usize, Card)> {
        self.slots
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_resolved())
            .map(|(i, s)| (i, s.attack))
    }

    pub fn all_resolved(&self) -> bool {
        self.slots.iter().all(TableSlot::is_resolved)
    }

    pub fn cards(&self) -> Vec<Card> {
        self.slots
            .iter()
            .flat_map(|s| std::iter::once(s.attack).chain(s.defense))
            .collect()
    }

    /// Empties the table, returning its cards in table order.
    pub fn drain(&mut self) -> Vec<Card> {
        let cards = self.cards();
        self.slots.clear();
        cards
    }
}
