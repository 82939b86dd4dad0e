use crate::cards::Card;
use crate::player::Seat;
use thiserror::Error;

/// Rejections produced by the session state machine.
///
/// Every variant is recoverable: the session is left untouched and the caller
/// re-prompts the same actor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("It's not {actual}'s turn (expected {expected})")]
    NotYourTurn { expected: Seat, actual: Seat },
    #[error("Card {0} is not in hand")]
    CardNotInHand(Card),
    #[error("Card {0} cannot be played here")]
    IllegalCard(Card),
    #[error("No table slot {0}")]
    SlotNotFound(usize),
    #[error("Table slot {0} is already defended")]
    SlotAlreadyDefended(usize),
    #[error("Game already finished")]
    SessionAlreadyTerminal,
    #[error("Table is at capacity")]
    TableAtCapacity,
    #[error("Nothing has been played yet")]
    EmptyTable,
    #[error("Stale snapshot: expected version {expected}, session is at {actual}")]
    StaleSnapshot { expected: u64, actual: u64 },
}

impl GameError {
    /// Machine-readable code for the calling layer.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotYourTurn { .. } => "not_your_turn",
            GameError::CardNotInHand(_) => "card_not_in_hand",
            GameError::IllegalCard(_) => "illegal_card",
            GameError::SlotNotFound(_) => "slot_not_found",
            GameError::SlotAlreadyDefended(_) => "slot_already_defended",
            GameError::SessionAlreadyTerminal => "session_already_terminal",
            GameError::TableAtCapacity => "table_at_capacity",
            GameError::EmptyTable => "empty_table",
            GameError::StaleSnapshot { .. } => "stale_snapshot",
        }
    }
}
