use crate::cards::Variant;
use crate::player::Seat;
use serde::{Deserialize, Serialize};

/// Where a session is in its round.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Attacker opens a round on an empty table
    Attack,
    /// Defender must beat or take the unresolved slot
    Defend,
    /// Every slot is beaten; attacker may throw in or end the turn
    ThrowIn,
    /// Game over, no further moves
    Terminal,
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    /// Seat emptied its hand after the deck ran out
    Won { winner: Seat },
    /// Both hands emptied at the same moment
    Draw,
    /// Opponent abandoned or released the game
    Forfeited { winner: Seat },
}

impl Outcome {
    pub fn winner(&self) -> Option<Seat> {
        match self {
            Outcome::Won { winner } | Outcome::Forfeited { winner } => Some(*winner),
            Outcome::Draw => None,
        }
    }
}

/// Parameters fixed at session creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub variant: Variant,
    /// `None` draws a fresh seed
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn new(variant: Variant, seed: Option<u64>) -> Self {
        Self { variant, seed }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            variant: Variant::Standard,
            seed: Some(seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_winner() {
        assert_eq!(Outcome::Won { winner: Seat::First }.winner(), Some(Seat::First));
        assert_eq!(Outcome::Draw.winner(), None);
        assert_eq!(
            Outcome::Forfeited {
                winner: Seat::Second
            }
            .winner(),
            Some(Seat::Second)
        );
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(Outcome::Won { winner: Seat::Second }).unwrap();
        assert_eq!(json["result"], "won");
        assert_eq!(json["winner"], "second");
    }
}
