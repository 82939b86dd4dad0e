//! # durak-ai: AI Opponents for Durak
//!
//! Provides the card-selection policy used when one side of a session is
//! played by the computer. The policy is a pure function of the session and
//! a difficulty tier; opponents wrap it behind a common trait.
//!
//! ## Core Components
//!
//! - [`AIOpponent`] - Trait defining the interface for AI decision-making
//! - [`heuristic`] - Tiered heuristic policy (`easy`, `medium`, `hard`)
//! - [`create_ai`] - Factory function for creating AI opponents
//!
//! ## Quick Start
//!
//! ```rust
//! use durak_ai::{create_ai, Decision, Difficulty};
//! use durak_engine::game::GameConfig;
//! use durak_engine::session::Session;
//!
//! let ai = create_ai(Difficulty::Medium, Some(7));
//! let session = Session::new(GameConfig::seeded(42));
//!
//! let decision = ai.get_action(&session, session.attacker());
//! assert!(matches!(decision, Decision::Attack(_)));
//! ```

use std::fmt;
use std::str::FromStr;

use durak_engine::cards::Card;
use durak_engine::player::{Move, Seat};
use durak_engine::session::Session;
use serde::{Deserialize, Serialize};

pub mod heuristic;

/// AI strength tier. Fixed when a session is created; only changes which card
/// the policy picks, never the rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Random legal attacks
    Easy,
    /// Cheapest card first, trumps last
    #[default]
    Medium,
    /// Like medium, but presses with high cards when the opponent runs low
    Hard,
}

impl Difficulty {
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!(
                "unknown difficulty: {other} (expected easy, medium or hard)"
            )),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(s)
    }
}

/// What the policy wants to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    Attack(Card),
    Defend { slot: usize, card: Card },
    /// No legal attack left or the table is full
    EndTurn,
    /// Nothing beats the open slot
    TakeCards,
    /// Every slot is already beaten; the attacker moves next
    FullyDefended,
}

impl Decision {
    /// The session move for this decision. `FullyDefended` has none.
    pub fn into_move(self) -> Option<Move> {
        match self {
            Decision::Attack(card) => Some(Move::Attack(card)),
            Decision::Defend { slot, card } => Some(Move::Defend { slot, card }),
            Decision::EndTurn => Some(Move::EndTurn),
            Decision::TakeCards => Some(Move::Take),
            Decision::FullyDefended => None,
        }
    }
}

/// Trait defining the interface for AI opponents.
///
/// Implementations only read the session; the caller applies the returned
/// decision through the same path as a human move.
///
/// # Example Implementation
///
/// ```rust
/// use durak_ai::{AIOpponent, Decision};
/// use durak_engine::player::Seat;
/// use durak_engine::session::Session;
///
/// struct AlwaysTakes;
///
/// impl AIOpponent for AlwaysTakes {
///     fn get_action(&self, _session: &Session, _seat: Seat) -> Decision {
///         Decision::TakeCards
///     }
///
///     fn name(&self) -> &str {
///         "AlwaysTakes"
///     }
/// }
/// ```
pub trait AIOpponent: Send + Sync {
    /// Decide the next action for `seat` in `session`.
    fn get_action(&self, session: &Session, seat: Seat) -> Decision;

    fn name(&self) -> &str;
}

/// Creates an opponent for `difficulty`. A seed makes easy-tier choices
/// reproducible; `None` seeds from the OS.
///
/// ```rust
/// use durak_ai::{create_ai, Difficulty};
///
/// let ai = create_ai(Difficulty::Hard, None);
/// assert_eq!(ai.name(), "HeuristicAI(hard)");
/// ```
pub fn create_ai(difficulty: Difficulty, seed: Option<u64>) -> Box<dyn AIOpponent> {
    Box::new(heuristic::HeuristicAI::new(difficulty, seed))
}
