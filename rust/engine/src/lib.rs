//! # durak-engine: Two-Player Durak Core
//!
//! A deterministic engine for heads-up Durak ("Fool"). Owns the deck, hands,
//! table and discard pile of a single game and enforces the round cycle
//! (attack, defend, throw in, take or end turn) with seeded RNG so any game
//! can be replayed from its seed.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and the 36/24-card variants
//! - [`deck`] - Seeded shuffling and the face-up trump card
//! - [`rules`] - Beating, throw-in and first-attacker rules
//! - [`table`] - Attack/defense pairs of the current round
//! - [`player`] - Seats, hands and moves
//! - [`game`] - Stages, outcomes and game configuration
//! - [`session`] - The per-game state machine
//! - [`snapshot`] - Read-only copies of a session for callers
//! - [`logger`] - Move history and JSONL game records
//! - [`errors`] - Error types for rejected moves
//!
//! ## Quick Start
//!
//! ```rust
//! use durak_engine::cards::Suit;
//! use durak_engine::rules::can_beat;
//!
//! let attack = "9S".parse().unwrap();
//! let defense = "6H".parse().unwrap();
//! assert!(can_beat(attack, defense, Suit::Hearts));
//! ```
//!
//! ## Deterministic Gameplay
//!
//! ```rust
//! use durak_engine::game::GameConfig;
//! use durak_engine::session::Session;
//!
//! let a = Session::new(GameConfig::seeded(42));
//! let b = Session::new(GameConfig::seeded(42));
//! assert_eq!(a.snapshot(), b.snapshot());
//! ```
//!
//! ## Rejected Moves
//!
//! ```rust
//! use durak_engine::errors::GameError;
//! use durak_engine::game::GameConfig;
//! use durak_engine::session::Session;
//!
//! let mut session = Session::new(GameConfig::seeded(1));
//! let defender = session.defender();
//! let card = session.hand(defender).cards()[0];
//!
//! match session.attack(defender, card) {
//!     Err(GameError::NotYourTurn { .. }) => {}
//!     other => panic!("unexpected: {other:?}"),
//! }
//! assert_eq!(session.version(), 0);
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod game;
pub mod logger;
pub mod player;
pub mod rules;
pub mod session;
pub mod snapshot;
pub mod table;
