//! Tiered heuristic policy.
//!
//! Attacking depends on the tier; defending is the same for every tier: beat
//! the first open slot as cheaply as possible or take the cards.

use std::sync::Mutex;

use durak_engine::cards::{Card, Suit};
use durak_engine::player::{Role, Seat};
use durak_engine::session::Session;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::{AIOpponent, Decision, Difficulty};

/// Opponent hand size at which the hard tier starts attacking with its
/// highest card.
pub const PRESSURE_THRESHOLD: usize = 3;

/// Picks the next move for the side holding `role` in `session`.
///
/// Attackers return [`Decision::EndTurn`] when nothing can be put on the
/// table. Defenders return [`Decision::TakeCards`] when the open slot cannot
/// be beaten and [`Decision::FullyDefended`] when no slot is open.
pub fn choose_move<R: Rng + ?Sized>(
    session: &Session,
    role: Role,
    difficulty: Difficulty,
    rng: &mut R,
) -> Decision {
    match role {
        Role::Attacker => choose_attack(session, difficulty, rng),
        Role::Defender => choose_defense(session),
    }
}

fn choose_attack<R: Rng + ?Sized>(
    session: &Session,
    difficulty: Difficulty,
    rng: &mut R,
) -> Decision {
    let seat = session.attacker();
    let legal = session.legal_attacks(seat);
    let trump = session.trump();

    let pick = match difficulty {
        Difficulty::Easy => legal.choose(rng).copied(),
        Difficulty::Medium => cheapest(&legal, trump),
        Difficulty::Hard => {
            if session.hand(seat.other()).len() <= PRESSURE_THRESHOLD {
                strongest(&legal, trump)
            } else {
                cheapest(&legal, trump)
            }
        }
    };
    pick.map_or(Decision::EndTurn, Decision::Attack)
}

fn choose_defense(session: &Session) -> Decision {
    let seat = session.defender();
    let Some((slot, _)) = session.table().first_unresolved() else {
        return Decision::FullyDefended;
    };
    let options = session.legal_defenses(seat, slot);
    match cheapest(&options, session.trump()) {
        Some(card) => Decision::Defend { slot, card },
        None => Decision::TakeCards,
    }
}

/// Lowest non-trump, falling back to the lowest trump.
fn cheapest(cards: &[Card], trump: Suit) -> Option<Card> {
    cards.iter().copied().min_by_key(|c| (c.suit == trump, c.rank))
}

/// Highest rank; a non-trump wins the tie.
fn strongest(cards: &[Card], trump: Suit) -> Option<Card> {
    cards.iter().copied().max_by_key(|c| (c.rank, c.suit != trump))
}

/// [`choose_move`] behind the [`AIOpponent`] trait, with its own RNG.
#[derive(Debug)]
pub struct HeuristicAI {
    difficulty: Difficulty,
    name: String,
    rng: Mutex<ChaCha20Rng>,
}

impl HeuristicAI {
    pub fn new(difficulty: Difficulty, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha20Rng::seed_from_u64(s),
            None => ChaCha20Rng::from_os_rng(),
        };
        Self {
            difficulty,
            name: format!("HeuristicAI({difficulty})"),
            rng: Mutex::new(rng),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

impl AIOpponent for HeuristicAI {
    fn get_action(&self, session: &Session, seat: Seat) -> Decision {
        let role = if seat == session.attacker() {
            Role::Attacker
        } else {
            Role::Defender
        };
        // RNG state stays valid after a poisoning panic
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        choose_move(session, role, self.difficulty, &mut *rng)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
