//! `durak sim`: plays AI-vs-AI games and records them.
//!
//! Game `i` of a run is seeded from a ChaCha stream keyed by the base seed,
//! so a run can be reproduced from its base seed alone. With `--output` every
//! game is appended to a JSONL file as a [`GameRecord`].

use crate::error::CliError;
use crate::ui;
use durak_ai::{AIOpponent, Difficulty, create_ai};
use durak_engine::cards::Variant;
use durak_engine::game::{GameConfig, Outcome};
use durak_engine::logger::{GameLogger, GameRecord};
use durak_engine::player::Seat;
use durak_engine::session::Session;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::io::Write;
use std::path::Path;

// A Durak game is far shorter; hitting this means a policy is stuck.
const MAX_MOVES: usize = 2_000;

/// Plays one game between `ais[0]` (first seat) and `ais[1]` (second seat).
pub(crate) fn play_ai_game(
    config: GameConfig,
    ais: [&dyn AIOpponent; 2],
) -> Result<Session, CliError> {
    let mut session = Session::new(config);
    for _ in 0..MAX_MOVES {
        let Some(seat) = session.actor() else {
            return Ok(session);
        };
        let ai = ais[seat.index()];
        let decision = ai.get_action(&session, seat);
        let mv = decision.into_move().ok_or_else(|| {
            CliError::Engine(format!("{} returned {:?} on its turn", ai.name(), decision))
        })?;
        session.apply(seat, mv)?;
    }
    Err(CliError::Engine(format!(
        "game with seed {} did not finish within {} moves",
        session.seed(),
        MAX_MOVES
    )))
}

/// Seeds for the games of one run.
pub(crate) fn game_seeds(base_seed: u64) -> impl Iterator<Item = u64> {
    let mut rng = ChaCha20Rng::seed_from_u64(base_seed);
    std::iter::repeat_with(move || rng.random())
}

pub(crate) fn today() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

#[derive(Debug, Default)]
struct SimSummary {
    games: u32,
    first_wins: u32,
    second_wins: u32,
    draws: u32,
    moves: usize,
}

impl SimSummary {
    fn add(&mut self, record: &GameRecord) {
        self.games += 1;
        self.moves += record.moves.len();
        match record.outcome {
            Some(Outcome::Won { winner }) | Some(Outcome::Forfeited { winner }) => match winner {
                Seat::First => self.first_wins += 1,
                Seat::Second => self.second_wins += 1,
            },
            Some(Outcome::Draw) | None => self.draws += 1,
        }
    }
}

pub fn handle_sim_command(
    games: u32,
    output: Option<String>,
    seed: Option<u64>,
    variant: Variant,
    difficulty: Difficulty,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if games == 0 {
        return Err(CliError::InvalidInput("games must be >= 1".to_string()));
    }

    let mut logger = match output.as_deref() {
        Some(path) => {
            if Path::new(path).exists() {
                ui::display_warning(err, &format!("overwriting {}", path))?;
            }
            GameLogger::create(path)?
        }
        None => GameLogger::detached(&today()),
    };

    let base_seed = seed.unwrap_or_else(rand::random);
    let mut summary = SimSummary::default();

    for game_seed in game_seeds(base_seed).take(games as usize) {
        let first = create_ai(difficulty, Some(game_seed));
        let second = create_ai(difficulty, Some(game_seed.rotate_left(32)));
        let session = play_ai_game(
            GameConfig::new(variant, Some(game_seed)),
            [first.as_ref(), second.as_ref()],
        )?;

        let mut record = session.record(logger.next_id());
        record.meta = Some(serde_json::json!({
            "first": difficulty,
            "second": difficulty,
        }));
        logger.write(&record)?;
        summary.add(&record);
    }

    writeln!(
        out,
        "Simulated {} games ({}, {} vs {}), base seed {}",
        summary.games, variant, difficulty, difficulty, base_seed
    )?;
    writeln!(
        out,
        "First seat wins: {} ({:.1}%)",
        summary.first_wins,
        ui::percent(summary.first_wins, summary.games)
    )?;
    writeln!(
        out,
        "Second seat wins: {} ({:.1}%)",
        summary.second_wins,
        ui::percent(summary.second_wins, summary.games)
    )?;
    writeln!(out, "Draws: {}", summary.draws)?;
    writeln!(
        out,
        "Average moves per game: {:.1}",
        summary.moves as f64 / summary.games as f64
    )?;
    if let Some(path) = output {
        writeln!(out, "Records written to {}", path)?;
    }
    Ok(())
}
