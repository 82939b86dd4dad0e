//! `durak eval`: two AI tiers play each other with seats alternating every
//! game, so neither side keeps the first-seat advantage.

use crate::commands::sim::{game_seeds, play_ai_game};
use crate::error::CliError;
use crate::ui;
use durak_ai::{Difficulty, create_ai};
use durak_engine::cards::Variant;
use durak_engine::game::GameConfig;
use durak_engine::player::Seat;
use std::io::Write;

#[derive(Debug, Clone, Default, PartialEq)]
struct EvalStats {
    games: u32,
    wins_a: u32,
    wins_b: u32,
    draws: u32,
    rounds: u64,
}

impl EvalStats {
    fn record(&mut self, winner: Option<Seat>, a_seat: Seat, rounds: u32) {
        self.games += 1;
        self.rounds += u64::from(rounds);
        match winner {
            Some(seat) if seat == a_seat => self.wins_a += 1,
            Some(_) => self.wins_b += 1,
            None => self.draws += 1,
        }
    }

    fn avg_rounds(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.rounds as f64 / self.games as f64
        }
    }
}

pub fn handle_eval_command(
    ai_a: Difficulty,
    ai_b: Difficulty,
    games: u32,
    seed: Option<u64>,
    variant: Variant,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if games == 0 {
        return Err(CliError::InvalidInput("games must be >= 1".to_string()));
    }

    let base_seed = seed.unwrap_or_else(rand::random);
    let stats = run_eval(ai_a, ai_b, games, base_seed, variant)?;

    writeln!(
        out,
        "Eval: {} (A) vs {} (B), {} games ({}), base seed {}",
        ai_a, ai_b, stats.games, variant, base_seed
    )?;
    writeln!(
        out,
        "A {}: {} wins ({:.1}%)",
        ai_a,
        stats.wins_a,
        ui::percent(stats.wins_a, stats.games)
    )?;
    writeln!(
        out,
        "B {}: {} wins ({:.1}%)",
        ai_b,
        stats.wins_b,
        ui::percent(stats.wins_b, stats.games)
    )?;
    writeln!(out, "Draws: {}", stats.draws)?;
    writeln!(out, "Average rounds: {:.1}", stats.avg_rounds())?;
    Ok(())
}

fn run_eval(
    ai_a: Difficulty,
    ai_b: Difficulty,
    games: u32,
    base_seed: u64,
    variant: Variant,
) -> Result<EvalStats, CliError> {
    let mut stats = EvalStats::default();
    for (i, game_seed) in game_seeds(base_seed).take(games as usize).enumerate() {
        let a = create_ai(ai_a, Some(game_seed));
        let b = create_ai(ai_b, Some(game_seed.rotate_left(32)));
        let (seats, a_seat) = if i % 2 == 0 {
            ([a.as_ref(), b.as_ref()], Seat::First)
        } else {
            ([b.as_ref(), a.as_ref()], Seat::Second)
        };

        let session = play_ai_game(GameConfig::new(variant, Some(game_seed)), seats)?;
        let winner = session.outcome().and_then(|o| o.winner());
        stats.record(winner, a_seat, session.round());
    }
    Ok(stats)
}
