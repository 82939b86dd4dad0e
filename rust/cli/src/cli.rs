//! Argument definitions for the `durak` binary.

use clap::{Parser, Subcommand};
use durak_ai::Difficulty;
use durak_engine::cards::Variant;

#[derive(Parser, Debug)]
#[command(
    name = "durak",
    version,
    about = "Durak engine toolbox: inspect deals, simulate and compare AI tiers"
)]
pub struct DurakCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved configuration and where each value came from
    Cfg,
    /// Deal one game and show trump, hands and the first attacker
    Deal {
        #[arg(long)]
        seed: Option<u64>,
        /// 36 (standard) or 24 (quick)
        #[arg(long)]
        variant: Option<Variant>,
    },
    /// Play AI-vs-AI games and optionally write JSONL game records
    Sim {
        #[arg(long)]
        games: Option<u32>,
        #[arg(long)]
        output: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        variant: Option<Variant>,
        /// Tier used for both seats
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Compare two AI tiers head-to-head, alternating seats
    Eval {
        #[arg(long)]
        ai_a: Difficulty,
        #[arg(long)]
        ai_b: Difficulty,
        #[arg(long)]
        games: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        variant: Option<Variant>,
    },
}
