//! # Durak CLI Library
//!
//! Command-line front end for the Durak engine: inspect seeded deals, run
//! AI-vs-AI simulations that write JSONL game records, and compare AI tiers.
//!
//! The primary entry point is [`run`], which parses arguments and dispatches
//! to a subcommand, writing to the streams it is given.
//!
//! ## Available Subcommands
//!
//! - `cfg`: Display the resolved configuration and its sources
//! - `deal`: Deal one game for inspection
//! - `sim`: Play AI-vs-AI games and record them
//! - `eval`: Compare two AI tiers head-to-head
//!
//! Flags win over configuration; configuration comes from defaults, the TOML
//! file named by `DURAK_CONFIG`, then `DURAK_SEED`, `DURAK_VARIANT`,
//! `DURAK_DIFFICULTY` and `DURAK_GAMES`.

use clap::Parser;
use std::io::Write;
pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod ui;

use cli::{Commands, DurakCli};
use commands::{handle_cfg_command, handle_deal_command, handle_eval_command, handle_sim_command};

pub use error::CliError;

const COMMANDS: &[&str] = &["cfg", "deal", "sim", "eval"];

/// Parses `args` and runs the subcommand.
///
/// Returns `0` on success and `2` for usage, configuration or runtime errors.
///
/// # Example
///
/// ```
/// use std::io;
/// let args = vec!["durak", "deal", "--seed", "42"];
/// let code = durak_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match DurakCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return report_usage(e, out, err),
    };

    // cfg reports its own errors, including a broken configuration
    if let Commands::Cfg = cli.cmd {
        return match handle_cfg_command(out, err) {
            Ok(()) => exit_code::SUCCESS,
            Err(_) => exit_code::ERROR,
        };
    }

    let result = config::load()
        .map_err(CliError::from)
        .and_then(|cfg| dispatch(cli.cmd, &cfg, out, err));

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn dispatch(
    cmd: Commands,
    cfg: &config::Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    match cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Deal { seed, variant } => {
            handle_deal_command(seed.or(cfg.seed), variant.unwrap_or(cfg.variant), out)
        }
        Commands::Sim {
            games,
            output,
            seed,
            variant,
            difficulty,
        } => handle_sim_command(
            games.unwrap_or(cfg.games),
            output,
            seed.or(cfg.seed),
            variant.unwrap_or(cfg.variant),
            difficulty.unwrap_or(cfg.difficulty),
            out,
            err,
        ),
        Commands::Eval {
            ai_a,
            ai_b,
            games,
            seed,
            variant,
        } => handle_eval_command(
            ai_a,
            ai_b,
            games.unwrap_or(cfg.games),
            seed.or(cfg.seed),
            variant.unwrap_or(cfg.variant),
            out,
        ),
    }
}

fn report_usage(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version should print to stdout and exit 0
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            if write!(out, "{}", e).is_err() {
                return exit_code::ERROR;
            }
            exit_code::SUCCESS
        }
        _ => {
            let _ = writeln!(err, "{}", e);
            let _ = writeln!(err, "Durak CLI");
            let _ = writeln!(err, "Usage: durak <command> [options]\n");
            let _ = writeln!(err, "Commands:");
            for c in COMMANDS {
                let _ = writeln!(err, "  {}", c);
            }
            let _ = writeln!(err, "\nFor full help, run: durak --help");
            exit_code::ERROR
        }
    }
}
