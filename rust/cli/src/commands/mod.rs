//! Command handlers for the `durak` CLI.
//!
//! Each command lives in its own module and exposes
//! `handle_COMMAND_command(...) -> Result<(), CliError>`, writing to the
//! streams it is given so tests can capture output.

mod cfg;
mod deal;
mod eval;
mod sim;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use eval::handle_eval_command;
pub use sim::handle_sim_command;
