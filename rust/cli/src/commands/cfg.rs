//! `durak cfg`: prints the resolved configuration as JSON, each value next
//! to where it came from (`default`, `file` or `env`).

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Configuration error: {}", e))?;
            return Err(CliError::Config(e.to_string()));
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "variant": {
            "value": config.variant,
            "source": sources.variant,
        },
        "difficulty": {
            "value": config.difficulty,
            "source": sources.difficulty,
        },
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "games": {
            "value": config.games,
            "source": sources.games,
        },
        "abandon_timeout_secs": {
            "value": config.abandon_timeout_secs,
            "source": sources.abandon_timeout_secs,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
