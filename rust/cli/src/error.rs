//! Error types for the CLI application.
//!
//! Every handler returns `Result<(), CliError>`; [`crate::run`] prints the
//! error and maps it to exit code `2`.

use crate::config::ConfigError;
use durak_engine::errors::GameError;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// The engine refused a move it should have accepted
    Engine(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<GameError> for CliError {
    fn from(error: GameError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_keep_their_message() {
        let err = CliError::from(GameError::TableAtCapacity);
        assert!(err.to_string().starts_with("Engine error: "));
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn io_errors_expose_source() {
        let err = CliError::from(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "I/O error: disk full");
        assert!(std::error::Error::source(&err).is_some());
    }
}
