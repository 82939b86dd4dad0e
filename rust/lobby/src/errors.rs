//! Error types for the lobby and their machine-readable form.
//!
//! Every error maps to a stable code and a severity so a calling layer (chat
//! bot, HTTP front end) can render it without matching on variants.
use durak_engine::errors::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::registry::{PlayerId, SessionId};
use crate::rooms::RoomId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LobbyError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
    #[error("Player {0} is not in a game or room")]
    NotBound(PlayerId),
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),
    #[error("Cannot join your own room")]
    OwnRoom,
    #[error("Player is not seated in this session")]
    NotAParticipant,
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Lobby storage poisoned")]
    StoragePoisoned,
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    /// Caller mistakes: expected, normal operation
    Client,
    /// Unexpected failures that need investigation
    Server,
    /// Shared state can no longer be trusted
    Critical,
}

impl LobbyError {
    pub fn error_code(&self) -> &'static str {
        match self {
            LobbyError::NotFound(_) => "session_not_found",
            LobbyError::NotBound(_) => "not_bound",
            LobbyError::RoomNotFound(_) => "room_not_found",
            LobbyError::OwnRoom => "own_room",
            LobbyError::NotAParticipant => "not_a_participant",
            LobbyError::Game(err) => err.code(),
            LobbyError::StoragePoisoned => "lobby_storage_error",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LobbyError::StoragePoisoned => ErrorSeverity::Critical,
            _ => ErrorSeverity::Client,
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            LobbyError::NotFound(id) => Some(serde_json::json!({ "session_id": id })),
            LobbyError::RoomNotFound(id) => Some(serde_json::json!({ "room_id": id })),
            LobbyError::Game(GameError::StaleSnapshot { expected, actual }) => Some(
                serde_json::json!({ "expected_version": expected, "actual_version": actual }),
            ),
            _ => None,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            details: self.error_details(),
        }
    }
}

/// Serializable error payload for whatever layer talks to players.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "session_not_found")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}
