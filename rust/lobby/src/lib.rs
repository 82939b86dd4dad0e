//! In-memory lobby for Durak games.
//!
//! Binds external player ids to sessions, runs single-player games against
//! the AI and two-player rooms, and publishes game events on an [`EventBus`].
//! Transport (chat bot, HTTP, terminal) is left to the caller.
//!
//! ```
//! use durak_lobby::Lobby;
//!
//! let lobby = Lobby::new();
//! let sessions = lobby.sessions();
//! let id = sessions.start_vs_ai("alice", None, None, Some(42)).expect("start");
//! // The AI replies on its own, so alice is always the one to act here.
//! let view = sessions.view("alice").expect("view");
//! assert!(view.to_act);
//! assert_eq!(view.hand.len(), 6);
//! assert!(sessions.active_sessions().contains(&id));
//! ```

pub mod errors;
pub mod events;
pub mod logging;
pub mod registry;
pub mod rooms;
pub mod settings;

use std::sync::Arc;

pub use errors::{ErrorResponse, ErrorSeverity, LobbyError};
pub use events::{EventBus, EventSubscription, GameEvent, SeatInfo};
pub use logging::{LogEntry, LogFormat, TestLogSubscriber, init_logging};
pub use registry::{
    AiMove, Binding, GameSession, LOBBY_CHANNEL, Participant, PlayerId, SessionId, SessionManager,
};
pub use rooms::{RoomId, RoomInfo};
pub use settings::{LobbySettings, SettingsError, SettingsStore};

/// Shared handles for one lobby instance.
///
/// Finished and abandoned games are dropped only by
/// [`SessionManager::cleanup_abandoned`]. Hosts start
/// [`SessionManager::spawn_sweeper`] on their tokio runtime, or call the
/// cleanups themselves; without either every finished game stays in memory.
#[derive(Debug, Clone)]
pub struct Lobby {
    event_bus: Arc<EventBus>,
    settings: Arc<SettingsStore>,
    sessions: Arc<SessionManager>,
}

impl Lobby {
    pub fn new() -> Self {
        let settings = Arc::new(SettingsStore::new());
        Self::with_store(settings)
    }

    pub fn with_settings(settings: LobbySettings) -> Result<Self, SettingsError> {
        let store = Arc::new(SettingsStore::with_settings(settings)?);
        Ok(Self::with_store(store))
    }

    fn with_store(settings: Arc<SettingsStore>) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let sessions = Arc::new(SessionManager::with_settings(
            Arc::clone(&event_bus),
            Arc::clone(&settings),
        ));
        Self {
            event_bus,
            settings,
            sessions,
        }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn settings(&self) -> Arc<SettingsStore> {
        Arc::clone(&self.settings)
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}
