//! Pending multiplayer rooms: a creator waiting for a second player.

use durak_engine::cards::Variant;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::errors::LobbyError;
use crate::registry::PlayerId;

pub type RoomId = String;

#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub creator: PlayerId,
    pub variant: Variant,
    pub seed: Option<u64>,
    opened_at: Instant,
}

impl Room {
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }
}

/// Public listing entry for an open room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomInfo {
    pub id: RoomId,
    pub creator: PlayerId,
    pub variant: Variant,
    pub waiting_secs: u64,
}

impl From<&Room> for RoomInfo {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            creator: room.creator.clone(),
            variant: room.variant,
            waiting_secs: room.age().as_secs(),
        }
    }
}

/// Open rooms by id. Taking a room removes it, so only one joiner wins.
#[derive(Debug, Default)]
pub struct RoomBook {
    rooms: RwLock<HashMap<RoomId, Room>>,
}

impl RoomBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(
        &self,
        creator: PlayerId,
        variant: Variant,
        seed: Option<u64>,
    ) -> Result<Room, LobbyError> {
        let room = Room {
            id: Uuid::new_v4().to_string(),
            creator,
            variant,
            seed,
            opened_at: Instant::now(),
        };
        self.rooms
            .write()
            .map_err(|_| LobbyError::StoragePoisoned)?
            .insert(room.id.clone(), room.clone());
        Ok(room)
    }

    pub fn get(&self, id: &str) -> Result<Room, LobbyError> {
        self.rooms
            .read()
            .map_err(|_| LobbyError::StoragePoisoned)?
            .get(id)
            .cloned()
            .ok_or_else(|| LobbyError::RoomNotFound(id.to_string()))
    }

    /// Removes and returns the room unless `joiner` created it.
    pub fn take_for(&self, id: &str, joiner: &str) -> Result<Room, LobbyError> {
        let mut guard = self.rooms.write().map_err(|_| LobbyError::StoragePoisoned)?;
        match guard.get(id) {
            None => Err(LobbyError::RoomNotFound(id.to_string())),
            Some(room) if room.creator == joiner => Err(LobbyError::OwnRoom),
            Some(_) => guard
                .remove(id)
                .ok_or_else(|| LobbyError::RoomNotFound(id.to_string())),
        }
    }

    pub fn remove(&self, id: &str) -> Result<Option<Room>, LobbyError> {
        Ok(self
            .rooms
            .write()
            .map_err(|_| LobbyError::StoragePoisoned)?
            .remove(id))
    }

    /// Removes and returns every room older than `ttl`.
    pub fn take_expired(&self, ttl: Duration) -> Vec<Room> {
        let mut guard = match self.rooms.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut expired = Vec::new();
        guard.retain(|_, room| {
            if room.age() >= ttl {
                expired.push(room.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn list(&self) -> Vec<RoomInfo> {
        match self.rooms.read() {
            Ok(guard) => guard.values().map(RoomInfo::from).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
impl RoomBook {
    pub(crate) fn backdate(&self, id: &str, by: Duration) {
        if let Ok(mut guard) = self.rooms.write() {
            if let Some(room) = guard.get_mut(id) {
                room.opened_at -= by;
            }
        }
    }
}
