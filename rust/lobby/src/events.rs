use durak_ai::Difficulty;
use durak_engine::game::Outcome;
use durak_engine::player::{Move, Seat};
use durak_engine::snapshot::SessionSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

use crate::registry::{PlayerId, SessionId};
use crate::rooms::RoomId;

// Use bounded channel with reasonable buffer size to prevent memory exhaustion
// If all subscribers are slow, events will be dropped (backpressure)
const EVENT_CHANNEL_BUFFER: usize = 1000;

/// Session or room id an event is published under.
pub type ChannelId = String;

pub type EventSender = mpsc::Sender<GameEvent>;
pub type EventReceiver = mpsc::Receiver<GameEvent>;

pub struct EventSubscription {
    bus: EventBus,
    channel: ChannelId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }

    /// Everything delivered so far, without waiting.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.channel, self.subscriber_id);
    }
}

type Subscribers = HashMap<ChannelId, Vec<(usize, EventSender)>>;

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<Subscribers>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, channel: impl Into<ChannelId>) -> EventSubscription {
        let channel = channel.into();
        let (subscriber_id, receiver) = self.subscribe_raw(channel.clone());
        EventSubscription {
            bus: self.clone(),
            channel,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, channel: ChannelId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.write()
            .entry(channel.clone())
            .or_default()
            .push((id, tx));

        tracing::info!(
            channel = %channel,
            subscriber_id = id,
            "subscribed to game events"
        );

        (id, rx)
    }

    pub fn broadcast(&self, channel: &str, event: GameEvent) {
        tracing::debug!(
            channel = %channel,
            event_type = event.kind(),
            "broadcasting game event"
        );

        let subscribers = self.read().get(channel).cloned();

        if let Some(list) = subscribers {
            tracing::trace!(
                channel = %channel,
                subscriber_count = list.len(),
                "sending event to subscribers"
            );

            let mut failed = Vec::new();
            for (id, sender) in list {
                // Use try_send to avoid blocking on full channels
                // This implements backpressure by dropping events for slow subscribers
                if let Err(e) = sender.try_send(event.clone()) {
                    tracing::warn!(
                        channel = %channel,
                        subscriber_id = id,
                        error = ?e,
                        "failed to send event to subscriber"
                    );
                    failed.push(id);
                }
            }
            if !failed.is_empty() {
                self.remove_subscribers(channel, &failed);
            }
        }
    }

    pub fn unsubscribe(&self, channel: &str, subscriber_id: usize) {
        self.remove_subscribers(channel, &[subscriber_id]);
    }

    pub fn drop_channel(&self, channel: &str) {
        self.write().remove(channel);
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, channel: &str, ids: &[usize]) {
        let mut guard = self.write();
        if let Some(list) = guard.get_mut(channel) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(channel);
            }
        }
    }

    // The map only holds senders; a panic mid-update cannot corrupt it.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Subscribers> {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Subscribers> {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Who sits in a seat, as announced when a game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeatInfo {
    Human { seat: Seat, player_id: PlayerId },
    Ai { seat: Seat, difficulty: Difficulty },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted {
        session_id: SessionId,
        seats: Vec<SeatInfo>,
        snapshot: SessionSnapshot,
    },
    /// A move was accepted; `snapshot` is the state right after it.
    StateChanged {
        session_id: SessionId,
        seat: Seat,
        action: Move,
        snapshot: SessionSnapshot,
    },
    GameEnded {
        session_id: SessionId,
        outcome: Option<Outcome>,
        reason: String,
        /// RFC3339
        ended_at: String,
    },
    RoomOpened {
        room_id: RoomId,
        creator: PlayerId,
    },
    RoomClosed {
        room_id: RoomId,
        reason: String,
    },
}

impl GameEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::StateChanged { .. } => "state_changed",
            GameEvent::GameEnded { .. } => "game_ended",
            GameEvent::RoomOpened { .. } => "room_opened",
            GameEvent::RoomClosed { .. } => "room_closed",
        }
    }
}
