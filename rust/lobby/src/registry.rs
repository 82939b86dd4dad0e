//! Session registry and matchmaking.
//!
//! The [`SessionManager`] owns every live [`GameSession`], the open rooms, and
//! the mapping from external player ids to what they are currently playing.
//! A player is bound to at most one session or room at a time. Rebinding
//! happens under the bindings lock, and whatever the player was attached to
//! before is forfeited or closed before that lock is released.
//!
//! Each session's engine sits behind its own mutex, so moves for one game are
//! applied one at a time while unrelated games proceed in parallel. AI moves
//! are computed on a copy of the engine outside that lock and then applied
//! through the same versioned path as human moves.

use durak_ai::{create_ai, AIOpponent, Decision, Difficulty};
use durak_engine::cards::{Card, Variant};
use durak_engine::errors::GameError;
use durak_engine::game::GameConfig;
use durak_engine::player::{Move, Seat};
use durak_engine::session::Session;
use durak_engine::snapshot::{PlayerView, SessionSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::errors::LobbyError;
use crate::events::{EventBus, GameEvent, SeatInfo};
use crate::rooms::{Room, RoomBook, RoomId, RoomInfo};
use crate::settings::{LobbySettings, SettingsStore};

pub type SessionId = String;
pub type PlayerId = String;

/// Channel carrying room announcements for everyone in the lobby.
pub const LOBBY_CHANNEL: &str = "lobby";

// A full game is well under this many moves; the cap only guards the loop.
const MAX_AI_STEPS: usize = 1024;

/// Who plays a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Participant {
    Human(PlayerId),
    Ai(Difficulty),
}

impl Participant {
    pub fn player_id(&self) -> Option<&str> {
        match self {
            Participant::Human(id) => Some(id),
            Participant::Ai(_) => None,
        }
    }

    fn seat_info(&self, seat: Seat) -> SeatInfo {
        match self {
            Participant::Human(id) => SeatInfo::Human {
                seat,
                player_id: id.clone(),
            },
            Participant::Ai(difficulty) => SeatInfo::Ai {
                seat,
                difficulty: *difficulty,
            },
        }
    }
}

/// What a player is currently attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Session(SessionId, Seat),
    Room(RoomId),
}

/// What a removed binding left behind.
enum Displaced {
    Forfeited(Arc<GameSession>, Seat),
    Room(RoomId),
    Gone,
}

/// An AI move chosen for the seat on turn, tagged with the version it was
/// computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiMove {
    pub seat: Seat,
    pub version: u64,
    pub decision: Decision,
}

/// Engine state and the time of the last accepted move, locked together so
/// the idle sweep always judges the actor against its own timestamp.
struct LiveGame {
    engine: Session,
    last_active: Instant,
}

pub struct GameSession {
    id: SessionId,
    state: Mutex<LiveGame>,
    seats: [Participant; 2],
    ai: [Option<Box<dyn AIOpponent>>; 2],
    created_at: Instant,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ai_names: Vec<&str> = self.ai.iter().flatten().map(|ai| ai.name()).collect();
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("seats", &self.seats)
            .field("ai", &ai_names)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl GameSession {
    fn new(id: SessionId, config: GameConfig, seats: [Participant; 2]) -> Self {
        let ai = Seat::both().map(|seat| match &seats[seat.index()] {
            Participant::Ai(difficulty) => Some(create_ai(
                *difficulty,
                config.seed.map(|s| s.wrapping_add(seat.index() as u64 + 1)),
            )),
            Participant::Human(_) => None,
        });
        let now = Instant::now();
        Self {
            id,
            state: Mutex::new(LiveGame {
                engine: Session::new(config),
                last_active: now,
            }),
            seats,
            ai,
            created_at: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn seats(&self) -> &[Participant; 2] {
        &self.seats
    }

    pub fn seat_of(&self, player: &str) -> Option<Seat> {
        Seat::both()
            .into_iter()
            .find(|seat| self.seats[seat.index()].player_id() == Some(player))
    }

    pub fn is_ai(&self, seat: Seat) -> bool {
        self.ai[seat.index()].is_some()
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, LobbyError> {
        Ok(self.lock()?.engine.snapshot())
    }

    /// Time since the last accepted move, or since creation.
    pub fn idle_for(&self) -> Duration {
        self.state
            .lock()
            .map(|game| game.last_active.elapsed())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, LiveGame>, LobbyError> {
        self.state.lock().map_err(|_| LobbyError::StoragePoisoned)
    }

    fn humans(&self) -> impl Iterator<Item = &str> {
        self.seats.iter().filter_map(Participant::player_id)
    }

    fn seat_infos(&self) -> Vec<SeatInfo> {
        Seat::both()
            .into_iter()
            .map(|seat| self.seats[seat.index()].seat_info(seat))
            .collect()
    }
}

#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<GameSession>>>,
    bindings: RwLock<HashMap<PlayerId, Binding>>,
    rooms: RoomBook,
    event_bus: Arc<EventBus>,
    settings: Arc<SettingsStore>,
}

impl SessionManager {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self::with_settings(event_bus, Arc::new(SettingsStore::new()))
    }

    pub fn with_settings(event_bus: Arc<EventBus>, settings: Arc<SettingsStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            bindings: RwLock::new(HashMap::new()),
            rooms: RoomBook::new(),
            event_bus,
            settings,
        }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn settings(&self) -> Result<LobbySettings, LobbyError> {
        self.settings.get().map_err(|_| LobbyError::StoragePoisoned)
    }

    /// Creates a session with explicit seating. Humans in `seats` lose any
    /// previous binding.
    pub fn create_session(
        &self,
        config: GameConfig,
        seats: [Participant; 2],
    ) -> Result<SessionId, LobbyError> {
        self.open_session(config, seats, None)
    }

    /// Single-player game: `player` takes the first seat, the AI the second.
    pub fn start_vs_ai(
        &self,
        player: &str,
        difficulty: Option<Difficulty>,
        variant: Option<Variant>,
        seed: Option<u64>,
    ) -> Result<SessionId, LobbyError> {
        let settings = self.settings()?;
        let difficulty = difficulty.unwrap_or(settings.default_difficulty);
        let variant = variant.unwrap_or(settings.default_variant);
        self.create_session(
            GameConfig::new(variant, seed),
            [
                Participant::Human(player.to_string()),
                Participant::Ai(difficulty),
            ],
        )
    }

    /// Opens a room for `player` to wait in until someone joins.
    pub fn create_room(
        &self,
        player: &str,
        variant: Option<Variant>,
        seed: Option<u64>,
    ) -> Result<RoomId, LobbyError> {
        let variant = variant.unwrap_or(self.settings()?.default_variant);

        let (room, displaced) = {
            let mut bindings = self
                .bindings
                .write()
                .map_err(|_| LobbyError::StoragePoisoned)?;
            let room = self.rooms.open(player.to_string(), variant, seed)?;
            let previous = bindings.insert(player.to_string(), Binding::Room(room.id.clone()));
            let displaced = match previous {
                Some(previous) => self.displace(previous)?,
                None => Displaced::Gone,
            };
            (room, displaced)
        };
        self.settle(player, displaced)?;

        tracing::info!(room_id = %room.id, creator = %player, variant = ?variant, "room opened");

        let event = GameEvent::RoomOpened {
            room_id: room.id.clone(),
            creator: player.to_string(),
        };
        self.event_bus.broadcast(player, event.clone());
        self.event_bus.broadcast(LOBBY_CHANNEL, event);
        Ok(room.id)
    }

    /// Seats the room's creator first and `player` second in a new session.
    /// Fails with `RoomNotFound` if the creator moved on before the join landed.
    pub fn join_room(&self, player: &str, room_id: &str) -> Result<SessionId, LobbyError> {
        let room = self.rooms.take_for(room_id, player)?;
        self.open_session(
            GameConfig::new(room.variant, room.seed),
            [
                Participant::Human(room.creator.clone()),
                Participant::Human(player.to_string()),
            ],
            Some(&room),
        )
    }

    /// Withdraws `player`'s open room.
    pub fn cancel_room(&self, player: &str) -> Result<RoomId, LobbyError> {
        let room_id = match self.binding_of(player)? {
            Some(Binding::Room(room_id)) => room_id,
            _ => return Err(LobbyError::NotBound(player.to_string())),
        };
        self.release(player)?;
        Ok(room_id)
    }

    pub fn apply_attack(
        &self,
        session_id: &str,
        player: &str,
        card: Card,
    ) -> Result<SessionSnapshot, LobbyError> {
        self.submit(session_id, player, Move::Attack(card), None)
    }

    pub fn apply_defend(
        &self,
        session_id: &str,
        player: &str,
        slot: usize,
        card: Card,
    ) -> Result<SessionSnapshot, LobbyError> {
        self.submit(session_id, player, Move::Defend { slot, card }, None)
    }

    pub fn take_cards(
        &self,
        session_id: &str,
        player: &str,
    ) -> Result<SessionSnapshot, LobbyError> {
        self.submit(session_id, player, Move::Take, None)
    }

    pub fn end_attack_turn(
        &self,
        session_id: &str,
        player: &str,
    ) -> Result<SessionSnapshot, LobbyError> {
        self.submit(session_id, player, Move::EndTurn, None)
    }

    /// Applies `mv` for `player`. With `expected_version` the move is refused
    /// once the session has moved past that version, which is how a repeated
    /// submission built from the same snapshot gets rejected.
    ///
    /// Returns the state after any AI replies have been played.
    pub fn submit(
        &self,
        session_id: &str,
        player: &str,
        mv: Move,
        expected_version: Option<u64>,
    ) -> Result<SessionSnapshot, LobbyError> {
        let session = self.get_session(session_id)?;
        let seat = session
            .seat_of(player)
            .ok_or(LobbyError::NotAParticipant)?;

        let snapshot = self.apply_to(&session, seat, mv, expected_version)?;
        if snapshot.outcome.is_none() && self.settings()?.auto_play_ai {
            self.play_ai_turns(session_id)?;
            return session.snapshot();
        }
        Ok(snapshot)
    }

    /// The AI's choice for the seat on turn, or `None` when a human must act
    /// or the game is over.
    pub fn compute_ai_move(&self, session_id: &str) -> Result<Option<AiMove>, LobbyError> {
        let session = self.get_session(session_id)?;
        let engine = session.lock()?.engine.clone();

        let Some(seat) = engine.actor() else {
            return Ok(None);
        };
        let Some(ai) = session.ai[seat.index()].as_ref() else {
            return Ok(None);
        };

        Ok(Some(AiMove {
            seat,
            version: engine.version(),
            decision: ai.get_action(&engine, seat),
        }))
    }

    /// Plays AI moves until a human is on turn or the game ends. Returns the
    /// number of moves applied.
    pub fn play_ai_turns(&self, session_id: &str) -> Result<usize, LobbyError> {
        let session = self.get_session(session_id)?;
        let mut applied = 0;

        for _ in 0..MAX_AI_STEPS {
            let Some(ai_move) = self.compute_ai_move(session_id)? else {
                break;
            };
            let Some(mv) = ai_move.decision.into_move() else {
                tracing::warn!(
                    session_id = %session_id,
                    seat = ?ai_move.seat,
                    decision = ?ai_move.decision,
                    "AI returned no playable move"
                );
                break;
            };

            match self.apply_to(&session, ai_move.seat, mv, Some(ai_move.version)) {
                Ok(snapshot) => {
                    applied += 1;
                    if snapshot.outcome.is_some() {
                        break;
                    }
                }
                // Someone else moved first; recompute against the new state.
                Err(LobbyError::Game(GameError::StaleSnapshot { .. })) => continue,
                Err(err) => return Err(err),
            }
        }

        Ok(applied)
    }

    pub fn get_session(&self, id: &str) -> Result<Arc<GameSession>, LobbyError> {
        let guard = self
            .sessions
            .read()
            .map_err(|_| LobbyError::StoragePoisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| LobbyError::NotFound(id.to_string()))
    }

    /// Full state of a session, both hands included.
    pub fn state(&self, session_id: &str) -> Result<SessionSnapshot, LobbyError> {
        self.get_session(session_id)?.snapshot()
    }

    /// The game `player` is bound to, seen from their seat.
    pub fn view(&self, player: &str) -> Result<PlayerView, LobbyError> {
        match self.binding_of(player)? {
            Some(Binding::Session(session_id, seat)) => {
                let session = self.get_session(&session_id)?;
                let game = session.lock()?;
                Ok(game.engine.view(seat))
            }
            _ => Err(LobbyError::NotBound(player.to_string())),
        }
    }

    pub fn view_for(&self, session_id: &str, player: &str) -> Result<PlayerView, LobbyError> {
        let session = self.get_session(session_id)?;
        let seat = session
            .seat_of(player)
            .ok_or(LobbyError::NotAParticipant)?;
        let game = session.lock()?;
        Ok(game.engine.view(seat))
    }

    pub fn binding_of(&self, player: &str) -> Result<Option<Binding>, LobbyError> {
        Ok(self
            .bindings
            .read()
            .map_err(|_| LobbyError::StoragePoisoned)?
            .get(player)
            .cloned())
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        match self.sessions.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn open_rooms(&self) -> Vec<RoomInfo> {
        self.rooms.list()
    }

    /// Detaches `player` from whatever they are in. Leaving a live game
    /// forfeits it; leaving a room closes it.
    pub fn release(&self, player: &str) -> Result<(), LobbyError> {
        let displaced = {
            let mut bindings = self
                .bindings
                .write()
                .map_err(|_| LobbyError::StoragePoisoned)?;
            let binding = bindings
                .remove(player)
                .ok_or_else(|| LobbyError::NotBound(player.to_string()))?;
            self.displace(binding)?
        };
        self.settle(player, displaced)
    }

    /// Forfeits live sessions whose side on turn has been idle past the
    /// abandon timeout, and drops finished sessions. This is the only place
    /// sessions leave the registry, so their final state stays readable until
    /// the next sweep. Returns the ids of the sessions forfeited by this sweep.
    pub fn cleanup_abandoned(&self) -> Vec<SessionId> {
        let timeout = match self.settings() {
            Ok(settings) => settings.abandon_timeout(),
            Err(err) => {
                tracing::error!(error = %err, "cannot read lobby settings");
                return Vec::new();
            }
        };

        let sessions: Vec<Arc<GameSession>> = match self.sessions.read() {
            Ok(guard) => guard.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        };

        let mut forfeited = Vec::new();
        let mut finished = Vec::new();
        for session in sessions {
            let idle_actor = match session.lock() {
                Ok(mut game) => match game.engine.actor() {
                    None => {
                        finished.push(session.id.clone());
                        continue;
                    }
                    Some(actor) if game.last_active.elapsed() >= timeout => {
                        let idle = game.last_active.elapsed();
                        game.engine.forfeit(actor).ok().map(|_| (actor, idle))
                    }
                    Some(_) => None,
                },
                Err(err) => {
                    tracing::error!(session_id = %session.id, error = %err, "session lock poisoned");
                    finished.push(session.id.clone());
                    continue;
                }
            };

            if let Some((actor, idle)) = idle_actor {
                tracing::warn!(
                    session_id = %session.id,
                    seat = ?actor,
                    idle_secs = idle.as_secs(),
                    "side on turn abandoned the game and forfeits"
                );
                if let Err(err) = self.finish(&session, "abandoned") {
                    tracing::error!(session_id = %session.id, error = %err, "failed to finish session");
                }
                forfeited.push(session.id.clone());
                finished.push(session.id.clone());
            }
        }

        self.prune(&finished);
        forfeited
    }

    /// Closes rooms nobody joined within the room timeout.
    pub fn cleanup_expired_rooms(&self) -> Vec<RoomId> {
        let ttl = match self.settings() {
            Ok(settings) => settings.room_timeout(),
            Err(err) => {
                tracing::error!(error = %err, "cannot read lobby settings");
                return Vec::new();
            }
        };

        let expired = self.rooms.take_expired(ttl);
        let mut ids = Vec::with_capacity(expired.len());
        for room in expired {
            if let Ok(mut bindings) = self.bindings.write() {
                if bindings.get(&room.creator) == Some(&Binding::Room(room.id.clone())) {
                    bindings.remove(&room.creator);
                }
            }
            tracing::info!(room_id = %room.id, creator = %room.creator, "room expired");
            self.announce_room_closed(&room.creator, &room.id, "expired");
            ids.push(room.id);
        }
        ids
    }

    /// Runs both sweeps every `period` on the current tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let forfeited = manager.cleanup_abandoned();
                let expired = manager.cleanup_expired_rooms();
                if !forfeited.is_empty() || !expired.is_empty() {
                    tracing::debug!(
                        forfeited = forfeited.len(),
                        expired_rooms = expired.len(),
                        "sweep finished"
                    );
                }
            }
        })
    }

    fn apply_to(
        &self,
        session: &GameSession,
        seat: Seat,
        mv: Move,
        expected_version: Option<u64>,
    ) -> Result<SessionSnapshot, LobbyError> {
        let result = {
            let mut game = session.lock()?;
            let result = match expected_version {
                Some(version) => game.engine.apply_checked(seat, mv, version),
                None => game.engine.apply(seat, mv),
            };
            if result.is_ok() {
                game.last_active = Instant::now();
            }
            result
        };

        match result {
            Ok(snapshot) => {
                tracing::debug!(
                    session_id = %session.id,
                    seat = ?seat,
                    action = ?mv,
                    version = snapshot.version,
                    stage = ?snapshot.stage,
                    "move applied"
                );
                self.publish(
                    session,
                    GameEvent::StateChanged {
                        session_id: session.id.clone(),
                        seat,
                        action: mv,
                        snapshot: snapshot.clone(),
                    },
                );
                if snapshot.outcome.is_some() {
                    self.finish(session, "completed")?;
                }
                Ok(snapshot)
            }
            Err(err) => {
                tracing::warn!(
                    session_id = %session.id,
                    seat = ?seat,
                    action = ?mv,
                    error = %err,
                    "move rejected"
                );
                Err(err.into())
            }
        }
    }

    /// Unbinds both players of a finished session and announces the result.
    fn finish(&self, session: &GameSession, reason: &str) -> Result<(), LobbyError> {
        let outcome = session.lock()?.engine.outcome();
        {
            let mut bindings = self
                .bindings
                .write()
                .map_err(|_| LobbyError::StoragePoisoned)?;
            for player in session.humans() {
                if matches!(bindings.get(player), Some(Binding::Session(id, _)) if *id == session.id)
                {
                    bindings.remove(player);
                }
            }
        }

        tracing::info!(
            session_id = %session.id,
            outcome = ?outcome,
            reason = %reason,
            "game ended"
        );
        self.publish(
            session,
            GameEvent::GameEnded {
                session_id: session.id.clone(),
                outcome,
                reason: reason.to_string(),
                ended_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        Ok(())
    }

    fn prune(&self, ids: &[SessionId]) {
        if ids.is_empty() {
            return;
        }
        let mut guard = match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for id in ids {
            if guard.remove(id).is_some() {
                self.event_bus.drop_channel(id);
                tracing::debug!(session_id = %id, "session pruned");
            }
        }
    }

    /// Registers a session and binds its humans in one critical section on
    /// the bindings map. A `room` being joined must still be its creator's
    /// binding at that point.
    fn open_session(
        &self,
        config: GameConfig,
        seats: [Participant; 2],
        room: Option<&Room>,
    ) -> Result<SessionId, LobbyError> {
        let id = Uuid::new_v4().to_string();
        let session = Arc::new(GameSession::new(id.clone(), config, seats));

        let displaced = {
            let mut bindings = self
                .bindings
                .write()
                .map_err(|_| LobbyError::StoragePoisoned)?;
            if let Some(room) = room {
                if bindings.get(&room.creator) != Some(&Binding::Room(room.id.clone())) {
                    return Err(LobbyError::RoomNotFound(room.id.clone()));
                }
            }

            self.sessions
                .write()
                .map_err(|_| LobbyError::StoragePoisoned)?
                .insert(id.clone(), Arc::clone(&session));

            let mut displaced = Vec::new();
            for seat in Seat::both() {
                let Some(player) = session.seats[seat.index()].player_id() else {
                    continue;
                };
                match bindings.insert(player.to_string(), Binding::Session(id.clone(), seat)) {
                    None => {}
                    Some(Binding::Room(room_id)) if room.is_some_and(|r| r.id == room_id) => {}
                    Some(Binding::Session(prev, _)) if prev == id => {}
                    Some(previous) => {
                        displaced.push((player.to_string(), self.displace(previous)?));
                    }
                }
            }
            displaced
        };

        tracing::info!(
            session_id = %id,
            variant = ?config.variant,
            seed = ?config.seed,
            seats = ?session.seats,
            "creating new game session"
        );

        for (player, previous) in displaced {
            self.settle(&player, previous)?;
        }
        if let Some(room) = room {
            tracing::info!(
                room_id = %room.id,
                creator = %room.creator,
                session_id = %id,
                "room joined"
            );
            self.announce_room_closed(&room.creator, &room.id, "joined");
        }

        let snapshot = session.snapshot()?;
        self.publish(
            &session,
            GameEvent::GameStarted {
                session_id: id.clone(),
                seats: session.seat_infos(),
                snapshot,
            },
        );

        if self.settings()?.auto_play_ai {
            self.play_ai_turns(&id)?;
        }

        Ok(id)
    }

    /// Ends what a binding pointed at. Called with the bindings lock held,
    /// so no one can act in a displaced game once its binding is gone.
    fn displace(&self, binding: Binding) -> Result<Displaced, LobbyError> {
        match binding {
            Binding::Session(session_id, seat) => {
                let session = match self.get_session(&session_id) {
                    Ok(session) => session,
                    Err(LobbyError::NotFound(_)) => return Ok(Displaced::Gone),
                    Err(err) => return Err(err),
                };
                let forfeited = match session.lock()?.engine.forfeit(seat) {
                    Ok(_) => true,
                    Err(GameError::SessionAlreadyTerminal) => false,
                    Err(err) => return Err(err.into()),
                };
                Ok(if forfeited {
                    Displaced::Forfeited(session, seat)
                } else {
                    Displaced::Gone
                })
            }
            Binding::Room(room_id) => {
                self.rooms.remove(&room_id)?;
                Ok(Displaced::Room(room_id))
            }
        }
    }

    /// Logs and announces a displacement once the bindings lock is released.
    fn settle(&self, player: &str, displaced: Displaced) -> Result<(), LobbyError> {
        match displaced {
            Displaced::Forfeited(session, seat) => {
                tracing::warn!(
                    session_id = %session.id,
                    player = %player,
                    seat = ?seat,
                    "player left a live game and forfeits"
                );
                self.finish(&session, "forfeited")
            }
            Displaced::Room(room_id) => {
                tracing::info!(room_id = %room_id, creator = %player, "room cancelled");
                self.announce_room_closed(player, &room_id, "cancelled");
                Ok(())
            }
            Displaced::Gone => Ok(()),
        }
    }

    /// Session events go to the session channel and to each human's own
    /// channel, so a player can listen before the session id is known.
    fn publish(&self, session: &GameSession, event: GameEvent) {
        for player in session.humans() {
            self.event_bus.broadcast(player, event.clone());
        }
        self.event_bus.broadcast(&session.id, event);
    }

    fn announce_room_closed(&self, creator: &str, room_id: &str, reason: &str) {
        let event = GameEvent::RoomClosed {
            room_id: room_id.to_string(),
            reason: reason.to_string(),
        };
        self.event_bus.broadcast(creator, event.clone());
        self.event_bus.broadcast(LOBBY_CHANNEL, event);
    }
}

#[cfg(test)]
impl GameSession {
    pub(crate) fn force_last_active(&self, instant: Instant) {
        if let Ok(mut game) = self.state.lock() {
            game.last_active = instant;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use durak_engine::game::Stage;
    use std::collections::HashSet;
    use std::thread;

    fn manual_manager() -> SessionManager {
        let settings = LobbySettings {
            auto_play_ai: false,
            ..Default::default()
        };
        SessionManager::with_settings(
            Arc::new(EventBus::new()),
            Arc::new(SettingsStore::with_settings(settings).expect("settings")),
        )
    }

    fn first_legal_attack(manager: &SessionManager, player: &str) -> Card {
        manager.view(player).expect("view").legal_attacks[0]
    }

    #[test]
    fn vs_ai_binds_player_to_first_seat() {
        let manager = manual_manager();
        let id = manager
            .start_vs_ai("alice", Some(Difficulty::Easy), None, Some(7))
            .expect("start");

        assert_eq!(
            manager.binding_of("alice").expect("binding"),
            Some(Binding::Session(id.clone(), Seat::First))
        );
        let session = manager.get_session(&id).expect("session");
        assert!(session.is_ai(Seat::Second));
        assert!(!session.is_ai(Seat::First));
        assert_eq!(session.seat_of("alice"), Some(Seat::First));
        assert_eq!(manager.state(&id).expect("state").hands[0].len(), 6);
    }

    #[test]
    fn outsider_cannot_move() {
        let manager = manual_manager();
        let id = manager.start_vs_ai("alice", None, None, Some(3)).expect("start");
        let card = manager.state(&id).expect("state").hands[0][0];
        assert_eq!(
            manager.apply_attack(&id, "mallory", card).unwrap_err(),
            LobbyError::NotAParticipant
        );
        assert!(matches!(
            manager.take_cards("missing", "alice"),
            Err(LobbyError::NotFound(_))
        ));
    }

    #[test]
    fn ai_reply_is_computed_and_applied() {
        let manager = manual_manager();
        let id = manager
            .start_vs_ai("alice", Some(Difficulty::Medium), None, Some(11))
            .expect("start");

        // Hand the turn to the AI whichever seat opens.
        let before = manager.state(&id).expect("state");
        if before.attacker == Seat::First {
            let card = first_legal_attack(&manager, "alice");
            manager.apply_attack(&id, "alice", card).expect("attack");
        }

        let ai_move = manager
            .compute_ai_move(&id)
            .expect("compute")
            .expect("AI is on turn");
        assert_eq!(ai_move.seat, Seat::Second);

        let applied = manager.play_ai_turns(&id).expect("play");
        assert!(applied >= 1);
        let after = manager.state(&id).expect("state");
        assert!(after.version > ai_move.version);
    }

    #[test]
    fn stale_version_is_rejected() {
        let manager = manual_manager();
        let id = manager.start_vs_ai("alice", None, None, Some(5)).expect("start");
        if manager.state(&id).expect("state").attacker == Seat::Second {
            manager.play_ai_turns(&id).expect("ai opens");
        }

        let view = manager.view("alice").expect("view");
        let mv = if view.is_attacker {
            Move::Attack(view.legal_attacks[0])
        } else {
            Move::Take
        };
        manager
            .submit(&id, "alice", mv, Some(view.version))
            .expect("first submission");
        let err = manager
            .submit(&id, "alice", mv, Some(view.version))
            .unwrap_err();
        assert!(matches!(
            err,
            LobbyError::Game(GameError::StaleSnapshot { .. })
        ));
    }

    #[test]
    fn starting_again_forfeits_previous_game() {
        let manager = manual_manager();
        let first = manager.start_vs_ai("alice", None, None, Some(1)).expect("start");
        let second = manager.start_vs_ai("alice", None, None, Some(2)).expect("restart");
        assert_ne!(first, second);

        let old = manager.state(&first).expect("old state");
        assert_eq!(old.stage, Stage::Terminal);
        assert_eq!(old.winner, Some(Seat::Second));
        assert_eq!(
            manager.binding_of("alice").expect("binding"),
            Some(Binding::Session(second, Seat::First))
        );
    }

    #[test]
    fn release_without_binding_fails() {
        let manager = manual_manager();
        assert_eq!(
            manager.release("nobody").unwrap_err(),
            LobbyError::NotBound("nobody".into())
        );
        assert!(matches!(manager.view("nobody"), Err(LobbyError::NotBound(_))));
    }

    #[test]
    fn abandoned_session_forfeits_idle_actor() {
        let manager = manual_manager();
        let id = manager.start_vs_ai("alice", None, None, Some(9)).expect("start");
        let actor = manager.state(&id).expect("state").attacker;

        let session = manager.get_session(&id).expect("session");
        session.force_last_active(Instant::now() - Duration::from_secs(3600));

        assert_eq!(manager.cleanup_abandoned(), vec![id.clone()]);
        assert!(matches!(manager.get_session(&id), Err(LobbyError::NotFound(_))));
        assert_eq!(
            session.snapshot().expect("snapshot").winner,
            Some(actor.other())
        );
        assert_eq!(manager.binding_of("alice").expect("binding"), None);
    }

    #[test]
    fn accepted_move_resets_idle_clock() {
        let manager = manual_manager();
        let room = manager.create_room("alice", None, Some(21)).expect("room");
        let id = manager.join_room("bob", &room).expect("join");
        let session = manager.get_session(&id).expect("session");
        session.force_last_active(Instant::now() - Duration::from_secs(3600));

        let attacker = if manager.view("alice").expect("view").is_attacker {
            "alice"
        } else {
            "bob"
        };
        let card = first_legal_attack(&manager, attacker);
        manager.apply_attack(&id, attacker, card).expect("attack");

        assert!(session.idle_for() < Duration::from_secs(60));
        assert!(manager.cleanup_abandoned().is_empty());
        assert!(manager.state(&id).expect("state").outcome.is_none());
    }

    #[test]
    fn rejected_move_keeps_idle_clock() {
        let manager = manual_manager();
        let id = manager.start_vs_ai("alice", None, None, Some(9)).expect("start");
        let session = manager.get_session(&id).expect("session");
        session.force_last_active(Instant::now() - Duration::from_secs(3600));

        let _ = manager.end_attack_turn(&id, "alice");
        assert!(session.idle_for() >= Duration::from_secs(3600));
    }

    #[test]
    fn finished_sessions_stay_until_swept() {
        let manager = manual_manager();
        let id = manager.start_vs_ai("alice", None, None, Some(6)).expect("start");
        manager.release("alice").expect("release");

        assert_eq!(manager.state(&id).expect("state").stage, Stage::Terminal);
        assert!(manager.cleanup_abandoned().is_empty());
        assert!(matches!(manager.state(&id), Err(LobbyError::NotFound(_))));
        assert!(manager.active_sessions().is_empty());
    }

    #[test]
    fn fresh_sessions_survive_sweep() {
        let manager = manual_manager();
        let id = manager.start_vs_ai("alice", None, None, Some(9)).expect("start");
        assert!(manager.cleanup_abandoned().is_empty());
        assert!(manager.get_session(&id).is_ok());
    }

    #[test]
    fn room_join_seats_creator_first() {
        let manager = manual_manager();
        let room = manager.create_room("alice", Some(Variant::Quick), Some(4)).expect("room");
        assert_eq!(manager.open_rooms().len(), 1);
        assert_eq!(manager.join_room("alice", &room).unwrap_err(), LobbyError::OwnRoom);

        let id = manager.join_room("bob", &room).expect("join");
        assert!(manager.open_rooms().is_empty());
        let session = manager.get_session(&id).expect("session");
        assert_eq!(session.seat_of("alice"), Some(Seat::First));
        assert_eq!(session.seat_of("bob"), Some(Seat::Second));
        assert_eq!(manager.state(&id).expect("state").variant, Variant::Quick);
    }

    #[test]
    fn concurrent_session_creation_is_safe() {
        let manager = Arc::new(manual_manager());
        let mut handles = Vec::new();
        for t in 0..4 {
            let manager = Arc::clone(&manager);
            handles.push(thread::spawn(move || {
                (0..8)
                    .map(|i| {
                        manager
                            .start_vs_ai(&format!("p{t}-{i}"), None, None, None)
                            .expect("start")
                    })
                    .collect::<Vec<_>>()
            }));
        }

        let mut unique = HashSet::new();
        for handle in handles {
            for id in handle.join().expect("join thread") {
                assert!(unique.insert(id));
            }
        }
        assert_eq!(manager.active_sessions().len(), unique.len());
    }
}
