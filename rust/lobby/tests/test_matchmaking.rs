use durak_ai::Difficulty;
use durak_engine::cards::Variant;
use durak_engine::game::{Outcome, Stage};
use durak_engine::player::{Move, Seat};
use durak_lobby::{Binding, GameEvent, LOBBY_CHANNEL, Lobby, LobbyError, LobbySettings, SessionManager};

fn manual_lobby() -> Lobby {
    Lobby::with_settings(LobbySettings {
        auto_play_ai: false,
        ..Default::default()
    })
    .expect("lobby")
}

/// Plays whichever human is on turn with a simple policy until the game ends.
fn play_out(sessions: &SessionManager, session_id: &str, players: [&str; 2]) -> u64 {
    for _ in 0..2000 {
        let snapshot = sessions.state(session_id).expect("state");
        if snapshot.stage == Stage::Terminal {
            return snapshot.version;
        }
        let (player, view) = players
            .iter()
            .map(|p| (*p, sessions.view_for(session_id, p).expect("view")))
            .find(|(_, view)| view.to_act)
            .expect("someone is on turn");

        let mv = match (view.stage, view.pending_slot) {
            (Stage::Defend, Some(slot)) => match view.legal_defenses.first() {
                Some(card) => Move::Defend { slot, card: *card },
                None => Move::Take,
            },
            _ => match view.legal_attacks.first() {
                Some(card) if view.stage == Stage::Attack || view.table.len() < 3 => {
                    Move::Attack(*card)
                }
                _ => Move::EndTurn,
            },
        };
        sessions
            .submit(session_id, player, mv, Some(view.version))
            .expect("legal move");
    }
    panic!("game did not finish");
}

#[test]
fn room_flow_creates_shared_session() {
    let lobby = manual_lobby();
    let sessions = lobby.sessions();
    let mut lobby_feed = lobby.event_bus().subscribe(LOBBY_CHANNEL);
    let mut alice_feed = lobby.event_bus().subscribe("alice");

    let room = sessions
        .create_room("alice", Some(Variant::Standard), Some(77))
        .expect("room");
    assert_eq!(
        sessions.binding_of("alice").expect("binding"),
        Some(Binding::Room(room.clone()))
    );

    let id = sessions.join_room("bob", &room).expect("join");
    assert_eq!(
        sessions.binding_of("alice").expect("binding"),
        Some(Binding::Session(id.clone(), Seat::First))
    );
    assert_eq!(
        sessions.binding_of("bob").expect("binding"),
        Some(Binding::Session(id.clone(), Seat::Second))
    );

    let lobby_events = lobby_feed.drain();
    assert!(matches!(lobby_events[0], GameEvent::RoomOpened { .. }));
    assert!(matches!(
        &lobby_events[1],
        GameEvent::RoomClosed { reason, .. } if reason == "joined"
    ));

    let alice_events = alice_feed.drain();
    assert!(alice_events.iter().any(|e| matches!(
        e,
        GameEvent::GameStarted { session_id, seats, .. } if *session_id == id && seats.len() == 2
    )));

    let alice = sessions.view("alice").expect("alice view");
    let bob = sessions.view("bob").expect("bob view");
    assert_eq!(alice.opponent_cards, bob.hand.len());
    assert_ne!(alice.is_attacker, bob.is_attacker);
}

#[test]
fn joining_unknown_room_fails() {
    let lobby = manual_lobby();
    assert!(matches!(
        lobby.sessions().join_room("bob", "no-such-room"),
        Err(LobbyError::RoomNotFound(_))
    ));
}

#[test]
fn creating_a_second_room_cancels_the_first() {
    let lobby = manual_lobby();
    let sessions = lobby.sessions();
    let first = sessions.create_room("alice", None, None).expect("room");
    let second = sessions.create_room("alice", None, None).expect("room");

    let open: Vec<_> = sessions.open_rooms().into_iter().map(|r| r.id).collect();
    assert_eq!(open, vec![second.clone()]);
    assert!(matches!(
        sessions.join_room("bob", &first),
        Err(LobbyError::RoomNotFound(_))
    ));

    assert_eq!(sessions.cancel_room("alice").expect("cancel"), second);
    assert!(sessions.open_rooms().is_empty());
    assert!(matches!(
        sessions.cancel_room("alice"),
        Err(LobbyError::NotBound(_))
    ));
}

#[test]
fn leaving_a_multiplayer_game_hands_the_win_to_the_other_side() {
    let lobby = manual_lobby();
    let sessions = lobby.sessions();
    let room = sessions.create_room("alice", None, Some(5)).expect("room");
    let id = sessions.join_room("bob", &room).expect("join");
    let mut feed = lobby.event_bus().subscribe(id.clone());

    sessions.release("bob").expect("release");

    let state = sessions.state(&id).expect("state");
    assert_eq!(state.outcome, Some(Outcome::Forfeited { winner: Seat::First }));
    assert_eq!(sessions.binding_of("alice").expect("binding"), None);
    assert!(matches!(
        feed.drain().last(),
        Some(GameEvent::GameEnded { reason, .. }) if reason == "forfeited"
    ));

    let card = state.hands[0][0];
    assert_eq!(
        sessions.apply_attack(&id, "alice", card).unwrap_err(),
        LobbyError::Game(durak_engine::errors::GameError::SessionAlreadyTerminal)
    );
}

#[test]
fn two_humans_play_to_the_end() {
    let lobby = manual_lobby();
    let sessions = lobby.sessions();
    let room = sessions.create_room("alice", Some(Variant::Quick), Some(2024)).expect("room");
    let id = sessions.join_room("bob", &room).expect("join");
    let mut feed = lobby.event_bus().subscribe(id.clone());

    let final_version = play_out(&sessions, &id, ["alice", "bob"]);

    let state = sessions.state(&id).expect("state");
    assert!(state.outcome.is_some());
    assert!(final_version > 0);
    assert_eq!(sessions.binding_of("alice").expect("binding"), None);
    assert_eq!(sessions.binding_of("bob").expect("binding"), None);

    let events = feed.drain();
    assert!(matches!(events.last(), Some(GameEvent::GameEnded { reason, .. }) if reason == "completed"));
    let moves = events
        .iter()
        .filter(|e| matches!(e, GameEvent::StateChanged { .. }))
        .count() as u64;
    assert_eq!(moves, final_version);
}

#[test]
fn autoplay_answers_every_human_move() {
    let lobby = Lobby::new();
    let sessions = lobby.sessions();
    let id = sessions
        .start_vs_ai("alice", Some(Difficulty::Hard), Some(Variant::Quick), Some(8))
        .expect("start");

    for _ in 0..500 {
        let view = match sessions.view("alice") {
            Ok(view) => view,
            Err(LobbyError::NotBound(_)) => break,
            Err(err) => panic!("unexpected error: {err}"),
        };
        assert!(view.to_act, "AI should have replied");
        let mv = match (view.pending_slot, view.legal_defenses.first()) {
            (Some(slot), Some(card)) if view.stage == Stage::Defend => {
                Move::Defend { slot, card: *card }
            }
            _ if view.stage == Stage::Defend => Move::Take,
            _ => match view.legal_attacks.first() {
                Some(card) if view.stage == Stage::Attack => Move::Attack(*card),
                _ => Move::EndTurn,
            },
        };
        sessions.submit(&id, "alice", mv, None).expect("legal move");
    }

    assert!(sessions.state(&id).expect("state").outcome.is_some());
}
