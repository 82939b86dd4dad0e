use durak_engine::player::{Move, Seat};
use durak_lobby::{Lobby, LobbySettings, TestLogSubscriber};
use tracing::Level;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;

fn capture<T>(f: impl FnOnce() -> T) -> (T, TestLogSubscriber) {
    let logs = TestLogSubscriber::new();
    let registry = Registry::default().with(logs.layer());
    let value = tracing::subscriber::with_default(registry, f);
    (value, logs)
}

#[test]
fn session_lifecycle_is_logged() {
    let lobby = Lobby::with_settings(LobbySettings {
        auto_play_ai: false,
        ..Default::default()
    })
    .expect("lobby");
    let sessions = lobby.sessions();

    let (id, logs) = capture(|| {
        let id = sessions.start_vs_ai("alice", None, None, Some(3)).expect("start");
        sessions.release("alice").expect("release");
        id
    });

    let created = logs.matching("creating new game session");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].level, Level::INFO);
    assert!(created[0].field("session_id").is_some_and(|v| v.contains(&id)));

    let forfeits = logs.matching("forfeits");
    assert_eq!(forfeits.len(), 1);
    assert_eq!(forfeits[0].level, Level::WARN);

    let ended = logs.matching("game ended");
    assert_eq!(ended.len(), 1);
    assert!(ended[0].field("reason").is_some_and(|v| v.contains("forfeited")));
}

#[test]
fn applied_and_rejected_moves_are_logged() {
    let lobby = Lobby::with_settings(LobbySettings {
        auto_play_ai: false,
        ..Default::default()
    })
    .expect("lobby");
    let sessions = lobby.sessions();
    let room = sessions.create_room("alice", None, Some(19)).expect("room");
    let id = sessions.join_room("bob", &room).expect("join");

    let state = sessions.state(&id).expect("state");
    let (attacker, defender) = match state.attacker {
        Seat::First => ("alice", "bob"),
        Seat::Second => ("bob", "alice"),
    };
    let card = state.hand(state.attacker)[0];

    let (_, logs) = capture(|| {
        sessions
            .submit(&id, defender, Move::EndTurn, None)
            .expect_err("defender cannot end the turn");
        sessions.apply_attack(&id, attacker, card).expect("attack");
    });

    let rejected = logs.matching("move rejected");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].level, Level::WARN);
    assert!(rejected[0].field("error").is_some());

    let applied = logs.matching("move applied");
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].level, Level::DEBUG);
    assert!(applied[0].field("version").is_some_and(|v| v == "1"));
}
