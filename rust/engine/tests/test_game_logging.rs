use std::fs;

use durak_engine::game::GameConfig;
use durak_engine::logger::{GameLogger, GameRecord};
use durak_engine::player::Seat;
use durak_engine::session::Session;

fn played_record(id: &str) -> GameRecord {
    let mut s = Session::new(GameConfig::seeded(17));
    let attacker = s.attacker();
    let card = s.hand(attacker).cards()[0];
    s.attack(attacker, card).expect("attack");
    s.take_cards(attacker.other()).expect("take");
    s.record(id)
}

#[test]
fn writes_jsonl_with_lf_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("games").join("run.jsonl");
    let mut logger = GameLogger::create(&path).expect("create logger");
    logger.write(&played_record("20250102-000001")).expect("write");
    logger.write(&played_record("20250102-000002")).expect("write");

    let bytes = fs::read(&path).expect("read file");
    assert!(bytes.ends_with(b"\n"));
    assert!(!bytes.contains(&b'\r'));
    let text = String::from_utf8(bytes).expect("utf8");
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn sequential_ids_increment() {
    let mut logger = GameLogger::detached("20251231");
    assert_eq!(logger.next_id(), "20251231-000001");
    assert_eq!(logger.next_id(), "20251231-000002");
}

#[test]
fn ts_is_generated_when_missing_and_preserved_when_present() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ts.jsonl");
    let mut logger = GameLogger::create(&path).expect("create logger");

    logger.write(&played_record("20250102-000010")).expect("write");
    let mut with_ts = played_record("20250102-000011");
    with_ts.ts = Some("2025-01-02T03:04:05Z".to_string());
    logger.write(&with_ts).expect("write");

    let text = fs::read_to_string(&path).expect("read");
    let mut lines = text.lines();
    let first: GameRecord = serde_json::from_str(lines.next().expect("line")).expect("json");
    let second: GameRecord = serde_json::from_str(lines.next().expect("line")).expect("json");
    assert!(first.ts.is_some());
    assert_eq!(second.ts.as_deref(), Some("2025-01-02T03:04:05Z"));
}

#[test]
fn record_round_trips_moves_and_seats() {
    let record = played_record("20250102-000020");
    let json = serde_json::to_string(&record).expect("serialize");
    let parsed: GameRecord = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, record);
    assert_eq!(parsed.moves.len(), 2);
    assert_eq!(parsed.moves[1].seat, parsed.first_attacker.other());
    assert!(json.contains("\"type\":\"take\""));
    assert!(matches!(parsed.first_attacker, Seat::First | Seat::Second));
}
