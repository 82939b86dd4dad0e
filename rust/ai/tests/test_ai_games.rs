use durak_ai::{create_ai, AIOpponent, Decision, Difficulty};
use durak_engine::game::{GameConfig, Outcome};
use durak_engine::session::Session;

fn play(first: &dyn AIOpponent, second: &dyn AIOpponent, seed: u64) -> Session {
    let mut session = Session::new(GameConfig::seeded(seed));
    for _ in 0..2_000 {
        let Some(seat) = session.actor() else { break };
        let ai = if seat.index() == 0 { first } else { second };
        let decision = ai.get_action(&session, seat);
        let mv = decision
            .into_move()
            .unwrap_or_else(|| panic!("actor got {decision:?}"));
        session.apply(seat, mv).expect("AI chose a legal move");
    }
    session
}

#[test]
fn every_tier_finishes_its_games() {
    for difficulty in Difficulty::all() {
        let a = create_ai(difficulty, Some(1));
        let b = create_ai(difficulty, Some(2));
        for seed in 0..10 {
            let s = play(a.as_ref(), b.as_ref(), seed);
            assert!(s.is_terminal(), "{difficulty} seed {seed} stalled");
            assert!(matches!(
                s.outcome(),
                Some(Outcome::Won { .. }) | Some(Outcome::Draw)
            ));
        }
    }
}

#[test]
fn seeded_easy_games_are_reproducible() {
    let run = || {
        let a = create_ai(Difficulty::Easy, Some(10));
        let b = create_ai(Difficulty::Easy, Some(20));
        play(a.as_ref(), b.as_ref(), 5).record("20250101-000001")
    };
    assert_eq!(run(), run());
}

#[test]
fn opening_attack_is_never_end_turn() {
    for seed in 0..20 {
        let s = Session::new(GameConfig::seeded(seed));
        let ai = create_ai(Difficulty::Hard, Some(seed));
        assert!(matches!(
            ai.get_action(&s, s.attacker()),
            Decision::Attack(_)
        ));
    }
}
