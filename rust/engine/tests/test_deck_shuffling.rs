use std::collections::HashSet;

use durak_engine::cards::{full_deck, Card, Variant};
use durak_engine::deck::{new_deck, Deck};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[test]
fn standard_deck_has_36_unique_cards() {
    let mut deck = Deck::new_with_seed(Variant::Standard, 42);
    deck.shuffle();
    let mut set = HashSet::new();
    for i in 0..36 {
        let c = deck.deal_card().expect("should have 36 cards");
        assert!(set.insert(c), "card {:?} duplicated at position {}", c, i);
    }
    assert!(deck.deal_card().is_none(), "after 36 cards, deck should be empty");
}

#[test]
fn quick_deck_starts_at_nine() {
    let cards = full_deck(Variant::Quick);
    assert_eq!(cards.len(), 24);
    assert!(cards.iter().all(|c| c.rank as u8 >= 9));
}

#[test]
fn shuffle_is_deterministic_with_same_seed() {
    let mut d1 = Deck::new_with_seed(Variant::Standard, 12345);
    let mut d2 = Deck::new_with_seed(Variant::Standard, 12345);
    d1.shuffle();
    d2.shuffle();
    let a: Vec<Card> = (0..10).map(|_| d1.deal_card().unwrap()).collect();
    let b: Vec<Card> = (0..10).map(|_| d2.deal_card().unwrap()).collect();
    assert_eq!(a, b, "same seed must yield identical order");
}

#[test]
fn shuffle_differs_with_different_seed() {
    let mut d1 = Deck::new_with_seed(Variant::Standard, 1);
    let mut d2 = Deck::new_with_seed(Variant::Standard, 2);
    d1.shuffle();
    d2.shuffle();
    assert_ne!(
        d1.cards(),
        d2.cards(),
        "different seeds should produce different orders (high probability)"
    );
}

#[test]
fn new_deck_is_a_permutation_of_the_full_set() {
    let mut rng = ChaCha20Rng::seed_from_u64(5);
    let mut shuffled = new_deck(Variant::Standard, &mut rng);
    let mut sorted = full_deck(Variant::Standard);
    shuffled.sort_by_key(|c| (c.suit as u8, c.rank));
    sorted.sort_by_key(|c| (c.suit as u8, c.rank));
    assert_eq!(shuffled, sorted);
}

#[test]
fn trump_card_stays_visible_at_the_bottom() {
    let mut deck = Deck::new_with_seed(Variant::Standard, 77);
    deck.shuffle();
    let trump = deck.draw_trump().expect("trump");
    assert_eq!(deck.trump_card(), Some(trump));
    assert_eq!(deck.cards().first(), Some(&trump));
    assert_eq!(deck.remaining(), 36);
}
