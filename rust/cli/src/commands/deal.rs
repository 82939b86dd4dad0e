//! `durak deal`: shows the opening position of one seeded game.

use crate::error::CliError;
use crate::ui::format_cards;
use durak_engine::cards::Variant;
use durak_engine::game::GameConfig;
use durak_engine::player::Seat;
use durak_engine::session::Session;
use std::io::Write;

/// Deals one game and prints trump, both hands and who attacks first.
/// The same seed and variant always print the same deal.
pub fn handle_deal_command(
    seed: Option<u64>,
    variant: Variant,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(rand::random);
    let session = Session::new(GameConfig::new(variant, Some(seed)));

    writeln!(out, "Seed: {}", seed)?;
    writeln!(out, "Variant: {} ({} cards)", variant, variant.deck_size())?;
    writeln!(out, "Trump: {}", session.trump_card())?;
    for seat in Seat::both() {
        let label = match seat {
            Seat::First => "First seat",
            Seat::Second => "Second seat",
        };
        writeln!(out, "{}: {}", label, format_cards(session.hand(seat).cards()))?;
    }
    writeln!(out, "Attacker: {}", session.attacker())?;
    writeln!(out, "Deck: {} cards left", session.deck_remaining())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(seed: u64, variant: Variant) -> String {
        let mut out = Vec::new();
        handle_deal_command(Some(seed), variant, &mut out).expect("deal");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn same_seed_same_deal() {
        assert_eq!(deal(12345, Variant::Standard), deal(12345, Variant::Standard));
        assert_ne!(deal(1, Variant::Standard), deal(2, Variant::Standard));
    }

    #[test]
    fn output_lists_the_opening_position() {
        let output = deal(999, Variant::Quick);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Seed: 999");
        assert_eq!(lines[1], "Variant: quick (24 cards)");
        assert!(lines[2].starts_with("Trump: "));
        assert!(lines[3].starts_with("First seat: "));
        assert_eq!(lines[3].split(' ').count(), 2 + 6);
        assert_eq!(lines[6], "Deck: 12 cards left");
    }
}
