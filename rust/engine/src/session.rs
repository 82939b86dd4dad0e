use crate::cards::{Card, Suit, Variant};
use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::{GameConfig, Outcome, Stage};
use crate::logger::{GameRecord, MoveRecord};
use crate::player::{Hand, Move, Seat};
use crate::rules::{self, HAND_SIZE};
use crate::snapshot::{PlayerView, SessionSnapshot};
use crate::table::Table;

/// One game of Durak between two seats.
///
/// Owns the deck, both hands, the table and the discard pile, and drives the
/// `Attack → Defend → ThrowIn` round cycle. Every accepted move bumps
/// [`version`](Session::version); rejected moves leave the session untouched.
///
/// # Examples
///
/// ```
/// use durak_engine::game::{GameConfig, Stage};
/// use durak_engine::session::Session;
///
/// let mut session = Session::new(GameConfig::seeded(7));
/// let attacker = session.attacker();
/// let card = session.hand(attacker).cards()[0];
///
/// let snapshot = session.attack(attacker, card).expect("opening attack");
/// assert_eq!(snapshot.stage, Stage::Defend);
/// assert_eq!(snapshot.table.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    seed: u64,
    deck: Deck,
    trump_card: Card,
    hands: [Hand; 2],
    table: Table,
    discard: Vec<Card>,
    attacker: Seat,
    first_attacker: Seat,
    stage: Stage,
    /// Attack cap fixed when the current round's first card landed
    round_cap: usize,
    round: u32,
    outcome: Option<Outcome>,
    version: u64,
    history: Vec<MoveRecord>,
}

impl Session {
    /// Shuffles, fixes trump, deals six to each seat and picks the opener.
    pub fn new(config: GameConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut deck = Deck::new_with_seed(config.variant, seed);
        deck.shuffle();
        // a shuffled deck of either variant is never empty
        let trump_card = deck.draw_trump().unwrap_or(Card::new(
            config.variant.ranks()[0],
            Suit::Hearts,
        ));

        let mut hands = [Hand::new(), Hand::new()];
        for hand in hands.iter_mut() {
            for _ in 0..HAND_SIZE {
                if let Some(c) = deck.deal_card() {
                    hand.add(c);
                }
            }
        }

        let attacker = rules::first_attacker(&hands[0], &hands[1], trump_card.suit);
        let mut session = Self {
            seed,
            deck,
            trump_card,
            hands,
            table: Table::new(),
            discard: Vec::new(),
            attacker,
            first_attacker: attacker,
            stage: Stage::Attack,
            round_cap: 0,
            round: 1,
            outcome: None,
            version: 0,
            history: Vec::new(),
        };
        session.check_terminal();
        session
    }

    /// Builds a session from explicit parts. Meant for fixtures and replays
    /// where the exact hands matter; the caller owns card uniqueness.
    pub fn from_parts(
        trump_card: Card,
        deck: Vec<Card>,
        first: Vec<Card>,
        second: Vec<Card>,
        attacker: Seat,
    ) -> Self {
        let variant = if first
            .iter()
            .chain(&second)
            .chain(&deck)
            .any(|c| !Variant::Quick.ranks().contains(&c.rank))
        {
            Variant::Standard
        } else {
            Variant::Quick
        };
        let mut session = Self {
            seed: 0,
            deck: Deck::stacked(variant, deck, trump_card),
            trump_card,
            hands: [Hand::from_cards(first), Hand::from_cards(second)],
            table: Table::new(),
            discard: Vec::new(),
            attacker,
            first_attacker: attacker,
            stage: Stage::Attack,
            round_cap: 0,
            round: 1,
            outcome: None,
            version: 0,
            history: Vec::new(),
        };
        session.check_terminal();
        session
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
    pub fn variant(&self) -> Variant {
        self.deck.variant()
    }
    pub fn trump(&self) -> Suit {
        self.trump_card.suit
    }
    pub fn trump_card(&self) -> Card {
        self.trump_card
    }
    pub fn stage(&self) -> Stage {
        self.stage
    }
    pub fn attacker(&self) -> Seat {
        self.attacker
    }
    pub fn defender(&self) -> Seat {
        self.attacker.other()
    }
    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }
    pub fn table(&self) -> &Table {
        &self.table
    }
    pub fn discard(&self) -> &[Card] {
        &self.discard
    }
    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }
    pub fn deck_cards(&self) -> &[Card] {
        self.deck.cards()
    }
    pub fn round(&self) -> u32 {
        self.round
    }
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }
    pub fn version(&self) -> u64 {
        self.version
    }
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }
    pub fn is_terminal(&self) -> bool {
        self.stage == Stage::Terminal
    }

    /// Seat expected to move next, `None` once the game is over. While the
    /// defender is on the move the attacker may still throw in.
    pub fn actor(&self) -> Option<Seat> {
        match self.stage {
            Stage::Attack | Stage::ThrowIn => Some(self.attacker),
            Stage::Defend => Some(self.defender()),
            Stage::Terminal => None,
        }
    }

    /// Attack cards the current round may hold in total.
    pub fn attack_limit(&self) -> usize {
        if self.table.is_empty() {
            rules::round_capacity(self.hand(self.defender()).len())
        } else {
            self.round_cap
        }
    }

    pub fn table_at_capacity(&self) -> bool {
        self.table.len() >= self.attack_limit()
    }

    /// Cards `seat` could legally put on the table right now.
    pub fn legal_attacks(&self, seat: Seat) -> Vec<Card> {
        let can_attack =
            !self.is_terminal() && seat == self.attacker && !self.table_at_capacity();
        if !can_attack {
            return Vec::new();
        }
        rules::legal_attacks(self.hand(seat).cards(), &self.table)
    }

    /// Cards `seat` could use against `slot` right now.
    pub fn legal_defenses(&self, seat: Seat, slot: usize) -> Vec<Card> {
        if self.stage != Stage::Defend || seat != self.defender() {
            return Vec::new();
        }
        match self.table.get(slot) {
            Some(s) if !s.is_resolved() => {
                rules::legal_defenses(self.hand(seat).cards(), s.attack, self.trump())
            }
            _ => Vec::new(),
        }
    }

    pub fn apply(&mut self, seat: Seat, mv: Move) -> Result<SessionSnapshot, GameError> {
        match mv {
            Move::Attack(card) => self.attack(seat, card),
            Move::Defend { slot, card } => self.defend(seat, slot, card),
            Move::Take => self.take_cards(seat),
            Move::EndTurn => self.end_attack_turn(seat),
        }
    }

    /// Like [`apply`](Session::apply), but refuses to act on a session that
    /// moved past `expected_version`. A second submission of the same move
    /// built from the same snapshot is rejected this way.
    pub fn apply_checked(
        &mut self,
        seat: Seat,
        mv: Move,
        expected_version: u64,
    ) -> Result<SessionSnapshot, GameError> {
        self.ensure_live()?;
        if expected_version != self.version {
            return Err(GameError::StaleSnapshot {
                expected: expected_version,
                actual: self.version,
            });
        }
        self.apply(seat, mv)
    }

    /// Put `card` on the table: the opening attack or a throw-in. Throw-ins
    /// are accepted while the defender is still working on earlier slots.
    pub fn attack(&mut self, seat: Seat, card: Card) -> Result<SessionSnapshot, GameError> {
        self.ensure_live()?;
        if seat != self.attacker {
            return Err(GameError::NotYourTurn {
                expected: self.attacker,
                actual: seat,
            });
        }
        if !self.hand(seat).contains(card) {
            return Err(GameError::CardNotInHand(card));
        }
        if self.table_at_capacity() {
            return Err(GameError::TableAtCapacity);
        }
        if !rules::legal_attacks(self.hand(seat).cards(), &self.table).contains(&card) {
            return Err(GameError::IllegalCard(card));
        }

        if self.table.is_empty() {
            self.round_cap = self.attack_limit();
        }
        self.hands[seat.index()].remove(card);
        self.table.push_attack(card);
        self.stage = Stage::Defend;
        self.commit(seat, Move::Attack(card));
        Ok(self.snapshot())
    }

    /// Beat the attack card in `slot` with `card`.
    pub fn defend(
        &mut self,
        seat: Seat,
        slot: usize,
        card: Card,
    ) -> Result<SessionSnapshot, GameError> {
        self.ensure_live()?;
        if self.stage != Stage::Defend || seat != self.defender() {
            return Err(self.not_your_turn(seat));
        }
        let target = self.table.get(slot).ok_or(GameError::SlotNotFound(slot))?;
        if target.is_resolved() {
            return Err(GameError::SlotAlreadyDefended(slot));
        }
        if !self.hand(seat).contains(card) {
            return Err(GameError::CardNotInHand(card));
        }
        if !rules::can_beat(target.attack, card, self.trump()) {
            return Err(GameError::IllegalCard(card));
        }

        self.hands[seat.index()].remove(card);
        self.table.cover(slot, card);
        if self.table.all_resolved() {
            self.stage = Stage::ThrowIn;
        }
        self.commit(seat, Move::Defend { slot, card });
        if self.stage == Stage::ThrowIn && self.table.len() >= self.round_cap {
            // nothing more can be thrown in
            self.close_round(true);
        }
        Ok(self.snapshot())
    }

    /// Defender picks up every card on the table; the attacker keeps the
    /// attacking role for the next round.
    pub fn take_cards(&mut self, seat: Seat) -> Result<SessionSnapshot, GameError> {
        self.ensure_live()?;
        if self.stage != Stage::Defend || seat != self.defender() {
            return Err(self.not_your_turn(seat));
        }
        self.commit(seat, Move::Take);
        self.close_round(false);
        Ok(self.snapshot())
    }

    /// Attacker stops throwing in; the repelled cards are discarded and the
    /// defender attacks next.
    pub fn end_attack_turn(&mut self, seat: Seat) -> Result<SessionSnapshot, GameError> {
        self.ensure_live()?;
        if seat != self.attacker || self.stage == Stage::Defend {
            return Err(self.not_your_turn(seat));
        }
        if self.stage == Stage::Attack {
            return Err(GameError::EmptyTable);
        }
        self.commit(seat, Move::EndTurn);
        self.close_round(true);
        Ok(self.snapshot())
    }

    /// Ends a live game in favour of `seat`'s opponent.
    pub fn forfeit(&mut self, seat: Seat) -> Result<SessionSnapshot, GameError> {
        self.ensure_live()?;
        self.outcome = Some(Outcome::Forfeited {
            winner: seat.other(),
        });
        self.stage = Stage::Terminal;
        self.version += 1;
        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: self.version,
            variant: self.variant(),
            trump: self.trump(),
            trump_card: self.trump_card,
            deck_count: self.deck.remaining(),
            discard_count: self.discard.len(),
            table: self.table.slots().to_vec(),
            hands: [
                self.hands[0].cards().to_vec(),
                self.hands[1].cards().to_vec(),
            ],
            stage: self.stage,
            attacker: self.attacker,
            defender: self.defender(),
            attack_limit: self.attack_limit(),
            round: self.round,
            winner: self.outcome.and_then(|o| o.winner()),
            outcome: self.outcome,
        }
    }

    /// What `seat` is allowed to see and do.
    pub fn view(&self, seat: Seat) -> PlayerView {
        let pending = self.table.first_unresolved();
        PlayerView {
            seat,
            version: self.version,
            stage: self.stage,
            trump_card: self.trump_card,
            deck_count: self.deck.remaining(),
            table: self.table.slots().to_vec(),
            hand: self.hand(seat).cards().to_vec(),
            opponent_cards: self.hand(seat.other()).len(),
            is_attacker: seat == self.attacker,
            to_act: self.actor() == Some(seat),
            legal_attacks: self.legal_attacks(seat),
            pending_slot: pending.map(|(i, _)| i),
            legal_defenses: pending
                .map(|(i, _)| self.legal_defenses(seat, i))
                .unwrap_or_default(),
            winner: self.outcome.and_then(|o| o.winner()),
        }
    }

    /// Record of the game so far, ready for [`crate::logger::GameLogger`].
    pub fn record(&self, game_id: impl Into<String>) -> GameRecord {
        GameRecord {
            game_id: game_id.into(),
            seed: self.seed,
            variant: self.variant(),
            trump: self.trump_card,
            first_attacker: self.first_attacker,
            moves: self.history.clone(),
            outcome: self.outcome,
            ts: None,
            meta: None,
        }
    }

    fn ensure_live(&self) -> Result<(), GameError> {
        if self.is_terminal() {
            Err(GameError::SessionAlreadyTerminal)
        } else {
            Ok(())
        }
    }

    fn not_your_turn(&self, seat: Seat) -> GameError {
        GameError::NotYourTurn {
            expected: self.actor().unwrap_or(seat.other()),
            actual: seat,
        }
    }

    fn commit(&mut self, seat: Seat, action: Move) {
        self.history.push(MoveRecord {
            seat,
            round: self.round,
            action,
        });
        self.version += 1;
        self.check_terminal();
    }

    /// Clears the table, refills both hands and hands out the next attack.
    fn close_round(&mut self, repelled: bool) {
        if self.is_terminal() {
            return;
        }
        let cards = self.table.drain();
        let defender = self.defender();
        if repelled {
            self.discard.extend(cards);
        } else {
            for c in cards {
                self.hands[defender.index()].add(c);
            }
        }
        self.refill(self.attacker);
        self.refill(defender);
        if repelled {
            self.attacker = defender;
        }
        self.round_cap = 0;
        self.round += 1;
        self.stage = Stage::Attack;
        self.check_terminal();
    }

    fn refill(&mut self, seat: Seat) {
        let hand = &mut self.hands[seat.index()];
        while hand.len() < HAND_SIZE {
            match self.deck.deal_card() {
                Some(c) => hand.add(c),
                None => break,
            }
        }
    }

    /// Deck empty and some hand empty ends the game; both empty is a draw.
    fn check_terminal(&mut self) {
        if self.outcome.is_some() || !self.deck.is_empty() {
            return;
        }
        let first_out = self.hands[0].is_empty();
        let second_out = self.hands[1].is_empty();
        self.outcome = match (first_out, second_out) {
            (true, true) => Some(Outcome::Draw),
            (true, false) => Some(Outcome::Won {
                winner: Seat::First,
            }),
            (false, true) => Some(Outcome::Won {
                winner: Seat::Second,
            }),
            (false, false) => None,
        };
        if self.outcome.is_some() {
            self.stage = Stage::Terminal;
        }
    }
}
