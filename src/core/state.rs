//! The match document.
//!
//! ## MatchState
//!
//! One value per match, shared by both participants through the store:
//! - Seats, turn owner, round and scores
//! - Track positions
//! - Deck, hands and discard pile
//! - Phase (carrying the attack in flight)
//! - Match log
//!
//! The action log uses `im::Vector`, so the per-transition clone made by
//! the rules stays cheap as the log grows.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::{LastCardPlayed, LogEntry};
use super::card::{shuffled_deck, Card, Hand};
use super::config::RulesConfig;
use super::ids::ParticipantId;
use super::rng::GameRng;
use super::slot::{Slot, SlotMap};

/// An attack that has been declared and not yet resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRecord {
    pub attacker: Slot,
    pub cards: Hand,
    pub total_value: u32,
    pub card_count: usize,
    /// Declared after an advance (legacy ruleset); the defender may retreat.
    pub is_advance: bool,
}

impl AttackRecord {
    /// A fresh single-card attack.
    #[must_use]
    pub fn new(attacker: Slot, card: Card, is_advance: bool) -> Self {
        let mut cards = Hand::new();
        cards.push(card);
        Self {
            attacker,
            cards,
            total_value: u32::from(card.value()),
            card_count: 1,
            is_advance,
        }
    }

    /// The value every strengthening card must match.
    #[must_use]
    pub fn lead_card(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    /// The slot being attacked.
    #[must_use]
    pub fn defender(&self) -> Slot {
        self.attacker.opponent()
    }

    /// Append a strengthening card.
    pub fn strengthen(&mut self, card: Card) {
        self.cards.push(card);
        self.card_count += 1;
        self.total_value += u32::from(card.value());
    }
}

/// Where the match is in its flow.
///
/// Attack-bearing phases own their `AttackRecord`, so an attack exists
/// exactly while one of them is active.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the second participant.
    #[default]
    Waiting,
    /// Free play: move or attack.
    Playing,
    /// Attacker may strengthen or finish.
    Attacking(AttackRecord),
    /// Defender must parry or concede.
    Parrying(AttackRecord),
    /// Defender parried and may counter-hit.
    Riposte(AttackRecord),
    /// Advancing slot must declare its attack (legacy ruleset). No attack
    /// record exists until the strike card is declared.
    AdvanceAttack { attacker: Slot },
    /// A participant reached the winning score.
    GameOver,
}

impl Phase {
    /// The attack in flight, if any.
    #[must_use]
    pub fn attack(&self) -> Option<&AttackRecord> {
        match self {
            Phase::Attacking(attack) | Phase::Parrying(attack) | Phase::Riposte(attack) => {
                Some(attack)
            }
            _ => None,
        }
    }

    /// Short name for diagnostics and rejection messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Playing => "playing",
            Phase::Attacking(_) => "attacking",
            Phase::Parrying(_) => "parrying",
            Phase::Riposte(_) => "riposte",
            Phase::AdvanceAttack { .. } => "advance attack",
            Phase::GameOver => "game over",
        }
    }
}

/// Single document describing one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    /// Rules fixed at creation.
    pub rules: RulesConfig,

    /// Seated participants.
    pub players: SlotMap<Option<ParticipantId>>,

    /// True once both seats are filled.
    pub started: bool,

    /// Slot allowed to act.
    pub turn: Slot,

    /// Round number (starts at 1).
    pub round: u32,

    /// Hits won.
    pub scores: SlotMap<u32>,

    /// Track coordinates in `[0, rules.track_max]`.
    pub positions: SlotMap<i32>,

    /// Draw pile; the top is the end of the vec.
    pub deck: Vec<Card>,

    /// Cards held.
    pub hands: SlotMap<Hand>,

    /// Cards spent this round.
    pub discard: Vec<Card>,

    /// Current phase.
    pub phase: Phase,

    /// Most recent card played, for display.
    pub last_card_played: Option<LastCardPlayed>,

    /// Append-only match log.
    pub action_log: Vector<LogEntry>,

    /// Set when a hit ends a round; cleared by acknowledgement.
    pub round_ended: bool,
}

impl MatchState {
    /// Initial document for a match hosted by `host` in slot `A`.
    #[must_use]
    pub fn new(host: ParticipantId, rules: RulesConfig, rng: &mut GameRng) -> Self {
        let deck = shuffled_deck(&rules, rng);
        Self::with_deck(host, rules, deck)
    }

    /// Initial document with an explicit deck (top = end).
    #[must_use]
    pub fn with_deck(host: ParticipantId, rules: RulesConfig, deck: Vec<Card>) -> Self {
        let positions = SlotMap::new(|slot| slot.home(rules.track_max));
        Self {
            rules,
            players: SlotMap::from_pair(Some(host), None),
            started: false,
            turn: Slot::A,
            round: 1,
            scores: SlotMap::with_value(0),
            positions,
            deck,
            hands: SlotMap::default(),
            discard: Vec::new(),
            phase: Phase::Waiting,
            last_card_played: None,
            action_log: Vector::new(),
            round_ended: false,
        }
    }

    /// Slot occupied by `participant`, if seated.
    #[must_use]
    pub fn slot_of(&self, participant: ParticipantId) -> Option<Slot> {
        self.players
            .iter()
            .find(|(_, seated)| **seated == Some(participant))
            .map(|(slot, _)| slot)
    }

    /// Whether `slot` owns the turn.
    #[must_use]
    pub fn is_turn_of(&self, slot: Slot) -> bool {
        self.turn == slot
    }

    /// Distance between the two fighters.
    #[must_use]
    pub fn distance(&self) -> i32 {
        (self.positions[Slot::B] - self.positions[Slot::A]).abs()
    }

    /// Whether nothing has been drawn from a full deck this round.
    #[must_use]
    pub fn is_undealt(&self) -> bool {
        self.hands[Slot::A].is_empty() && self.deck.len() == self.rules.deck_size()
    }

    /// Whether the round needs a fresh deal.
    ///
    /// A hand emptied mid-round by an exhausted deck does not count.
    #[must_use]
    pub fn needs_deal(&self) -> bool {
        self.started && self.is_undealt() && !self.round_ended && self.phase != Phase::GameOver
    }

    /// Every card the match accounts for: hands, deck, discard and the attack in flight.
    #[must_use]
    pub fn card_count(&self) -> usize {
        let in_flight = self.phase.attack().map_or(0, |a| a.cards.len());
        self.hands.values().map(|h| h.len()).sum::<usize>()
            + self.deck.len()
            + self.discard.len()
            + in_flight
    }

    /// Winner, once the match is over.
    #[must_use]
    pub fn winner(&self) -> Option<Slot> {
        if self.phase != Phase::GameOver {
            return None;
        }
        Slot::ALL
            .into_iter()
            .find(|&slot| self.scores[slot] >= self.rules.winning_score)
    }

    /// The most recent log line, used as a result summary.
    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.action_log.last().map(|entry| entry.message.as_str())
    }

    /// Append a log line.
    pub fn log(&mut self, actor: Option<Slot>, message: impl Into<String>) {
        self.action_log.push_back(LogEntry::new(actor, message));
    }

    /// Encode for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode from storage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
