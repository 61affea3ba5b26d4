//! Action representation and the match log.
//!
//! Actions are a closed enum: one variant per move a seated participant
//! can make. `CardPlay` selects what a card played from hand does.
//! Dealing and scoring are not actions; the rules perform them as
//! consequences of other transitions.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::card::{Card, Hand};
use super::slot::Slot;

/// What a card played from hand is used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardPlay {
    /// Step toward the opponent.
    Move,
    /// Step away from the opponent.
    MoveBackward,
    /// Strike at exactly the card's distance.
    Attack,
    /// Step toward the opponent, then declare an attack (legacy ruleset).
    Advance,
}

impl std::fmt::Display for CardPlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardPlay::Move => "move",
            CardPlay::MoveBackward => "move backward",
            CardPlay::Attack => "attack",
            CardPlay::Advance => "advance",
        };
        f.write_str(name)
    }
}

/// A complete turn action.
///
/// ## Example
///
/// ```
/// use duel_engine::core::{Action, Card, CardPlay};
///
/// let lunge = Action::PlayCard { card: Card::new(3), play: CardPlay::Attack };
/// let parry = Action::parry(&[Card::new(1), Card::new(2)]);
/// assert_ne!(lunge, parry);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Spend a card from hand.
    PlayCard { card: Card, play: CardPlay },
    /// Add another card of the same value to the attack in flight.
    StrengthenAttack(Card),
    /// Commit the attack and hand the turn to the defender.
    FinishAttack,
    /// Answer the attack with cards matching its count and total.
    Parry(Hand),
    /// Concede the hit.
    FailParry,
    /// Land an immediate counter-hit after a parry.
    Riposte(Card),
    /// Let the riposte window pass.
    DeclineRiposte,
    /// Declare the attack that follows an advance (legacy ruleset).
    AdvanceAttack(Card),
    /// Step back out of an advance attack instead of parrying (legacy ruleset).
    RetreatFromAdvanceAttack,
}

impl Action {
    /// Build a parry from a slice of cards.
    #[must_use]
    pub fn parry(cards: &[Card]) -> Self {
        Action::Parry(Hand::from_slice(cards))
    }

    /// Short name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::PlayCard { .. } => "play_card",
            Action::StrengthenAttack(_) => "strengthen_attack",
            Action::FinishAttack => "finish_attack",
            Action::Parry(_) => "parry",
            Action::FailParry => "fail_parry",
            Action::Riposte(_) => "riposte",
            Action::DeclineRiposte => "decline_riposte",
            Action::AdvanceAttack(_) => "advance_attack",
            Action::RetreatFromAdvanceAttack => "retreat_from_advance_attack",
        }
    }
}

/// The most recent card played, kept for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastCardPlayed {
    pub slot: Slot,
    pub card: Card,
    pub play: CardPlay,
}

/// One line of the match log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: OffsetDateTime,
    pub message: String,
    /// `None` for entries the rules write on their own (round starts).
    pub actor: Option<Slot>,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    pub fn new(actor: Option<Slot>, message: impl Into<String>) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            message: message.into(),
            actor,
        }
    }
}
