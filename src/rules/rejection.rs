//! Reasons an in-game action is refused.
//!
//! Rejections are not failures of the engine: the presentation layer is
//! expected to offer only legal actions, so a rejection means a client
//! bug. They are returned as values and the match state stays untouched.

use thiserror::Error;

use crate::core::{Card, Slot};

/// Why an action was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("match has not started")]
    NotStarted,

    #[error("match is over")]
    GameOver,

    #[error("round result has not been acknowledged")]
    RoundEndPending,

    #[error("round is already dealt")]
    AlreadyDealt,

    #[error("not {0}'s turn")]
    NotYourTurn(Slot),

    #[error("action requires the {expected} phase, match is in {actual}")]
    WrongPhase {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("card {0} is not in hand")]
    CardNotInHand(Card),

    #[error("parry cards are not all in hand")]
    CardsNotInHand,

    #[error("invalid move - cannot move onto or past opponent")]
    BlockedByOpponent,

    #[error("invalid move - position {0} is off the track")]
    OffTrack(i32),

    #[error("invalid move - already at the end of the track")]
    AtTrackEnd,

    #[error("invalid attack - distance {distance} does not match card {card}")]
    DistanceMismatch { distance: i32, card: Card },

    #[error("can only strengthen with the same value card ({lead})")]
    StrengthenMismatch { lead: Card },

    #[error("invalid parry - need {count} cards totalling {total}, got {got_count} totalling {got_total}")]
    ParryMismatch {
        count: usize,
        total: u32,
        got_count: usize,
        got_total: u32,
    },

    #[error("only the attacker ({0}) may do that")]
    NotAttacker(Slot),

    #[error("can only retreat from advance attacks")]
    NotAdvanceAttack,

    #[error("no card left to attack with after advancing")]
    NoFollowUpAttack,

    #[error("{0} is not available in this ruleset")]
    RulesetDisabled(&'static str),
}
