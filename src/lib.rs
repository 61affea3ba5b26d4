//! # duel-engine
//!
//! Rules engine for a two-player fencing duel played with numbered cards
//! on a linear track. Players spend cards to move, attack, parry and
//! riposte; the first to five hits wins.
//!
//! ## Design Principles
//!
//! 1. **One Document**: A match is a single `MatchState`. Every
//!    transition is a pure function of that document and an action.
//!
//! 2. **No Partial Moves**: A rejected action leaves the state exactly as
//!    it was and returns the reason instead of an error.
//!
//! 3. **Turn Ownership Gates Writes**: Only the slot holding the turn may
//!    act, and every write is conditioned on the revision it read.
//!
//! ## Modules
//!
//! - `core`: Slots, cards, ids, RNG, rules configuration, actions, state
//! - `rules`: The state machine, legality queries, parry search
//! - `store`: Store trait, partial updates, in-memory store
//! - `duel`: Per-participant engine over a store

pub mod core;
pub mod rules;
pub mod store;
pub mod duel;

// Re-export commonly used types
pub use crate::core::{
    Action, AttackRecord, Card, CardPlay, GameRng, Hand, LogEntry, MatchId, MatchState,
    ParticipantId, Phase, RulesConfig, Ruleset, Slot, SlotMap,
};

pub use crate::rules::{DuelRules, GameResult, Rejection, RulesEngine};

pub use crate::store::{
    MatchStore, MemoryStore, Precondition, Revision, StateUpdate, StoreError, Versioned,
};

pub use crate::duel::{DuelEngine, DuelError, Outcome};
