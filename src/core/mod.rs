//! Core types: slots, cards, ids, RNG, configuration, actions, state.
//!
//! Everything here is plain data. Rules live in `rules`; persistence in `store`.

pub mod slot;
pub mod card;
pub mod ids;
pub mod rng;
pub mod config;
pub mod action;
pub mod state;

pub use slot::{Slot, SlotMap};
pub use card::{Card, Hand};
pub use ids::{IdError, MatchId, ParticipantId, MATCH_ID_LEN};
pub use rng::GameRng;
pub use config::{ConfigError, RulesConfig, Ruleset};
pub use action::{Action, CardPlay, LastCardPlayed, LogEntry};
pub use state::{AttackRecord, MatchState, Phase};
