//! The duel state machine.
//!
//! `DuelRules` implements `RulesEngine`:
//! - Legal actions for each state and slot
//! - Transitions that either apply fully or leave the state untouched
//! - Win detection
//!
//! Legality queries are also exposed directly for the presentation layer.

pub mod engine;
pub mod legality;
pub mod parry;
mod rejection;
mod transitions;

pub use engine::{DuelRules, GameResult, RulesEngine};
pub use rejection::Rejection;
