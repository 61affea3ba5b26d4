//! Participant-facing action API.
//!
//! `DuelEngine` binds one participant to one match in a `MatchStore`.
//! Setup failures (`NotFound`, `Full`) are errors; illegal plays are
//! `Outcome::Rejected` and leave the stored match untouched.

mod engine;
mod error;

pub use engine::{DuelEngine, Outcome};
pub use error::DuelError;
