//! Errors surfaced to the caller of the action API.

use thiserror::Error;

use crate::core::{ConfigError, MatchId};
use crate::store::StoreError;

/// Failures of match setup or of the store.
///
/// Illegal in-game actions are not errors; they come back as
/// `Outcome::Rejected`.
#[derive(Debug, Error)]
pub enum DuelError {
    #[error("match {0} not found")]
    NotFound(MatchId),

    #[error("match {0} is full")]
    Full(MatchId),

    #[error("not seated in a match")]
    NotSeated,

    #[error("already seated in match {0}")]
    AlreadySeated(MatchId),

    #[error("invalid rules: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for DuelError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => DuelError::NotFound(id),
            other => DuelError::Store(other),
        }
    }
}

impl DuelError {
    /// Whether the failure was a lost race against another write.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, DuelError::Store(StoreError::Conflict { .. }))
    }
}
