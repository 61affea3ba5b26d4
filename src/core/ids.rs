//! Match and participant identifiers.
//!
//! A `MatchId` is a short code players read aloud or paste to each other,
//! so it is uppercase alphanumeric and parsed case-insensitively. A
//! `ParticipantId` is an opaque token that never reaches the screen.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::rng::GameRng;

const MATCH_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated match code.
pub const MATCH_ID_LEN: usize = 6;

/// Unparsable match code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("match code must be {MATCH_ID_LEN} characters, got {0}")]
    Length(usize),

    #[error("match code may only contain letters and digits, found {0:?}")]
    Character(char),
}

/// Shareable match code, e.g. `K7Q2ZD`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId(String);

impl MatchId {
    /// Generate a fresh code.
    #[must_use]
    pub fn generate(rng: &mut GameRng) -> Self {
        let code = (0..MATCH_ID_LEN)
            .map(|_| char::from(MATCH_ID_ALPHABET[rng.gen_range_usize(0..MATCH_ID_ALPHABET.len())]))
            .collect();
        Self(code)
    }

    /// The code as typed by players.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MatchId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let len = trimmed.chars().count();
        if len != MATCH_ID_LEN {
            return Err(IdError::Length(len));
        }
        if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(IdError::Character(bad));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque participant token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate(rng: &mut GameRng) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "participant_{}", self.0.simple())
    }
}
