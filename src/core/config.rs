//! Rules configuration.
//!
//! A match stores the `RulesConfig` it was created with, so both
//! participants evaluate every action against the same numbers:
//! - `Ruleset`: which rule revision is in force
//! - Track length, hand size, winning score
//! - Deck composition
//!
//! Two presets exist. `RulesConfig::riposte()` is the canonical ruleset
//! and the `Default`. `RulesConfig::legacy()` reproduces the earlier
//! revision with a longer track and advance-and-attack instead of
//! ripostes and backward moves.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule revision in force for a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ruleset {
    /// Backward moves and ripostes after a successful parry.
    #[default]
    Riposte,
    /// Advance-and-attack, retreat from advance attacks, no riposte.
    Legacy,
}

/// Invalid rules configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("track must be longer than the largest card ({max_card_value}), got {track_max}")]
    TrackTooShort { track_max: i32, max_card_value: u8 },

    #[error("{field} must be at least 1")]
    Zero { field: &'static str },

    #[error("deck of {deck} cards cannot deal two hands of {hand_size}")]
    DeckTooSmall { deck: usize, hand_size: usize },
}

/// Numbers and switches that define a duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Rule revision.
    pub ruleset: Ruleset,

    /// Highest track coordinate; slot `B` starts here.
    pub track_max: i32,

    /// Cards held after every refill.
    pub hand_size: usize,

    /// Hits needed to win the match.
    pub winning_score: u32,

    /// Largest card value; the deck holds values `1..=max_card_value`.
    pub max_card_value: u8,

    /// Copies of each value in a fresh deck.
    pub copies_per_value: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::riposte()
    }
}

impl RulesConfig {
    /// The canonical ruleset: 0–18 track, ripostes, backward moves.
    #[must_use]
    pub fn riposte() -> Self {
        Self {
            ruleset: Ruleset::Riposte,
            track_max: 18,
            hand_size: 5,
            winning_score: 5,
            max_card_value: 5,
            copies_per_value: 5,
        }
    }

    /// The earlier revision: 0–22 track, advance-and-attack.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            ruleset: Ruleset::Legacy,
            track_max: 22,
            ..Self::riposte()
        }
    }

    /// Set the track length.
    #[must_use]
    pub fn with_track_max(mut self, track_max: i32) -> Self {
        self.track_max = track_max;
        self
    }

    /// Set the hand size.
    #[must_use]
    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    /// Set the number of hits needed to win.
    #[must_use]
    pub fn with_winning_score(mut self, winning_score: u32) -> Self {
        self.winning_score = winning_score;
        self
    }

    /// Cards in a fresh deck.
    #[must_use]
    pub fn deck_size(&self) -> usize {
        usize::from(self.max_card_value) * self.copies_per_value
    }

    /// Whether a successful parry can open a riposte window.
    #[must_use]
    pub fn allows_riposte(&self) -> bool {
        self.ruleset == Ruleset::Riposte
    }

    /// Whether fighters may spend a card to step away from the opponent.
    #[must_use]
    pub fn allows_backward_move(&self) -> bool {
        self.ruleset == Ruleset::Riposte
    }

    /// Whether advance-and-attack (and retreating from it) is available.
    #[must_use]
    pub fn allows_advance(&self) -> bool {
        self.ruleset == Ruleset::Legacy
    }

    /// Check that a match can be played with these numbers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hand_size == 0 {
            return Err(ConfigError::Zero { field: "hand_size" });
        }
        if self.winning_score == 0 {
            return Err(ConfigError::Zero { field: "winning_score" });
        }
        if self.max_card_value == 0 {
            return Err(ConfigError::Zero { field: "max_card_value" });
        }
        if self.copies_per_value == 0 {
            return Err(ConfigError::Zero { field: "copies_per_value" });
        }
        if self.track_max <= i32::from(self.max_card_value) {
            return Err(ConfigError::TrackTooShort {
                track_max: self.track_max,
                max_card_value: self.max_card_value,
            });
        }
        if self.deck_size() < self.hand_size * 2 {
            return Err(ConfigError::DeckTooSmall {
                deck: self.deck_size(),
                hand_size: self.hand_size,
            });
        }
        Ok(())
    }
}
