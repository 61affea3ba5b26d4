//! Participant slots and per-slot data storage.
//!
//! ## Slot
//!
//! A duel always has exactly two seats. `Slot::A` starts at the low end of
//! the track and moves up; `Slot::B` starts at the high end and moves down.
//!
//! ## SlotMap
//!
//! Fixed two-entry storage indexed by `Slot`, replacing pairs of
//! duplicated per-player fields.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two seats in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// Both slots in seating order.
    pub const ALL: [Slot; 2] = [Slot::A, Slot::B];

    /// The other slot.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    /// Storage index (A = 0, B = 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }

    /// Unit step toward the opponent along the track.
    ///
    /// ```
    /// use duel_engine::core::Slot;
    ///
    /// assert_eq!(Slot::A.forward(), 1);
    /// assert_eq!(Slot::B.forward(), -1);
    /// ```
    #[must_use]
    pub const fn forward(self) -> i32 {
        match self {
            Slot::A => 1,
            Slot::B => -1,
        }
    }

    /// Starting position on a track whose far end is `track_max`.
    #[must_use]
    pub const fn home(self, track_max: i32) -> i32 {
        match self {
            Slot::A => 0,
            Slot::B => track_max,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::A => write!(f, "Player A"),
            Slot::B => write!(f, "Player B"),
        }
    }
}

/// Per-slot data with O(1) access.
///
/// ## Example
///
/// ```
/// use duel_engine::core::{Slot, SlotMap};
///
/// let mut scores: SlotMap<u32> = SlotMap::with_value(0);
/// scores[Slot::B] += 1;
///
/// assert_eq!(scores[Slot::A], 0);
/// assert_eq!(scores[Slot::B], 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotMap<T> {
    data: [T; 2],
}

impl<T> SlotMap<T> {
    /// Create from explicit values for `A` and `B`.
    pub fn from_pair(a: T, b: T) -> Self {
        Self { data: [a, b] }
    }

    /// Create with values from a factory function.
    pub fn new(factory: impl Fn(Slot) -> T) -> Self {
        Self {
            data: [factory(Slot::A), factory(Slot::B)],
        }
    }

    /// Create with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            data: [value.clone(), value],
        }
    }

    /// Iterate over (Slot, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &T)> {
        Slot::ALL.into_iter().zip(self.data.iter())
    }

    /// Iterate over the values only.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<Slot> for SlotMap<T> {
    type Output = T;

    fn index(&self, slot: Slot) -> &Self::Output {
        &self.data[slot.index()]
    }
}

impl<T> IndexMut<Slot> for SlotMap<T> {
    fn index_mut(&mut self, slot: Slot) -> &mut Self::Output {
        &mut self.data[slot.index()]
    }
}
