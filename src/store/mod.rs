//! State store: where match documents live.
//!
//! The engine never holds the authoritative state; it reads a
//! `Versioned<MatchState>`, computes the next state, and writes a
//! `StateUpdate` guarded by a `Precondition`. Every participant observes
//! the same document through `subscribe`.
//!
//! ## Example
//!
//! ```
//! use duel_engine::core::{GameRng, MatchId, MatchState, ParticipantId, RulesConfig, Slot};
//! use duel_engine::store::{MatchStore, MemoryStore, Precondition, StateUpdate};
//!
//! let store = MemoryStore::new();
//! let mut rng = GameRng::new(42);
//! let id = MatchId::generate(&mut rng);
//! let state = MatchState::new(ParticipantId::generate(&mut rng), RulesConfig::default(), &mut rng);
//!
//! let revision = store.create(&id, state).unwrap();
//! let update = StateUpdate { turn: Some(Slot::B), ..StateUpdate::default() };
//! store.update(&id, &update, Precondition::Revision(revision)).unwrap();
//!
//! // The old revision is now stale
//! assert!(store.update(&id, &update, Precondition::Revision(revision)).is_err());
//! ```

mod memory;
mod update;

pub use memory::MemoryStore;
pub use update::StateUpdate;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{MatchId, MatchState};

/// Document version, bumped by every successful write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision(pub u64);

impl Revision {
    /// Revision assigned on creation.
    pub const INITIAL: Revision = Revision(1);

    /// The revision after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Revision(self.0 + 1)
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A document along with the revision it was read at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versioned<T> {
    pub revision: Revision,
    pub value: T,
}

/// Condition a write must satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precondition {
    /// Write unconditionally.
    None,
    /// Write only if the document is still at this revision.
    Revision(Revision),
}

/// Handle returned by `subscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Change listener. Called after every successful write.
pub type Listener = Arc<dyn Fn(&Versioned<MatchState>) + Send + Sync>;

/// Store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("match {0} not found")]
    NotFound(MatchId),

    #[error("match {0} already exists")]
    AlreadyExists(MatchId),

    #[error("match {id} changed: expected {expected}, found {actual}")]
    Conflict {
        id: MatchId,
        expected: Revision,
        actual: Revision,
    },

    #[error("document codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Persistence and change notification for match documents.
pub trait MatchStore: Send + Sync {
    /// Read the current document.
    fn get(&self, id: &MatchId) -> Result<Versioned<MatchState>, StoreError>;

    /// Create a new document.
    fn create(&self, id: &MatchId, state: MatchState) -> Result<Revision, StoreError>;

    /// Merge `update` into the document if `precondition` holds.
    fn update(
        &self,
        id: &MatchId,
        update: &StateUpdate,
        precondition: Precondition,
    ) -> Result<Revision, StoreError>;

    /// Register a change listener.
    fn subscribe(&self, id: &MatchId, listener: Listener) -> Result<SubscriptionId, StoreError>;

    /// Remove a change listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: &MatchId, subscription: SubscriptionId);

    /// Delete the document and drop its listeners.
    fn delete(&self, id: &MatchId) -> Result<(), StoreError>;
}

impl<S: MatchStore + ?Sized> MatchStore for Arc<S> {
    fn get(&self, id: &MatchId) -> Result<Versioned<MatchState>, StoreError> {
        (**self).get(id)
    }

    fn create(&self, id: &MatchId, state: MatchState) -> Result<Revision, StoreError> {
        (**self).create(id, state)
    }

    fn update(
        &self,
        id: &MatchId,
        update: &StateUpdate,
        precondition: Precondition,
    ) -> Result<Revision, StoreError> {
        (**self).update(id, update, precondition)
    }

    fn subscribe(&self, id: &MatchId, listener: Listener) -> Result<SubscriptionId, StoreError> {
        (**self).subscribe(id, listener)
    }

    fn unsubscribe(&self, id: &MatchId, subscription: SubscriptionId) {
        (**self).unsubscribe(id, subscription);
    }

    fn delete(&self, id: &MatchId) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}
