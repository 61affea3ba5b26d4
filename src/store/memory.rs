//! In-process store.
//!
//! Documents are kept `bincode`-encoded, so readers always get an
//! independent copy, as they would from a remote store. Listeners run
//! after the lock is released and may write back into the store.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::core::{MatchId, MatchState};

use super::{
    Listener, MatchStore, Precondition, Revision, StateUpdate, StoreError, SubscriptionId,
    Versioned,
};

struct Document {
    revision: Revision,
    bytes: Vec<u8>,
    listeners: Vec<(SubscriptionId, Listener)>,
}

#[derive(Default)]
struct Inner {
    documents: FxHashMap<MatchId, Document>,
    next_subscription: u64,
}

/// Thread-safe in-memory `MatchStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().documents.len()
    }

    /// Whether no matches are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(listeners: Vec<Listener>, snapshot: &Versioned<MatchState>) {
        for listener in listeners {
            listener(snapshot);
        }
    }
}

impl MatchStore for MemoryStore {
    fn get(&self, id: &MatchId) -> Result<Versioned<MatchState>, StoreError> {
        let inner = self.inner.lock();
        let doc = inner
            .documents
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(Versioned {
            revision: doc.revision,
            value: MatchState::from_bytes(&doc.bytes)?,
        })
    }

    fn create(&self, id: &MatchId, state: MatchState) -> Result<Revision, StoreError> {
        let bytes = state.to_bytes()?;
        let mut inner = self.inner.lock();
        if inner.documents.contains_key(id) {
            return Err(StoreError::AlreadyExists(id.clone()));
        }
        inner.documents.insert(
            id.clone(),
            Document {
                revision: Revision::INITIAL,
                bytes,
                listeners: Vec::new(),
            },
        );
        tracing::debug!(match_id = %id, "match document created");
        Ok(Revision::INITIAL)
    }

    fn update(
        &self,
        id: &MatchId,
        update: &StateUpdate,
        precondition: Precondition,
    ) -> Result<Revision, StoreError> {
        let (snapshot, listeners) = {
            let mut inner = self.inner.lock();
            let doc = inner
                .documents
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;

            if let Precondition::Revision(expected) = precondition {
                if doc.revision != expected {
                    return Err(StoreError::Conflict {
                        id: id.clone(),
                        expected,
                        actual: doc.revision,
                    });
                }
            }

            let mut state = MatchState::from_bytes(&doc.bytes)?;
            update.apply_to(&mut state);
            doc.bytes = state.to_bytes()?;
            doc.revision = doc.revision.next();

            tracing::debug!(
                match_id = %id,
                revision = %doc.revision,
                fields = ?update.field_names(),
                "match document updated"
            );

            let listeners: Vec<Listener> = doc.listeners.iter().map(|(_, l)| l.clone()).collect();
            (
                Versioned {
                    revision: doc.revision,
                    value: state,
                },
                listeners,
            )
        };

        Self::notify(listeners, &snapshot);
        Ok(snapshot.revision)
    }

    fn subscribe(&self, id: &MatchId, listener: Listener) -> Result<SubscriptionId, StoreError> {
        let mut inner = self.inner.lock();
        let subscription = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;

        let doc = inner
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        doc.listeners.push((subscription, listener));
        Ok(subscription)
    }

    fn unsubscribe(&self, id: &MatchId, subscription: SubscriptionId) {
        let mut inner = self.inner.lock();
        if let Some(doc) = inner.documents.get_mut(id) {
            doc.listeners.retain(|(sub, _)| *sub != subscription);
        }
    }

    fn delete(&self, id: &MatchId) -> Result<(), StoreError> {
        let removed = self.inner.lock().documents.remove(id);
        match removed {
            Some(_) => {
                tracing::debug!(match_id = %id, "match document deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }
}
