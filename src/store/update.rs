//! Partial document updates with merge semantics.
//!
//! The engine computes a full next state, then `StateUpdate::diff`
//! reduces it to the fields that changed. Stores apply an update by
//! overwriting exactly those fields.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{Card, Hand, LastCardPlayed, LogEntry, MatchState, ParticipantId, Phase, Slot, SlotMap};

/// Fields to overwrite; `None` leaves a field as stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub players: Option<SlotMap<Option<ParticipantId>>>,
    pub started: Option<bool>,
    pub turn: Option<Slot>,
    pub round: Option<u32>,
    pub scores: Option<SlotMap<u32>>,
    pub positions: Option<SlotMap<i32>>,
    pub deck: Option<Vec<Card>>,
    pub hands: Option<SlotMap<Hand>>,
    pub discard: Option<Vec<Card>>,
    pub phase: Option<Phase>,
    pub last_card_played: Option<Option<LastCardPlayed>>,
    pub action_log: Option<Vector<LogEntry>>,
    pub round_ended: Option<bool>,
}

fn changed<T: PartialEq + Clone>(before: &T, after: &T) -> Option<T> {
    (before != after).then(|| after.clone())
}

impl StateUpdate {
    /// The fields that differ between `before` and `after`.
    ///
    /// The rules configuration is fixed at creation and never part of an update.
    #[must_use]
    pub fn diff(before: &MatchState, after: &MatchState) -> Self {
        Self {
            players: changed(&before.players, &after.players),
            started: changed(&before.started, &after.started),
            turn: changed(&before.turn, &after.turn),
            round: changed(&before.round, &after.round),
            scores: changed(&before.scores, &after.scores),
            positions: changed(&before.positions, &after.positions),
            deck: changed(&before.deck, &after.deck),
            hands: changed(&before.hands, &after.hands),
            discard: changed(&before.discard, &after.discard),
            phase: changed(&before.phase, &after.phase),
            last_card_played: changed(&before.last_card_played, &after.last_card_played),
            action_log: changed(&before.action_log, &after.action_log),
            round_ended: changed(&before.round_ended, &after.round_ended),
        }
    }

    /// Whether applying this update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    /// Names of the fields present, for diagnostics.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let present = [
            ("players", self.players.is_some()),
            ("started", self.started.is_some()),
            ("turn", self.turn.is_some()),
            ("round", self.round.is_some()),
            ("scores", self.scores.is_some()),
            ("positions", self.positions.is_some()),
            ("deck", self.deck.is_some()),
            ("hands", self.hands.is_some()),
            ("discard", self.discard.is_some()),
            ("phase", self.phase.is_some()),
            ("last_card_played", self.last_card_played.is_some()),
            ("action_log", self.action_log.is_some()),
            ("round_ended", self.round_ended.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(name, is_set)| is_set.then_some(name))
            .collect()
    }

    /// Merge into `state`, overwriting only the present fields.
    pub fn apply_to(&self, state: &mut MatchState) {
        fn merge<T: Clone>(field: &Option<T>, target: &mut T) {
            if let Some(value) = field {
                *target = value.clone();
            }
        }

        merge(&self.players, &mut state.players);
        merge(&self.started, &mut state.started);
        merge(&self.turn, &mut state.turn);
        merge(&self.round, &mut state.round);
        merge(&self.scores, &mut state.scores);
        merge(&self.positions, &mut state.positions);
        merge(&self.deck, &mut state.deck);
        merge(&self.hands, &mut state.hands);
        merge(&self.discard, &mut state.discard);
        merge(&self.phase, &mut state.phase);
        merge(&self.last_card_played, &mut state.last_card_played);
        merge(&self.action_log, &mut state.action_log);
        merge(&self.round_ended, &mut state.round_ended);
    }
}
