//! Per-participant action API over a shared store.
//!
//! Each participant runs one `DuelEngine`. Every action reads the
//! current document, runs it through `DuelRules`, and writes the changed
//! fields conditioned on the revision it read. A second engine that acted
//! on the same revision gets a conflict instead of silently overwriting.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use duel_engine::core::{RulesConfig, Slot};
//! use duel_engine::duel::DuelEngine;
//! use duel_engine::store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut host = DuelEngine::new(store.clone(), 1);
//! let mut guest = DuelEngine::new(store, 2);
//!
//! let id = host.create_match(RulesConfig::default()).unwrap();
//! guest.join_match(&id).unwrap();
//!
//! // The host holds the turn and deals the first round on observing the join
//! host.poll().unwrap();
//! guest.poll().unwrap();
//! assert_eq!(guest.state().unwrap().hands[Slot::B].len(), 5);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{
    Action, AttackRecord, Card, CardPlay, GameRng, Hand, MatchId, MatchState, ParticipantId,
    RulesConfig, Slot,
};
use crate::rules::{legality, parry, DuelRules, Rejection, RulesEngine};
use crate::store::{MatchStore, Precondition, StateUpdate, StoreError, SubscriptionId, Versioned};

use super::error::DuelError;

/// Attempts at finding an unused match code before giving up.
const CREATE_ATTEMPTS: usize = 8;

/// What happened to an in-game action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The action was legal and written.
    Applied,
    /// The action was illegal; nothing was written.
    Rejected(Rejection),
}

impl Outcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

struct Seat {
    match_id: MatchId,
    slot: Slot,
    subscription: SubscriptionId,
}

type Inbox = Arc<Mutex<Option<Versioned<MatchState>>>>;

/// One participant's view of, and handle on, a match.
pub struct DuelEngine<S: MatchStore> {
    store: S,
    rules: DuelRules,
    participant: ParticipantId,
    deck_rng: GameRng,
    id_rng: GameRng,
    seat: Option<Seat>,
    inbox: Inbox,
    latest: Option<Versioned<MatchState>>,
}

impl<S: MatchStore> DuelEngine<S> {
    /// Create an engine with deterministic ids and shuffles.
    pub fn new(store: S, seed: u64) -> Self {
        let rng = GameRng::new(seed);
        let mut id_rng = rng.for_context("ids");
        let participant = ParticipantId::generate(&mut id_rng);
        Self {
            store,
            rules: DuelRules::new(),
            participant,
            deck_rng: rng.for_context("deck"),
            id_rng,
            seat: None,
            inbox: Arc::new(Mutex::new(None)),
            latest: None,
        }
    }

    /// Create an engine seeded from operating system entropy.
    pub fn from_entropy(store: S) -> Self {
        Self::new(store, GameRng::from_entropy().seed())
    }

    /// This participant's opaque id.
    #[must_use]
    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// The match this engine is seated in.
    #[must_use]
    pub fn match_id(&self) -> Option<&MatchId> {
        self.seat.as_ref().map(|seat| &seat.match_id)
    }

    /// The slot this engine plays.
    #[must_use]
    pub fn slot(&self) -> Option<Slot> {
        self.seat.as_ref().map(|seat| seat.slot)
    }

    /// Most recently observed state.
    #[must_use]
    pub fn state(&self) -> Option<&MatchState> {
        self.latest.as_ref().map(|v| &v.value)
    }

    /// Whether the observed state gives this participant the turn.
    #[must_use]
    pub fn is_my_turn(&self) -> bool {
        self.view().is_some_and(|(state, slot)| state.is_turn_of(slot))
    }

    /// Latest log line, for result summaries.
    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.state().and_then(MatchState::last_message)
    }

    fn view(&self) -> Option<(&MatchState, Slot)> {
        Some((self.state()?, self.slot()?))
    }

    fn seat(&self) -> Result<(MatchId, Slot), DuelError> {
        self.seat
            .as_ref()
            .map(|seat| (seat.match_id.clone(), seat.slot))
            .ok_or(DuelError::NotSeated)
    }

    fn ensure_unseated(&self) -> Result<(), DuelError> {
        match &self.seat {
            Some(seat) => Err(DuelError::AlreadySeated(seat.match_id.clone())),
            None => Ok(()),
        }
    }

    fn listen(&mut self, id: &MatchId, slot: Slot) -> Result<(), DuelError> {
        let inbox = self.inbox.clone();
        let subscription = self.store.subscribe(
            id,
            Arc::new(move |snapshot: &Versioned<MatchState>| {
                let mut pending = inbox.lock();
                let newer = pending
                    .as_ref()
                    .map_or(true, |held| held.revision < snapshot.revision);
                if newer {
                    *pending = Some(snapshot.clone());
                }
            }),
        )?;
        self.seat = Some(Seat {
            match_id: id.clone(),
            slot,
            subscription,
        });
        Ok(())
    }

    // === Match setup ===

    /// Host a new match in slot `A` and return its shareable code.
    pub fn create_match(&mut self, rules: RulesConfig) -> Result<MatchId, DuelError> {
        self.ensure_unseated()?;
        rules.validate()?;

        let mut attempts = 0;
        let id = loop {
            let id = MatchId::generate(&mut self.id_rng);
            let state = MatchState::new(self.participant, rules.clone(), &mut self.deck_rng);
            match self.store.create(&id, state) {
                Ok(_) => break id,
                Err(StoreError::AlreadyExists(_)) if attempts + 1 < CREATE_ATTEMPTS => {
                    attempts += 1;
                }
                Err(err) => return Err(err.into()),
            }
        };

        self.listen(&id, Slot::A)?;
        self.refresh()?;
        tracing::info!(match_id = %id, participant = %self.participant, "match created");
        Ok(id)
    }

    /// Take slot `B` of an existing match.
    pub fn join_match(&mut self, id: &MatchId) -> Result<(), DuelError> {
        self.ensure_unseated()?;

        let current = self.store.get(id)?;
        let state = &current.value;
        if state.players[Slot::B].is_some() || state.slot_of(self.participant).is_some() {
            return Err(DuelError::Full(id.clone()));
        }

        let mut next = state.clone();
        next.players[Slot::B] = Some(self.participant);
        next.started = true;
        next.turn = Slot::A;
        next.log(Some(Slot::B), format!("{} joined", Slot::B));

        let update = StateUpdate::diff(state, &next);
        match self.store.update(id, &update, Precondition::Revision(current.revision)) {
            Ok(_) => {}
            Err(StoreError::Conflict { .. }) => {
                // Someone wrote first; report Full if that write took the seat
                let now = self.store.get(id)?;
                if now.value.players[Slot::B].is_some() {
                    return Err(DuelError::Full(id.clone()));
                }
                return Err(DuelError::Store(StoreError::Conflict {
                    id: id.clone(),
                    expected: current.revision,
                    actual: now.revision,
                }));
            }
            Err(err) => return Err(err.into()),
        }

        self.listen(id, Slot::B)?;
        self.refresh()?;
        tracing::info!(match_id = %id, participant = %self.participant, "joined match");
        Ok(())
    }

    /// Stop observing and delete the match document.
    pub fn leave_match(&mut self) -> Result<(), DuelError> {
        let seat = self.seat.take().ok_or(DuelError::NotSeated)?;
        self.store.unsubscribe(&seat.match_id, seat.subscription);
        self.latest = None;
        self.inbox.lock().take();

        match self.store.delete(&seat.match_id) {
            // The opponent may have left first
            Ok(()) | Err(StoreError::NotFound(_)) => {
                tracing::info!(match_id = %seat.match_id, "left match");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    // === Observation ===

    /// Process pending change notifications.
    ///
    /// Returns whether a newer state was observed. Deals a fresh round
    /// when the observed state needs one and this participant holds the turn.
    pub fn poll(&mut self) -> Result<bool, DuelError> {
        let mut observed = false;
        loop {
            let pending = self.inbox.lock().take();
            let Some(snapshot) = pending else {
                break;
            };
            observed |= self.observe(snapshot)?;
        }
        Ok(observed)
    }

    /// Read the document directly from the store and observe it.
    pub fn refresh(&mut self) -> Result<(), DuelError> {
        let (id, _) = self.seat()?;
        let current = self.store.get(&id)?;
        self.observe(current)?;
        self.poll()?;
        Ok(())
    }

    fn observe(&mut self, snapshot: Versioned<MatchState>) -> Result<bool, DuelError> {
        let stale = self
            .latest
            .as_ref()
            .is_some_and(|held| held.revision >= snapshot.revision);
        if stale {
            return Ok(false);
        }
        self.latest = Some(snapshot);
        self.deal_if_needed()?;
        Ok(true)
    }

    fn deal_if_needed(&mut self) -> Result<(), DuelError> {
        let (id, slot) = self.seat()?;
        let Some(current) = &self.latest else {
            return Ok(());
        };
        if !current.value.needs_deal() || !current.value.is_turn_of(slot) {
            return Ok(());
        }

        let mut next = current.value.clone();
        if self.rules.start_new_round(&mut next, slot).is_err() {
            return Ok(());
        }
        let update = StateUpdate::diff(&current.value, &next);
        match self.store.update(&id, &update, Precondition::Revision(current.revision)) {
            Ok(revision) => {
                tracing::debug!(match_id = %id, %revision, round = next.round, "round dealt");
                Ok(())
            }
            Err(StoreError::Conflict { .. }) => {
                tracing::debug!(match_id = %id, "deal skipped, document moved on");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    // === Turn actions ===

    fn act(&mut self, action: Action) -> Result<Outcome, DuelError> {
        let (id, slot) = self.seat()?;
        let current = self.store.get(&id)?;

        let mut next = current.value.clone();
        match self
            .rules
            .apply_action(&mut next, slot, &action, &mut self.deck_rng)
        {
            Ok(()) => {
                let update = StateUpdate::diff(&current.value, &next);
                let revision =
                    self.store
                        .update(&id, &update, Precondition::Revision(current.revision))?;
                tracing::debug!(
                    match_id = %id,
                    %slot,
                    action = action.name(),
                    %revision,
                    "action applied"
                );
                self.poll()?;
                Ok(Outcome::Applied)
            }
            Err(rejection) => {
                tracing::warn!(
                    match_id = %id,
                    %slot,
                    action = action.name(),
                    reason = %rejection,
                    "action rejected"
                );
                Ok(Outcome::Rejected(rejection))
            }
        }
    }

    /// Spend a card from hand to move, retreat, attack or advance.
    pub fn play_card(&mut self, card: Card, play: CardPlay) -> Result<Outcome, DuelError> {
        self.act(Action::PlayCard { card, play })
    }

    /// Add a same-valued card to the attack in flight.
    pub fn strengthen_attack(&mut self, card: Card) -> Result<Outcome, DuelError> {
        self.act(Action::StrengthenAttack(card))
    }

    /// Commit the attack; the defender takes the turn.
    pub fn finish_attack(&mut self) -> Result<Outcome, DuelError> {
        self.act(Action::FinishAttack)
    }

    /// Answer the attack with exactly matching cards.
    pub fn parry(&mut self, cards: &[Card]) -> Result<Outcome, DuelError> {
        self.act(Action::parry(cards))
    }

    /// Concede the hit.
    pub fn fail_parry(&mut self) -> Result<Outcome, DuelError> {
        self.act(Action::FailParry)
    }

    /// Counter-hit after a successful parry.
    pub fn riposte(&mut self, card: Card) -> Result<Outcome, DuelError> {
        self.act(Action::Riposte(card))
    }

    /// Pass on the riposte window.
    pub fn decline_riposte(&mut self) -> Result<Outcome, DuelError> {
        self.act(Action::DeclineRiposte)
    }

    /// Declare the attack following an advance.
    pub fn advance_attack(&mut self, card: Card) -> Result<Outcome, DuelError> {
        self.act(Action::AdvanceAttack(card))
    }

    /// Step out of an advance attack instead of parrying.
    pub fn retreat_from_advance_attack(&mut self) -> Result<Outcome, DuelError> {
        self.act(Action::RetreatFromAdvanceAttack)
    }

    /// Clear the round-ended flag so the next round can be dealt.
    ///
    /// Either participant may acknowledge. Returns whether the flag was set.
    pub fn acknowledge_round_end(&mut self) -> Result<bool, DuelError> {
        let (id, _) = self.seat()?;
        let current = self.store.get(&id)?;

        let mut next = current.value.clone();
        if !self.rules.acknowledge_round_end(&mut next) {
            return Ok(false);
        }
        let update = StateUpdate::diff(&current.value, &next);
        match self.store.update(&id, &update, Precondition::Revision(current.revision)) {
            Ok(_) => {}
            // The other participant acknowledged first
            Err(StoreError::Conflict { .. }) if !self.store.get(&id)?.value.round_ended => {}
            Err(err) => return Err(err.into()),
        }
        self.refresh()?;
        Ok(true)
    }

    // === Legality queries ===

    /// Whether a forward move by `card` is legal now.
    #[must_use]
    pub fn can_move_forward(&self, card: Card) -> bool {
        self.view()
            .is_some_and(|(state, slot)| legality::can_move_forward(state, slot, card))
    }

    /// Whether a backward move by `card` is legal now.
    #[must_use]
    pub fn can_move_backward(&self, card: Card) -> bool {
        self.view()
            .is_some_and(|(state, slot)| legality::can_move_backward(state, slot, card))
    }

    /// Whether `card` matches the current distance.
    #[must_use]
    pub fn can_attack(&self, card: Card) -> bool {
        self.state().is_some_and(|state| legality::can_attack(state, card))
    }

    /// Whether the defender of `attack` holds a matching parry.
    #[must_use]
    pub fn can_parry(&self, attack: &AttackRecord) -> bool {
        self.state().is_some_and(|state| legality::can_parry(state, attack))
    }

    /// Whether this participant holds a card for a riposte.
    #[must_use]
    pub fn can_riposte(&self) -> bool {
        self.view()
            .is_some_and(|(state, slot)| legality::can_riposte(state, slot))
    }

    /// Whether advancing by `advance` sets up an attack with `attack` (legacy ruleset).
    #[must_use]
    pub fn can_advance_and_attack(&self, advance: Card, attack: Card) -> bool {
        self.view().is_some_and(|(state, slot)| {
            legality::can_advance_and_attack(state, slot, advance, attack)
        })
    }

    /// Distinct parries this participant could answer `attack` with.
    #[must_use]
    pub fn parry_options(&self, attack: &AttackRecord) -> Vec<Hand> {
        match self.view() {
            Some((state, slot)) => {
                parry::parry_options(&state.hands[slot], attack.card_count, attack.total_value)
            }
            None => Vec::new(),
        }
    }

    /// Every action this participant may take in the observed state.
    #[must_use]
    pub fn legal_actions(&self) -> Vec<Action> {
        match self.view() {
            Some((state, slot)) => self.rules.legal_actions(state, slot),
            None => Vec::new(),
        }
    }
}
