//! Participant engine tests over the in-memory store.
//!
//! Two `DuelEngine`s share one `MemoryStore`, the way two clients share
//! one remote document. Scenarios that need a specific hand are set up by
//! writing straight into the store.

use std::sync::Arc;

use duel_engine::core::{
    Action, Card, CardPlay, ConfigError, Hand, MatchId, MatchState, ParticipantId, Phase,
    RulesConfig, Slot, SlotMap,
};
use duel_engine::duel::{DuelEngine, DuelError, Outcome};
use duel_engine::rules::{DuelRules, Rejection};
use duel_engine::store::{MatchStore, MemoryStore, Precondition, StateUpdate, StoreError};
use uuid::Uuid;

type Engine = DuelEngine<Arc<MemoryStore>>;

fn cards(values: &[u8]) -> Hand {
    values.iter().map(|&v| Card::new(v)).collect()
}

/// Host and guest seated, first round dealt and observed by both.
fn seated() -> (Arc<MemoryStore>, Engine, Engine, MatchId) {
    let store = Arc::new(MemoryStore::new());
    let mut host = DuelEngine::new(store.clone(), 11);
    let mut guest = DuelEngine::new(store.clone(), 22);

    let id = host.create_match(RulesConfig::default()).unwrap();
    guest.join_match(&id).unwrap();
    host.poll().unwrap();
    guest.poll().unwrap();
    (store, host, guest, id)
}

fn force(store: &MemoryStore, id: &MatchId, update: StateUpdate) {
    store.update(id, &update, Precondition::None).unwrap();
}

/// Host `A` at 10 holding a 3, guest `B` at 13 unable to parry it.
fn host_can_strike(store: &MemoryStore, id: &MatchId, score_a: u32) {
    force(
        store,
        id,
        StateUpdate {
            positions: Some(SlotMap::from_pair(10, 13)),
            hands: Some(SlotMap::from_pair(cards(&[3, 1, 1, 1, 1]), cards(&[2, 2, 2, 2, 2]))),
            scores: Some(SlotMap::from_pair(score_a, 0)),
            ..StateUpdate::default()
        },
    );
}

// =============================================================================
// Match setup
// =============================================================================

/// Test that the host deals as soon as it observes the join.
#[test]
fn test_join_deals_first_round() {
    let (_store, host, guest, id) = seated();

    assert_eq!(host.match_id(), Some(&id));
    assert_eq!(host.slot(), Some(Slot::A));
    assert_eq!(guest.slot(), Some(Slot::B));

    let state = guest.state().unwrap();
    assert!(state.started);
    assert_eq!(state.round, 1);
    assert_eq!(state.phase, Phase::Playing);
    assert_eq!(state.hands[Slot::A].len(), 5);
    assert_eq!(state.hands[Slot::B].len(), 5);
    assert_eq!(state.deck.len(), 15);
    assert_eq!(state.card_count(), 25);
    assert_eq!(state.players[Slot::A], Some(host.participant()));
    assert_eq!(state.players[Slot::B], Some(guest.participant()));

    assert!(host.is_my_turn());
    assert!(!guest.is_my_turn());
    assert_eq!(guest.last_message(), Some("Round 1 started!"));
}

/// Test that joining missing, full or second matches fails.
#[test]
fn test_join_errors() {
    let (store, mut host, _guest, id) = seated();
    let mut third = DuelEngine::new(store.clone(), 33);

    let missing: MatchId = "ZZZZZZ".parse().unwrap();
    assert_ne!(missing, id);
    assert!(matches!(third.join_match(&missing), Err(DuelError::NotFound(_))));
    assert!(matches!(third.join_match(&id), Err(DuelError::Full(_))));
    assert!(third.match_id().is_none());

    assert!(matches!(host.join_match(&id), Err(DuelError::AlreadySeated(_))));
    assert!(matches!(
        host.create_match(RulesConfig::default()),
        Err(DuelError::AlreadySeated(_))
    ));
}

#[test]
fn test_invalid_rules_are_refused() {
    let store = Arc::new(MemoryStore::new());
    let mut host = DuelEngine::new(store.clone(), 1);

    let result = host.create_match(RulesConfig::default().with_hand_size(0));
    assert!(matches!(
        result,
        Err(DuelError::Config(ConfigError::Zero { field: "hand_size" }))
    ));
    assert!(store.is_empty());
}

#[test]
fn test_host_waits_until_joined() {
    let store = Arc::new(MemoryStore::new());
    let mut host = DuelEngine::new(store, 1);
    host.create_match(RulesConfig::default()).unwrap();

    let state = host.state().unwrap();
    assert!(!state.started);
    assert_eq!(state.phase, Phase::Waiting);
    assert!(state.hands[Slot::A].is_empty());
    assert_eq!(
        host.play_card(Card::new(1), CardPlay::Move).unwrap(),
        Outcome::Rejected(Rejection::NotStarted)
    );
}

#[test]
fn test_leave_match() {
    let (store, mut host, mut guest, _id) = seated();

    host.leave_match().unwrap();
    assert!(store.is_empty());
    assert!(host.match_id().is_none());
    assert!(host.state().is_none());
    assert!(matches!(
        host.play_card(Card::new(1), CardPlay::Move),
        Err(DuelError::NotSeated)
    ));

    // The document is already gone
    guest.leave_match().unwrap();
    assert!(matches!(guest.leave_match(), Err(DuelError::NotSeated)));
}

// =============================================================================
// Turn actions
// =============================================================================

#[test]
fn test_off_turn_action_writes_nothing() {
    let (store, _host, mut guest, id) = seated();
    let before = store.get(&id).unwrap();

    let outcome = guest.play_card(Card::new(1), CardPlay::Move).unwrap();
    assert_eq!(outcome, Outcome::Rejected(Rejection::NotYourTurn(Slot::B)));
    assert_eq!(store.get(&id).unwrap(), before);
}

#[test]
fn test_applied_action_reaches_opponent() {
    let (_store, mut host, mut guest, _id) = seated();

    let Some(Action::PlayCard { card, play }) = host.legal_actions().first().cloned() else {
        panic!("host should open with a card play");
    };
    assert_eq!(play, CardPlay::Move);
    assert!(host.can_move_forward(card));
    assert!(host.play_card(card, play).unwrap().is_applied());

    assert!(guest.poll().unwrap());
    assert!(!guest.poll().unwrap());
    let state = guest.state().unwrap();
    assert_eq!(state.positions[Slot::A], card.reach());
    assert_eq!(state.hands[Slot::A].len(), 5);
    assert_eq!(state.card_count(), 25);
    assert!(guest.is_my_turn());
    assert!(!host.is_my_turn());
}

/// Test that acknowledging a round end lets the turn holder deal.
#[test]
fn test_hit_then_acknowledged_round_is_dealt() {
    let (store, mut host, mut guest, id) = seated();
    host_can_strike(&store, &id, 0);
    host.poll().unwrap();

    assert!(host.can_attack(Card::new(3)));
    assert!(host.play_card(Card::new(3), CardPlay::Attack).unwrap().is_applied());
    assert!(host.finish_attack().unwrap().is_applied());

    guest.poll().unwrap();
    assert!(guest.is_my_turn());
    let attack = guest.state().unwrap().phase.attack().cloned().unwrap();
    assert!(!guest.can_parry(&attack));
    assert!(guest.parry_options(&attack).is_empty());
    assert_eq!(
        guest.parry(&[Card::new(3)]).unwrap(),
        Outcome::Rejected(Rejection::CardsNotInHand)
    );
    assert!(guest.fail_parry().unwrap().is_applied());

    host.poll().unwrap();
    let state = host.state().unwrap();
    assert_eq!(state.scores[Slot::A], 1);
    assert_eq!(state.round, 2);
    assert!(state.round_ended);
    assert!(state.hands[Slot::A].is_empty());

    // The guest holds the turn, so its acknowledgement also deals
    assert!(guest.acknowledge_round_end().unwrap());
    host.poll().unwrap();
    let state = host.state().unwrap();
    assert!(!state.round_ended);
    assert_eq!(state.hands[Slot::A].len(), 5);
    assert_eq!(state.hands[Slot::B].len(), 5);
    assert_eq!(state.positions, SlotMap::from_pair(0, 18));
    assert_eq!(state.card_count(), 25);
    assert_eq!(host.last_message(), Some("Round 2 started!"));

    assert!(!host.acknowledge_round_end().unwrap());
}

#[test]
fn test_winning_hit_ends_match() {
    let (store, mut host, mut guest, id) = seated();
    host_can_strike(&store, &id, 4);

    host.play_card(Card::new(3), CardPlay::Attack).unwrap();
    host.finish_attack().unwrap();
    assert!(guest.fail_parry().unwrap().is_applied());

    host.poll().unwrap();
    let state = host.state().unwrap();
    assert_eq!(state.phase, Phase::GameOver);
    assert_eq!(state.winner(), Some(Slot::A));
    assert_eq!(state.round, 1);
    assert_eq!(host.last_message(), Some("Player A wins the game!"));
    assert!(host.legal_actions().is_empty());

    assert!(guest.acknowledge_round_end().unwrap());
    assert_eq!(
        guest.play_card(Card::new(2), CardPlay::Move).unwrap(),
        Outcome::Rejected(Rejection::GameOver)
    );
    host.poll().unwrap();
    assert_eq!(host.state().unwrap().round, 1);
}

// =============================================================================
// Store races
// =============================================================================

#[test]
fn test_stale_write_is_a_conflict() {
    let (store, _host, _guest, id) = seated();
    let read = store.get(&id).unwrap();
    let update = StateUpdate {
        turn: Some(Slot::B),
        ..StateUpdate::default()
    };

    store
        .update(&id, &update, Precondition::Revision(read.revision))
        .unwrap();
    let err = store
        .update(&id, &update, Precondition::Revision(read.revision))
        .unwrap_err();

    assert!(matches!(err, StoreError::Conflict { .. }));
    assert!(DuelError::from(err).is_conflict());
}

/// Test that two deals computed from one revision cannot both be written.
#[test]
fn test_racing_deals_only_one_lands() {
    let store = MemoryStore::new();
    let id: MatchId = "RACE01".parse().unwrap();
    let rules = RulesConfig::default();
    let mut state = MatchState::with_deck(
        ParticipantId::from_uuid(Uuid::from_u128(1)),
        rules.clone(),
        duel_engine::core::card::ordered_deck(&rules),
    );
    state.players[Slot::B] = Some(ParticipantId::from_uuid(Uuid::from_u128(2)));
    state.started = true;
    let revision = store.create(&id, state.clone()).unwrap();

    let mut first = state.clone();
    DuelRules.start_new_round(&mut first, Slot::A).unwrap();
    let mut second = state.clone();
    DuelRules.start_new_round(&mut second, Slot::A).unwrap();

    let condition = Precondition::Revision(revision);
    store
        .update(&id, &StateUpdate::diff(&state, &first), condition)
        .unwrap();
    assert!(matches!(
        store.update(&id, &StateUpdate::diff(&state, &second), condition),
        Err(StoreError::Conflict { .. })
    ));

    let stored = store.get(&id).unwrap().value;
    assert_eq!(stored.hands[Slot::A].len(), 5);
    assert_eq!(stored.card_count(), 25);
}

#[test]
fn test_update_carries_only_changed_fields() {
    let (store, mut host, _guest, id) = seated();
    let before = store.get(&id).unwrap().value;

    let Some(Action::PlayCard { card, play }) = host.legal_actions().first().cloned() else {
        panic!("host should open with a card play");
    };
    host.play_card(card, play).unwrap();
    let after = store.get(&id).unwrap().value;

    let update = StateUpdate::diff(&before, &after);
    let json = serde_json::to_value(&update).unwrap();
    assert_eq!(json["turn"], "B");
    assert!(json["players"].is_null());
    assert!(json["scores"].is_null());
    assert!(json["action_log"].is_array());
    assert!(update.field_names().contains(&"positions"));
}
