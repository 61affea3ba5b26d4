//! Pure legality queries.
//!
//! Each query answers for a given slot against a given state without
//! mutating anything. They cover the geometry of a play only; turn and
//! phase gating happens in the transitions, which reuse these checks.

use crate::core::{AttackRecord, Card, MatchState, Slot};

use super::parry;
use super::rejection::Rejection;

/// Target position of a forward move, or why it is illegal.
pub fn forward_target(state: &MatchState, slot: Slot, card: Card) -> Result<i32, Rejection> {
    let target = state.positions[slot] + slot.forward() * card.reach();
    let opponent = state.positions[slot.opponent()];
    let blocked = match slot {
        Slot::A => target >= opponent,
        Slot::B => target <= opponent,
    };
    if target < 0 || target > state.rules.track_max {
        return Err(Rejection::OffTrack(target));
    }
    if blocked {
        return Err(Rejection::BlockedByOpponent);
    }
    Ok(target)
}

/// Target position of a backward move, clamped to the track.
///
/// Illegal only when the fighter already stands on their own track end.
pub fn backward_target(state: &MatchState, slot: Slot, card: Card) -> Result<i32, Rejection> {
    let current = state.positions[slot];
    let target = (current - slot.forward() * card.reach()).clamp(0, state.rules.track_max);
    if target == current {
        return Err(Rejection::AtTrackEnd);
    }
    Ok(target)
}

/// Whether `card` can strike from the current distance.
pub fn check_attack(state: &MatchState, card: Card) -> Result<(), Rejection> {
    let distance = state.distance();
    if distance != card.reach() {
        return Err(Rejection::DistanceMismatch { distance, card });
    }
    Ok(())
}

/// Whether `slot` may step forward by `card`.
#[must_use]
pub fn can_move_forward(state: &MatchState, slot: Slot, card: Card) -> bool {
    forward_target(state, slot, card).is_ok()
}

/// Whether `slot` may step backward by `card`.
#[must_use]
pub fn can_move_backward(state: &MatchState, slot: Slot, card: Card) -> bool {
    state.rules.allows_backward_move() && backward_target(state, slot, card).is_ok()
}

/// Whether `card` matches the current distance.
#[must_use]
pub fn can_attack(state: &MatchState, card: Card) -> bool {
    check_attack(state, card).is_ok()
}

/// Whether the defender's hand can answer `attack`.
#[must_use]
pub fn can_parry(state: &MatchState, attack: &AttackRecord) -> bool {
    parry::can_parry_with(
        &state.hands[attack.defender()],
        attack.card_count,
        attack.total_value,
    )
}

/// Whether `slot` holds a card equal to the current distance.
#[must_use]
pub fn can_riposte(state: &MatchState, slot: Slot) -> bool {
    state.rules.allows_riposte() && holds_distance_card(state, slot)
}

/// Whether advancing by `advance` would leave `attack` at exactly the striking distance.
#[must_use]
pub fn can_advance_and_attack(state: &MatchState, slot: Slot, advance: Card, attack: Card) -> bool {
    if !state.rules.allows_advance() {
        return false;
    }
    match forward_target(state, slot, advance) {
        Ok(target) => (state.positions[slot.opponent()] - target).abs() == attack.reach(),
        Err(_) => false,
    }
}

pub(crate) fn holds_distance_card(state: &MatchState, slot: Slot) -> bool {
    let distance = state.distance();
    state.hands[slot].iter().any(|c| c.reach() == distance)
}
