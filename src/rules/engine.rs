//! Rules engine trait and the duel implementation.
//!
//! `RulesEngine` is the seam between the state machine and whatever
//! drives it (the `DuelEngine` over a store, tests, bots):
//! - What actions are legal
//! - How actions modify state
//! - Win conditions

use crate::core::{Action, CardPlay, GameRng, MatchState, Phase, Slot};

use super::legality;
use super::parry;
use super::rejection::Rejection;

/// Result of a completed match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Winner(Slot),
}

impl GameResult {
    /// Check if a slot won.
    #[must_use]
    pub fn is_winner(&self, slot: Slot) -> bool {
        match self {
            GameResult::Winner(s) => *s == slot,
        }
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_actions`: Return empty vec if the slot can't act
/// - `apply_action`: On `Err`, `state` must be unchanged
/// - `is_terminal`: Return None if the match continues
pub trait RulesEngine {
    /// Enumerate every legal action for `slot`.
    fn legal_actions(&self, state: &MatchState, slot: Slot) -> Vec<Action>;

    /// Apply an action taken by `actor`.
    fn apply_action(
        &self,
        state: &mut MatchState,
        actor: Slot,
        action: &Action,
        rng: &mut GameRng,
    ) -> Result<(), Rejection>;

    /// Check if the match is over.
    fn is_terminal(&self, state: &MatchState) -> Option<GameResult>;
}

/// The duel state machine. Stateless: rule numbers live in each `MatchState`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DuelRules;

impl DuelRules {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RulesEngine for DuelRules {
    fn legal_actions(&self, state: &MatchState, slot: Slot) -> Vec<Action> {
        let mut actions = Vec::new();
        if !state.started || state.round_ended || !state.is_turn_of(slot) {
            return actions;
        }

        let hand = &state.hands[slot];
        let mut distinct: Vec<_> = hand.to_vec();
        distinct.sort_unstable();
        distinct.dedup();

        match &state.phase {
            Phase::Playing => {
                for &card in &distinct {
                    if legality::can_move_forward(state, slot, card) {
                        actions.push(Action::PlayCard { card, play: CardPlay::Move });
                    }
                    if legality::can_move_backward(state, slot, card) {
                        actions.push(Action::PlayCard { card, play: CardPlay::MoveBackward });
                    }
                    if legality::can_attack(state, card) {
                        actions.push(Action::PlayCard { card, play: CardPlay::Attack });
                    }
                    if state.rules.allows_advance() && self.check_advance(state, slot, card).is_ok() {
                        actions.push(Action::PlayCard { card, play: CardPlay::Advance });
                    }
                }
            }
            Phase::Attacking(attack) if attack.attacker == slot => {
                if let Some(lead) = attack.lead_card() {
                    if hand.contains(&lead) {
                        actions.push(Action::StrengthenAttack(lead));
                    }
                }
                actions.push(Action::FinishAttack);
            }
            Phase::Parrying(attack) => {
                for option in parry::parry_options(hand, attack.card_count, attack.total_value) {
                    actions.push(Action::Parry(option));
                }
                actions.push(Action::FailParry);
                if attack.is_advance && state.rules.allows_advance() {
                    actions.push(Action::RetreatFromAdvanceAttack);
                }
            }
            Phase::Riposte(_) => {
                for &card in &distinct {
                    if legality::check_attack(state, card).is_ok() {
                        actions.push(Action::Riposte(card));
                    }
                }
                actions.push(Action::DeclineRiposte);
            }
            Phase::AdvanceAttack { attacker } if *attacker == slot => {
                for &card in &distinct {
                    if legality::can_attack(state, card) {
                        actions.push(Action::AdvanceAttack(card));
                    }
                }
            }
            _ => {}
        }

        actions
    }

    fn apply_action(
        &self,
        state: &mut MatchState,
        actor: Slot,
        action: &Action,
        rng: &mut GameRng,
    ) -> Result<(), Rejection> {
        // Work on a copy so a rejection mid-transition leaves `state` untouched
        let mut next = state.clone();
        self.transition(&mut next, actor, action, rng)?;
        *state = next;
        Ok(())
    }

    fn is_terminal(&self, state: &MatchState) -> Option<GameResult> {
        state.winner().map(GameResult::Winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::Winner(Slot::B);
        assert!(!result.is_winner(Slot::A));
        assert!(result.is_winner(Slot::B));
    }
}
