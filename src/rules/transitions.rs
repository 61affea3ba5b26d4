//! State transitions for every duel action.
//!
//! Each transition validates before it mutates, but callers still go
//! through `RulesEngine::apply_action`, which runs it on a copy.

use crate::core::card::{refill, shuffled_deck, take_card, take_cards};
use crate::core::{
    Action, AttackRecord, Card, CardPlay, GameRng, LastCardPlayed, MatchState, Phase, Slot,
};

use super::engine::DuelRules;
use super::legality::{self, backward_target, check_attack, forward_target};
use super::rejection::Rejection;

fn wrong_phase(expected: &'static str, state: &MatchState) -> Rejection {
    Rejection::WrongPhase {
        expected,
        actual: state.phase.name(),
    }
}

/// Common gate for turn actions.
fn check_turn(state: &MatchState, actor: Slot) -> Result<(), Rejection> {
    if state.phase == Phase::GameOver {
        return Err(Rejection::GameOver);
    }
    if !state.started || state.phase == Phase::Waiting {
        return Err(Rejection::NotStarted);
    }
    if state.round_ended {
        return Err(Rejection::RoundEndPending);
    }
    if !state.is_turn_of(actor) {
        return Err(Rejection::NotYourTurn(actor));
    }
    Ok(())
}

fn discard_attack(state: &mut MatchState, attack: &AttackRecord) {
    state.discard.extend(attack.cards.iter().copied());
}

fn refill_hand(state: &mut MatchState, slot: Slot) {
    let hand_size = state.rules.hand_size;
    refill(&mut state.hands[slot], &mut state.deck, hand_size);
}

impl DuelRules {
    pub(crate) fn transition(
        &self,
        state: &mut MatchState,
        actor: Slot,
        action: &Action,
        rng: &mut GameRng,
    ) -> Result<(), Rejection> {
        check_turn(state, actor)?;

        match action {
            Action::PlayCard { card, play } => self.play_card(state, actor, *card, *play),
            Action::StrengthenAttack(card) => self.strengthen_attack(state, actor, *card),
            Action::FinishAttack => self.finish_attack(state, actor),
            Action::Parry(cards) => self.parry(state, actor, cards),
            Action::FailParry => self.fail_parry(state, rng),
            Action::Riposte(card) => self.riposte(state, actor, *card, rng),
            Action::DeclineRiposte => self.decline_riposte(state, actor),
            Action::AdvanceAttack(card) => self.advance_attack(state, actor, *card),
            Action::RetreatFromAdvanceAttack => self.retreat_from_advance_attack(state, actor),
        }
    }

    /// Target square of an advance, provided a card left in hand can strike from there.
    pub(crate) fn check_advance(
        &self,
        state: &MatchState,
        slot: Slot,
        card: Card,
    ) -> Result<i32, Rejection> {
        let target = forward_target(state, slot, card)?;
        let distance = (state.positions[slot.opponent()] - target).abs();
        let mut remaining = state.hands[slot].clone();
        take_card(&mut remaining, card);
        if remaining.iter().any(|c| c.reach() == distance) {
            Ok(target)
        } else {
            Err(Rejection::NoFollowUpAttack)
        }
    }

    fn play_card(
        &self,
        state: &mut MatchState,
        actor: Slot,
        card: Card,
        play: CardPlay,
    ) -> Result<(), Rejection> {
        if state.phase != Phase::Playing {
            return Err(wrong_phase("playing", state));
        }
        if !state.hands[actor].contains(&card) {
            return Err(Rejection::CardNotInHand(card));
        }

        match play {
            CardPlay::Move => {
                let target = forward_target(state, actor, card)?;
                take_card(&mut state.hands[actor], card);
                state.discard.push(card);
                state.positions[actor] = target;
                state.log(Some(actor), format!("{actor} moved {card} spaces (card {card})"));
                refill_hand(state, actor);
                state.turn = actor.opponent();
            }
            CardPlay::MoveBackward => {
                if !state.rules.allows_backward_move() {
                    return Err(Rejection::RulesetDisabled("moving backward"));
                }
                let target = backward_target(state, actor, card)?;
                take_card(&mut state.hands[actor], card);
                state.discard.push(card);
                state.positions[actor] = target;
                state.log(Some(actor), format!("{actor} moved back to {target} (card {card})"));
                refill_hand(state, actor);
                state.turn = actor.opponent();
            }
            CardPlay::Attack => {
                check_attack(state, card)?;
                take_card(&mut state.hands[actor], card);
                state.phase = Phase::Attacking(AttackRecord::new(actor, card, false));
                state.log(Some(actor), format!("{actor} attacks with card {card}!"));
            }
            CardPlay::Advance => {
                if !state.rules.allows_advance() {
                    return Err(Rejection::RulesetDisabled("advance and attack"));
                }
                let target = self.check_advance(state, actor, card)?;
                take_card(&mut state.hands[actor], card);
                state.discard.push(card);
                state.positions[actor] = target;
                state.phase = Phase::AdvanceAttack { attacker: actor };
                state.log(Some(actor), format!("{actor} advances {card} spaces (card {card})"));
            }
        }

        state.last_card_played = Some(LastCardPlayed {
            slot: actor,
            card,
            play,
        });
        Ok(())
    }

    fn strengthen_attack(
        &self,
        state: &mut MatchState,
        actor: Slot,
        card: Card,
    ) -> Result<(), Rejection> {
        let actual = state.phase.name();
        let Phase::Attacking(attack) = &mut state.phase else {
            return Err(Rejection::WrongPhase {
                expected: "attacking",
                actual,
            });
        };
        if attack.attacker != actor {
            return Err(Rejection::NotAttacker(attack.attacker));
        }
        let lead = attack.lead_card().unwrap_or(card);
        if card != lead {
            return Err(Rejection::StrengthenMismatch { lead });
        }
        if !take_card(&mut state.hands[actor], card) {
            return Err(Rejection::CardNotInHand(card));
        }
        attack.strengthen(card);
        let total = attack.total_value;

        state.log(
            Some(actor),
            format!("{actor} strengthens attack with card {card} (total: {total})"),
        );
        Ok(())
    }

    fn finish_attack(&self, state: &mut MatchState, actor: Slot) -> Result<(), Rejection> {
        let Phase::Attacking(attack) = &state.phase else {
            return Err(wrong_phase("attacking", state));
        };
        if attack.attacker != actor {
            return Err(Rejection::NotAttacker(attack.attacker));
        }
        let attack = attack.clone();

        refill_hand(state, actor);
        state.log(
            Some(actor),
            format!(
                "{actor} commits {} card(s) totalling {}",
                attack.card_count, attack.total_value
            ),
        );
        state.turn = attack.defender();
        state.phase = Phase::Parrying(attack);
        Ok(())
    }

    fn parry(&self, state: &mut MatchState, actor: Slot, cards: &[Card]) -> Result<(), Rejection> {
        let Phase::Parrying(attack) = &state.phase else {
            return Err(wrong_phase("parrying", state));
        };
        let attack = attack.clone();

        let got_total: u32 = cards.iter().map(|c| u32::from(c.value())).sum();
        if cards.len() != attack.card_count || got_total != attack.total_value {
            return Err(Rejection::ParryMismatch {
                count: attack.card_count,
                total: attack.total_value,
                got_count: cards.len(),
                got_total,
            });
        }
        if !take_cards(&mut state.hands[actor], cards) {
            return Err(Rejection::CardsNotInHand);
        }
        state.discard.extend_from_slice(cards);
        refill_hand(state, actor);

        if state.rules.allows_riposte() && legality::holds_distance_card(state, actor) {
            state.log(Some(actor), format!("{actor} parries successfully! Riposte available"));
            state.phase = Phase::Riposte(attack);
        } else {
            state.log(Some(actor), format!("{actor} parries successfully!"));
            discard_attack(state, &attack);
            state.phase = Phase::Playing;
        }
        Ok(())
    }

    fn fail_parry(&self, state: &mut MatchState, rng: &mut GameRng) -> Result<(), Rejection> {
        let Phase::Parrying(attack) = &state.phase else {
            return Err(wrong_phase("parrying", state));
        };
        let attack = attack.clone();

        state.log(
            Some(attack.defender()),
            format!(
                "{} fails to parry. {} scores a hit!",
                attack.defender(),
                attack.attacker
            ),
        );
        discard_attack(state, &attack);
        state.phase = Phase::Playing;
        self.score_hit(state, attack.attacker, rng);
        Ok(())
    }

    fn riposte(
        &self,
        state: &mut MatchState,
        actor: Slot,
        card: Card,
        rng: &mut GameRng,
    ) -> Result<(), Rejection> {
        let Phase::Riposte(attack) = &state.phase else {
            return Err(wrong_phase("riposte", state));
        };
        let attack = attack.clone();

        check_attack(state, card)?;
        if !take_card(&mut state.hands[actor], card) {
            return Err(Rejection::CardNotInHand(card));
        }
        state.discard.push(card);
        discard_attack(state, &attack);
        refill_hand(state, actor);
        state.phase = Phase::Playing;
        state.log(Some(actor), format!("{actor} ripostes with card {card}!"));
        self.score_hit(state, actor, rng);
        Ok(())
    }

    fn decline_riposte(&self, state: &mut MatchState, actor: Slot) -> Result<(), Rejection> {
        let Phase::Riposte(attack) = &state.phase else {
            return Err(wrong_phase("riposte", state));
        };
        let attack = attack.clone();

        discard_attack(state, &attack);
        state.phase = Phase::Playing;
        state.log(Some(actor), format!("{actor} lets the riposte pass"));
        Ok(())
    }

    fn advance_attack(&self, state: &mut MatchState, actor: Slot, card: Card) -> Result<(), Rejection> {
        let Phase::AdvanceAttack { attacker } = state.phase else {
            return Err(wrong_phase("advance attack", state));
        };
        if attacker != actor {
            return Err(Rejection::NotAttacker(attacker));
        }
        check_attack(state, card)?;
        if !take_card(&mut state.hands[actor], card) {
            return Err(Rejection::CardNotInHand(card));
        }

        state.phase = Phase::Attacking(AttackRecord::new(actor, card, true));
        state.log(
            Some(actor),
            format!("{actor} attacks with card {card} (Advance and Attack)!"),
        );
        Ok(())
    }

    fn retreat_from_advance_attack(&self, state: &mut MatchState, actor: Slot) -> Result<(), Rejection> {
        if !state.rules.allows_advance() {
            return Err(Rejection::RulesetDisabled("retreating"));
        }
        let Phase::Parrying(attack) = &state.phase else {
            return Err(wrong_phase("parrying", state));
        };
        if !attack.is_advance {
            return Err(Rejection::NotAdvanceAttack);
        }
        let attack = attack.clone();

        let track_max = state.rules.track_max;
        let position = &mut state.positions[actor];
        *position = (*position - actor.forward()).clamp(0, track_max);

        discard_attack(state, &attack);
        state.phase = Phase::Playing;
        state.turn = actor.opponent();
        state.log(Some(actor), format!("{actor} retreats from advance attack"));
        Ok(())
    }

    /// Award a hit to `winner` and either end the match or reset for the next round.
    pub fn score_hit(&self, state: &mut MatchState, winner: Slot, rng: &mut GameRng) {
        state.scores[winner] += 1;
        let score = state.scores[winner];

        if score >= state.rules.winning_score {
            state.phase = Phase::GameOver;
            state.log(Some(winner), format!("{winner} wins the game!"));
            tracing::info!(%winner, round = state.round, "match won");
        } else {
            let (a, b) = (state.scores[Slot::A], state.scores[Slot::B]);
            state.log(
                Some(winner),
                format!("{winner} wins the round! Score: Player A: {a}, Player B: {b}"),
            );
            tracing::info!(%winner, round = state.round, a, b, "round won");

            state.round += 1;
            state.deck = shuffled_deck(&state.rules, rng);
            for hand in [Slot::A, Slot::B] {
                state.hands[hand].clear();
            }
            state.discard.clear();
            state.phase = Phase::Playing;
        }
        state.round_ended = true;
    }

    /// Deal a fresh round. Only the turn holder deals, and only when the round is undealt.
    pub fn start_new_round(&self, state: &mut MatchState, actor: Slot) -> Result<(), Rejection> {
        if state.phase == Phase::GameOver {
            return Err(Rejection::GameOver);
        }
        if !state.started {
            return Err(Rejection::NotStarted);
        }
        if state.round_ended {
            return Err(Rejection::RoundEndPending);
        }
        if !state.is_undealt() {
            return Err(Rejection::AlreadyDealt);
        }
        if !state.is_turn_of(actor) {
            return Err(Rejection::NotYourTurn(actor));
        }

        let track_max = state.rules.track_max;
        for slot in Slot::ALL {
            state.positions[slot] = slot.home(track_max);
        }
        state.phase = Phase::Playing;
        state.last_card_played = None;

        for _ in 0..state.rules.hand_size {
            for slot in Slot::ALL {
                if state.hands[slot].len() < state.rules.hand_size {
                    if let Some(card) = state.deck.pop() {
                        state.hands[slot].push(card);
                    }
                }
            }
        }

        let round = state.round;
        state.log(None, format!("Round {round} started!"));
        Ok(())
    }

    /// Clear the round-ended flag. Returns whether it was set.
    pub fn acknowledge_round_end(&self, state: &mut MatchState) -> bool {
        std::mem::replace(&mut state.round_ended, false)
    }
}
