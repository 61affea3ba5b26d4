//! Card values, hands and the shared draw pile.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::config::RulesConfig;
use super::rng::GameRng;

/// A numbered card. Its value is both a movement distance and a strike length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card(pub u8);

impl Card {
    /// Create a card with the given value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// The card's face value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The face value as a track distance.
    #[must_use]
    pub const fn reach(self) -> i32 {
        self.0 as i32
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player's hand. Duplicates allowed; capacity covers the usual five cards inline.
pub type Hand = SmallVec<[Card; 5]>;

/// Build a fresh, shuffled deck for the given rules.
///
/// Holds `copies_per_value` copies of each value `1..=max_card_value`.
#[must_use]
pub fn shuffled_deck(rules: &RulesConfig, rng: &mut GameRng) -> Vec<Card> {
    let mut deck = ordered_deck(rules);
    rng.shuffle(&mut deck);
    deck
}

/// Build an unshuffled deck: all copies of 1, then all copies of 2, and so on.
#[must_use]
pub fn ordered_deck(rules: &RulesConfig) -> Vec<Card> {
    (1..=rules.max_card_value)
        .flat_map(|value| std::iter::repeat(Card(value)).take(rules.copies_per_value))
        .collect()
}

/// Remove one copy of `card` from `hand`. Returns false if absent.
pub fn take_card(hand: &mut Hand, card: Card) -> bool {
    match hand.iter().position(|&c| c == card) {
        Some(idx) => {
            hand.remove(idx);
            true
        }
        None => false,
    }
}

/// Remove every card in `cards` from `hand` as a multiset.
///
/// Leaves `hand` untouched and returns false unless all are present.
pub fn take_cards(hand: &mut Hand, cards: &[Card]) -> bool {
    let mut remaining = hand.clone();
    for &card in cards {
        if !take_card(&mut remaining, card) {
            return false;
        }
    }
    *hand = remaining;
    true
}

/// Draw from the end of `deck` until `hand` holds `hand_size` cards or the deck runs out.
pub fn refill(hand: &mut Hand, deck: &mut Vec<Card>, hand_size: usize) {
    while hand.len() < hand_size {
        match deck.pop() {
            Some(card) => hand.push(card),
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_ordered_deck() {
        let deck = ordered_deck(&RulesConfig::default());
        assert_eq!(deck.len(), 25);
        assert_eq!(&deck[..6], &[Card(1), Card(1), Card(1), Card(1), Card(1), Card(2)]);
        for value in 1..=5 {
            assert_eq!(deck.iter().filter(|c| c.value() == value).count(), 5);
        }
    }

    #[test]
    fn test_shuffled_deck_is_permutation() {
        let rules = RulesConfig::default();
        let mut deck = shuffled_deck(&rules, &mut GameRng::new(9));
        deck.sort();
        assert_eq!(deck, ordered_deck(&rules));
    }

    #[test]
    fn test_take_cards_all_or_nothing() {
        let mut hand: Hand = smallvec![Card(2), Card(2), Card(3)];

        assert!(!take_cards(&mut hand, &[Card(2), Card(4)]));
        assert_eq!(hand.len(), 3);

        assert!(take_cards(&mut hand, &[Card(2), Card(2)]));
        assert_eq!(hand.as_slice(), &[Card(3)]);
    }

    #[test]
    fn test_refill_pops_from_end() {
        let mut hand: Hand = smallvec![Card(5)];
        let mut deck = vec![Card(1), Card(2), Card(3)];

        refill(&mut hand, &mut deck, 3);

        assert_eq!(hand.as_slice(), &[Card(5), Card(3), Card(2)]);
        assert_eq!(deck, vec![Card(1)]);
    }

    #[test]
    fn test_refill_short_deck() {
        let mut hand = Hand::new();
        let mut deck = vec![Card(4)];

        refill(&mut hand, &mut deck, 5);

        assert_eq!(hand.len(), 1);
        assert!(deck.is_empty());
    }
}
