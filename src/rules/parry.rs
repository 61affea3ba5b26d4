//! Parry search: which cards in hand can answer an attack.
//!
//! A parry must use exactly as many cards as the attack and match its
//! total. Hands hold at most a handful of cards, so an exhaustive walk
//! over index combinations is both correct and fast.

use smallvec::SmallVec;

use crate::core::{Card, Hand};

/// Iterator over all `k`-element index combinations of `0..n`, in lexicographic order.
pub struct Combinations {
    n: usize,
    indices: SmallVec<[usize; 8]>,
    first: bool,
    done: bool,
}

impl Combinations {
    /// Combinations of `k` indices out of `n`. Yields nothing when `k > n`.
    #[must_use]
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            first: true,
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = SmallVec<[usize; 8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.first {
            self.first = false;
            return Some(self.indices.clone());
        }

        let k = self.indices.len();
        // Rightmost index that can still move right
        let pivot = (0..k).rev().find(|&i| self.indices[i] < self.n - k + i);
        match pivot {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                Some(self.indices.clone())
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

fn sum(cards: impl IntoIterator<Item = Card>) -> u32 {
    cards.into_iter().map(|c| u32::from(c.value())).sum()
}

/// First combination of exactly `count` cards from `hand` summing to `total`.
///
/// Returns `None` (never panics) when the hand is too small or no subset fits.
#[must_use]
pub fn find_parry(hand: &[Card], count: usize, total: u32) -> Option<Hand> {
    if count == 0 {
        return None;
    }
    Combinations::new(hand.len(), count)
        .find(|combo| sum(combo.iter().map(|&i| hand[i])) == total)
        .map(|combo| combo.iter().map(|&i| hand[i]).collect())
}

/// Whether some subset of exactly `count` cards from `hand` sums to `total`.
///
/// ```
/// use duel_engine::core::Card;
/// use duel_engine::rules::parry::can_parry_with;
///
/// let hand = [Card::new(1), Card::new(2)];
/// assert!(!can_parry_with(&hand, 1, 3));
/// assert!(can_parry_with(&hand, 2, 3));
/// ```
#[must_use]
pub fn can_parry_with(hand: &[Card], count: usize, total: u32) -> bool {
    find_parry(hand, count, total).is_some()
}

/// Every distinct multiset of `count` cards from `hand` summing to `total`, each sorted ascending.
#[must_use]
pub fn parry_options(hand: &[Card], count: usize, total: u32) -> Vec<Hand> {
    if count == 0 {
        return Vec::new();
    }
    let mut options: Vec<Hand> = Vec::new();
    for combo in Combinations::new(hand.len(), count) {
        let mut cards: Hand = combo.iter().map(|&i| hand[i]).collect();
        if sum(cards.iter().copied()) != total {
            continue;
        }
        cards.sort_unstable();
        if !options.contains(&cards) {
            options.push(cards);
        }
    }
    options
}
