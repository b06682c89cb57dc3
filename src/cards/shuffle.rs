use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::card::Card;

/// Source of swap indices for [`shuffle`].
///
/// Implementations must return a value in `[0, upper)`; `upper` is always at
/// least 1.
pub trait ShuffleSource: Send + Sync {
    fn index_below(&self, upper: usize) -> usize;
}

/// Unseeded, thread-local randomness. Used by the running server.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl ShuffleSource for ThreadRandom {
    fn index_below(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Reproducible randomness from a fixed seed.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ShuffleSource for SeededRandom {
    fn index_below(&self, upper: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..upper)
    }
}

/// Shuffles `items` in place, calling `place` with the new index of both
/// elements touched by every swap.
///
/// The pivot walks from the last index down to 1 and its partner is drawn
/// from `[0, i)`, never `i` itself. Index 0 is only ever a swap target, so at
/// `i == 1` the first two elements always trade places.
pub fn shuffle<T, F>(items: &mut [T], source: &dyn ShuffleSource, mut place: F)
where
    F: FnMut(&mut T, usize),
{
    for i in (1..items.len()).rev() {
        let j = source.index_below(i);
        items.swap(i, j);
        place(&mut items[i], i);
        place(&mut items[j], j);
    }
}

/// Shuffles cards and keeps each card's `order` equal to its index.
pub fn shuffle_cards(cards: &mut [Card], source: &dyn ShuffleSource) {
    shuffle(cards, source, |card, index| card.order = index);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always picks the lowest index and counts how often it was asked.
    #[derive(Default)]
    pub(crate) struct LowestIndex {
        pub calls: AtomicUsize,
    }

    impl ShuffleSource for LowestIndex {
        fn index_below(&self, _upper: usize) -> usize {
            self.calls.fetch_add(1, Ordering::SeqCst);
            0
        }
    }

    #[test]
    fn test_empty_and_single_are_untouched() {
        let source = LowestIndex::default();
        let mut empty: Vec<u8> = vec![];
        shuffle(&mut empty, &source, |_, _| {});
        let mut single = vec![7];
        shuffle(&mut single, &source, |_, _| panic!("nothing to place"));
        assert_eq!(single, vec![7]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_two_elements_always_swap() {
        for seed in 0..20 {
            let mut pair = vec!['a', 'b'];
            shuffle(&mut pair, &SeededRandom::new(seed), |_, _| {});
            assert_eq!(pair, vec!['b', 'a']);
        }
    }

    #[test]
    fn test_pivot_never_stays_in_place() {
        // Partners come from [0, i), so the result has no fixed points.
        for seed in 0..50 {
            let mut items: Vec<usize> = (0..10).collect();
            shuffle(&mut items, &SeededRandom::new(seed), |_, _| {});
            for (index, item) in items.iter().enumerate() {
                assert_ne!(index, *item);
            }
        }
    }

    #[test]
    fn test_lowest_index_rotates_left() {
        let source = LowestIndex::default();
        let mut items = vec![0, 1, 2, 3];
        shuffle(&mut items, &source, |_, _| {});
        assert_eq!(items, vec![1, 2, 3, 0]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_shuffle_is_permutation_with_matching_orders() {
        let mut cards = Card::full_sets(2);
        shuffle_cards(&mut cards, &SeededRandom::new(42));

        let mut codes: Vec<String> = cards.iter().map(|c| c.code.clone()).collect();
        codes.sort();
        let mut expected: Vec<String> = Card::full_sets(2).into_iter().map(|c| c.code).collect();
        expected.sort();
        assert_eq!(codes, expected);

        for (index, card) in cards.iter().enumerate() {
            assert_eq!(card.order, index);
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let mut first: Vec<u32> = (0..52).collect();
        let mut second = first.clone();
        shuffle(&mut first, &SeededRandom::new(9), |_, _| {});
        shuffle(&mut second, &SeededRandom::new(9), |_, _| {});
        assert_eq!(first, second);
    }
}
