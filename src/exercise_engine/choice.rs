//! Random selection helpers layered on a caller-supplied random source.
//!
//! Everything here is generic over `R: Rng` so the same helpers serve the
//! generation context and plain tests. None of them keep a random source of
//! their own; the caller's stream is the only source of entropy.

use rand::Rng;

use crate::exercise_engine::error::{Error, Result};

/// Pick one option uniformly. Returns `None` (without drawing) for an empty slice.
pub fn choose<'o, T, R: Rng + ?Sized>(rng: &mut R, options: &'o [T]) -> Option<&'o T> {
    if options.is_empty() {
        return None;
    }
    Some(&options[rng.gen_range(0..options.len())])
}

/// Return `a` with probability `p`, otherwise `b`. Always consumes one draw.
pub fn choose_with_prob<T, R: Rng + ?Sized>(rng: &mut R, p: f64, a: T, b: T) -> T {
    if rng.gen::<f64>() < p {
        a
    } else {
        b
    }
}

// ---------------------------------------------------------------------------
// ChoiceDeck
// ---------------------------------------------------------------------------

/// Shuffle-without-replacement sampler.
///
/// Candidates are dealt from a shuffled copy; when the copy runs out it is
/// refilled and reshuffled. Every window of `len()` draws aligned to a refill
/// contains each candidate exactly once, so the gap between two draws of the
/// same candidate is at most `2 * len() - 1`.
#[derive(Debug, Clone)]
pub struct ChoiceDeck<T: Clone> {
    candidates: Vec<T>,
    cards: Vec<T>,
    cursor: usize,
}

impl<T: Clone> ChoiceDeck<T> {
    pub fn new(candidates: Vec<T>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(Error::Precondition("choice deck needs at least one candidate".into()));
        }
        Ok(ChoiceDeck { candidates, cards: Vec::new(), cursor: 0 })
    }

    /// Deal the next candidate, reshuffling a fresh copy when exhausted.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> T {
        if self.cursor >= self.cards.len() {
            self.refill(rng);
        }
        let card = self.cards[self.cursor].clone();
        self.cursor += 1;
        card
    }

    fn refill<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.clear();
        self.cards.extend(self.candidates.iter().cloned());
        // Fisher-Yates shuffle
        for i in (1..self.cards.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.cards.swap(i, j);
        }
        self.cursor = 0;
    }

    /// Number of distinct slots in one full pass.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Draws left before the next reshuffle.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }
}

// ---------------------------------------------------------------------------
// WeightedChoices
// ---------------------------------------------------------------------------

/// Discrete sampler picking entries in proportion to integer weights.
#[derive(Debug, Clone)]
pub struct WeightedChoices<T> {
    entries: Vec<(T, u32)>,
    total: u64,
}

impl<T> WeightedChoices<T> {
    /// Fails when the weights sum to zero, since nothing could ever be chosen.
    pub fn new(entries: Vec<(T, u32)>) -> Result<Self> {
        let total: u64 = entries.iter().map(|(_, w)| u64::from(*w)).sum();
        if total == 0 {
            return Err(Error::Precondition(
                "weighted choices need a positive total weight".into(),
            ));
        }
        Ok(WeightedChoices { entries, total })
    }

    pub fn total_weight(&self) -> u64 {
        self.total
    }

    /// Draw once and scan, subtracting weights until the remainder reaches zero.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        let mut remaining = rng.gen_range(1..=self.total) as i64;
        for (entry, weight) in &self.entries {
            remaining -= i64::from(*weight);
            if remaining <= 0 {
                return entry;
            }
        }
        unreachable!("weighted scan exhausted with {remaining} left of {}", self.total)
    }
}
