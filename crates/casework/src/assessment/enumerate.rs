//! Enumeration of feasible intervention combinations.
//!
//! The space is bounded: at most `2^N` subsets for the `N` available flags,
//! further limited by the optional cap on simultaneous interventions. The
//! iterator is lazy and the enumerator can be walked any number of times,
//! always in the same order: ascending subset size, lexicographic within a
//! size. Ranking relies on that order to break ties consistently.

use super::domain::{InterventionCombination, InterventionKind};
use super::InvalidConfigError;

#[derive(Debug)]
pub struct CombinationEnumerator {
    flags: Vec<InterventionKind>,
    cap: usize,
}

impl CombinationEnumerator {
    pub fn new(
        flags: Vec<InterventionKind>,
        max_simultaneous: Option<usize>,
    ) -> Result<Self, InvalidConfigError> {
        let available = flags.len();
        let cap = max_simultaneous.unwrap_or(available);
        if cap > available {
            return Err(InvalidConfigError::MaxSimultaneousTooLarge {
                requested: cap,
                available,
            });
        }
        Ok(Self { flags, cap })
    }

    /// Enumerator over the full intervention catalog.
    pub fn all_interventions(
        max_simultaneous: Option<usize>,
    ) -> Result<Self, InvalidConfigError> {
        Self::new(InterventionKind::ALL.to_vec(), max_simultaneous)
    }

    /// Total number of combinations the iterator will yield.
    pub fn combination_count(&self) -> u64 {
        (0..=self.cap)
            .map(|size| binomial(self.flags.len() as u64, size as u64))
            .sum()
    }

    pub fn iter(&self) -> Combinations<'_> {
        Combinations {
            flags: &self.flags,
            cap: self.cap,
            indices: Vec::new(),
            done: false,
        }
    }
}

impl<'a> IntoIterator for &'a CombinationEnumerator {
    type Item = InterventionCombination;
    type IntoIter = Combinations<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy walk over subsets of the flag list.
pub struct Combinations<'a> {
    flags: &'a [InterventionKind],
    cap: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations<'_> {
    /// Advance `indices` to the next subset in (size, lexicographic) order.
    fn advance(&mut self) {
        let n = self.flags.len();
        let size = self.indices.len();

        let mut position = size;
        loop {
            if position == 0 {
                let next_size = size + 1;
                if next_size > self.cap || next_size > n {
                    self.done = true;
                } else {
                    self.indices = (0..next_size).collect();
                }
                return;
            }
            position -= 1;
            if self.indices[position] < n - (size - position) {
                self.indices[position] += 1;
                for follower in position + 1..size {
                    self.indices[follower] = self.indices[follower - 1] + 1;
                }
                return;
            }
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = InterventionCombination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let combination = InterventionCombination::new(
            self.indices.iter().map(|&slot| self.flags[slot]).collect(),
        );
        self.advance();
        Some(combination)
    }
}

fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result = 1u64;
    for step in 0..k {
        result = result * (n - step) / (step + 1);
    }
    result
}
