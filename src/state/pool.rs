//! Number pool for a draw session.
//!
//! Holds the fixed range, the set of numbers already drawn, and the
//! unique-pick algorithm. Nothing here knows about session lifecycle.

use std::collections::BTreeSet;

use rand::Rng;

/// Smallest number on a ball.
pub const RANGE_MIN: u8 = 1;

/// Largest number on a ball. Also the pool size.
pub const RANGE_MAX: u8 = 90;

/// Number of balls in a full pool.
pub const POOL_SIZE: usize = (RANGE_MAX - RANGE_MIN + 1) as usize;

/// Check if a value is a valid ball number.
pub fn in_range(value: u8) -> bool {
    (RANGE_MIN..=RANGE_MAX).contains(&value)
}

/// Set of numbers already drawn in the current session.
///
/// Iterates in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawnSet {
    values: BTreeSet<u8>,
}

impl DrawnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a drawn value.
    ///
    /// Returns `false` if the value was already present or is out of range.
    pub fn insert(&mut self, value: u8) -> bool {
        in_range(value) && self.values.insert(value)
    }

    pub fn contains(&self, value: u8) -> bool {
        self.values.contains(&value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numbers left in the pool.
    pub fn remaining(&self) -> usize {
        POOL_SIZE - self.values.len()
    }

    /// Check if every number in the range has been drawn.
    pub fn is_exhausted(&self) -> bool {
        self.values.len() >= POOL_SIZE
    }

    /// Drawn values in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.values.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.iter().collect()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Pick a number uniformly from the values not yet in `drawn`.
///
/// Samples the full range and resamples while the candidate is already
/// drawn. Returns `None` when the pool is empty, without touching `rng`.
pub fn pick_unique<R: Rng + ?Sized>(rng: &mut R, drawn: &DrawnSet) -> Option<u8> {
    if drawn.is_exhausted() {
        return None;
    }

    let mut attempts: u32 = 0;
    loop {
        let candidate = rng.gen_range(RANGE_MIN..=RANGE_MAX);
        attempts += 1;
        if !drawn.contains(candidate) {
            tracing::trace!(candidate, attempts, "picked unique number");
            return Some(candidate);
        }
    }
}
