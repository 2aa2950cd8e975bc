//! Fixed-capacity record of every estimate produced by one solve.
//!
//! The capacity equals the iteration budget, so a solve that respects its budget can
//! never overflow the buffer. Overflowing it is a bug in the engine: `push` reports
//! [`CapacityError`] and trips a debug assertion.
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct CapacityError {
    pub capacity: usize,
    pub rejected: f64,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Iteration trace is full ({} entries), cannot append {}",
            self.capacity, self.rejected
        )
    }
}

impl std::error::Error for CapacityError {}

/// Ordered iterates `x_0 .. x_k` of one solve, `x_0` being the initial guess.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationTrace {
    values: Vec<f64>,
    capacity: usize,
}

/// most iterates reserved up front, the buffer grows past this on demand
pub(crate) const PREALLOCATED: usize = 4096;

impl IterationTrace {
    /// `capacity` is the logical limit checked by `push`, the allocation is made lazily.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity.min(PREALLOCATED)),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, value: f64) -> Result<(), CapacityError> {
        if self.values.len() >= self.capacity {
            debug_assert!(
                false,
                "iteration trace overflow: capacity {} exceeded",
                self.capacity
            );
            return Err(CapacityError {
                capacity: self.capacity,
                rejected: value,
            });
        }
        self.values.push(value);
        Ok(())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

impl<'a> IntoIterator for &'a IterationTrace {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl AsRef<[f64]> for IterationTrace {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
