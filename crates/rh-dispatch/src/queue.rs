//! `DriverQueue`: drivers ordered by the moment they become available.
//!
//! # Ordering
//!
//! The queue is a min-heap keyed by `(available_at, DriverId)`, so drivers
//! that free up at the same moment always come out in id order and every run
//! with the same inputs pops drivers in the same sequence.
//!
//! # Candidate gathering
//!
//! [`DriverQueue::take_candidates`] implements the matching window: every
//! driver already free at the request time competes for the passenger; if
//! nobody is free yet, the single earliest driver is the only candidate.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rh_core::Timestamp;

use crate::fleet::Driver;

/// Heap slot ordered by `(available_at, id)`.  Two drivers never compare
/// equal unless they share an id.
#[derive(Copy, Clone, Debug)]
struct Queued(Driver);

impl Queued {
    fn key(&self) -> (Timestamp, rh_core::DriverId) {
        (self.0.available_at, self.0.id)
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Min-priority queue of drivers waiting for their next passenger.
#[derive(Default)]
pub struct DriverQueue {
    heap: BinaryHeap<Reverse<Queued>>,
}

impl DriverQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_drivers(drivers: impl IntoIterator<Item = Driver>) -> Self {
        Self {
            heap: drivers.into_iter().map(|d| Reverse(Queued(d))).collect(),
        }
    }

    pub fn push(&mut self, driver: Driver) {
        self.heap.push(Reverse(Queued(driver)));
    }

    /// Remove and return the earliest-available driver.
    pub fn pop(&mut self) -> Option<Driver> {
        self.heap.pop().map(|Reverse(Queued(d))| d)
    }

    /// The earliest-available driver, without removing it.
    pub fn peek(&self) -> Option<&Driver> {
        self.heap.peek().map(|Reverse(Queued(d))| d)
    }

    /// Pop the drivers that compete for a request made at `requested_at`.
    ///
    /// Returns every driver with `available_at <= requested_at`, in pop
    /// order.  If the earliest driver is still busy at `requested_at`, that
    /// driver alone is returned.  Empty only when the queue is empty.
    pub fn take_candidates(&mut self, requested_at: Timestamp) -> Vec<Driver> {
        let Some(first) = self.pop() else {
            return Vec::new();
        };
        let mut candidates = vec![first];
        if first.available_at > requested_at {
            return candidates;
        }
        while self.peek().is_some_and(|d| d.available_at <= requested_at) {
            if let Some(d) = self.pop() {
                candidates.push(d);
            }
        }
        candidates
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Queued drivers in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Driver> + '_ {
        self.heap.iter().map(|Reverse(Queued(d))| d)
    }

    /// Drain into a `Vec` sorted by `(available_at, id)`.
    pub fn into_sorted_vec(self) -> Vec<Driver> {
        let mut drivers: Vec<Driver> = self.heap.into_iter().map(|Reverse(Queued(d))| d).collect();
        drivers.sort_by_key(|d| (d.available_at, d.id));
        drivers
    }
}
