use std::fmt::Display;

use itertools::Itertools;
use rand::{Rng, seq::index::sample};

use crate::{errors::HeapError, mode::HeapMode};

/// Values are drawn without replacement from `0..VALUE_DOMAIN`.
pub const VALUE_DOMAIN: usize = 100;

pub fn parent(i: usize) -> usize {
    i / 2
}

pub fn left(i: usize) -> usize {
    2 * i
}

pub fn right(i: usize) -> usize {
    2 * i + 1
}

/// True when `j` is a child of `i` (`i < j`).
pub fn is_parent_child(i: usize, j: usize) -> bool {
    left(i) == j || right(i) == j
}

/// An array-backed binary heap, 1-indexed.
///
/// Slot 0 is a sentinel that never holds a node. Slots past the logical
/// size hold values that have been detached by a remove, so a finished
/// heapsort leaves the sorted run in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapStore {
    items: Vec<u32>,
    size: usize,
}

impl HeapStore {
    /// Build a store over `values`, which become indices `1..=values.len()`.
    pub fn new(values: Vec<u32>) -> HeapStore {
        let size = values.len();
        let mut items = Vec::with_capacity(size + 1);
        items.push(0);
        items.extend(values);
        HeapStore { items, size }
    }

    /// Like `new`, but the values must be distinct and drawn from `0..VALUE_DOMAIN`.
    pub fn from_values(values: Vec<u32>) -> Result<HeapStore, HeapError> {
        if values.len() > VALUE_DOMAIN {
            return Err(HeapError::TooManyValues(values.len()));
        }
        let mut seen = [false; VALUE_DOMAIN];
        for v in values.iter() {
            let slot = seen
                .get_mut(*v as usize)
                .ok_or(HeapError::BadValue(*v))?;
            if *slot {
                return Err(HeapError::DuplicateValue(*v));
            }
            *slot = true;
        }
        Ok(HeapStore::new(values))
    }

    /// Fill a new store with `size` distinct random values from `0..VALUE_DOMAIN`.
    pub fn init<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<HeapStore, HeapError> {
        if size > VALUE_DOMAIN {
            return Err(HeapError::TooManyValues(size));
        }
        let values = sample(rng, VALUE_DOMAIN, size)
            .into_iter()
            .map(|v| v as u32)
            .collect();
        Ok(HeapStore::new(values))
    }

    /// Number of elements still in the heap.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of slots, detached ones included.
    pub fn capacity(&self) -> usize {
        self.items.len() - 1
    }

    pub fn get(&self, i: usize) -> u32 {
        self.check(i);
        self.items[i]
    }

    pub fn set(&mut self, i: usize, value: u32) {
        self.check(i);
        self.items[i] = value;
    }

    pub fn swap_values(&mut self, i: usize, j: usize) {
        self.check(i);
        self.check(j);
        self.items.swap(i, j);
    }

    /// Drop the last element out of the logical heap, leaving it in its slot.
    pub fn detach(&mut self) -> Option<u32> {
        if self.size == 0 {
            return None;
        }
        let value = self.items[self.size];
        self.size -= 1;
        Some(value)
    }

    /// The root, if the heap is not empty.
    pub fn front(&self) -> Option<u32> {
        if self.size > 0 {
            Some(self.items[1])
        } else {
            None
        }
    }

    /// All slots, `1..=capacity`.
    pub fn values(&self) -> &[u32] {
        &self.items[1..]
    }

    /// The logical heap, `1..=len`.
    pub fn heap(&self) -> &[u32] {
        &self.items[1..=self.size]
    }

    /// Slots that have been detached, in index order.
    pub fn detached(&self) -> &[u32] {
        &self.items[self.size + 1..]
    }

    /// Children of `i` that lie inside the logical heap.
    pub fn children(&self, i: usize) -> impl Iterator<Item = usize> {
        let size = self.size;
        [left(i), right(i)].into_iter().filter(move |c| *c <= size)
    }

    pub fn is_heap(&self, mode: HeapMode) -> bool {
        (2..=self.size).all(|i| !mode.should_swap(self.items[i], self.items[parent(i)]))
    }

    fn check(&self, i: usize) {
        assert!(
            i >= 1 && i < self.items.len(),
            "heap index {} out of range 1..={}",
            i,
            self.capacity()
        );
    }
}

impl Display for HeapStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[\u{00D8}")?;
        if self.size > 0 {
            write!(f, " {}", self.heap().iter().join(" "))?;
        }
        if self.size < self.capacity() {
            write!(f, " | {}", self.detached().iter().join(" "))?;
        }
        write!(f, "]")
    }
}
