//! Leave-two-out pair enumeration.

use crate::{NeurosemError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An unordered pair of item indices, stored with `item1 < item2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemPair {
    item1: usize,
    item2: usize,
}

impl ItemPair {
    /// Build a pair from two distinct indices in either order.
    pub fn new(a: usize, b: usize) -> Result<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Ok(Self { item1: a, item2: b }),
            std::cmp::Ordering::Greater => Ok(Self { item1: b, item2: a }),
            std::cmp::Ordering::Equal => Err(NeurosemError::insufficient(format!(
                "a held-out pair needs two distinct items, got {a} twice"
            ))),
        }
    }

    pub fn item1(self) -> usize {
        self.item1
    }

    pub fn item2(self) -> usize {
        self.item2
    }

    /// Whether `index` is one of the held-out items.
    pub fn contains(self, index: usize) -> bool {
        index == self.item1 || index == self.item2
    }
}

impl fmt::Display for ItemPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.item1, self.item2)
    }
}

/// Leave-two-out splitter over `num_items` items.
#[derive(Clone, Copy, Debug)]
pub struct LeaveTwoOut {
    num_items: usize,
}

impl LeaveTwoOut {
    pub fn new(num_items: usize) -> Self {
        Self { num_items }
    }

    /// `C(num_items, 2)`.
    pub fn num_folds(&self) -> usize {
        self.num_items * self.num_items.saturating_sub(1) / 2
    }

    /// All pairs, item1 ascending then item2 ascending.
    pub fn pairs(&self) -> impl Iterator<Item = ItemPair> + '_ {
        (0..self.num_items).flat_map(move |item1| {
            ((item1 + 1)..self.num_items).map(move |item2| ItemPair { item1, item2 })
        })
    }

    /// Train and test indices for one pair.
    pub fn split(&self, pair: ItemPair) -> (Vec<usize>, Vec<usize>) {
        let train = (0..self.num_items).filter(|&i| !pair.contains(i)).collect();
        (train, vec![pair.item1, pair.item2])
    }
}
