//! Ordered handle lists
//!
//! A [`RidList`] groups handles without owning what they point to, e.g.
//! "ships parked at this planet". Nothing keeps the entries fresh: the
//! owning allocator may free a slot at any time, so readers check each
//! handle before use.

use crate::document::{DataNode, DocumentError};
use crate::rid::Rid;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Index;

/// Smallest growth step, and the capacity kept after `clear`.
const MIN_GROWTH: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RidList {
    items: Vec<Rid>,
}

impl RidList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Append at the end. Full lists grow by half their capacity (at
    /// least [`MIN_GROWTH`] entries).
    pub fn append(&mut self, rid: Rid) {
        if self.items.len() == self.items.capacity() {
            let extension = (self.items.capacity() / 2).max(MIN_GROWTH);
            self.items.reserve_exact(extension);
        }
        self.items.push(rid);
    }

    /// Remove the entry at `index`, shifting later entries left.
    /// Out-of-range indices are ignored.
    pub fn erase_at(&mut self, index: usize) -> Option<Rid> {
        if index >= self.items.len() {
            return None;
        }
        Some(self.items.remove(index))
    }

    /// Remove the first occurrence of `rid`.
    pub fn remove(&mut self, rid: Rid) -> bool {
        match self.find(rid) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Position of the first occurrence of `rid`.
    pub fn find(&self, rid: Rid) -> Option<usize> {
        self.items.iter().position(|&r| r == rid)
    }

    pub fn contains(&self, rid: Rid) -> bool {
        self.find(rid).is_some()
    }

    pub fn get(&self, index: usize) -> Option<Rid> {
        self.items.get(index).copied()
    }

    pub fn last(&self) -> Option<Rid> {
        self.items.last().copied()
    }

    /// Sort with a caller-supplied order. Not stable.
    pub fn sort_by(&mut self, compare: impl FnMut(&Rid, &Rid) -> Ordering) {
        self.items.sort_unstable_by(compare);
    }

    /// Empty the list and give back all but a small baseline of storage.
    pub fn clear(&mut self) {
        self.items.clear();
        self.items.shrink_to(MIN_GROWTH);
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, Rid>> {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[Rid] {
        &self.items
    }

    /// Store the raw handle values as an integer array under `key`.
    pub fn serialize_into(&self, node: &mut DataNode, key: &str) {
        node.set_int_array(key, self.items.iter().map(|rid| rid.raw() as i64));
    }

    /// Replace the contents with the handles stored under `key`.
    ///
    /// Handles are restored verbatim, stale ones included.
    pub fn deserialize_from(&mut self, node: &DataNode, key: &str) -> Result<(), DocumentError> {
        let raw = node.int_array(key)?;
        let items = raw
            .into_iter()
            .map(|value| {
                u32::try_from(value)
                    .map(Rid::from_raw)
                    .map_err(|_| DocumentError::WrongType {
                        key: key.to_owned(),
                        expected: "32-bit handle values",
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.items = items;
        Ok(())
    }
}

impl Index<usize> for RidList {
    type Output = Rid;

    fn index(&self, index: usize) -> &Rid {
        &self.items[index]
    }
}

impl FromIterator<Rid> for RidList {
    fn from_iter<I: IntoIterator<Item = Rid>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<Rid> for RidList {
    fn extend<I: IntoIterator<Item = Rid>>(&mut self, iter: I) {
        for rid in iter {
            self.append(rid);
        }
    }
}

impl<'a> IntoIterator for &'a RidList {
    type Item = Rid;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Rid>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
