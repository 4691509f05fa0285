// slot_allocator.rs - Dense payload storage addressed by typed handles
//
// Three parallel structures indexed by slot:
//   payloads  Vec<T>          every slot holds a value, live or not
//   bits      ExistenceBits   set iff the slot is live
//   free      Vec<u32>        stack of free slots, top = next to allocate

use super::bits::ExistenceBits;
use super::{AllocatorConfig, SlotError};
use crate::rid::{EntityType, Rid, RidSource};
use std::fmt;

/// Upper bound on slots per allocator. Index `Rid::MAX_INDEX` itself is
/// left unused so that no handle of any type shares the sentinel's index.
const MAX_CAPACITY: u32 = Rid::MAX_INDEX;

/// Typed slot allocator.
///
/// Handles stay valid across growth because indices are never remapped;
/// the payload vector only ever grows. Freed slots are reused LIFO: the
/// most recently freed index is handed out first.
///
/// Example:
/// ```
/// use astro_core::alloc::SlotAllocator;
/// use astro_core::rid::EntityType;
///
/// let mut ships: SlotAllocator<String> = SlotAllocator::new(EntityType::SHIP);
/// let (ship, name) = ships.allocate().unwrap();
/// name.push_str("Rocinante");
///
/// assert_eq!(ships.get(ship).map(String::as_str), Some("Rocinante"));
/// ships.free(ship);
/// assert!(ships.get(ship).is_none());
/// ```
pub struct SlotAllocator<T> {
    entity_type: EntityType,
    config: AllocatorConfig,
    payloads: Vec<T>,
    free: Vec<u32>,
    bits: ExistenceBits,
    live: u32,
}

impl<T> SlotAllocator<T> {
    #[inline]
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    #[inline]
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Number of live slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.live as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots, live or free.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.payloads.len() as u32
    }

    /// Whether `rid` names a live slot of this allocator.
    ///
    /// Accepts any value, including the sentinel and other types' handles.
    #[inline]
    pub fn contains(&self, rid: Rid) -> bool {
        rid.entity_type() == self.entity_type && self.bits.get(rid.index() as usize)
    }

    pub fn get(&self, rid: Rid) -> Option<&T> {
        if !self.contains(rid) {
            return None;
        }
        self.payloads.get(rid.index() as usize)
    }

    pub fn get_mut(&mut self, rid: Rid) -> Option<&mut T> {
        if !self.contains(rid) {
            return None;
        }
        self.payloads.get_mut(rid.index() as usize)
    }

    /// Live slots in ascending index order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            entity_type: self.entity_type,
            payloads: &self.payloads,
            next: 0,
            bits: &self.bits,
        }
    }

    /// Live slots in ascending index order, mutably.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            entity_type: self.entity_type,
            rest: self.payloads.as_mut_slice(),
            offset: 0,
            bits: &self.bits,
        }
    }

    /// Handles of all live slots in ascending index order.
    pub fn rids(&self) -> impl Iterator<Item = Rid> + '_ {
        self.bits
            .iter_ones()
            .map(move |i| Rid::new(i as u32, self.entity_type))
    }

    /// A borrow-free position for walking live slots while mutating the
    /// allocator in between steps.
    pub fn cursor(&self) -> SlotCursor {
        SlotCursor { next: 0 }
    }

    #[inline]
    fn rid_at(&self, index: u32) -> Rid {
        Rid::new(index, self.entity_type)
    }

    /// Check the free-stack / bitmap bookkeeping, panicking on the first
    /// inconsistency. Walks every slot; meant for tests and tooling.
    pub fn debug_validate_invariants(&self) {
        let capacity = self.payloads.len();
        assert_eq!(self.bits.len(), capacity, "bitmap length diverged");
        assert_eq!(
            self.free.len() + self.live as usize,
            capacity,
            "free stack and live count do not cover capacity"
        );
        assert_eq!(self.bits.count_ones(), self.live as usize, "live count diverged");
        let mut seen = ExistenceBits::with_len(capacity);
        for &index in &self.free {
            let i = index as usize;
            assert!(i < capacity, "free index {i} out of range");
            assert!(!self.bits.get(i), "free index {i} is marked live");
            assert!(!seen.get(i), "free index {i} listed twice");
            seen.set(i);
        }
    }
}

impl<T: Default> SlotAllocator<T> {
    /// Create an allocator for `entity_type` with the default configuration.
    pub fn new(entity_type: EntityType) -> Self {
        Self::with_config(entity_type, AllocatorConfig::default())
    }

    /// Create an allocator with `config.starting_capacity` free slots.
    ///
    /// # Panics
    /// If `entity_type` is [`EntityType::INVALID`] or
    /// [`EntityType::UNINITIALIZED`], if `grow_by` is zero, or if the
    /// starting capacity exceeds the 24-bit index space.
    pub fn with_config(entity_type: EntityType, config: AllocatorConfig) -> Self {
        assert!(
            entity_type.is_allocatable(),
            "cannot create an allocator for {entity_type}"
        );
        assert!(config.grow_by > 0, "grow_by must be non-zero");
        assert!(
            config.starting_capacity <= MAX_CAPACITY,
            "starting capacity {} exceeds the index space",
            config.starting_capacity
        );

        let capacity = config.starting_capacity;
        let mut payloads = Vec::with_capacity(capacity as usize);
        payloads.resize_with(capacity as usize, T::default);

        Self {
            entity_type,
            config,
            payloads,
            free: (0..capacity).rev().collect(),
            bits: ExistenceBits::with_len(capacity as usize),
            live: 0,
        }
    }

    /// Allocate a slot, growing if every slot is live.
    ///
    /// The payload is reset to `T::default()`.
    pub fn allocate(&mut self) -> Result<(Rid, &mut T), SlotError> {
        if self.free.is_empty() {
            self.grow()?;
        }
        let Some(index) = self.free.pop() else {
            return Err(self.exhausted());
        };
        let rid = self.rid_at(index);
        Ok((rid, self.occupy(index)))
    }

    /// Allocate a slot and return only its handle.
    pub fn allocate_rid(&mut self) -> Result<Rid, SlotError> {
        self.allocate().map(|(rid, _)| rid)
    }

    /// Allocate exactly the slot `rid` names (forced placement).
    ///
    /// Used when restoring saved state, where handle values must come back
    /// unchanged. Returns false without touching anything if `rid` belongs
    /// to another type, is already live, or lies beyond the configured
    /// `max_forced_gap`.
    pub fn allocate_at(&mut self, rid: Rid) -> bool {
        if rid.entity_type() != self.entity_type {
            return false;
        }
        let index = rid.index();
        if index >= MAX_CAPACITY || self.bits.get(index as usize) {
            return false;
        }

        let capacity = self.capacity();
        if index >= capacity {
            let gap = index + 1 - capacity;
            if let Some(max_gap) = self.config.max_forced_gap {
                if gap > max_gap {
                    tracing::error!(
                        %rid, capacity, gap, max_gap,
                        "refusing forced placement far beyond capacity"
                    );
                    return false;
                }
            }
            if gap >= self.config.forced_gap_warning {
                tracing::warn!(
                    %rid, capacity, gap,
                    "forced placement leaves many unused slots"
                );
            }
            // Same capacity repeated `grow` calls would reach, in one step.
            let grow_by = self.config.grow_by;
            let target = capacity
                .saturating_add(gap.div_ceil(grow_by).saturating_mul(grow_by))
                .min(MAX_CAPACITY);
            self.grow_to(target);
        }

        // Linear in the free stack. Ids restored in ascending order, as saves
        // store them, sit at the top.
        match self.free.iter().rposition(|&i| i == index) {
            Some(pos) => {
                self.free.remove(pos);
            }
            None => {
                debug_assert!(false, "free index {index} missing from free stack");
                return false;
            }
        }
        self.occupy(index);
        true
    }

    /// Release the slot `rid` names.
    ///
    /// Freeing a stale, foreign or never-allocated handle does nothing and
    /// returns false.
    pub fn free(&mut self, rid: Rid) -> bool {
        if !self.contains(rid) {
            return false;
        }
        let index = rid.index();
        self.bits.unset(index as usize);
        self.free.push(index);
        self.live -= 1;
        if self.config.reset_on_free {
            self.payloads[index as usize] = T::default();
        }
        true
    }

    /// Payload of `*rid` if live, otherwise a fresh slot whose handle is
    /// written back into `rid`.
    pub fn get_or_allocate(&mut self, rid: &mut Rid) -> Result<&mut T, SlotError> {
        if self.contains(*rid) {
            return Ok(&mut self.payloads[rid.index() as usize]);
        }
        let (fresh, payload) = self.allocate()?;
        *rid = fresh;
        Ok(payload)
    }

    /// Keep only the live slots for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(Rid, &mut T) -> bool) {
        let mut cursor = self.cursor();
        while let Some(rid) = cursor.next(self) {
            let index = rid.index() as usize;
            if !keep(rid, &mut self.payloads[index]) {
                self.free(rid);
            }
        }
    }

    /// Drop every payload and return to the starting capacity.
    pub fn clear(&mut self) {
        *self = Self::with_config(self.entity_type, self.config);
    }

    fn occupy(&mut self, index: u32) -> &mut T {
        self.bits.set(index as usize);
        self.live += 1;
        let payload = &mut self.payloads[index as usize];
        *payload = T::default();
        payload
    }

    fn grow(&mut self) -> Result<(), SlotError> {
        let old = self.capacity();
        if old >= MAX_CAPACITY {
            let err = self.exhausted();
            tracing::error!(%err, "allocator cannot grow");
            return Err(err);
        }
        self.grow_to(old.saturating_add(self.config.grow_by).min(MAX_CAPACITY));
        Ok(())
    }

    fn grow_to(&mut self, new: u32) {
        let old = self.capacity();
        debug_assert!(old < new && new <= MAX_CAPACITY);

        self.payloads.resize_with(new as usize, T::default);
        self.bits.grow(new as usize);
        // New slots go to the bottom of the stack so previously freed
        // slots are still reused first.
        self.free.splice(0..0, (old..new).rev());

        tracing::trace!(entity_type = %self.entity_type, old, new, "allocator grew");
    }

    fn exhausted(&self) -> SlotError {
        SlotError::CapacityExhausted {
            entity_type: self.entity_type,
            capacity: self.capacity(),
        }
    }
}

impl<T> RidSource for SlotAllocator<T> {
    fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    fn contains(&self, rid: Rid) -> bool {
        SlotAllocator::contains(self, rid)
    }
}

impl<T> fmt::Debug for SlotAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotAllocator")
            .field("entity_type", &self.entity_type)
            .field("live", &self.live)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a SlotAllocator<T> {
    type Item = (Rid, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Position in a walk over live slots that does not borrow the allocator.
///
/// Each step resumes strictly after the previously returned index, so
/// freeing the slot just returned does not skip or repeat anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotCursor {
    next: usize,
}

impl SlotCursor {
    /// Next live handle at or after the cursor position.
    pub fn next<T>(&mut self, allocator: &SlotAllocator<T>) -> Option<Rid> {
        let index = allocator.bits.next_set(self.next)?;
        self.next = index + 1;
        Some(allocator.rid_at(index as u32))
    }
}

/// Iterator over `(Rid, &T)` for live slots.
pub struct Iter<'a, T> {
    entity_type: EntityType,
    payloads: &'a [T],
    bits: &'a ExistenceBits,
    next: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Rid, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.bits.next_set(self.next)?;
        self.next = index + 1;
        let rid = Rid::new(index as u32, self.entity_type);
        Some((rid, &self.payloads[index]))
    }
}

/// Iterator over `(Rid, &mut T)` for live slots.
pub struct IterMut<'a, T> {
    entity_type: EntityType,
    rest: &'a mut [T],
    offset: usize,
    bits: &'a ExistenceBits,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = (Rid, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.bits.next_set(self.offset)?;
        let rest = std::mem::take(&mut self.rest);
        let (payload, tail) = rest[index - self.offset..].split_first_mut()?;
        self.rest = tail;
        self.offset = index + 1;
        Some((Rid::new(index as u32, self.entity_type), payload))
    }
}
