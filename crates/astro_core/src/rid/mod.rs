//! Typed resource handles
//!
//! A [`Rid`] is a 32-bit value naming one entity: the high byte is its
//! [`EntityType`], the low 24 bits are its index in that type's
//! [`SlotAllocator`](crate::alloc::SlotAllocator).
//!
//! Handles carry no ownership and no generation. A handle goes stale the
//! moment its slot is freed; callers re-validate through the owning
//! allocator (or a [`RidRegistry`]) before every dereference.

mod entity_type;
mod names;
mod registry;

pub use entity_type::EntityType;
pub use names::RidNames;
pub use registry::{RidRegistry, RidSource};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const INDEX_BITS: u32 = 24;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;

/// Errors raised while building or validating handles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RidError {
    #[error("index {index} does not fit the 24-bit index field of {entity_type}")]
    IndexOverflow { index: u32, entity_type: EntityType },

    #[error("{entity_type} has no registered allocator")]
    UninitializedCategory { entity_type: EntityType },
}

/// Resource handle: `[8-bit entity type | 24-bit index]`.
///
/// Example:
/// ```
/// use astro_core::rid::{EntityType, Rid};
///
/// let rid = Rid::new(7, EntityType::SHIP);
/// assert_eq!(rid.index(), 7);
/// assert_eq!(rid.entity_type(), EntityType::SHIP);
/// assert_eq!(Rid::from_raw(rid.raw()), rid);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rid(u32);

impl Rid {
    /// The null handle. Decodes to [`EntityType::INVALID`] and never comes
    /// out of an allocator.
    pub const INVALID: Rid = Rid(u32::MAX);

    /// Largest index a handle can carry.
    pub const MAX_INDEX: u32 = INDEX_MASK;

    /// Pack `index` and `entity_type`.
    ///
    /// An index outside the 24-bit range is reported and yields
    /// [`Rid::INVALID`] instead of being truncated.
    pub fn new(index: u32, entity_type: EntityType) -> Rid {
        match Self::try_new(index, entity_type) {
            Ok(rid) => rid,
            Err(err) => {
                tracing::error!(%err, "cannot encode handle");
                Rid::INVALID
            }
        }
    }

    pub fn try_new(index: u32, entity_type: EntityType) -> Result<Rid, RidError> {
        if index > INDEX_MASK {
            return Err(RidError::IndexOverflow { index, entity_type });
        }
        Ok(Rid(index | ((entity_type.raw() as u32) << INDEX_BITS)))
    }

    /// Reinterpret a raw value, e.g. one read back from a save file.
    #[inline]
    pub const fn from_raw(raw: u32) -> Rid {
        Rid(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0 & INDEX_MASK
    }

    #[inline]
    pub const fn entity_type(self) -> EntityType {
        EntityType::new((self.0 >> INDEX_BITS) as u8)
    }

    /// Cheap local check against the null handle. Says nothing about
    /// whether the slot is live; see [`RidRegistry::is_valid`].
    #[inline]
    pub const fn is_sentinel(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for Rid {
    fn default() -> Self {
        Rid::INVALID
    }
}

impl fmt::Debug for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            f.write_str("Rid(INVALID)")
        } else {
            write!(f, "Rid({}:{})", self.entity_type(), self.index())
        }
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            f.write_str("invalid")
        } else {
            write!(f, "{}#{}", self.entity_type(), self.index())
        }
    }
}

impl From<Rid> for u32 {
    fn from(rid: Rid) -> u32 {
        rid.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_type_in_high_byte() {
        let rid = Rid::new(0x12_3456, EntityType::QUEST);
        assert_eq!(rid.raw(), 0x0412_3456);
        assert_eq!(rid.index(), 0x12_3456);
        assert_eq!(rid.entity_type(), EntityType::QUEST);
    }

    #[test]
    fn sentinel_decodes_to_invalid_type() {
        let rid = Rid::INVALID;
        assert!(rid.is_sentinel());
        assert_eq!(rid.entity_type(), EntityType::INVALID);
        assert_eq!(rid.index(), Rid::MAX_INDEX);
        assert_eq!(Rid::default(), Rid::INVALID);
    }

    #[test]
    fn overflowing_index_yields_sentinel() {
        let err = Rid::try_new(Rid::MAX_INDEX + 1, EntityType::SHIP).unwrap_err();
        assert_eq!(
            err,
            RidError::IndexOverflow {
                index: Rid::MAX_INDEX + 1,
                entity_type: EntityType::SHIP
            }
        );
        assert_eq!(Rid::new(u32::MAX, EntityType::SHIP), Rid::INVALID);
        assert!(!Rid::new(Rid::MAX_INDEX, EntityType::SHIP).is_sentinel());
    }

    #[test]
    fn accessors_are_total() {
        for raw in [0u32, 1, 0x00FF_FFFF, 0x0100_0000, 0xFE00_0001, u32::MAX - 1] {
            let rid = Rid::from_raw(raw);
            assert_eq!(
                (rid.entity_type().raw() as u32) << 24 | rid.index(),
                raw
            );
        }
    }

    #[test]
    fn serializes_as_raw_integer() {
        let rid = Rid::new(3, EntityType::TASK);
        let json = serde_json::to_string(&rid).unwrap();
        assert_eq!(json, rid.raw().to_string());
        let back: Rid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rid);
    }

    #[test]
    fn formats_readably() {
        assert_eq!(Rid::new(12, EntityType::SHIP).to_string(), "ship#12");
        assert_eq!(format!("{:?}", Rid::INVALID), "Rid(INVALID)");
    }
}
