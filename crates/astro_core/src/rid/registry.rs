// registry.rs - Two-level handle validity across every entity type
//
// The registry borrows its sources; it is rebuilt wherever a full validity
// check is needed rather than living in a global.

use super::{EntityType, Rid, RidError};
use std::collections::HashMap;

/// Something that owns the slots of one entity type.
pub trait RidSource {
    /// The type this source hands out handles for.
    fn entity_type(&self) -> EntityType;

    /// Whether `rid` currently names a live slot.
    fn contains(&self, rid: Rid) -> bool;
}

/// Maps each [`EntityType`] to the source that owns its handles.
///
/// ```
/// use astro_core::alloc::SlotAllocator;
/// use astro_core::rid::{EntityType, RidRegistry};
///
/// let mut ships: SlotAllocator<u32> = SlotAllocator::new(EntityType::SHIP);
/// let ship = ships.allocate_rid().unwrap();
///
/// let mut registry = RidRegistry::new();
/// registry.register(&ships);
/// assert_eq!(registry.is_valid(ship), Ok(true));
/// ```
#[derive(Default)]
pub struct RidRegistry<'a> {
    sources: HashMap<EntityType, &'a dyn RidSource>,
}

impl<'a> RidRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` for its entity type, replacing any earlier one.
    pub fn register(&mut self, source: &'a dyn RidSource) -> &mut Self {
        let entity_type = source.entity_type();
        if self.sources.insert(entity_type, source).is_some() {
            tracing::warn!(%entity_type, "replacing registered handle source");
        }
        self
    }

    pub fn is_registered(&self, entity_type: EntityType) -> bool {
        self.sources.contains_key(&entity_type)
    }

    /// Full validity check.
    ///
    /// The sentinel and handles of type [`EntityType::INVALID`] are simply
    /// invalid. A handle whose type has no registered source is an error:
    /// either the data is corrupt or a subsystem forgot to register.
    pub fn is_valid(&self, rid: Rid) -> Result<bool, RidError> {
        if rid.is_sentinel() {
            return Ok(false);
        }
        let entity_type = rid.entity_type();
        if entity_type == EntityType::INVALID {
            return Ok(false);
        }
        match self.sources.get(&entity_type) {
            Some(source) => Ok(source.contains(rid)),
            None => {
                let err = RidError::UninitializedCategory { entity_type };
                tracing::error!(%rid, %err, "validity check on unregistered type");
                Err(err)
            }
        }
    }

    /// Valid and of the expected type.
    pub fn is_valid_typed(&self, rid: Rid, entity_type: EntityType) -> Result<bool, RidError> {
        if rid.entity_type() != entity_type {
            return Ok(false);
        }
        self.is_valid(rid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::SlotAllocator;

    #[test]
    fn delegates_to_owning_allocator() {
        let mut ships: SlotAllocator<u8> = SlotAllocator::new(EntityType::SHIP);
        let mut tasks: SlotAllocator<u8> = SlotAllocator::new(EntityType::TASK);
        let ship = ships.allocate_rid().unwrap();
        let task = tasks.allocate_rid().unwrap();
        tasks.free(task);

        let mut registry = RidRegistry::new();
        registry.register(&ships).register(&tasks);

        assert_eq!(registry.is_valid(ship), Ok(true));
        assert_eq!(registry.is_valid(task), Ok(false));
        assert_eq!(registry.is_valid_typed(ship, EntityType::SHIP), Ok(true));
        assert_eq!(registry.is_valid_typed(ship, EntityType::TASK), Ok(false));
    }

    #[test]
    fn sentinel_is_invalid_not_an_error() {
        let registry = RidRegistry::new();
        assert_eq!(registry.is_valid(Rid::INVALID), Ok(false));
        assert_eq!(registry.is_valid(Rid::new(4, EntityType::INVALID)), Ok(false));
    }

    #[test]
    fn unregistered_type_is_reported() {
        let ships: SlotAllocator<u8> = SlotAllocator::new(EntityType::SHIP);
        let mut registry = RidRegistry::new();
        registry.register(&ships);

        let uninit = Rid::from_raw(5);
        assert_eq!(
            registry.is_valid(uninit),
            Err(RidError::UninitializedCategory {
                entity_type: EntityType::UNINITIALIZED
            })
        );
        assert!(registry.is_valid(Rid::new(0, EntityType::QUEST)).is_err());
        assert!(!registry.is_registered(EntityType::QUEST));
    }
}
