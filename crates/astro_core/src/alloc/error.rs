use crate::document::DocumentError;
use crate::rid::{EntityType, Rid};
use thiserror::Error;

/// Errors raised by a [`SlotAllocator`](super::SlotAllocator).
///
/// Absence is never an error: lookups of stale or foreign handles return
/// `None`/`false` instead.
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("{entity_type} allocator exhausted the 24-bit index space ({capacity} slots)")]
    CapacityExhausted { entity_type: EntityType, capacity: u32 },

    #[error("cannot place {rid} in the {entity_type} allocator")]
    Placement { rid: Rid, entity_type: EntityType },

    #[error("document error in '{key}': {source}")]
    Document {
        key: String,
        #[source]
        source: DocumentError,
    },
}
