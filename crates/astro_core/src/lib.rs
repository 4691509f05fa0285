//! Astro Core
//!
//! The handle layer every game subsystem is built on:
//! - Typed resource handles ([`rid::Rid`]) and their entity types
//! - Slot allocators with stable indices and LIFO reuse
//! - Handle lists for ad-hoc groupings
//! - Structured documents for save games

pub mod alloc;
pub mod document;
pub mod list;
pub mod rid;

pub use alloc::{AllocatorConfig, Persist, SlotAllocator, SlotError};
pub use document::{DataNode, DocumentError};
pub use list::RidList;
pub use rid::{EntityType, Rid, RidError, RidNames, RidRegistry, RidSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
