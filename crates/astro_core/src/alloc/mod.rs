//! Slot allocation
//!
//! [`SlotAllocator`] owns the payloads of one entity type and hands out
//! [`Rid`](crate::rid::Rid) handles to them. Everything else in the game
//! stores handles and looks payloads up through the allocator.

mod bits;
mod config;
mod error;
mod persist;
mod slot_allocator;

pub use bits::{ExistenceBits, Ones};
pub use config::AllocatorConfig;
pub use error::SlotError;
pub use persist::{Persist, ID_KEY};
pub use slot_allocator::{Iter, IterMut, SlotAllocator, SlotCursor};
