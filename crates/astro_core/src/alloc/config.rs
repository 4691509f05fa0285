//! Allocator tuning

use serde::{Deserialize, Serialize};

/// Per-allocator settings, normally read from the `allocators` table of the
/// settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Slots available right after construction and after `clear`.
    pub starting_capacity: u32,
    /// Fixed number of slots added whenever the allocator runs full.
    pub grow_by: u32,
    /// Forced placements this many slots past the current capacity are
    /// logged as wasteful.
    pub forced_gap_warning: u32,
    /// Forced placements further than this past the current capacity are
    /// refused. `None` accepts any gap.
    pub max_forced_gap: Option<u32>,
    /// Reset freed payloads to their default value so stale handles never
    /// observe the previous owner's data.
    pub reset_on_free: bool,
}

impl AllocatorConfig {
    pub const DEFAULT_STARTING_CAPACITY: u32 = 32;
    pub const DEFAULT_GROW_BY: u32 = 32;
    pub const DEFAULT_FORCED_GAP_WARNING: u32 = 1024;

    pub fn with_starting_capacity(mut self, starting_capacity: u32) -> Self {
        self.starting_capacity = starting_capacity;
        self
    }

    pub fn with_grow_by(mut self, grow_by: u32) -> Self {
        self.grow_by = grow_by;
        self
    }

    pub fn with_max_forced_gap(mut self, max_forced_gap: Option<u32>) -> Self {
        self.max_forced_gap = max_forced_gap;
        self
    }

    pub fn with_reset_on_free(mut self, reset_on_free: bool) -> Self {
        self.reset_on_free = reset_on_free;
        self
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            starting_capacity: Self::DEFAULT_STARTING_CAPACITY,
            grow_by: Self::DEFAULT_GROW_BY,
            forced_gap_warning: Self::DEFAULT_FORCED_GAP_WARNING,
            max_forced_gap: None,
            reset_on_free: true,
        }
    }
}
