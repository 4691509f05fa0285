// entity_type.rs - Category tags carried in the high byte of a Rid

use std::fmt;

/// Identifies which kind of entity (and therefore which allocator) a
/// [`Rid`](super::Rid) belongs to.
///
/// The tag is an open `u8` rather than a closed enum so that every 32-bit
/// handle value decodes to *some* type, including values written by newer
/// builds or corrupted save files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntityType(u8);

impl EntityType {
    /// Never registered with any allocator. Seeing it is a bug.
    pub const UNINITIALIZED: Self = Self(0);
    pub const PLANET: Self = Self(1);
    pub const SHIP: Self = Self(2);
    pub const MODULE: Self = Self(3);
    pub const QUEST: Self = Self(4);
    pub const ACTIVE_QUEST: Self = Self(5);
    pub const TASK: Self = Self(6);
    pub const DIALOGUE: Self = Self(7);
    pub const SHIP_CLASS: Self = Self(8);
    pub const MODULE_CLASS: Self = Self(9);
    pub const TECHTREE_NODE: Self = Self(10);
    /// Reserved for tests and tooling.
    pub const TEST: Self = Self(0xFE);
    /// Type of the invalid sentinel handle.
    pub const INVALID: Self = Self(0xFF);

    const NAMED: [(Self, &'static str); 13] = [
        (Self::UNINITIALIZED, "uninitialized"),
        (Self::PLANET, "planet"),
        (Self::SHIP, "ship"),
        (Self::MODULE, "module"),
        (Self::QUEST, "quest"),
        (Self::ACTIVE_QUEST, "active_quest"),
        (Self::TASK, "task"),
        (Self::DIALOGUE, "dialogue"),
        (Self::SHIP_CLASS, "ship_class"),
        (Self::MODULE_CLASS, "module_class"),
        (Self::TECHTREE_NODE, "techtree_node"),
        (Self::TEST, "test"),
        (Self::INVALID, "invalid"),
    ];

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Whether allocators may be created for this type.
    #[inline]
    pub const fn is_allocatable(self) -> bool {
        self.0 != Self::UNINITIALIZED.0 && self.0 != Self::INVALID.0
    }

    /// Stable lowercase name, used as the key in settings files.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(ty, _)| *ty == self)
            .map(|(_, name)| *name)
    }

    /// Inverse of [`EntityType::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(ty, _)| *ty)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "type#{}", self.0),
        }
    }
}
