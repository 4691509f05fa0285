use super::Rid;
use crate::document::{DataNode, DocumentError};
use std::collections::BTreeMap;

const NAME_KEY: &str = "name";
const ID_KEY: &str = "id";

/// String identifiers for handles that content files refer to by name,
/// e.g. `"home_planet"` or `"tutorial_quest"`.
///
/// Like every other handle container this never checks liveness; a
/// named handle goes stale when its slot is freed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RidNames {
    names: BTreeMap<String, Rid>,
}

impl RidNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `rid`, returning the previous binding.
    pub fn insert(&mut self, name: impl Into<String>, rid: Rid) -> Option<Rid> {
        let name = name.into();
        let previous = self.names.insert(name.clone(), rid);
        if let Some(previous) = previous {
            if previous != rid {
                tracing::warn!(%name, %previous, %rid, "rebinding string identifier");
            }
        }
        previous
    }

    /// Handle bound to `name`, or [`Rid::INVALID`] if there is none.
    pub fn get(&self, name: &str) -> Rid {
        match self.names.get(name) {
            Some(&rid) => rid,
            None => {
                tracing::warn!(%name, "unknown string identifier");
                Rid::INVALID
            }
        }
    }

    pub fn try_get(&self, name: &str) -> Option<Rid> {
        self.names.get(name).copied()
    }

    pub fn remove(&mut self, name: &str) -> Option<Rid> {
        self.names.remove(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Rid)> + '_ {
        self.names.iter().map(|(name, &rid)| (name.as_str(), rid))
    }

    /// Write every binding as `{ "name": .., "id": .. }` under `key`.
    pub fn serialize_into(&self, node: &mut DataNode, key: &str) {
        let entries = node.set_child_array(key, self.names.len());
        for (entry, (name, rid)) in entries.iter_mut().zip(&self.names) {
            entry.set(NAME_KEY, name.as_str());
            entry.set_i(ID_KEY, rid.raw() as i64);
        }
    }

    /// Replace all bindings with the ones saved under `key`. Nothing is
    /// changed when the saved data is malformed.
    pub fn deserialize_from(&mut self, node: &DataNode, key: &str) -> Result<(), DocumentError> {
        let entries = node
            .child_array(key)
            .ok_or_else(|| DocumentError::MissingKey { key: key.to_owned() })?;

        let mut names = BTreeMap::new();
        for entry in entries {
            let name = entry.require(NAME_KEY)?;
            let raw = u32::try_from(entry.require_i(ID_KEY)?).map_err(|_| {
                DocumentError::WrongType {
                    key: ID_KEY.to_owned(),
                    expected: "a 32-bit handle",
                }
            })?;
            names.insert(name.to_owned(), Rid::from_raw(raw));
        }
        self.names = names;
        Ok(())
    }
}
