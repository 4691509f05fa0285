// persist.rs - Dumping and restoring a whole allocator through a DataNode
//
// Layout under `key`: one child per live slot, ascending index order,
//   { "id": <raw handle>, ...payload fields }

use super::{SlotAllocator, SlotError};
use crate::document::{DataNode, DocumentError};
use crate::rid::Rid;

/// Field holding the raw handle value of each saved slot.
pub const ID_KEY: &str = "id";

/// Per-payload encoding for save files.
pub trait Persist {
    fn encode(&self, node: &mut DataNode);
    fn decode(&mut self, node: &DataNode) -> Result<(), DocumentError>;
}

impl<T: Default> SlotAllocator<T> {
    /// Write every live slot into a child array under `key`.
    pub fn serialize_into_with(
        &self,
        node: &mut DataNode,
        key: &str,
        mut encode: impl FnMut(&T, &mut DataNode),
    ) {
        let entries = node.set_child_array(key, self.len());
        for (entry, (rid, payload)) in entries.iter_mut().zip(self.iter()) {
            encode(payload, entry);
            entry.set_i(ID_KEY, rid.raw() as i64);
        }
    }

    /// Replace the contents with the slots saved under `key`.
    ///
    /// Every saved handle comes back with exactly its saved value. On error
    /// the allocator is left cleared. Returns the number of restored slots.
    pub fn deserialize_from_with(
        &mut self,
        node: &DataNode,
        key: &str,
        mut decode: impl FnMut(&mut T, &DataNode) -> Result<(), DocumentError>,
    ) -> Result<usize, SlotError> {
        self.clear();
        let result = self.restore(node, key, &mut decode);
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn restore(
        &mut self,
        node: &DataNode,
        key: &str,
        decode: &mut impl FnMut(&mut T, &DataNode) -> Result<(), DocumentError>,
    ) -> Result<usize, SlotError> {
        let document_error = |source| SlotError::Document {
            key: key.to_owned(),
            source,
        };

        let entries = node.child_array(key).ok_or_else(|| {
            document_error(DocumentError::MissingKey { key: key.to_owned() })
        })?;

        for entry in entries {
            let raw = entry.require_i(ID_KEY).map_err(document_error)?;
            let raw = u32::try_from(raw).map_err(|_| {
                document_error(DocumentError::WrongType {
                    key: ID_KEY.to_owned(),
                    expected: "a 32-bit handle",
                })
            })?;
            let rid = Rid::from_raw(raw);
            if !self.allocate_at(rid) {
                return Err(SlotError::Placement {
                    rid,
                    entity_type: self.entity_type(),
                });
            }
            if let Some(payload) = self.get_mut(rid) {
                decode(payload, entry).map_err(document_error)?;
            }
        }
        Ok(self.len())
    }
}

impl<T: Default + Persist> SlotAllocator<T> {
    pub fn serialize_into(&self, node: &mut DataNode, key: &str) {
        self.serialize_into_with(node, key, |payload, entry| payload.encode(entry));
    }

    pub fn deserialize_from(&mut self, node: &DataNode, key: &str) -> Result<usize, SlotError> {
        self.deserialize_from_with(node, key, |payload, entry| payload.decode(entry))
    }
}
