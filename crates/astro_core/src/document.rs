//! Structured documents for save games and data files
//!
//! A [`DataNode`] is a tree of named scalar fields, named children, named
//! scalar arrays and named arrays of children. Subsystems write their own
//! fields into nodes; the handle layer only relies on child arrays and
//! integer fields. Keys are kept sorted so the JSON form is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("missing key '{key}'")]
    MissingKey { key: String },

    #[error("key '{key}' does not hold {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Leaf value of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats; text does not parse.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataNode {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, Scalar>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, DataNode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    arrays: BTreeMap<String, Vec<Scalar>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    child_arrays: BTreeMap<String, Vec<DataNode>>,
}

impl DataNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
            || self.children.contains_key(key)
            || self.arrays.contains_key(key)
            || self.child_arrays.contains_key(key)
    }

    /// Remove `key` from whichever section holds it.
    pub fn remove(&mut self, key: &str) {
        self.fields.remove(key);
        self.children.remove(key);
        self.arrays.remove(key);
        self.child_arrays.remove(key);
    }

    // ------------------------------------------------------------------
    // Scalar fields
    // ------------------------------------------------------------------

    pub fn set_i(&mut self, key: &str, value: i64) {
        self.fields.insert(key.to_owned(), Scalar::Int(value));
    }

    pub fn set_f(&mut self, key: &str, value: f64) {
        self.fields.insert(key.to_owned(), Scalar::Float(value));
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_owned(), Scalar::Text(value.into()));
    }

    pub fn get_i(&self, key: &str) -> Option<i64> {
        self.fields.get(key)?.as_i64()
    }

    pub fn get_f(&self, key: &str) -> Option<f64> {
        self.fields.get(key)?.as_f64()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key)?.as_str()
    }

    pub fn get_i_or(&self, key: &str, default: i64) -> i64 {
        self.get_i(key).unwrap_or(default)
    }

    pub fn get_f_or(&self, key: &str, default: f64) -> f64 {
        self.get_f(key).unwrap_or(default)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Like [`DataNode::get_i`], but absence and type mismatch are errors.
    pub fn require_i(&self, key: &str) -> Result<i64, DocumentError> {
        match self.fields.get(key) {
            None => Err(DocumentError::MissingKey { key: key.to_owned() }),
            Some(value) => value.as_i64().ok_or_else(|| DocumentError::WrongType {
                key: key.to_owned(),
                expected: "an integer",
            }),
        }
    }

    pub fn require_f(&self, key: &str) -> Result<f64, DocumentError> {
        match self.fields.get(key) {
            None => Err(DocumentError::MissingKey { key: key.to_owned() }),
            Some(value) => value.as_f64().ok_or_else(|| DocumentError::WrongType {
                key: key.to_owned(),
                expected: "a number",
            }),
        }
    }

    pub fn require(&self, key: &str) -> Result<&str, DocumentError> {
        match self.fields.get(key) {
            None => Err(DocumentError::MissingKey { key: key.to_owned() }),
            Some(value) => value.as_str().ok_or_else(|| DocumentError::WrongType {
                key: key.to_owned(),
                expected: "text",
            }),
        }
    }

    // ------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------

    /// Insert an empty child under `key` (replacing any previous one).
    pub fn set_child(&mut self, key: &str) -> &mut DataNode {
        let slot = self.children.entry(key.to_owned()).or_default();
        *slot = DataNode::new();
        slot
    }

    pub fn child(&self, key: &str) -> Option<&DataNode> {
        self.children.get(key)
    }

    pub fn child_mut(&mut self, key: &str) -> Option<&mut DataNode> {
        self.children.get_mut(key)
    }

    // ------------------------------------------------------------------
    // Scalar arrays
    // ------------------------------------------------------------------

    pub fn set_int_array(&mut self, key: &str, values: impl IntoIterator<Item = i64>) {
        let values = values.into_iter().map(Scalar::Int).collect();
        self.arrays.insert(key.to_owned(), values);
    }

    pub fn set_text_array<S: Into<String>>(&mut self, key: &str, values: impl IntoIterator<Item = S>) {
        let values = values.into_iter().map(|s| Scalar::Text(s.into())).collect();
        self.arrays.insert(key.to_owned(), values);
    }

    pub fn array(&self, key: &str) -> Option<&[Scalar]> {
        self.arrays.get(key).map(Vec::as_slice)
    }

    pub fn array_len(&self, key: &str) -> usize {
        self.arrays.get(key).map_or(0, Vec::len)
    }

    /// Read an integer array; every element must be an integer.
    pub fn int_array(&self, key: &str) -> Result<Vec<i64>, DocumentError> {
        let values = self
            .arrays
            .get(key)
            .ok_or_else(|| DocumentError::MissingKey { key: key.to_owned() })?;
        values
            .iter()
            .map(|v| {
                v.as_i64().ok_or_else(|| DocumentError::WrongType {
                    key: key.to_owned(),
                    expected: "an integer array",
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Child arrays
    // ------------------------------------------------------------------

    /// Create (or reset) an array of `len` empty children under `key`.
    pub fn set_child_array(&mut self, key: &str, len: usize) -> &mut [DataNode] {
        let slot = self.child_arrays.entry(key.to_owned()).or_default();
        slot.clear();
        slot.resize_with(len, DataNode::new);
        slot.as_mut_slice()
    }

    /// Append an empty child to the array under `key`, creating it if needed.
    pub fn push_array_child(&mut self, key: &str) -> &mut DataNode {
        let slot = self.child_arrays.entry(key.to_owned()).or_default();
        slot.push(DataNode::new());
        let last = slot.len() - 1;
        &mut slot[last]
    }

    pub fn child_array(&self, key: &str) -> Option<&[DataNode]> {
        self.child_arrays.get(key).map(Vec::as_slice)
    }

    pub fn child_array_len(&self, key: &str) -> usize {
        self.child_arrays.get(key).map_or(0, Vec::len)
    }

    // ------------------------------------------------------------------
    // Text form
    // ------------------------------------------------------------------

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }
}
