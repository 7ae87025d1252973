//! Attribute values

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::attribute::AttributeId;

/// Identifier of a value inside an [`AttributeDictionary`](super::AttributeDictionary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId(pub(crate) u32);

impl ValueId {
    /// Position of the value in the dictionary arena
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A value owned by exactly one attribute
///
/// The input form is the label as seen in source data; the model form is
/// the canonical representation after parsing or mapping. Equality and
/// hashing only look at the owning attribute id and the input form.
#[derive(Debug, Clone)]
pub struct Value {
    id: ValueId,
    attribute: AttributeId,
    input: String,
    model: String,
    empty: bool,
}

impl Value {
    pub(crate) fn new(id: ValueId, attribute: AttributeId, input: String, model: String) -> Self {
        Self {
            id,
            attribute,
            input,
            model,
            empty: false,
        }
    }

    pub(crate) fn empty(id: ValueId, attribute: AttributeId) -> Self {
        Self {
            id,
            attribute,
            input: String::new(),
            model: String::new(),
            empty: true,
        }
    }

    /// Dictionary id of this value
    #[must_use]
    pub const fn id(&self) -> ValueId {
        self.id
    }

    /// Id of the owning attribute
    #[must_use]
    pub const fn attribute(&self) -> AttributeId {
        self.attribute
    }

    /// Label as seen in source data
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Canonical label
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether this is the attribute's empty sentinel
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.empty
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.attribute == other.attribute && self.input == other.input
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.attribute.hash(state);
        self.input.hash(state);
    }
}
