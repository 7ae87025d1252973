//! Attribute definitions
//!
//! An attribute is a dimension of the joint distribution. Its referent is
//! stored as an id into the owning dictionary; a root attribute is its
//! own referent.

use serde::{Deserialize, Serialize};

use super::mapper::ValueMapper;
use super::range::RangeBound;
use super::value::ValueId;

/// Identifier of an attribute inside an [`AttributeDictionary`](super::AttributeDictionary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeId(pub(crate) u32);

impl AttributeId {
    /// Position of the attribute in the dictionary arena
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Data type of an attribute's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Unordered categories
    #[default]
    Nominal,
    /// Ordered categories
    Order,
    /// Whole numbers
    Integer,
    /// Numeric bins
    Range,
}

/// Role an attribute plays in the reference graph
#[derive(Debug, Clone)]
pub enum AttributeKind {
    /// Root attribute with an explicit value space
    Unique,
    /// Root attribute whose values are numeric bins, aligned with the value space
    Range(Vec<RangeBound>),
    /// Attribute defined against a referent through an explicit mapping
    Mapped(ValueMapper),
    /// Bookkeeping attribute that never takes part in value matching
    Record,
}

/// A named dimension with a value space and a referent attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub(crate) id: AttributeId,
    pub(crate) name: String,
    pub(crate) data_type: DataType,
    pub(crate) kind: AttributeKind,
    pub(crate) values: Vec<ValueId>,
    pub(crate) empty_value: ValueId,
    pub(crate) referent: AttributeId,
}

impl Attribute {
    #[must_use]
    pub const fn id(&self) -> AttributeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    #[must_use]
    pub const fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    /// Legal values, in definition order. The empty sentinel is not included.
    #[must_use]
    pub fn values(&self) -> &[ValueId] {
        &self.values
    }

    #[must_use]
    pub const fn empty_value(&self) -> ValueId {
        self.empty_value
    }

    /// Referent attribute id; equal to [`Attribute::id`] for root attributes
    #[must_use]
    pub const fn referent(&self) -> AttributeId {
        self.referent
    }

    /// Whether the attribute is its own authority
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.referent == self.id
    }

    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self.kind, AttributeKind::Record)
    }

    /// Value mapper for mapped attributes
    #[must_use]
    pub const fn mapper(&self) -> Option<&ValueMapper> {
        match &self.kind {
            AttributeKind::Mapped(mapper) => Some(mapper),
            _ => None,
        }
    }

    /// Numeric bins for range attributes
    #[must_use]
    pub fn ranges(&self) -> Option<&[RangeBound]> {
        match &self.kind {
            AttributeKind::Range(bounds) => Some(bounds),
            _ => None,
        }
    }
}
