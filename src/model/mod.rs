//! Attribute and value model
//!
//! Attributes are the dimensions of a joint distribution. They live in an
//! [`AttributeDictionary`] arena and reference each other by id, forming an
//! acyclic referent graph that lets values defined at different levels of
//! aggregation be translated into one another.

pub mod attribute;
pub mod definition;
pub mod dictionary;
pub mod mapper;
pub mod range;
pub mod value;

// Re-export commonly used items
pub use attribute::{Attribute, AttributeId, AttributeKind, DataType};
pub use definition::{AttributeDefinition, AttributeRole, MappingDefinition};
pub use dictionary::AttributeDictionary;
pub use mapper::{MappingEntry, ValueMapper};
pub use range::RangeBound;
pub use value::{Value, ValueId};
