//! Coordinates identifying matrix cells

use std::fmt;

use smallvec::SmallVec;

use crate::error::{Result, SynthesisError};
use crate::model::{AttributeDictionary, AttributeId, ValueId};

/// Inline capacity for coordinate values; wider tables spill to the heap
const INLINE_VALUES: usize = 8;

/// An immutable set of values, at most one per attribute
///
/// Values are kept sorted so equality and hashing are structural. A
/// coordinate with fewer values than a matrix has dimensions denotes a
/// marginal cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coordinate {
    values: SmallVec<[ValueId; INLINE_VALUES]>,
}

impl Coordinate {
    /// Build a coordinate, checking that no attribute appears twice and that
    /// no empty sentinel value is used
    pub fn new(
        dict: &AttributeDictionary,
        values: impl IntoIterator<Item = ValueId>,
    ) -> Result<Self> {
        let mut sorted: SmallVec<[ValueId; INLINE_VALUES]> = values.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut seen: SmallVec<[AttributeId; INLINE_VALUES]> = SmallVec::new();
        for id in &sorted {
            let value = dict.value(*id)?;
            if value.is_empty() {
                return Err(SynthesisError::NoSuchCoordinate(format!(
                    "{} cannot be part of a coordinate",
                    dict.describe_value(*id)
                )));
            }
            if seen.contains(&value.attribute()) {
                return Err(SynthesisError::NoSuchCoordinate(format!(
                    "attribute '{}' appears twice",
                    dict.attribute_name(value.attribute())
                )));
            }
            seen.push(value.attribute());
        }
        Ok(Self { values: sorted })
    }

    /// Build from values already known to be one-per-attribute
    pub(crate) fn from_values_unchecked(values: impl IntoIterator<Item = ValueId>) -> Self {
        let mut values: SmallVec<[ValueId; INLINE_VALUES]> = values.into_iter().collect();
        values.sort_unstable();
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[ValueId] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether this coordinate's value set is a superset of `other`'s
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        if other.values.len() > self.values.len() {
            return false;
        }
        // Both sides are sorted: one merge pass
        let mut mine = self.values.iter();
        'outer: for wanted in &other.values {
            for candidate in mine.by_ref() {
                if candidate == wanted {
                    continue 'outer;
                }
                if candidate > wanted {
                    return false;
                }
            }
            return false;
        }
        true
    }

    #[must_use]
    pub fn contains_value(&self, value: ValueId) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    /// Value this coordinate holds for `attribute`, if any
    #[must_use]
    pub fn value_for(&self, dict: &AttributeDictionary, attribute: AttributeId) -> Option<ValueId> {
        self.values
            .iter()
            .copied()
            .find(|id| dict.value(*id).is_ok_and(|value| value.attribute() == attribute))
    }

    /// Human readable form, e.g. `{age=0-14, sex=F}`
    #[must_use]
    pub fn describe(&self, dict: &AttributeDictionary) -> String {
        let parts: Vec<String> = self.values.iter().map(|id| dict.describe_value(*id)).collect();
        format!("{{{}}}", parts.join(", "))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.values.iter().map(|id| format!("#{}", id.index())).collect();
        write!(f, "{{{}}}", ids.join(", "))
    }
}
