//! Bidirectional value mapping between a mapped attribute and its referent

use std::collections::BTreeSet;

use super::value::ValueId;

/// Many-to-many mapping between sets of an attribute's own values and sets
/// of its referent's values
///
/// Each own value appears in at most one entry and so does each referent
/// value. The dictionary checks this when the mapping is registered.
#[derive(Debug, Clone, Default)]
pub struct ValueMapper {
    entries: Vec<MappingEntry>,
}

/// One `{own values} <-> {referent values}` relation
#[derive(Debug, Clone)]
pub struct MappingEntry {
    /// Values of the mapped attribute
    pub own: BTreeSet<ValueId>,
    /// Values of the referent attribute
    pub referent: BTreeSet<ValueId>,
}

impl ValueMapper {
    pub(crate) fn new(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    /// All registered entries
    #[must_use]
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Referent values that an own value corresponds to
    #[must_use]
    pub fn referent_values_of(&self, own: ValueId) -> Option<&BTreeSet<ValueId>> {
        self.entries
            .iter()
            .find(|entry| entry.own.contains(&own))
            .map(|entry| &entry.referent)
    }

    /// Own values that a referent value corresponds to
    #[must_use]
    pub fn own_values_of(&self, referent: ValueId) -> Option<&BTreeSet<ValueId>> {
        self.entries
            .iter()
            .find(|entry| entry.referent.contains(&referent))
            .map(|entry| &entry.own)
    }

    /// Find the first value appearing twice on either side, if any
    pub(crate) fn first_overlap(&self) -> Option<ValueId> {
        let mut own_seen = BTreeSet::new();
        let mut referent_seen = BTreeSet::new();
        for entry in &self.entries {
            for value in &entry.own {
                if !own_seen.insert(*value) {
                    return Some(*value);
                }
            }
            for value in &entry.referent {
                if !referent_seen.insert(*value) {
                    return Some(*value);
                }
            }
        }
        None
    }
}
