//! Marginal targets expressed in seed values

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rustc_hash::FxHashSet;

use super::matching::AttributeMatch;
use crate::matrix::ControlKind;
use crate::model::{AttributeDictionary, AttributeId, ValueId};

/// Allowed seed values per constrained attribute, sorted by attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueSubset {
    constraints: Vec<(AttributeId, BTreeSet<ValueId>)>,
}

impl ValueSubset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `attribute` to `allowed`, intersecting with any earlier restriction
    pub fn restrict(&mut self, attribute: AttributeId, allowed: BTreeSet<ValueId>) {
        match self.constraints.binary_search_by_key(&attribute, |(a, _)| *a) {
            Ok(pos) => {
                let current = &mut self.constraints[pos].1;
                current.retain(|value| allowed.contains(value));
            }
            Err(pos) => self.constraints.insert(pos, (attribute, allowed)),
        }
    }

    #[must_use]
    pub fn constraints(&self) -> &[(AttributeId, BTreeSet<ValueId>)] {
        &self.constraints
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Allowed values for `attribute`, if restricted
    #[must_use]
    pub fn allowed(&self, attribute: AttributeId) -> Option<&BTreeSet<ValueId>> {
        self.constraints
            .binary_search_by_key(&attribute, |(a, _)| *a)
            .ok()
            .map(|pos| &self.constraints[pos].1)
    }

    /// Human readable form, e.g. `{sex=F | age=0-14, 15-64}`
    #[must_use]
    pub fn describe(&self, dict: &AttributeDictionary) -> String {
        let parts: Vec<String> = self
            .constraints
            .iter()
            .map(|(attribute, allowed)| {
                let labels: Vec<String> = allowed
                    .iter()
                    .map(|id| {
                        dict.value(*id)
                            .map_or_else(|_| format!("#{}", id.index()), |v| {
                                if v.is_empty() { "<empty>".to_string() } else { v.input().to_string() }
                            })
                    })
                    .collect();
                format!("{}={}", dict.attribute_name(*attribute), labels.join(", "))
            })
            .collect();
        format!("{{{}}}", parts.join(" | "))
    }
}

/// One marginal target on a seed attribute
///
/// The target constrains the seed cells holding one of `values` on
/// `attribute` within the slice selected by `descriptor`. The descriptor
/// never restricts `attribute` itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Margin {
    pub attribute: AttributeId,
    pub values: BTreeSet<ValueId>,
    pub descriptor: ValueSubset,
    pub target: f64,
    /// Label of the control matrix the target came from
    pub source: String,
}

impl Margin {
    /// Full cell selection: the descriptor plus the targeted values
    #[must_use]
    pub fn subset(&self) -> ValueSubset {
        let mut subset = self.descriptor.clone();
        subset.restrict(self.attribute, self.values.clone());
        subset
    }
}

/// Marginal targets grouped by the seed attribute they constrain
#[derive(Debug, Clone)]
pub struct MarginSet {
    kind: ControlKind,
    margins: BTreeMap<AttributeId, Vec<Margin>>,
    matches: Vec<AttributeMatch>,
    unmatched: Vec<AttributeId>,
}

impl MarginSet {
    pub(crate) fn new(
        kind: ControlKind,
        margins: BTreeMap<AttributeId, Vec<Margin>>,
        matches: Vec<AttributeMatch>,
        unmatched: Vec<AttributeId>,
    ) -> Self {
        Self {
            kind,
            margins,
            matches,
            unmatched,
        }
    }

    /// Control kind of the seed the targets are scaled to
    #[must_use]
    pub const fn kind(&self) -> ControlKind {
        self.kind
    }

    /// Seed attributes carrying at least one target
    pub fn attributes(&self) -> impl Iterator<Item = AttributeId> + '_ {
        self.margins.keys().copied()
    }

    #[must_use]
    pub fn margins_for(&self, attribute: AttributeId) -> &[Margin] {
        self.margins.get(&attribute).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Margin> {
        self.margins.values().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.margins.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.margins.is_empty()
    }

    /// Control-to-seed attribute pairs that produced targets
    #[must_use]
    pub fn matches(&self) -> &[AttributeMatch] {
        &self.matches
    }

    /// Control attributes that matched no seed dimension
    #[must_use]
    pub fn unmatched(&self) -> &[AttributeId] {
        &self.unmatched
    }

    /// Margins with distinct cell selections, first occurrence kept
    ///
    /// Two control matrices sharing an attribute yield the same selection
    /// twice; fitting both would only make them fight.
    #[must_use]
    pub fn distinct(&self) -> Vec<&Margin> {
        let mut seen = FxHashSet::default();
        self.iter().filter(|margin| seen.insert(margin.subset())).collect()
    }
}

impl fmt::Display for MarginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} margins on {} seed attributes ({} matched, {} unmatched control attributes)",
            self.len(),
            self.margins.len(),
            self.matches.len(),
            self.unmatched.len()
        )
    }
}
