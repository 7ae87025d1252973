//! Matching control attributes to seed attributes

use std::fmt;

use crate::error::Result;
use crate::model::{AttributeDictionary, AttributeId};

/// How a control attribute relates to the seed attribute it constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Same attribute on both sides
    Exact,
    /// One attribute is the other's direct referent
    ByReferent,
    /// Both attributes descend from the same root
    ReferentToReferent,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::ByReferent => write!(f, "by referent"),
            Self::ReferentToReferent => write!(f, "referent to referent"),
        }
    }
}

/// A control attribute paired with the seed attribute it constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeMatch {
    pub control: AttributeId,
    pub seed: AttributeId,
    pub kind: MatchKind,
}

/// Find the seed dimension a control attribute constrains
///
/// Exact matches win over referent matches, which win over matches through
/// a shared root. Record attributes never match.
pub fn match_attribute(
    dict: &AttributeDictionary,
    control: AttributeId,
    seed_dimensions: &[AttributeId],
) -> Result<Option<AttributeMatch>> {
    let attribute = dict.attribute(control)?;
    if attribute.is_record() {
        return Ok(None);
    }
    if seed_dimensions.contains(&control) {
        return Ok(Some(AttributeMatch {
            control,
            seed: control,
            kind: MatchKind::Exact,
        }));
    }

    for seed in seed_dimensions {
        let seed_attr = dict.attribute(*seed)?;
        if seed_attr.is_record() {
            continue;
        }
        if attribute.referent() == *seed || seed_attr.referent() == control {
            return Ok(Some(AttributeMatch {
                control,
                seed: *seed,
                kind: MatchKind::ByReferent,
            }));
        }
    }

    let root = dict.root_of(control)?;
    for seed in seed_dimensions {
        if dict.attribute(*seed)?.is_record() {
            continue;
        }
        if dict.root_of(*seed)? == root {
            return Ok(Some(AttributeMatch {
                control,
                seed: *seed,
                kind: MatchKind::ReferentToReferent,
            }));
        }
    }
    Ok(None)
}
