//! Marginal reconciliation
//!
//! Turns a control matrix into marginal targets on the seed matrix. Control
//! attributes are matched to seed attributes, every matched root attribute
//! is expanded into relative marginals over the other matched attributes,
//! and the control values are translated into seed values through the
//! dictionary's referent graph.

pub mod margins;
pub mod matching;

pub use margins::{Margin, MarginSet, ValueSubset};
pub use matching::{AttributeMatch, MatchKind, match_attribute};

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use itertools::Itertools;
use log::debug;
use rustc_hash::FxHashMap;

use crate::error::{Result, SynthesisError};
use crate::matrix::{FullMatrix, Matrix, NDimensionalMatrix};
use crate::model::{AttributeDictionary, AttributeId, ValueId};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Derive the marginal targets a control matrix imposes on a seed
///
/// Targets are rescaled from each inner control matrix's mass to the seed's
/// mass so that a contingency seed can be fitted against frequency
/// controls and the other way round.
///
/// # Errors
/// `NoMatchingAttributes` when no control attribute reaches a seed
/// dimension, `LookupMiss` when an enumerated control value cannot be
/// retrieved, `InvalidDistribution` when either side carries no mass.
pub fn reconcile_margins(
    dict: &AttributeDictionary,
    control: &Matrix,
    seed: &FullMatrix,
) -> Result<MarginSet> {
    let start = Instant::now();
    log_operation_start("Reconciling margins", control.label());

    let seed_total = seed.total();
    if !seed_total.is_finite() || seed_total <= 0.0 {
        return Err(SynthesisError::InvalidDistribution(format!(
            "seed matrix '{}' has total mass {seed_total}",
            seed.label()
        )));
    }

    let mut margins: BTreeMap<AttributeId, Vec<Margin>> = BTreeMap::new();
    let mut matches = Vec::new();
    let mut unmatched = Vec::new();

    for inner in control.inner_matrices() {
        let inner_total = inner.total();
        if !inner_total.is_finite() || inner_total <= 0.0 {
            return Err(SynthesisError::InvalidDistribution(format!(
                "control matrix '{}' has total mass {inner_total}",
                inner.label()
            )));
        }
        let scale = seed_total / inner_total;

        let mut found = Vec::new();
        for attribute in inner.dimensions() {
            match match_attribute(dict, *attribute, seed.dimensions())? {
                Some(matched) => {
                    debug!(
                        "Control attribute '{}' matches seed attribute '{}' ({})",
                        dict.attribute_name(matched.control),
                        dict.attribute_name(matched.seed),
                        matched.kind
                    );
                    found.push(matched);
                }
                None => {
                    if !unmatched.contains(attribute) {
                        unmatched.push(*attribute);
                        log_warning(
                            &format!(
                                "control attribute '{}' matches no seed dimension and is not fitted",
                                dict.attribute_name(*attribute)
                            ),
                            Some(inner.label()),
                        );
                    }
                }
            }
        }

        let roots = root_matches(dict, &found)?;
        for target in &roots {
            let others: Vec<_> = roots.iter().filter(|m| m.control != target.control).collect();
            let pushed = relative_marginals(dict, inner, target, &others, scale)?;
            margins.entry(target.seed).or_default().extend(pushed);
        }
        matches.extend(roots);
    }

    if margins.is_empty() {
        let names: Vec<String> = seed
            .dimensions()
            .iter()
            .map(|attribute| dict.attribute_name(*attribute))
            .collect();
        return Err(SynthesisError::NoMatchingAttributes {
            seed_dimensions: names.join(", "),
        });
    }

    for attribute in seed.dimensions() {
        if !margins.contains_key(attribute) {
            log_warning(
                &format!(
                    "seed attribute '{}' is not constrained by any control",
                    dict.attribute_name(*attribute)
                ),
                Some(seed.label()),
            );
        }
    }

    let set = MarginSet::new(seed.kind(), margins, matches, unmatched);
    log_operation_complete("reconciled", control.label(), set.len(), Some(start.elapsed()));
    Ok(set)
}

/// Drop matches whose control attribute derives from another matched one
fn root_matches(
    dict: &AttributeDictionary,
    found: &[AttributeMatch],
) -> Result<Vec<AttributeMatch>> {
    let mut roots = Vec::with_capacity(found.len());
    for candidate in found {
        let referent = dict.attribute(candidate.control)?.referent();
        let derived =
            referent != candidate.control && found.iter().any(|m| m.control == referent);
        if !derived {
            roots.push(*candidate);
        }
    }
    Ok(roots)
}

/// Targets on `target`'s seed attribute for every descriptor of `others`
fn relative_marginals(
    dict: &AttributeDictionary,
    inner: &FullMatrix,
    target: &AttributeMatch,
    others: &[&AttributeMatch],
    scale: f64,
) -> Result<Vec<Margin>> {
    let target_axis = axis_of(inner, target.control)?;
    let descriptors: Vec<Vec<ValueId>> = if others.is_empty() {
        vec![Vec::new()]
    } else {
        others
            .iter()
            .map(|m| axis_of(inner, m.control).map(<[ValueId]>::to_vec))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .multi_cartesian_product()
            .collect()
    };

    let mut margins: Vec<Margin> = Vec::new();
    let mut seen: FxHashMap<(BTreeSet<ValueId>, ValueSubset), usize> = FxHashMap::default();

    for combo in &descriptors {
        let mut descriptor = ValueSubset::new();
        for (other, value) in others.iter().zip(combo) {
            descriptor.restrict(other.seed, dict.find_mapped_attribute_values(*value, other.seed)?);
        }

        for value in target_axis {
            let mut query = combo.clone();
            query.push(*value);
            let control = inner.get_val(&query).map_err(|e| SynthesisError::LookupMiss {
                attribute: dict.attribute_name(target.control),
                descriptor: describe_values(dict, &query),
                reason: e.to_string(),
            })?;
            let values = dict.find_mapped_attribute_values(*value, target.seed)?;
            let amount = control.value() * scale;

            match seen.get(&(values.clone(), descriptor.clone())) {
                Some(&pos) => margins[pos].target += amount,
                None => {
                    seen.insert((values.clone(), descriptor.clone()), margins.len());
                    margins.push(Margin {
                        attribute: target.seed,
                        values,
                        descriptor: descriptor.clone(),
                        target: amount,
                        source: inner.label().to_string(),
                    });
                }
            }
        }
    }
    Ok(margins)
}

fn axis_of(matrix: &FullMatrix, attribute: AttributeId) -> Result<&[ValueId]> {
    matrix.axis(attribute).ok_or_else(|| {
        SynthesisError::NoSuchCoordinate(format!(
            "attribute #{} is not a dimension of matrix '{}'",
            attribute.index(),
            matrix.label()
        ))
    })
}

fn describe_values(dict: &AttributeDictionary, values: &[ValueId]) -> String {
    let parts: Vec<String> = values.iter().map(|id| dict.describe_value(*id)).collect();
    format!("{{{}}}", parts.join(", "))
}
