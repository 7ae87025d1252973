//! Attribute dictionary
//!
//! The dictionary is the arena that owns every attribute and value.
//! Attributes refer to each other only through [`AttributeId`]s, and every
//! referent link is checked for cycles when it is created.

use std::collections::{BTreeSet, HashSet};

use itertools::Itertools;
use rustc_hash::FxHashMap;

use super::attribute::{Attribute, AttributeId, AttributeKind, DataType};
use super::mapper::{MappingEntry, ValueMapper};
use super::range::RangeBound;
use super::value::{Value, ValueId};
use crate::error::{Result, SynthesisError};

/// Arena of attributes and values
#[derive(Debug, Clone, Default)]
pub struct AttributeDictionary {
    attributes: Vec<Attribute>,
    values: Vec<Value>,
    by_name: FxHashMap<String, AttributeId>,
    value_index: FxHashMap<(AttributeId, String), ValueId>,
}

impl AttributeDictionary {
    /// Create an empty dictionary
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate over all attributes in definition order
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Add a root attribute whose model strings equal its input strings
    pub fn add_unique(
        &mut self,
        name: &str,
        data_type: DataType,
        inputs: &[&str],
    ) -> Result<AttributeId> {
        self.add_unique_with_models(name, data_type, inputs, inputs)
    }

    /// Add a root attribute with separate input and model strings
    ///
    /// # Arguments
    /// * `name` - Unique attribute name
    /// * `data_type` - Data type of the values
    /// * `inputs` - Value labels as found in source data
    /// * `models` - Canonical labels, one per input
    pub fn add_unique_with_models(
        &mut self,
        name: &str,
        data_type: DataType,
        inputs: &[&str],
        models: &[&str],
    ) -> Result<AttributeId> {
        self.check_new_attribute(name, inputs)?;
        if inputs.len() != models.len() {
            return Err(SynthesisError::ValueCountMismatch {
                attribute: name.to_string(),
                inputs: inputs.len(),
                models: models.len(),
            });
        }
        let models = models.iter().map(|m| (*m).to_string()).collect::<Vec<_>>();
        Ok(self.push_attribute(name, data_type, AttributeKind::Unique, None, inputs, &models))
    }

    /// Add a root attribute whose values are numeric bins such as `"0-14"` or `"75+"`
    pub fn add_range(&mut self, name: &str, inputs: &[&str]) -> Result<AttributeId> {
        self.check_new_attribute(name, inputs)?;
        let bounds = inputs
            .iter()
            .map(|input| {
                RangeBound::parse(input).map_err(|reason| SynthesisError::InvalidRange {
                    attribute: name.to_string(),
                    value: (*input).to_string(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        for (i, j) in (0..bounds.len()).tuple_combinations() {
            if bounds[i].overlaps(&bounds[j]) {
                return Err(SynthesisError::InvalidRange {
                    attribute: name.to_string(),
                    value: inputs[j].to_string(),
                    reason: format!("overlaps bin '{}'", inputs[i]),
                });
            }
        }
        let models = bounds.iter().map(RangeBound::model_string).collect::<Vec<_>>();
        Ok(self.push_attribute(
            name,
            DataType::Range,
            AttributeKind::Range(bounds),
            None,
            inputs,
            &models,
        ))
    }

    /// Add an attribute defined against `referent` through an explicit mapping
    ///
    /// Each mapping entry relates a set of this attribute's input strings to a
    /// set of the referent's input strings. Neither side may list a value in
    /// more than one entry.
    pub fn add_mapped(
        &mut self,
        name: &str,
        data_type: DataType,
        referent: AttributeId,
        inputs: &[&str],
        mapping: &[(&[&str], &[&str])],
    ) -> Result<AttributeId> {
        self.check_new_attribute(name, inputs)?;
        let referent_attr = self.attribute(referent)?;
        if referent_attr.is_record() {
            return Err(SynthesisError::InvalidMapping {
                attribute: name.to_string(),
                reason: format!("record attribute '{}' cannot be a referent", referent_attr.name),
            });
        }

        let mut own_seen = HashSet::new();
        let mut referent_seen = HashSet::new();
        let mut referent_entries = Vec::with_capacity(mapping.len());
        for (own, targets) in mapping {
            for value in own.iter() {
                if !inputs.contains(value) {
                    return Err(SynthesisError::UnknownValue {
                        attribute: name.to_string(),
                        value: (*value).to_string(),
                    });
                }
                if !own_seen.insert(*value) {
                    return Err(SynthesisError::InvalidMapping {
                        attribute: name.to_string(),
                        reason: format!("value '{value}' appears in more than one mapping entry"),
                    });
                }
            }
            let mut resolved = BTreeSet::new();
            for value in targets.iter() {
                let id = self.lookup_value(referent, value)?;
                if !referent_seen.insert(id) {
                    return Err(SynthesisError::InvalidMapping {
                        attribute: name.to_string(),
                        reason: format!(
                            "referent value '{value}' appears in more than one mapping entry"
                        ),
                    });
                }
                resolved.insert(id);
            }
            referent_entries.push(resolved);
        }

        let models = inputs.iter().map(|m| (*m).to_string()).collect::<Vec<_>>();
        let id = self.push_attribute(
            name,
            data_type,
            AttributeKind::Unique,
            Some(referent),
            inputs,
            &models,
        );

        let entries = mapping
            .iter()
            .zip(referent_entries)
            .map(|((own, _), referent)| MappingEntry {
                own: own
                    .iter()
                    .filter_map(|value| self.value_index.get(&(id, (*value).to_string())).copied())
                    .collect(),
                referent,
            })
            .collect();
        let mapper = ValueMapper::new(entries);
        debug_assert!(mapper.first_overlap().is_none());
        self.attributes[id.index()].kind = AttributeKind::Mapped(mapper);
        Ok(id)
    }

    /// Add a bookkeeping attribute attached to `referent`
    pub fn add_record(&mut self, name: &str, referent: AttributeId) -> Result<AttributeId> {
        self.check_new_attribute(name, &[])?;
        self.attribute(referent)?;
        Ok(self.push_attribute(
            name,
            DataType::Integer,
            AttributeKind::Record,
            Some(referent),
            &[],
            &[],
        ))
    }

    /// Point a unique or range attribute at a referent it is derived from
    ///
    /// Values of the two attributes correspond when their input strings are
    /// equal. Fails if the link would close a cycle in the reference graph.
    pub fn set_referent(&mut self, attribute: AttributeId, referent: AttributeId) -> Result<()> {
        let attr = self.attribute(attribute)?;
        if !matches!(attr.kind, AttributeKind::Unique | AttributeKind::Range(_)) {
            return Err(SynthesisError::InvalidMapping {
                attribute: attr.name.clone(),
                reason: "only unique and range attributes can be re-pointed".to_string(),
            });
        }
        self.attribute(referent)?;

        let mut chain = vec![attribute];
        let mut current = referent;
        loop {
            chain.push(current);
            if current == attribute {
                return Err(SynthesisError::CyclicReference {
                    chain: chain
                        .iter()
                        .map(|id| self.attributes[id.index()].name.clone())
                        .collect(),
                });
            }
            let next = self.attributes[current.index()].referent;
            if next == current || chain.len() > self.attributes.len() + 1 {
                break;
            }
            current = next;
        }

        self.attributes[attribute.index()].referent = referent;
        Ok(())
    }

    /// Look up an attribute by id
    pub fn attribute(&self, id: AttributeId) -> Result<&Attribute> {
        self.attributes
            .get(id.index())
            .ok_or_else(|| SynthesisError::UnknownAttribute(format!("#{}", id.0)))
    }

    /// Look up an attribute id by name
    pub fn attribute_id(&self, name: &str) -> Result<AttributeId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SynthesisError::UnknownAttribute(name.to_string()))
    }

    /// Name of an attribute, or a placeholder for ids from another dictionary
    #[must_use]
    pub fn attribute_name(&self, id: AttributeId) -> String {
        self.attributes
            .get(id.index())
            .map_or_else(|| format!("#{}", id.0), |attr| attr.name.clone())
    }

    /// Look up a value by id
    pub fn value(&self, id: ValueId) -> Result<&Value> {
        self.values.get(id.index()).ok_or_else(|| SynthesisError::UnknownValue {
            attribute: "?".to_string(),
            value: format!("#{}", id.0),
        })
    }

    /// `attribute=input` label for diagnostics
    #[must_use]
    pub fn describe_value(&self, id: ValueId) -> String {
        match self.values.get(id.index()) {
            Some(value) if value.is_empty() => {
                format!("{}=<empty>", self.attribute_name(value.attribute()))
            }
            Some(value) => format!("{}={}", self.attribute_name(value.attribute()), value.input()),
            None => format!("#{}", id.0),
        }
    }

    /// Legal values of an attribute
    pub fn values(&self, attribute: AttributeId) -> Result<&[ValueId]> {
        Ok(self.attribute(attribute)?.values())
    }

    /// Resolve an input string to a value id
    ///
    /// Record attributes never match: any lookup against them yields the
    /// attribute's empty value.
    pub fn value_of(&self, attribute: AttributeId, input: &str) -> Result<ValueId> {
        let attr = self.attribute(attribute)?;
        if attr.is_record() {
            return Ok(attr.empty_value);
        }
        self.lookup_value(attribute, input)
    }

    /// Resolve a number to the bin of a range attribute containing it
    ///
    /// Returns the empty value when no bin contains the number.
    pub fn value_for_number(&self, attribute: AttributeId, number: f64) -> Result<ValueId> {
        let attr = self.attribute(attribute)?;
        let Some(bounds) = attr.ranges() else {
            return Err(SynthesisError::InvalidRange {
                attribute: attr.name.clone(),
                value: number.to_string(),
                reason: "attribute is not a range attribute".to_string(),
            });
        };
        Ok(bounds
            .iter()
            .position(|bound| bound.contains(number))
            .map_or(attr.empty_value, |pos| attr.values[pos]))
    }

    /// Referent chain from `attribute` up to its root, both included
    pub fn referent_chain(&self, attribute: AttributeId) -> Result<Vec<AttributeId>> {
        let mut chain = vec![attribute];
        let mut current = self.attribute(attribute)?;
        while !current.is_root() {
            if chain.len() > self.attributes.len() {
                return Err(SynthesisError::CyclicReference {
                    chain: chain.iter().map(|id| self.attribute_name(*id)).collect(),
                });
            }
            chain.push(current.referent);
            current = self.attribute(current.referent)?;
        }
        Ok(chain)
    }

    /// Root attribute of a referent chain
    pub fn root_of(&self, attribute: AttributeId) -> Result<AttributeId> {
        let chain = self.referent_chain(attribute)?;
        Ok(chain[chain.len() - 1])
    }

    /// Translate a value into the corresponding values of another attribute
    ///
    /// The translation walks the reference graph: up from the value's
    /// attribute to the closest common ancestor of both attributes, then down
    /// to `target`. A value with no mapping entry yields `target`'s empty
    /// value.
    ///
    /// # Arguments
    /// * `value` - The value to translate
    /// * `target` - Attribute whose values are wanted
    ///
    /// # Returns
    /// The set of `target` values corresponding to `value`, or an error if
    /// the two attributes share no ancestor
    pub fn find_mapped_attribute_values(
        &self,
        value: ValueId,
        target: AttributeId,
    ) -> Result<BTreeSet<ValueId>> {
        let source_value = self.value(value)?;
        let target_attr = self.attribute(target)?;
        let source = source_value.attribute();

        if source == target {
            return Ok(BTreeSet::from([value]));
        }
        if source_value.is_empty() || target_attr.is_record() {
            return Ok(BTreeSet::from([target_attr.empty_value]));
        }

        let up_source = self.referent_chain(source)?;
        let up_target = self.referent_chain(target)?;
        let Some(common) = up_source.iter().find(|id| up_target.contains(id)).copied() else {
            return Err(SynthesisError::InvalidMapping {
                attribute: target_attr.name.clone(),
                reason: format!(
                    "attribute '{}' shares no referent with it",
                    self.attribute_name(source)
                ),
            });
        };

        let mut current = BTreeSet::from([value]);
        for attr in up_source.iter().take_while(|id| **id != common) {
            current = self.step_up(*attr, &current)?;
        }
        let descent: Vec<AttributeId> = up_target
            .iter()
            .take_while(|id| **id != common)
            .copied()
            .collect();
        for attr in descent.iter().rev() {
            current = self.step_down(*attr, &current)?;
        }

        if current.is_empty() {
            current.insert(target_attr.empty_value);
        }
        Ok(current)
    }

    /// Values of `attribute`'s referent corresponding to some of its own values
    fn step_up(&self, attribute: AttributeId, own: &BTreeSet<ValueId>) -> Result<BTreeSet<ValueId>> {
        let attr = self.attribute(attribute)?;
        let mut result = BTreeSet::new();
        match &attr.kind {
            AttributeKind::Mapped(mapper) => {
                for value in own {
                    if let Some(referent_values) = mapper.referent_values_of(*value) {
                        result.extend(referent_values.iter().copied());
                    }
                }
            }
            AttributeKind::Record => {}
            AttributeKind::Unique | AttributeKind::Range(_) => {
                for value in own {
                    let input = self.value(*value)?.input();
                    if let Some(id) = self.value_index.get(&(attr.referent, input.to_string())) {
                        result.insert(*id);
                    }
                }
            }
        }
        Ok(result)
    }

    /// Own values of `attribute` corresponding to some of its referent's values
    fn step_down(
        &self,
        attribute: AttributeId,
        referent_values: &BTreeSet<ValueId>,
    ) -> Result<BTreeSet<ValueId>> {
        let attr = self.attribute(attribute)?;
        let mut result = BTreeSet::new();
        match &attr.kind {
            AttributeKind::Mapped(mapper) => {
                for value in referent_values {
                    if let Some(own) = mapper.own_values_of(*value) {
                        result.extend(own.iter().copied());
                    }
                }
            }
            AttributeKind::Record => {}
            AttributeKind::Unique | AttributeKind::Range(_) => {
                for value in referent_values {
                    let input = self.value(*value)?.input();
                    if let Some(id) = self.value_index.get(&(attribute, input.to_string())) {
                        result.insert(*id);
                    }
                }
            }
        }
        Ok(result)
    }

    fn lookup_value(&self, attribute: AttributeId, input: &str) -> Result<ValueId> {
        self.value_index
            .get(&(attribute, input.to_string()))
            .copied()
            .ok_or_else(|| SynthesisError::UnknownValue {
                attribute: self.attribute_name(attribute),
                value: input.to_string(),
            })
    }

    fn check_new_attribute(&self, name: &str, inputs: &[&str]) -> Result<()> {
        if self.by_name.contains_key(name) {
            return Err(SynthesisError::DuplicateAttribute(name.to_string()));
        }
        let mut seen = HashSet::with_capacity(inputs.len());
        for input in inputs {
            if input.is_empty() || !seen.insert(*input) {
                return Err(SynthesisError::DuplicateValue {
                    attribute: name.to_string(),
                    value: (*input).to_string(),
                });
            }
        }
        Ok(())
    }

    fn push_attribute(
        &mut self,
        name: &str,
        data_type: DataType,
        kind: AttributeKind,
        referent: Option<AttributeId>,
        inputs: &[&str],
        models: &[String],
    ) -> AttributeId {
        let id = AttributeId(self.attributes.len() as u32);

        let empty_value = ValueId(self.values.len() as u32);
        self.values.push(Value::empty(empty_value, id));

        let mut values = Vec::with_capacity(inputs.len());
        for (input, model) in inputs.iter().zip(models) {
            let value_id = ValueId(self.values.len() as u32);
            self.values
                .push(Value::new(value_id, id, (*input).to_string(), model.clone()));
            self.value_index.insert((id, (*input).to_string()), value_id);
            values.push(value_id);
        }

        self.attributes.push(Attribute {
            id,
            name: name.to_string(),
            data_type,
            kind,
            values,
            empty_value,
            referent: referent.unwrap_or(id),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }
}
