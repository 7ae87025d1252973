//! Declarative attribute definitions
//!
//! Configuration describes attributes by name, and referents may be declared
//! before or after the attribute that uses them. Loading resolves the names,
//! rejects cycles in the reference graph, and registers attributes
//! referents-first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::attribute::DataType;
use super::dictionary::AttributeDictionary;
use crate::error::{Result, SynthesisError};

/// Role of a declared attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeRole {
    #[default]
    Unique,
    Range,
    Mapped,
    Record,
}

/// One `{values} <-> {referent values}` entry of a mapped attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDefinition {
    pub values: Vec<String>,
    pub referent_values: Vec<String>,
}

/// Declarative form of an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    #[serde(default)]
    pub role: AttributeRole,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub values: Vec<String>,
    /// Canonical labels, one per value; defaults to the input labels
    #[serde(default)]
    pub models: Option<Vec<String>>,
    #[serde(default)]
    pub referent: Option<String>,
    #[serde(default)]
    pub mapping: Vec<MappingDefinition>,
}

impl AttributeDefinition {
    /// Shorthand for a root attribute with the given values
    #[must_use]
    pub fn unique(name: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            role: AttributeRole::Unique,
            data_type: DataType::Nominal,
            values: values.iter().map(|v| (*v).to_string()).collect(),
            models: None,
            referent: None,
            mapping: Vec::new(),
        }
    }

    /// Set the referent attribute name
    #[must_use]
    pub fn with_referent(mut self, referent: &str) -> Self {
        self.referent = Some(referent.to_string());
        self
    }
}

impl AttributeDictionary {
    /// Build a dictionary from declarative definitions
    ///
    /// Fails with [`SynthesisError::CyclicReference`] if any referent chain
    /// loops back onto itself.
    pub fn from_definitions(definitions: &[AttributeDefinition]) -> Result<Self> {
        let mut positions = HashMap::with_capacity(definitions.len());
        for (pos, definition) in definitions.iter().enumerate() {
            if positions.insert(definition.name.as_str(), pos).is_some() {
                return Err(SynthesisError::DuplicateAttribute(definition.name.clone()));
            }
        }

        let mut referents = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let referent = match &definition.referent {
                Some(name) if name != &definition.name => Some(
                    *positions
                        .get(name.as_str())
                        .ok_or_else(|| SynthesisError::UnknownAttribute(name.clone()))?,
                ),
                _ => None,
            };
            referents.push(referent);
        }

        let order = registration_order(definitions, &referents)?;

        let mut dict = Self::new();
        for pos in order {
            dict.register_definition(&definitions[pos])?;
        }
        Ok(dict)
    }

    fn register_definition(&mut self, definition: &AttributeDefinition) -> Result<()> {
        let name = definition.name.as_str();
        let inputs: Vec<&str> = definition.values.iter().map(String::as_str).collect();
        let referent = definition
            .referent
            .as_deref()
            .filter(|referent| *referent != name)
            .map(|referent| self.attribute_id(referent))
            .transpose()?;

        if definition.role != AttributeRole::Mapped && !definition.mapping.is_empty() {
            return Err(SynthesisError::InvalidMapping {
                attribute: name.to_string(),
                reason: "only mapped attributes may declare a mapping".to_string(),
            });
        }

        match definition.role {
            AttributeRole::Unique | AttributeRole::Range => {
                let id = if definition.role == AttributeRole::Range {
                    self.add_range(name, &inputs)?
                } else {
                    let models: Vec<&str> = definition
                        .models
                        .as_ref()
                        .map_or_else(|| inputs.clone(), |m| m.iter().map(String::as_str).collect());
                    self.add_unique_with_models(name, definition.data_type, &inputs, &models)?
                };
                if let Some(referent) = referent {
                    self.set_referent(id, referent)?;
                }
            }
            AttributeRole::Mapped => {
                let referent = referent.ok_or_else(|| SynthesisError::InvalidMapping {
                    attribute: name.to_string(),
                    reason: "mapped attribute requires a referent".to_string(),
                })?;
                let entries: Vec<(Vec<&str>, Vec<&str>)> = definition
                    .mapping
                    .iter()
                    .map(|entry| {
                        (
                            entry.values.iter().map(String::as_str).collect(),
                            entry.referent_values.iter().map(String::as_str).collect(),
                        )
                    })
                    .collect();
                let mapping: Vec<(&[&str], &[&str])> = entries
                    .iter()
                    .map(|(own, target)| (own.as_slice(), target.as_slice()))
                    .collect();
                self.add_mapped(name, definition.data_type, referent, &inputs, &mapping)?;
            }
            AttributeRole::Record => {
                let referent = referent.ok_or_else(|| SynthesisError::InvalidMapping {
                    attribute: name.to_string(),
                    reason: "record attribute requires a referent".to_string(),
                })?;
                self.add_record(name, referent)?;
            }
        }
        Ok(())
    }
}

/// Order definitions so that every referent precedes the attributes using it
fn registration_order(
    definitions: &[AttributeDefinition],
    referents: &[Option<usize>],
) -> Result<Vec<usize>> {
    let mut order = Vec::with_capacity(definitions.len());
    let mut placed = vec![false; definitions.len()];

    for start in 0..definitions.len() {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(pos) = current {
            if placed[pos] {
                break;
            }
            if chain.contains(&pos) {
                let cycle_start = chain.iter().position(|p| *p == pos).unwrap_or(0);
                let mut names: Vec<String> = chain[cycle_start..]
                    .iter()
                    .map(|p| definitions[*p].name.clone())
                    .collect();
                names.push(definitions[pos].name.clone());
                return Err(SynthesisError::CyclicReference { chain: names });
            }
            chain.push(pos);
            current = referents[pos];
        }
        for pos in chain.into_iter().rev() {
            placed[pos] = true;
            order.push(pos);
        }
    }
    Ok(order)
}
