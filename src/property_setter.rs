//! Component property setter
//!
//! Property keys on the host carry an unpredictable `#` disambiguator and get
//! renamed over time, so callers pass an ordered list of candidate names and
//! the setter scans the instance's live properties for the first one that
//! matches. Values are coerced to the target property's type; variant values
//! are validated against the legal option set before assignment.

use crate::document::{ComponentProperty, Document, NodeId, PropertyValue};
use std::fmt;

/// Resolved value of a property mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedValue {
    Bool(bool),
    Text(String),
}

impl MappedValue {
    pub fn text(value: impl Into<String>) -> Self {
        MappedValue::Text(value.into())
    }

    /// Literal rendering used for text and variant targets
    pub fn as_literal(&self) -> &str {
        match self {
            MappedValue::Bool(true) => "true",
            MappedValue::Bool(false) => "false",
            MappedValue::Text(s) => s,
        }
    }

    /// True for `Bool(true)` and for non-empty text
    pub fn is_truthy(&self) -> bool {
        match self {
            MappedValue::Bool(b) => *b,
            MappedValue::Text(s) => !s.is_empty(),
        }
    }
}

impl From<bool> for MappedValue {
    fn from(value: bool) -> Self {
        MappedValue::Bool(value)
    }
}

impl From<&str> for MappedValue {
    fn from(value: &str) -> Self {
        MappedValue::Text(value.to_string())
    }
}

impl fmt::Display for MappedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappedValue::Bool(b) => write!(f, "{}", b),
            MappedValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find the index of the property matching `candidate`, from strictest to loosest
pub fn find_property_index(properties: &[ComponentProperty], candidate: &str) -> Option<usize> {
    if let Some(i) = properties.iter().position(|p| p.key == candidate) {
        return Some(i);
    }
    if let Some(i) = properties.iter().position(|p| p.simple_name() == candidate) {
        return Some(i);
    }
    if let Some(i) = properties
        .iter()
        .position(|p| p.simple_name().eq_ignore_ascii_case(candidate))
    {
        return Some(i);
    }
    let wanted = normalize(candidate);
    if wanted.is_empty() {
        return None;
    }
    properties.iter().position(|p| normalize(p.simple_name()) == wanted)
}

/// Coerce `value` into the shape of `current`, returning the new property value
fn coerce(current: &PropertyValue, value: &MappedValue) -> Result<PropertyValue, String> {
    match current {
        PropertyValue::Boolean { .. } => {
            let b = match value {
                MappedValue::Bool(b) => *b,
                MappedValue::Text(s) => match s.trim() {
                    "true" | "1" => true,
                    "false" | "0" => false,
                    other => return Err(format!("'{}' is not a boolean", other)),
                },
            };
            Ok(PropertyValue::Boolean { value: b })
        }
        PropertyValue::Text { .. } => Ok(PropertyValue::Text {
            value: value.as_literal().to_string(),
        }),
        PropertyValue::Variant { options, .. } => {
            let wanted = value.as_literal();
            let matched = options
                .iter()
                .find(|o| o.as_str() == wanted)
                .or_else(|| options.iter().find(|o| o.eq_ignore_ascii_case(wanted)))
                .or_else(|| {
                    let numeric = match wanted {
                        "true" => "1",
                        "false" => "0",
                        _ => return None,
                    };
                    options.iter().find(|o| o.as_str() == numeric)
                });
            match matched {
                Some(option) => Ok(PropertyValue::Variant {
                    value: option.clone(),
                    options: options.clone(),
                }),
                None => Err(format!("'{}' is not one of [{}]", wanted, options.join(", "))),
            }
        }
        PropertyValue::InstanceSwap { .. } => match value {
            MappedValue::Text(key) if !key.trim().is_empty() => Ok(PropertyValue::InstanceSwap {
                value: key.trim().to_string(),
            }),
            _ => Err("instance swap needs a component key".to_string()),
        },
    }
}

/// Try each candidate name in order; returns true iff one matched and the value was applied
pub fn try_set_property(
    doc: &mut Document,
    target: NodeId,
    candidates: &[&str],
    value: &MappedValue,
    field: &str,
) -> bool {
    let node = match doc.get(target) {
        Some(node) if !node.removed => node,
        _ => {
            log::debug!("[{}] target node is gone, skipping", field);
            return false;
        }
    };

    for candidate in candidates {
        let Some(index) = find_property_index(&node.properties, candidate) else {
            continue;
        };

        let key = node.properties[index].key.clone();
        return match coerce(&node.properties[index].value, value) {
            Ok(new_value) => {
                log::debug!("[{}] {}.{} = {}", field, node.name, key, value);
                doc.node_mut(target).properties[index].value = new_value;
                true
            }
            Err(reason) => {
                log::debug!("[{}] {}.{} rejected: {}", field, node.name, key, reason);
                false
            }
        };
    }

    log::debug!("[{}] {} has none of {:?}", field, node.name, candidates);
    false
}
