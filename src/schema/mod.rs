//! Declarative property mapping schemas
//!
//! A [`ComponentSchema`] describes, for one container type, which component
//! properties are derived from which row fields. The tables are plain static
//! data; the boolean logic lives in [`transforms`] and the interpreter in
//! [`engine`].

pub mod engine;
pub mod transforms;

mod eoffer_item;
mod eproduct_snippet;
mod eshop_item;
mod esnippet;
mod organic_offer;

use crate::deep_cache::DeepCache;
use crate::document::Node;
use crate::property_setter::MappedValue;
use crate::row::Row;
use serde::Serialize;

pub use engine::{apply_schema, resolve_value};
pub use eoffer_item::EOFFER_ITEM_SCHEMA;
pub use eproduct_snippet::EPRODUCT_SNIPPET_SCHEMA;
pub use eshop_item::ESHOP_ITEM_SCHEMA;
pub use esnippet::ESNIPPET_SCHEMA;
pub use organic_offer::ORGANIC_OFFER_SCHEMA;

/// Computed strategy: any function of the row, the container and its cache
pub type ComputeFn = fn(&Row, &Node, &DeepCache) -> MappedValue;

#[derive(Debug, Clone, Copy)]
pub struct EqualsRule {
    pub field: &'static str,
    pub value: &'static str,
}

/// How one target property gets its value.
///
/// Normally exactly one strategy is set. When several are present the
/// resolver honours compute, then equals, then has_value, then string_value.
#[derive(Clone, Copy)]
pub struct PropertyMapping {
    pub property_names: &'static [&'static str],
    pub field_name: &'static str,
    pub compute: Option<ComputeFn>,
    pub equals: Option<EqualsRule>,
    pub has_value: Option<&'static str>,
    pub string_value: Option<&'static str>,
    pub skip_if_empty: bool,
}

impl PropertyMapping {
    /// A mapping with no strategy; resolves to nothing until one is added
    pub const fn new(property_names: &'static [&'static str], field_name: &'static str) -> Self {
        Self {
            property_names,
            field_name,
            compute: None,
            equals: None,
            has_value: None,
            string_value: None,
            skip_if_empty: false,
        }
    }

    pub const fn computed(
        property_names: &'static [&'static str],
        field_name: &'static str,
        compute: ComputeFn,
    ) -> Self {
        Self::new(property_names, field_name).with_compute(compute)
    }

    /// `row[field] == value`, labelled with the field itself
    pub const fn equals(
        property_names: &'static [&'static str],
        field: &'static str,
        value: &'static str,
    ) -> Self {
        Self::new(property_names, field).with_equals(field, value)
    }

    pub const fn present(property_names: &'static [&'static str], field: &'static str) -> Self {
        Self::new(property_names, field).with_has_value(field)
    }

    /// Trimmed pass-through that is skipped when blank
    pub const fn text(property_names: &'static [&'static str], field: &'static str) -> Self {
        Self::new(property_names, field).with_string_value(field).skip_if_empty()
    }

    pub const fn with_compute(self, compute: ComputeFn) -> Self {
        Self {
            compute: Some(compute),
            ..self
        }
    }

    pub const fn with_equals(self, field: &'static str, value: &'static str) -> Self {
        Self {
            equals: Some(EqualsRule { field, value }),
            ..self
        }
    }

    pub const fn with_has_value(self, field: &'static str) -> Self {
        Self {
            has_value: Some(field),
            ..self
        }
    }

    pub const fn with_string_value(self, field: &'static str) -> Self {
        Self {
            string_value: Some(field),
            ..self
        }
    }

    pub const fn skip_if_empty(self) -> Self {
        Self {
            skip_if_empty: true,
            ..self
        }
    }

    /// Short description of the winning strategy, for listings
    pub fn strategy(&self) -> String {
        if self.compute.is_some() {
            "compute".to_string()
        } else if let Some(rule) = &self.equals {
            format!("{} == \"{}\"", rule.field, rule.value)
        } else if let Some(field) = self.has_value {
            format!("has {}", field)
        } else if let Some(field) = self.string_value {
            if self.skip_if_empty {
                format!("text {} (skip empty)", field)
            } else {
                format!("text {}", field)
            }
        } else {
            "none".to_string()
        }
    }
}

impl std::fmt::Debug for PropertyMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyMapping")
            .field("property_names", &self.property_names)
            .field("field_name", &self.field_name)
            .field("strategy", &self.strategy())
            .finish()
    }
}

/// Mappings applied to a named instance found in the container's deep cache
#[derive(Debug, Clone, Copy)]
pub struct NestedInstanceMapping {
    pub instance_name: &'static str,
    pub properties: &'static [PropertyMapping],
}

#[derive(Debug, Clone, Copy)]
pub struct ComponentSchema {
    pub container_names: &'static [&'static str],
    pub container_properties: &'static [PropertyMapping],
    pub nested_instances: &'static [NestedInstanceMapping],
    /// Handler names this table took over from. Documentation only.
    pub replaces_handlers: &'static [&'static str],
}

impl ComponentSchema {
    pub fn name(&self) -> &'static str {
        self.container_names.first().copied().unwrap_or("?")
    }

    pub fn applies_to(&self, container_name: &str) -> bool {
        self.container_names.contains(&container_name)
    }

    pub fn mapping_count(&self) -> usize {
        self.container_properties.len()
            + self
                .nested_instances
                .iter()
                .map(|n| n.properties.len())
                .sum::<usize>()
    }

    /// Serializable summary for `contentify schemas --format json`
    pub fn describe(&self) -> SchemaDescription {
        let describe_list = |list: &[PropertyMapping]| {
            list.iter()
                .map(|m| MappingDescription {
                    property_names: m.property_names.to_vec(),
                    field_name: m.field_name,
                    strategy: m.strategy(),
                })
                .collect()
        };

        SchemaDescription {
            container_names: self.container_names.to_vec(),
            container_properties: describe_list(self.container_properties),
            nested_instances: self
                .nested_instances
                .iter()
                .map(|n| NestedDescription {
                    instance_name: n.instance_name,
                    properties: describe_list(n.properties),
                })
                .collect(),
            replaces_handlers: self.replaces_handlers.to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MappingDescription {
    pub property_names: Vec<&'static str>,
    pub field_name: &'static str,
    pub strategy: String,
}

#[derive(Debug, Serialize)]
pub struct NestedDescription {
    pub instance_name: &'static str,
    pub properties: Vec<MappingDescription>,
}

#[derive(Debug, Serialize)]
pub struct SchemaDescription {
    pub container_names: Vec<&'static str>,
    pub container_properties: Vec<MappingDescription>,
    pub nested_instances: Vec<NestedDescription>,
    pub replaces_handlers: Vec<&'static str>,
}

static ALL_SCHEMAS: [&ComponentSchema; 5] = [
    &ESHOP_ITEM_SCHEMA,
    &EOFFER_ITEM_SCHEMA,
    &ESNIPPET_SCHEMA,
    &EPRODUCT_SNIPPET_SCHEMA,
    &ORGANIC_OFFER_SCHEMA,
];

pub fn all_schemas() -> &'static [&'static ComponentSchema] {
    &ALL_SCHEMAS
}

/// Schema responsible for a container name, if any
pub fn schema_for(container_name: &str) -> Option<&'static ComponentSchema> {
    ALL_SCHEMAS.iter().copied().find(|s| s.applies_to(container_name))
}

/// Price and label sub-components shared by the product-style cards
pub(crate) const PRICE_LABEL_NESTED: [NestedInstanceMapping; 3] = [
    NestedInstanceMapping {
        instance_name: "EPriceGroup",
        properties: &[
            PropertyMapping::equals(&["Discount", "withDiscount"], "#EPriceGroup_Discount", "true"),
            PropertyMapping::equals(&["Old Price", "oldPrice", "withOldPrice"], "#EPriceGroup_OldPrice", "true"),
        ],
    },
    NestedInstanceMapping {
        instance_name: "ELabelGroup",
        properties: &[
            PropertyMapping::present(&["Rating", "withRating"], "#ProductRating"),
            PropertyMapping::equals(&["Barometer", "withBarometer"], "#ELabelGroup_Barometer", "true"),
        ],
    },
    NestedInstanceMapping {
        instance_name: "EPriceBarometer",
        properties: &[PropertyMapping::text(&["View"], "#EPriceBarometer_View")],
    },
];
