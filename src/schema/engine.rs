//! Value resolver and schema engine

use super::{ComponentSchema, PropertyMapping};
use crate::deep_cache::DeepCache;
use crate::document::{DesignHost, Node, NodeId};
use crate::property_setter::MappedValue;
use crate::row::{Row, RowExt};

/// Resolve one mapping against a row.
///
/// `None` means "leave the property alone"; it is distinct from
/// `Some(Bool(false))` and `Some(Text(""))`.
pub fn resolve_value(
    mapping: &PropertyMapping,
    row: &Row,
    container: &Node,
    cache: &DeepCache,
) -> Option<MappedValue> {
    if let Some(compute) = mapping.compute {
        return Some(compute(row, container, cache));
    }

    if let Some(rule) = &mapping.equals {
        return Some(MappedValue::Bool(row.get(rule.field).map_or(false, |v| v == rule.value)));
    }

    if let Some(field) = mapping.has_value {
        return Some(MappedValue::Bool(row.has_value(field)));
    }

    if let Some(field) = mapping.string_value {
        let value = row.trimmed(field);
        if mapping.skip_if_empty && value.is_empty() {
            return None;
        }
        return Some(MappedValue::text(value));
    }

    None
}

fn apply_properties<H: DesignHost + ?Sized>(
    host: &mut H,
    target: NodeId,
    container: NodeId,
    mappings: &[PropertyMapping],
    row: &Row,
    cache: &DeepCache,
    label: &str,
) {
    for mapping in mappings {
        let value = {
            let node = host.document().node(container);
            resolve_value(mapping, row, node, cache)
        };
        let Some(value) = value else {
            continue;
        };

        let applied = host.try_set_property(target, mapping.property_names, &value, mapping.field_name);
        log::debug!(
            "   [{}] {}={}, result={}",
            label,
            mapping.property_names.first().copied().unwrap_or("?"),
            value,
            applied
        );
    }
}

/// Apply a schema to a container and its cached nested instances.
///
/// Container mappings run first, in declaration order, then each nested
/// instance in declaration order. Missing nested instances are skipped.
pub fn apply_schema<H: DesignHost + ?Sized>(
    host: &mut H,
    container: Option<NodeId>,
    row: Option<&Row>,
    schema: &ComponentSchema,
    cache: &DeepCache,
) {
    let (Some(container), Some(row)) = (container, row) else {
        return;
    };
    if host.document().is_removed(container) {
        return;
    }

    let container_name = host.document().node(container).name.clone();
    log::debug!("[Schema] Applying {} schema to \"{}\"", schema.name(), container_name);

    apply_properties(
        host,
        container,
        container,
        schema.container_properties,
        row,
        cache,
        &container_name,
    );

    for nested in schema.nested_instances {
        let Some(instance) = cache.instance(nested.instance_name) else {
            log::debug!("[Schema] Nested instance \"{}\" not found", nested.instance_name);
            continue;
        };

        apply_properties(
            host,
            instance,
            container,
            nested.properties,
            row,
            cache,
            nested.instance_name,
        );
    }
}
