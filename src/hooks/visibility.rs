//! Auto-hide of groups whose content was switched off

use super::HookContext;
use crate::document::Document;
use crate::document::NodeId;

const AUTO_HIDE_NAMES: &[&str] = &[
    "EcomMeta",
    "Meta",
    "ESnippet-Meta",
    "Rating + Reviews",
    "Rating + Review + Quote",
    "Sitelinks",
    "Contacts",
    "Promo",
    "Price Block",
    "EDeliveryGroup",
    "ShopInfo-DeliveryBnplContainer",
];

const AUTO_HIDE_SUFFIXES: &[&str] = &["Group", "Container", "Wrapper", "Block"];

/// Whether a group with this name takes part in auto-hiding
pub fn should_auto_hide(name: &str) -> bool {
    AUTO_HIDE_NAMES.contains(&name)
        || name.to_lowercase().contains("wrapper")
        || AUTO_HIDE_SUFFIXES.iter().any(|s| name.ends_with(s))
}

fn all_children_hidden(doc: &Document, group: NodeId) -> bool {
    doc.node(group)
        .children()
        .iter()
        .map(|c| doc.node(*c))
        .filter(|c| !c.removed)
        .all(|c| !c.visible)
}

/// Hide matching groups whose direct children are all hidden, deepest first
pub fn hide_empty_groups(ctx: &mut HookContext<'_>) {
    let mut groups: Vec<(usize, NodeId)> = ctx
        .cache
        .groups()
        .filter(|id| !ctx.doc.is_removed(*id))
        .map(|id| (ctx.doc.depth(id), id))
        .collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    for (_, id) in groups {
        let node = ctx.doc.node(id);
        if !node.visible || !should_auto_hide(&node.name) {
            continue;
        }
        if all_children_hidden(ctx.doc, id) {
            log::debug!("   [empty-groups] hiding \"{}\"", node.name);
            ctx.doc.set_visible(id, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_library::ComponentLibrary;
    use crate::deep_cache::DeepCache;
    use crate::document::Node;
    use crate::row::Row;

    #[test]
    fn test_name_patterns() {
        assert!(should_auto_hide("Meta"));
        assert!(should_auto_hide("Rating + Reviews"));
        assert!(should_auto_hide("EPriceGroup"));
        assert!(should_auto_hide("Thumb-wrapper"));
        assert!(should_auto_hide("Path Block"));
        assert!(!should_auto_hide("content__left"));
        assert!(!should_auto_hide("meta"));
    }

    #[test]
    fn test_nested_groups_hide_bottom_up() {
        let mut doc = Document::new("p");
        let card = doc.append(None, Node::instance("ESnippet"));
        let outer = doc.append(Some(card), Node::frame("Meta"));
        let inner = doc.append(Some(outer), Node::group("EDeliveryGroup"));
        doc.append(Some(inner), Node::text("#DeliveryList", "x").with_visible(false));
        let keep = doc.append(Some(card), Node::frame("Price Block"));
        doc.append(Some(keep), Node::text("#OrganicPrice", "100"));
        let unmatched = doc.append(Some(card), Node::frame("content__left"));

        let row = Row::new();
        let cache = DeepCache::build(&doc, card);
        let mut library = ComponentLibrary::new();
        let mut ctx = HookContext {
            doc: &mut doc,
            container: card,
            row: &row,
            cache: &cache,
            library: &mut library,
        };
        hide_empty_groups(&mut ctx);
        hide_empty_groups(&mut ctx);

        assert!(!doc.node(inner).visible);
        assert!(!doc.node(outer).visible);
        assert!(doc.node(keep).visible);
        assert!(doc.node(unmatched).visible);
    }
}
