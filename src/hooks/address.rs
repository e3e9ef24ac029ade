//! Shop offline region: address line plus a link with the branch count

use super::HookContext;
use crate::document::NodeId;
use crate::row::RowExt;

const REGION_NAMES: &[&str] = &["ShopOfflineRegion", "#ShopOfflineRegion"];
const ADDRESS_LAYERS: &[&str] = &["#addressText", "addressText", "Address"];
const LINK_LAYERS: &[&str] = &["#addressLink", "addressLink", "Link"];

fn region_block(ctx: &HookContext<'_>) -> Option<NodeId> {
    REGION_NAMES.iter().find_map(|name| ctx.cache.any(name))
}

fn set_first_text(ctx: &mut HookContext<'_>, root: NodeId, names: &[&str], value: &str) -> bool {
    let layer = names.iter().find_map(|name| ctx.doc.find_text_by_name(root, name));
    match layer {
        Some(layer) => ctx.doc.set_text(layer, value),
        None => false,
    }
}

pub fn apply_shop_offline_region(ctx: &mut HookContext<'_>) {
    let row = ctx.row;
    let address = row.trimmed("#addressText");
    let link = row.trimmed("#addressLink");
    let Some(region) = region_block(ctx) else {
        return;
    };

    if address.is_empty() && link.is_empty() && !row.is_true("#hasShopOfflineRegion") {
        ctx.doc.set_visible(region, false);
        log::debug!("   [offline-region] no address data, block hidden");
        return;
    }

    ctx.doc.set_visible(region, true);
    if !address.is_empty() {
        set_first_text(ctx, region, ADDRESS_LAYERS, address);
    }
    if !link.is_empty() {
        set_first_text(ctx, region, LINK_LAYERS, link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_library::ComponentLibrary;
    use crate::deep_cache::DeepCache;
    use crate::document::{Document, Node};
    use crate::row::{row_from, Row};

    fn card() -> (Document, NodeId, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("p");
        let card = doc.append(None, Node::instance("EShopItem"));
        let region = doc.append(Some(card), Node::instance("ShopOfflineRegion"));
        let address = doc.append(Some(region), Node::text("#addressText", "City"));
        let link = doc.append(Some(region), Node::text("Link", "1 branch"));
        (doc, card, region, address, link)
    }

    fn run(doc: &mut Document, container: NodeId, row: &Row) {
        let cache = DeepCache::build(doc, container);
        let mut library = ComponentLibrary::new();
        let mut ctx = HookContext {
            doc,
            container,
            row,
            cache: &cache,
            library: &mut library,
        };
        apply_shop_offline_region(&mut ctx);
    }

    #[test]
    fn test_address_and_link_filled() {
        let (mut doc, card, region, address, link) = card();
        let row = row_from([("#addressText", "Moscow, Tverskaya 1"), ("#addressLink", "77 branches")]);
        run(&mut doc, card, &row);

        assert!(doc.node(region).visible);
        assert_eq!(doc.node(address).characters, "Moscow, Tverskaya 1");
        assert_eq!(doc.node(link).characters, "77 branches");
    }

    #[test]
    fn test_region_hidden_without_data() {
        let (mut doc, card, region, _, _) = card();
        run(&mut doc, card, &Row::new());
        assert!(!doc.node(region).visible);

        // flag alone keeps the block
        run(&mut doc, card, &row_from([("#hasShopOfflineRegion", "true")]));
        assert!(doc.node(region).visible);
    }
}
