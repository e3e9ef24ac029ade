//! Swap the thumb slot between the single image and the collage component

use super::HookContext;
use crate::row::RowExt;

const SINGLE: &str = "EThumb";
const COLLAGE: &str = "EThumbGroup";

pub fn apply_image_type(ctx: &mut HookContext<'_>) {
    let image_type = ctx.row.trimmed("#imageType");
    if image_type.is_empty() {
        return;
    }
    let target = if image_type == COLLAGE { COLLAGE } else { SINGLE };

    let Some(slot) = ctx.cache.instance(SINGLE).or_else(|| ctx.cache.instance(COLLAGE)) else {
        return;
    };
    if ctx.doc.node(slot).name == target {
        return;
    }

    let Some(key) = ctx.library.key_for(ctx.doc, target) else {
        log::debug!("   [image-type] component \"{}\" not in library", target);
        return;
    };
    if ctx.doc.swap_component(slot, &key, target) {
        log::debug!("   [image-type] thumb swapped to {}", target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_library::ComponentLibrary;
    use crate::deep_cache::DeepCache;
    use crate::document::{ComponentDef, Document, Node, NodeId};
    use crate::row::{row_from, Row};

    fn run(doc: &mut Document, container: NodeId, row: &Row, library: &mut ComponentLibrary) {
        let cache = DeepCache::build(doc, container);
        let mut ctx = HookContext {
            doc,
            container,
            row,
            cache: &cache,
            library,
        };
        apply_image_type(&mut ctx);
    }

    #[test]
    fn test_swap_to_collage_and_back() {
        let mut doc = Document::new("p");
        doc.components = vec![
            ComponentDef { key: "single".into(), name: "EThumb".into() },
            ComponentDef { key: "collage".into(), name: "EThumbGroup".into() },
        ];
        let card = doc.append(None, Node::instance("ESnippet"));
        let thumb = doc.append(Some(card), Node::instance("EThumb").with_main_component("single"));
        let mut library = ComponentLibrary::new();

        let collage = row_from([("#imageType", "EThumbGroup")]);
        run(&mut doc, card, &collage, &mut library);
        run(&mut doc, card, &collage, &mut library);
        assert_eq!(doc.node(thumb).name, "EThumbGroup");
        assert_eq!(doc.node(thumb).main_component.as_deref(), Some("collage"));

        run(&mut doc, card, &row_from([("#imageType", "EThumb")]), &mut library);
        assert_eq!(doc.node(thumb).main_component.as_deref(), Some("single"));
        assert_eq!(library.rebuild_count(), 1);
    }

    #[test]
    fn test_missing_component_leaves_slot() {
        let mut doc = Document::new("p");
        let card = doc.append(None, Node::instance("ESnippet"));
        let thumb = doc.append(Some(card), Node::instance("EThumb"));
        let mut library = ComponentLibrary::new();

        run(&mut doc, card, &row_from([("#imageType", "EThumbGroup")]), &mut library);
        assert_eq!(doc.node(thumb).name, "EThumb");
    }
}
