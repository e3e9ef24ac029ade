//! Structural hooks
//!
//! Operations that cannot be written as a property mapping (text layers,
//! sitelinks, visibility fallbacks, instance swaps) run as hooks after the
//! schema engine. Each hook is bound to a set of container names; an empty set
//! means every container. Hooks must leave the container in the same state
//! when run twice with the same row.

mod address;
mod esnippet;
mod image_type;
mod text_fields;
mod visibility;

use crate::component_library::ComponentLibrary;
use crate::deep_cache::DeepCache;
use crate::document::{Document, NodeId};
use crate::row::Row;

pub use address::apply_shop_offline_region;
pub use esnippet::apply_esnippet_structure;
pub use image_type::apply_image_type;
pub use text_fields::apply_text_fields;
pub use visibility::{hide_empty_groups, should_auto_hide};

/// Everything a hook may touch while processing one container
pub struct HookContext<'a> {
    pub doc: &'a mut Document,
    pub container: NodeId,
    pub row: &'a Row,
    pub cache: &'a DeepCache,
    pub library: &'a mut ComponentLibrary,
}

pub type HookFn = fn(&mut HookContext<'_>);

#[derive(Clone, Copy)]
pub struct StructuralHook {
    pub name: &'static str,
    pub containers: &'static [&'static str],
    pub run: HookFn,
}

impl StructuralHook {
    pub fn applies_to(&self, container_name: &str) -> bool {
        self.containers.is_empty() || self.containers.contains(&container_name)
    }
}

impl std::fmt::Debug for StructuralHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralHook")
            .field("name", &self.name)
            .field("containers", &self.containers)
            .finish()
    }
}

const SNIPPET_CONTAINERS: &[&str] = &["ESnippet", "Snippet"];

#[derive(Debug, Default)]
pub struct HookRegistry {
    hooks: Vec<StructuralHook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in hooks in their run order
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(StructuralHook {
            name: "text-fields",
            containers: &[],
            run: apply_text_fields,
        });
        registry.register(StructuralHook {
            name: "esnippet-structure",
            containers: SNIPPET_CONTAINERS,
            run: apply_esnippet_structure,
        });
        registry.register(StructuralHook {
            name: "shop-offline-region",
            containers: &["ESnippet", "Snippet", "EShopItem"],
            run: apply_shop_offline_region,
        });
        registry.register(StructuralHook {
            name: "image-type",
            containers: SNIPPET_CONTAINERS,
            run: apply_image_type,
        });
        registry.register(StructuralHook {
            name: "empty-groups",
            containers: &[],
            run: hide_empty_groups,
        });
        registry
    }

    pub fn register(&mut self, hook: StructuralHook) {
        self.hooks.push(hook);
    }

    pub fn hooks(&self) -> &[StructuralHook] {
        &self.hooks
    }

    /// Run every hook bound to the container's name; returns how many ran
    pub fn run_for(&self, ctx: &mut HookContext<'_>) -> usize {
        if ctx.doc.is_removed(ctx.container) {
            return 0;
        }
        let container_name = ctx.doc.node(ctx.container).name.clone();

        let mut ran = 0;
        for hook in self.hooks.iter().filter(|h| h.applies_to(&container_name)) {
            log::debug!("   [hook] {} on \"{}\"", hook.name, container_name);
            (hook.run)(ctx);
            ran += 1;
        }
        ran
    }
}
