//! Per-container instance locator
//!
//! One depth-first walk over a container indexes its descendant instances,
//! text layers and groups by name so that the schema engine and the hooks can
//! address nested parts without re-walking the tree for every mapping.
//! Within each kind the first node encountered under a name wins; repeated
//! names stay reachable through the flat text list.

use crate::document::{Document, Node, NodeId, NodeKind};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

/// Traversal statistics for one cache build
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub node_count: usize,
    pub instance_count: usize,
    pub text_count: usize,
    pub group_count: usize,
    pub build_time_us: u64,
}

impl CacheStats {
    pub fn print_summary(&self, container: &str) {
        println!(
            "  {:<28} nodes: {:>4}  instances: {:>3}  texts: {:>3}  groups: {:>3}  ({}us)",
            container, self.node_count, self.instance_count, self.text_count, self.group_count, self.build_time_us
        );
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeepCache {
    instances: HashMap<String, NodeId>,
    texts: HashMap<String, NodeId>,
    groups: HashMap<String, NodeId>,
    all_texts: Vec<NodeId>,
    pub stats: CacheStats,
}

impl DeepCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every live descendant of `root` (the container itself is not indexed)
    pub fn build(doc: &Document, root: NodeId) -> Self {
        let start = Instant::now();
        let mut cache = Self::new();

        if doc.is_removed(root) {
            return cache;
        }

        let mut stack: Vec<NodeId> = doc.node(root).children().iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = doc.node(id);
            if node.removed {
                continue;
            }
            cache.insert(id, node);
            stack.extend(node.children().iter().rev().copied());
        }

        cache.stats.build_time_us = start.elapsed().as_micros() as u64;
        cache
    }

    fn insert(&mut self, id: NodeId, node: &Node) {
        self.stats.node_count += 1;
        match node.kind {
            NodeKind::Instance => {
                self.stats.instance_count += 1;
                self.instances.entry(node.name.clone()).or_insert(id);
            }
            NodeKind::Text => {
                self.stats.text_count += 1;
                self.all_texts.push(id);
                self.texts.entry(node.name.clone()).or_insert(id);
            }
            NodeKind::Frame | NodeKind::Group => {
                self.stats.group_count += 1;
                self.groups.entry(node.name.clone()).or_insert(id);
            }
            _ => {}
        }
    }

    pub fn instance(&self, name: &str) -> Option<NodeId> {
        self.instances.get(name).copied()
    }

    pub fn text(&self, name: &str) -> Option<NodeId> {
        self.texts.get(name).copied()
    }

    pub fn group(&self, name: &str) -> Option<NodeId> {
        self.groups.get(name).copied()
    }

    /// First indexed node with this name, looking at instances, then groups, then texts
    pub fn any(&self, name: &str) -> Option<NodeId> {
        self.instance(name).or_else(|| self.group(name)).or_else(|| self.text(name))
    }

    /// Every text layer in traversal order, duplicates included
    pub fn texts(&self) -> &[NodeId] {
        &self.all_texts
    }

    pub fn find_text<F>(&self, doc: &Document, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.all_texts.iter().copied().find(|id| predicate(doc.node(*id)))
    }

    /// Indexed groups and frames, one per name
    pub fn groups(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.groups.values().copied()
    }

    pub fn instance_names(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins() {
        let mut doc = Document::new("p");
        let root = doc.append(None, Node::instance("EShopItem"));
        let first = doc.append(Some(root), Node::instance("EPrice"));
        let _second = doc.append(Some(root), Node::instance("EPrice"));
        let label_a = doc.append(Some(root), Node::text("EPrice", "100"));
        let label_b = doc.append(Some(root), Node::text("EPrice", "200"));

        let cache = DeepCache::build(&doc, root);

        assert_eq!(cache.instance("EPrice"), Some(first));
        assert_eq!(cache.text("EPrice"), Some(label_a));
        assert_eq!(cache.texts(), &[label_a, label_b]);
        assert_eq!(cache.stats.instance_count, 2);
    }

    #[test]
    fn test_depth_first_order_prefers_earlier_subtree() {
        let mut doc = Document::new("p");
        let root = doc.append(None, Node::instance("ESnippet"));
        let left = doc.append(Some(root), Node::frame("content__left"));
        let deep = doc.append(Some(left), Node::instance("EShopName"));
        doc.append(Some(root), Node::instance("EShopName"));

        let cache = DeepCache::build(&doc, root);
        assert_eq!(cache.instance("EShopName"), Some(deep));
        assert_eq!(cache.group("content__left"), Some(left));
    }

    #[test]
    fn test_removed_subtrees_are_skipped() {
        let mut doc = Document::new("p");
        let root = doc.append(None, Node::instance("EOfferItem"));
        let gone = doc.append(Some(root), Node::group("Meta"));
        doc.append(Some(gone), Node::text("#ShopName", "x"));
        doc.remove(gone);

        let cache = DeepCache::build(&doc, root);
        assert_eq!(cache.group("Meta"), None);
        assert!(cache.texts().is_empty());
        assert_eq!(cache.stats.node_count, 0);
    }

    #[test]
    fn test_container_itself_not_indexed() {
        let mut doc = Document::new("p");
        let root = doc.append(None, Node::instance("EShopItem"));
        let cache = DeepCache::build(&doc, root);
        assert_eq!(cache.instance("EShopItem"), None);
    }
}
