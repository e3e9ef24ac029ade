//! In-memory host document model
//!
//! A design document is a forest of nodes owned by the host. The replay
//! pipeline never creates or destroys containers; it only mutates component
//! properties, text, visibility and fills of nodes that already exist.
//! Nodes live in an arena and are addressed by [`NodeId`].

use crate::error::{ReplayError, Result};
use crate::property_setter::{self, MappedValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    Instance,
    Text,
    Frame,
    Group,
    Rectangle,
    Ellipse,
    Polygon,
    Other,
}

impl NodeKind {
    /// Layers that can carry an image fill
    pub fn is_shape(self) -> bool {
        matches!(self, NodeKind::Rectangle | NodeKind::Ellipse | NodeKind::Polygon)
    }

    pub fn is_group_like(self) -> bool {
        matches!(self, NodeKind::Frame | NodeKind::Group)
    }
}

/// Value of a single component property as exposed by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyValue {
    Boolean { value: bool },
    Text { value: String },
    Variant { value: String, options: Vec<String> },
    InstanceSwap { value: String },
}

/// A named component property.
///
/// Keys carry an opaque disambiguator after `#` (`"Brand#22092:0"`); variant
/// properties usually come without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentProperty {
    pub key: String,
    #[serde(flatten)]
    pub value: PropertyValue,
}

impl ComponentProperty {
    pub fn new(key: impl Into<String>, value: PropertyValue) -> Self {
        Self { key: key.into(), value }
    }

    pub fn boolean(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, PropertyValue::Boolean { value })
    }

    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, PropertyValue::Text { value: value.into() })
    }

    pub fn variant(key: impl Into<String>, value: impl Into<String>, options: &[&str]) -> Self {
        Self::new(
            key,
            PropertyValue::Variant {
                value: value.into(),
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        )
    }

    pub fn instance_swap(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, PropertyValue::InstanceSwap { value: value.into() })
    }

    /// Property name without the `#` disambiguator
    pub fn simple_name(&self) -> &str {
        self.key.split('#').next().unwrap_or(&self.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScaleMode {
    Fill,
    Fit,
    Crop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Fill {
    Solid {
        r: f32,
        g: f32,
        b: f32,
        opacity: f32,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        image_hash: String,
        scale_mode: ScaleMode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transform: Option<[[f32; 3]; 2]>,
    },
}

/// Image registered with the document, keyed by content hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
}

/// Published component available for instance swaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub removed: bool,
    pub visible: bool,
    pub clips_content: bool,
    pub characters: String,
    pub properties: Vec<ComponentProperty>,
    pub fills: Vec<Fill>,
    pub width: f32,
    pub height: f32,
    pub main_component: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            kind,
            removed: false,
            visible: true,
            clips_content: false,
            characters: String::new(),
            properties: Vec::new(),
            fills: Vec::new(),
            width: 0.0,
            height: 0.0,
            main_component: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn instance(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Instance)
    }

    pub fn text(name: impl Into<String>, characters: impl Into<String>) -> Self {
        let mut node = Self::new(name, NodeKind::Text);
        node.characters = characters.into();
        node
    }

    pub fn frame(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Frame)
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn rectangle(name: impl Into<String>, width: f32, height: f32) -> Self {
        let mut node = Self::new(name, NodeKind::Rectangle);
        node.width = width;
        node.height = height;
        node
    }

    pub fn with_property(mut self, property: ComponentProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_main_component(mut self, key: impl Into<String>) -> Self {
        self.main_component = Some(key.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&ComponentProperty> {
        self.properties.iter().find(|p| p.key == key)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Read access for resolvers, write access for the property setter.
///
/// `Document` implements this directly; wrappers add bookkeeping such as
/// success counters or call recording.
pub trait DesignHost {
    fn document(&self) -> &Document;

    fn try_set_property(
        &mut self,
        target: NodeId,
        candidates: &[&str],
        value: &MappedValue,
        field: &str,
    ) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub current_page: String,
    pub components: Vec<ComponentDef>,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    selection: Vec<NodeId>,
    images: BTreeMap<String, ImageInfo>,
}

impl Document {
    pub fn new(current_page: impl Into<String>) -> Self {
        Self {
            current_page: current_page.into(),
            ..Self::default()
        }
    }

    /// Attach a node under `parent` (or as a page root) and return its id
    pub fn append(&mut self, parent: Option<NodeId>, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        if node.id.is_empty() {
            node.id = format!("n{}", id.0);
        }
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);

        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Vec<NodeId>) {
        self.selection = selection;
    }

    pub fn images(&self) -> &BTreeMap<String, ImageInfo> {
        &self.images
    }

    pub fn is_removed(&self, id: NodeId) -> bool {
        self.get(id).map_or(true, |n| n.removed)
    }

    /// Mark a node (and implicitly its subtree) as removed
    pub fn remove(&mut self, id: NodeId) {
        self.nodes[id.0].removed = true;
    }

    /// Number of ancestors between the node and the page
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id.0].parent;
        while let Some(p) = current {
            depth += 1;
            current = self.nodes[p.0].parent;
        }
        depth
    }

    /// Pre-order walk of the subtree rooted at `root`, skipping removed branches
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.removed {
                continue;
            }
            out.push(id);
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// All live descendants (excluding `root`) matching the predicate
    pub fn find_all<F>(&self, root: NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.descendants(root)
            .into_iter()
            .filter(|id| *id != root && predicate(&self.nodes[id.0]))
            .collect()
    }

    /// First live node (including `root`) with the exact name
    pub fn find_first_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.nodes[id.0].name == name)
    }

    pub fn find_text_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(root).into_iter().find(|id| {
            let node = &self.nodes[id.0];
            node.kind == NodeKind::Text && node.name == name
        })
    }

    pub fn find_first_text<F>(&self, root: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.descendants(root).into_iter().find(|id| {
            let node = &self.nodes[id.0];
            node.kind == NodeKind::Text && predicate(node)
        })
    }

    /// Replace the characters of a live text node. Returns false otherwise.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        let node = &mut self.nodes[id.0];
        if node.removed || node.kind != NodeKind::Text {
            return false;
        }
        if node.characters != text {
            node.characters = text.to_string();
        }
        true
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        let node = &mut self.nodes[id.0];
        if node.removed {
            return false;
        }
        node.visible = visible;
        true
    }

    pub fn set_fills(&mut self, id: NodeId, fills: Vec<Fill>) -> bool {
        let node = &mut self.nodes[id.0];
        if node.removed {
            return false;
        }
        node.fills = fills;
        true
    }

    /// Point an instance at another main component
    pub fn swap_component(&mut self, id: NodeId, key: &str, name: &str) -> bool {
        let node = &mut self.nodes[id.0];
        if node.removed || node.kind != NodeKind::Instance {
            return false;
        }
        node.main_component = Some(key.to_string());
        node.name = name.to_string();
        true
    }

    /// Register image bytes and return their content hash
    pub fn add_image(&mut self, bytes: &[u8], width: u32, height: u32) -> String {
        let hash = format!("{:x}", md5::compute(bytes));
        self.images.entry(hash.clone()).or_insert(ImageInfo {
            width,
            height,
            byte_len: bytes.len(),
        });
        hash
    }

    pub fn image(&self, hash: &str) -> Option<&ImageInfo> {
        self.images.get(hash)
    }

    pub fn find_by_external_id(&self, id: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.id == id).map(NodeId)
    }

    /// Load a document snapshot from a JSON file
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ReplayError::file_not_found(path, e))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: DocumentFile = serde_json::from_str(content)?;
        let mut doc = Document::new(file.current_page);
        doc.components = file.components;
        doc.images = file.images;

        for root in file.children {
            doc.append_file_node(None, root);
        }

        let mut selection = Vec::with_capacity(file.selection.len());
        for external in &file.selection {
            let id = doc.find_by_external_id(external).ok_or_else(|| {
                ReplayError::invalid_format(format!("selection refers to unknown node '{}'", external))
            })?;
            selection.push(id);
        }
        doc.selection = selection;

        Ok(doc)
    }

    fn append_file_node(&mut self, parent: Option<NodeId>, file: NodeFile) {
        let mut node = Node::new(file.name, file.kind);
        node.id = file.id.unwrap_or_default();
        node.removed = file.removed;
        node.visible = file.visible;
        node.clips_content = file.clips_content;
        node.characters = file.characters;
        node.properties = file.properties;
        node.fills = file.fills;
        node.width = file.width;
        node.height = file.height;
        node.main_component = file.main_component;

        let id = self.append(parent, node);
        for child in file.children {
            self.append_file_node(Some(id), child);
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let file = DocumentFile {
            current_page: self.current_page.clone(),
            selection: self.selection.iter().map(|id| self.nodes[id.0].id.clone()).collect(),
            components: self.components.clone(),
            images: self.images.clone(),
            children: self.roots.iter().map(|id| self.to_file_node(*id)).collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    fn to_file_node(&self, id: NodeId) -> NodeFile {
        let node = &self.nodes[id.0];
        NodeFile {
            id: Some(node.id.clone()),
            name: node.name.clone(),
            kind: node.kind,
            removed: node.removed,
            visible: node.visible,
            clips_content: node.clips_content,
            characters: node.characters.clone(),
            properties: node.properties.clone(),
            fills: node.fills.clone(),
            width: node.width,
            height: node.height,
            main_component: node.main_component.clone(),
            children: node.children.iter().map(|c| self.to_file_node(*c)).collect(),
        }
    }

    pub fn save(&self, path: &str) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Count of live nodes grouped by kind
    pub fn kind_histogram(&self) -> HashMap<NodeKind, usize> {
        let mut out = HashMap::new();
        for node in self.nodes.iter().filter(|n| !n.removed) {
            *out.entry(node.kind).or_insert(0) += 1;
        }
        out
    }
}

impl DesignHost for Document {
    fn document(&self) -> &Document {
        self
    }

    fn try_set_property(
        &mut self,
        target: NodeId,
        candidates: &[&str],
        value: &MappedValue,
        field: &str,
    ) -> bool {
        property_setter::try_set_property(self, target, candidates, value, field)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFile {
    #[serde(default)]
    current_page: String,
    #[serde(default)]
    selection: Vec<String>,
    #[serde(default)]
    components: Vec<ComponentDef>,
    #[serde(default)]
    images: BTreeMap<String, ImageInfo>,
    #[serde(default)]
    children: Vec<NodeFile>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    removed: bool,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    clips_content: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    characters: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    properties: Vec<ComponentProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fills: Vec<Fill>,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    main_component: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId) {
        let mut doc = Document::new("page-1");
        let root = doc.append(None, Node::instance("EShopItem"));
        let title = doc.append(Some(root), Node::text("#OrganicTitle", "placeholder"));
        let group = doc.append(Some(root), Node::group("Meta"));
        doc.append(Some(group), Node::text("#ShopName", "shop"));
        doc.remove(title);
        (doc, root)
    }

    #[test]
    fn test_descendants_skip_removed() {
        let (doc, root) = sample();
        let names: Vec<_> = doc.descendants(root).iter().map(|id| doc.node(*id).name.clone()).collect();
        assert_eq!(names, vec!["EShopItem", "Meta", "#ShopName"]);
    }

    #[test]
    fn test_set_text_only_on_live_text() {
        let (mut doc, root) = sample();
        let shop = doc.find_text_by_name(root, "#ShopName").unwrap();
        assert!(doc.set_text(shop, "Ozon"));
        assert_eq!(doc.node(shop).characters, "Ozon");
        assert!(!doc.set_text(root, "nope"));
    }

    #[test]
    fn test_depth() {
        let (doc, root) = sample();
        let shop = doc.find_text_by_name(root, "#ShopName").unwrap();
        assert_eq!(doc.depth(root), 0);
        assert_eq!(doc.depth(shop), 2);
    }

    #[test]
    fn test_json_round_trip_keeps_structure() {
        let json = r##"{
            "currentPage": "1:2",
            "selection": ["card"],
            "components": [{"key": "k1", "name": "EThumb"}],
            "children": [{
                "id": "card",
                "name": "ESnippet",
                "type": "INSTANCE",
                "properties": [
                    {"key": "withThumb#1:0", "type": "BOOLEAN", "value": false},
                    {"key": "Platform", "type": "VARIANT", "value": "Desktop", "options": ["Desktop", "Touch"]}
                ],
                "children": [{"name": "#OrganicTitle", "type": "TEXT", "characters": "x"}]
            }]
        }"##;

        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.current_page, "1:2");
        assert_eq!(doc.selection().len(), 1);
        let card = doc.selection()[0];
        assert_eq!(doc.node(card).properties.len(), 2);
        assert_eq!(doc.node(card).properties[0].simple_name(), "withThumb");
        assert_eq!(doc.node(card).children().len(), 1);

        let again = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(again.len(), doc.len());
        assert_eq!(again.node(NodeId(1)).characters, "x");
    }

    #[test]
    fn test_unknown_selection_is_an_error() {
        let json = r#"{"selection": ["missing"], "children": []}"#;
        assert!(Document::from_json(json).is_err());
    }

    #[test]
    fn test_add_image_dedupes_by_hash() {
        let mut doc = Document::new("p");
        let a = doc.add_image(b"same-bytes", 1, 1);
        let b = doc.add_image(b"same-bytes", 1, 1);
        assert_eq!(a, b);
        assert_eq!(doc.images().len(), 1);
    }
}
