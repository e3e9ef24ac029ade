//! Components-by-name cache for instance swaps
//!
//! Built lazily from the document's published components and tied to the
//! page it was built on; switching pages rebuilds it on the next access.

use crate::document::Document;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ComponentLibrary {
    by_name: HashMap<String, String>,
    built_for: Option<String>,
    rebuilds: usize,
}

impl ComponentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name to component key map valid for the document's current page
    pub fn get_or_rebuild(&mut self, doc: &Document) -> &HashMap<String, String> {
        if self.built_for.as_deref() != Some(doc.current_page.as_str()) {
            self.by_name.clear();
            for component in &doc.components {
                self.by_name
                    .entry(component.name.clone())
                    .or_insert_with(|| component.key.clone());
            }
            self.built_for = Some(doc.current_page.clone());
            self.rebuilds += 1;
            log::debug!(
                "Component library built for page '{}': {} components",
                doc.current_page,
                self.by_name.len()
            );
        }
        &self.by_name
    }

    pub fn key_for(&mut self, doc: &Document, name: &str) -> Option<String> {
        self.get_or_rebuild(doc).get(name).cloned()
    }

    pub fn invalidate(&mut self) {
        self.built_for = None;
    }

    /// How many times the map has been (re)built
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }
}
