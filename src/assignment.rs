//! Container discovery and row-to-container assignment
//!
//! Rows come in two queues. Catalog rows (`#isCatalogPage == "true"`) feed
//! snippet cards only and are used once each; product rows feed every card
//! type and wrap around when there are more cards than rows.

use crate::document::{Document, NodeId};
use crate::row::{row_from, Row, RowExt};
use serde::{Deserialize, Serialize};

/// Names of the card components rows are replayed into
pub const CONTAINER_NAMES: &[&str] = &[
    "EShopItem",
    "EProductSnippet2",
    "ESnippet",
    "EProductSnippet",
    "EOfferItem",
    "Snippet",
    "Organic_withOfferInfo",
    "ProductTile-Item",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Page,
    Selection,
}

pub fn is_container_name(name: &str) -> bool {
    CONTAINER_NAMES.contains(&name)
}

fn is_snippet(name: &str) -> bool {
    name == "ESnippet" || name == "Snippet"
}

/// Depth-first over the scope roots; a matched container is not searched further
pub fn find_containers(doc: &Document, scope: Scope) -> Vec<NodeId> {
    let roots: &[NodeId] = match scope {
        Scope::Page => doc.roots(),
        Scope::Selection => doc.selection(),
    };

    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let node = doc.node(id);
        if node.removed {
            continue;
        }
        if is_container_name(&node.name) {
            if !found.contains(&id) {
                found.push(id);
            }
            continue;
        }
        stack.extend(node.children().iter().rev().copied());
    }
    found
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowSource {
    Catalog(usize),
    Product(usize),
    /// Synthetic row for shop and offer cards left without data
    Stub(Row),
    Unassigned,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub container: NodeId,
    pub source: RowSource,
}

impl Assignment {
    pub fn row<'a>(&'a self, rows: &'a [Row]) -> Option<&'a Row> {
        match &self.source {
            RowSource::Catalog(i) | RowSource::Product(i) => rows.get(*i),
            RowSource::Stub(row) => Some(row),
            RowSource::Unassigned => None,
        }
    }

    /// Index into the input rows, if the row came from them
    pub fn row_index(&self) -> Option<usize> {
        match self.source {
            RowSource::Catalog(i) | RowSource::Product(i) => Some(i),
            _ => None,
        }
    }
}

pub fn stub_row(container_name: &str) -> Row {
    let view = if container_name == "EShopItem" { "secondary" } else { "white" };
    row_from([
        ("#SnippetType", container_name),
        ("#BUTTON", "true"),
        ("#ButtonView", view),
        ("#ButtonType", "shop"),
    ])
}

/// Assign rows to containers in container order
pub fn assign_rows(doc: &Document, rows: &[Row], containers: &[NodeId]) -> Vec<Assignment> {
    let catalog: Vec<usize> = (0..rows.len()).filter(|i| rows[*i].is_true("#isCatalogPage")).collect();
    let products: Vec<usize> = (0..rows.len()).filter(|i| !rows[*i].is_true("#isCatalogPage")).collect();

    log::info!(
        "Assigning rows: {} catalog (snippets only), {} product, {} containers",
        catalog.len(),
        products.len(),
        containers.len()
    );

    let mut catalog_used = 0;
    let mut product_index = 0;
    let mut assignments = Vec::with_capacity(containers.len());

    for &container in containers {
        let name = doc.node(container).name.as_str();

        let source = if is_snippet(name) && catalog_used < catalog.len() {
            catalog_used += 1;
            RowSource::Catalog(catalog[catalog_used - 1])
        } else if !products.is_empty() {
            let index = products[product_index % products.len()];
            product_index += 1;
            RowSource::Product(index)
        } else if name == "EShopItem" || name == "EOfferItem" {
            RowSource::Stub(stub_row(name))
        } else {
            log::warn!("{} has no matching row", name);
            RowSource::Unassigned
        };

        let assignment = Assignment { container, source };
        if let Some(index) = assignment.row_index() {
            let title: String = rows[index].field("#OrganicTitle").chars().take(35).collect();
            log::debug!("   {} <- row {} \"{}\"", name, index, title);
        }
        assignments.push(assignment);
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;

    fn doc_with(names: &[&str]) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new("p");
        let frame = doc.append(None, Node::frame("Results"));
        let ids = names.iter().map(|n| doc.append(Some(frame), Node::instance(*n))).collect();
        (doc, ids)
    }

    #[test]
    fn test_find_containers_does_not_descend_into_matches() {
        let mut doc = Document::new("p");
        let frame = doc.append(None, Node::frame("Serp"));
        let snippet = doc.append(Some(frame), Node::instance("ESnippet"));
        doc.append(Some(snippet), Node::instance("EShopItem"));
        let shop = doc.append(Some(frame), Node::instance("EShopItem"));
        let gone = doc.append(Some(frame), Node::instance("EOfferItem"));
        doc.remove(gone);

        assert_eq!(find_containers(&doc, Scope::Page), vec![snippet, shop]);

        doc.set_selection(vec![shop]);
        assert_eq!(find_containers(&doc, Scope::Selection), vec![shop]);
    }

    #[test]
    fn test_catalog_rows_only_feed_snippets() {
        let (doc, ids) = doc_with(&["ESnippet", "EShopItem", "ESnippet", "ESnippet", "EOfferItem"]);
        let rows = vec![
            row_from([("#isCatalogPage", "true"), ("#OrganicTitle", "cat-1")]),
            row_from([("#OrganicTitle", "prod-1")]),
            row_from([("#isCatalogPage", "true"), ("#OrganicTitle", "cat-2")]),
            row_from([("#OrganicTitle", "prod-2")]),
        ];

        let sources: Vec<_> = assign_rows(&doc, &rows, &ids).into_iter().map(|a| a.source).collect();
        assert_eq!(
            sources,
            vec![
                RowSource::Catalog(0),
                RowSource::Product(1),
                RowSource::Catalog(2),
                RowSource::Product(3),
                RowSource::Product(1),
            ]
        );
    }

    #[test]
    fn test_stub_rows_for_shop_and_offer_cards() {
        let (doc, ids) = doc_with(&["EShopItem", "EOfferItem", "ESnippet"]);
        let rows = vec![row_from([("#isCatalogPage", "true")])];
        let assignments = assign_rows(&doc, &rows, &ids);

        let shop = assignments[0].row(&rows).unwrap();
        assert_eq!(shop.field("#ButtonView"), "secondary");
        assert_eq!(shop.field("#ButtonType"), "shop");
        assert_eq!(assignments[1].row(&rows).unwrap().field("#ButtonView"), "white");
        assert_eq!(assignments[1].row_index(), None);
        assert_eq!(assignments[2].source, RowSource::Catalog(0));
    }

    #[test]
    fn test_unassigned_when_no_rows() {
        let (doc, ids) = doc_with(&["ESnippet"]);
        let assignments = assign_rows(&doc, &[], &ids);
        assert_eq!(assignments[0].source, RowSource::Unassigned);
        assert!(assignments[0].row(&[]).is_none());
    }
}
