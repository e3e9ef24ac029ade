//! End-to-end replay of rows into a document
//!
//! Containers are processed one at a time: the row is enriched, the deep
//! cache built, the schema applied and the structural hooks run. Image
//! tasks are collected along the way and handed to the image pool once every
//! container is done.

use crate::assignment::{assign_rows, find_containers, RowSource, Scope};
use crate::component_library::ComponentLibrary;
use crate::deep_cache::DeepCache;
use crate::document::{DesignHost, Document, NodeId};
use crate::enrich::enrich_row;
use crate::error::{ReplayError, Result};
use crate::hooks::{HookContext, HookRegistry};
use crate::images::{collect_tasks, HttpFetcher, ImageFetcher, ImagePool, ImageStats, ImageTask};
use crate::property_setter::MappedValue;
use crate::row::{Row, RowExt};
use crate::schema::{apply_schema, schema_for};
use crate::ReplayOptions;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress sink for long imports. Every method is optional.
pub trait Progress {
    /// Called once containers are discovered
    fn begin(&mut self, _total: usize) {}

    fn log(&mut self, _msg: &str) {}

    fn container_done(&mut self, _index: usize, _name: &str) {}

    /// Called at the end of a successful run
    fn finish(&mut self, _stats: &ImportStats) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Import statistics and metrics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportStats {
    /// Input rows
    pub row_count: usize,

    /// Input rows flagged as catalog pages
    pub catalog_row_count: usize,

    /// Containers found in scope
    pub container_count: usize,

    /// Containers that received an input row
    pub assigned_count: usize,

    /// Containers that received a synthetic stub row
    pub stub_count: usize,

    /// Containers left without data
    pub unassigned_count: usize,

    /// Containers with a schema table
    pub schema_containers: usize,

    /// Property writes accepted by the host
    pub properties_applied: usize,

    /// Property writes the host could not apply
    pub properties_failed: usize,

    /// Structural hook invocations
    pub hooks_run: usize,

    pub images: ImageStats,

    /// Wall time in milliseconds
    pub elapsed_ms: u64,
}

impl ImportStats {
    pub fn print_summary(&self) {
        println!("Import Statistics:");
        println!("  Rows: {} ({} catalog)", self.row_count, self.catalog_row_count);
        println!("  Containers: {}", self.container_count);
        println!("    with row data: {}", self.assigned_count);
        println!("    with stub rows: {}", self.stub_count);
        println!("    without data: {}", self.unassigned_count);
        println!("    schema-driven: {}", self.schema_containers);
        println!("  Properties applied: {}", self.properties_applied);
        if self.properties_failed > 0 {
            println!("  Properties that could not be applied: {}", self.properties_failed);
        }
        println!("  Hooks run: {}", self.hooks_run);
        if self.images.total > 0 {
            self.images.print_summary();
        }
        println!("  Time: {}ms", self.elapsed_ms);
    }
}

/// Host wrapper counting setter outcomes
struct CountingHost<'a> {
    doc: &'a mut Document,
    applied: usize,
    failed: usize,
}

impl<'a> CountingHost<'a> {
    fn new(doc: &'a mut Document) -> Self {
        Self {
            doc,
            applied: 0,
            failed: 0,
        }
    }
}

impl DesignHost for CountingHost<'_> {
    fn document(&self) -> &Document {
        &*self.doc
    }

    fn try_set_property(&mut self, target: NodeId, candidates: &[&str], value: &MappedValue, field: &str) -> bool {
        let applied = self.doc.try_set_property(target, candidates, value, field);
        if applied {
            self.applied += 1;
        } else {
            self.failed += 1;
        }
        applied
    }
}

pub struct ImportSession {
    options: ReplayOptions,
    hooks: HookRegistry,
    library: ComponentLibrary,
    fetcher: Option<Arc<dyn ImageFetcher>>,
}

impl ImportSession {
    pub fn new(options: ReplayOptions) -> Self {
        Self {
            options,
            hooks: HookRegistry::with_defaults(),
            library: ComponentLibrary::new(),
            fetcher: None,
        }
    }

    /// Use a custom fetcher instead of HTTP
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn options(&self) -> &ReplayOptions {
        &self.options
    }

    fn image_fetcher(&self) -> Arc<dyn ImageFetcher> {
        match &self.fetcher {
            Some(fetcher) => Arc::clone(fetcher),
            None => Arc::new(HttpFetcher::new(
                Duration::from_millis(self.options.image_timeout_ms),
                self.options.max_image_bytes,
            )),
        }
    }

    pub fn run(&mut self, doc: &mut Document, rows: &[Row], progress: &mut dyn Progress) -> Result<ImportStats> {
        let start = Instant::now();
        let mut stats = ImportStats {
            row_count: rows.len(),
            catalog_row_count: rows.iter().filter(|r| r.is_true("#isCatalogPage")).count(),
            ..ImportStats::default()
        };

        if self.options.scope == Scope::Selection && doc.selection().is_empty() {
            return Err(ReplayError::config("selection scope requested but nothing is selected"));
        }

        let containers = find_containers(doc, self.options.scope);
        stats.container_count = containers.len();
        progress.begin(containers.len());
        progress.log(&format!("Found {} containers for {} rows", containers.len(), rows.len()));

        if self.options.debug_mode {
            log::info!("Replaying {} rows into {} containers", rows.len(), containers.len());
        }

        let assignments = assign_rows(doc, rows, &containers);
        let mut image_tasks: Vec<ImageTask> = Vec::new();

        for (index, assignment) in assignments.iter().enumerate() {
            let container = assignment.container;
            let name = doc.node(container).name.clone();

            match &assignment.source {
                RowSource::Catalog(_) | RowSource::Product(_) => stats.assigned_count += 1,
                RowSource::Stub(_) => stats.stub_count += 1,
                RowSource::Unassigned => stats.unassigned_count += 1,
            }
            let Some(source_row) = assignment.row(rows) else {
                progress.container_done(index, &name);
                continue;
            };

            let row = enrich_row(source_row, &name);
            let cache = DeepCache::build(doc, container);
            if self.options.debug_mode {
                log::debug!(
                    "Container {} \"{}\": {} nodes cached in {}us",
                    index,
                    name,
                    cache.stats.node_count,
                    cache.stats.build_time_us
                );
            }

            if let Some(schema) = schema_for(&name) {
                let mut host = CountingHost::new(doc);
                apply_schema(&mut host, Some(container), Some(&row), schema, &cache);
                stats.properties_applied += host.applied;
                stats.properties_failed += host.failed;
                stats.schema_containers += 1;
            }

            let mut ctx = HookContext {
                doc: &mut *doc,
                container,
                row: &row,
                cache: &cache,
                library: &mut self.library,
            };
            stats.hooks_run += self.hooks.run_for(&mut ctx);

            // stub rows never carry images
            if self.options.fetch_images {
                if let Some(row_index) = assignment.row_index() {
                    image_tasks.extend(collect_tasks(doc, container, &row, row_index));
                }
            }

            progress.container_done(index, &name);
        }

        if !image_tasks.is_empty() {
            progress.log(&format!("Loading {} images", image_tasks.len()));
            let pool = ImagePool::new(self.image_fetcher(), self.options.max_concurrent_images);
            stats.images = pool.run(image_tasks, doc);
        }

        stats.elapsed_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Replay finished: {} containers, {} properties applied, {} failed, {} images applied, {} failed",
            stats.container_count,
            stats.properties_applied,
            stats.properties_failed,
            stats.images.applied,
            stats.images.failed
        );
        progress.finish(&stats);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ComponentProperty, Fill, Node, PropertyValue};
    use crate::row::row_from;
    use std::io::Cursor;

    struct StaticFetcher(Vec<u8>);

    impl ImageFetcher for StaticFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            if url.contains("missing") {
                return Err(ReplayError::fetch(url, "HTTP 404"));
            }
            Ok(self.0.clone())
        }
    }

    fn png() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(2, 2));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[derive(Default)]
    struct Recording {
        total: usize,
        done: Vec<String>,
        finished: bool,
    }

    impl Progress for Recording {
        fn begin(&mut self, total: usize) {
            self.total = total;
        }

        fn container_done(&mut self, _index: usize, name: &str) {
            self.done.push(name.to_string());
        }

        fn finish(&mut self, _stats: &ImportStats) {
            self.finished = true;
        }
    }

    fn bool_prop(node: &Node, key: &str) -> bool {
        match &node.property(key).unwrap().value {
            PropertyValue::Boolean { value } => *value,
            other => panic!("not a boolean: {:?}", other),
        }
    }

    fn serp() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("page-1");
        let frame = doc.append(None, Node::frame("Serp"));
        let shop = doc.append(
            Some(frame),
            Node::instance("EShopItem")
                .with_property(ComponentProperty::boolean("brand#1:0", false))
                .with_property(ComponentProperty::boolean("withFintech#1:1", false)),
        );
        doc.append(Some(shop), Node::text("#OrganicTitle", "placeholder"));
        let image = doc.append(Some(shop), Node::rectangle("#ThumbImage", 40.0, 40.0));
        let offer = doc.append(Some(frame), Node::instance("EOfferItem"));
        (doc, shop, image, offer)
    }

    fn options() -> ReplayOptions {
        ReplayOptions {
            fetch_images: false,
            ..ReplayOptions::default()
        }
    }

    #[test]
    fn test_replays_rows_into_containers() {
        let (mut doc, shop, image, offer) = serp();
        let rows = vec![row_from([
            ("#Brand", "Apple"),
            ("#EPriceGroup_Fintech", "true"),
            ("#OrganicTitle", "iPhone 15"),
            ("#ThumbImage", "https://img.test/a.png"),
        ])];
        let mut progress = Recording::default();

        let stats = ImportSession::new(options()).run(&mut doc, &rows, &mut progress).unwrap();

        assert_eq!(stats.container_count, 2);
        assert_eq!(stats.assigned_count, 2);
        assert_eq!(stats.schema_containers, 2);
        assert!(stats.properties_applied >= 2);
        assert!(stats.properties_failed > 0);
        assert_eq!(stats.images.total, 0);

        assert!(bool_prop(doc.node(shop), "brand#1:0"));
        assert!(bool_prop(doc.node(shop), "withFintech#1:1"));
        let title = doc.find_text_by_name(shop, "#OrganicTitle").unwrap();
        assert_eq!(doc.node(title).characters, "iPhone 15");
        assert!(doc.node(image).fills.is_empty());
        assert!(!doc.is_removed(offer));

        assert_eq!(progress.total, 2);
        assert_eq!(progress.done, vec!["EShopItem", "EOfferItem"]);
        assert!(progress.finished);
    }

    #[test]
    fn test_images_loaded_after_containers() {
        let (mut doc, _, image, _) = serp();
        let rows = vec![
            row_from([("#ThumbImage", "https://img.test/a.png")]),
            row_from([("#ThumbImage", "https://img.test/missing.png")]),
        ];
        let options = ReplayOptions {
            fetch_images: true,
            ..ReplayOptions::default()
        };

        let mut session = ImportSession::new(options).with_fetcher(Arc::new(StaticFetcher(png())));
        let stats = session.run(&mut doc, &rows, &mut NullProgress).unwrap();

        assert_eq!(stats.images.total, 1);
        assert_eq!(stats.images.applied, 1);
        assert!(matches!(doc.node(image).fills[0], Fill::Image { .. }));
    }

    #[test]
    fn test_unassigned_and_stub_containers() {
        let (mut doc, shop, _, _) = serp();
        let snippet = doc.append(None, Node::instance("ESnippet"));

        let stats = ImportSession::new(options()).run(&mut doc, &[], &mut NullProgress).unwrap();
        assert_eq!(stats.stub_count, 2);
        assert_eq!(stats.unassigned_count, 1);
        assert!(!bool_prop(doc.node(shop), "brand#1:0"));
        assert!(!doc.is_removed(snippet));
    }

    #[test]
    fn test_empty_selection_is_an_error() {
        let (mut doc, _, _, _) = serp();
        let options = ReplayOptions {
            scope: Scope::Selection,
            ..options()
        };
        let result = ImportSession::new(options).run(&mut doc, &[], &mut NullProgress);
        assert!(matches!(result, Err(ReplayError::Config { .. })));
    }

    #[test]
    fn test_rerun_is_stable() {
        let (mut doc, shop, _, _) = serp();
        let rows = vec![row_from([("#Brand", "Apple"), ("#OrganicTitle", "Phone")])];
        let mut session = ImportSession::new(options());
        let first = session.run(&mut doc, &rows, &mut NullProgress).unwrap();
        let snapshot = doc.to_json().unwrap();
        let second = session.run(&mut doc, &rows, &mut NullProgress).unwrap();

        assert_eq!(first.properties_applied, second.properties_applied);
        assert_eq!(doc.to_json().unwrap(), snapshot);
        assert!(bool_prop(doc.node(shop), "brand#1:0"));
    }
}
