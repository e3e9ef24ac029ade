//! Contentify
//!
//! Replays scraped product-snippet rows into the component instances of a
//! design document: component properties, text layers, visibility and image
//! fills.
//!
//! # Basic Usage
//!
//! ```no_run
//! use contentify::{replay_file, Result};
//!
//! fn main() -> Result<()> {
//!     let stats = replay_file("serp.json", "rows.json", "serp.out.json")?;
//!     stats.print_summary();
//!     Ok(())
//! }
//! ```
//!
//! # Replay Pipeline
//!
//! 1. **Discovery**: find card containers on the page or in the selection
//! 2. **Assignment**: pair containers with catalog and product rows
//! 3. **Enrichment**: derive fallback fields into a fresh row
//! 4. **Schema**: resolve declarative property mappings through the deep cache
//! 5. **Hooks**: run structural operations (text, sitelinks, visibility, swaps)
//! 6. **Images**: fetch and apply image fills through a bounded worker pool

pub mod assignment;
pub mod cli;
pub mod component_library;
pub mod deep_cache;
pub mod document;
pub mod enrich;
pub mod error;
pub mod hooks;
pub mod images;
pub mod pipeline;
pub mod property_setter;
pub mod row;
pub mod schema;

pub use assignment::{assign_rows, find_containers, Assignment, RowSource, Scope, CONTAINER_NAMES};
pub use cli::Cli;
pub use component_library::ComponentLibrary;
pub use deep_cache::{CacheStats, DeepCache};
pub use document::{DesignHost, Document, Fill, Node, NodeId, NodeKind};
pub use enrich::enrich_row;
pub use error::{ReplayError, Result};
pub use images::{HttpFetcher, ImageError, ImageFetcher, ImagePool, ImageStats, ImageTask};
pub use pipeline::{ImportSession, ImportStats, NullProgress, Progress};
pub use property_setter::{try_set_property, MappedValue};
pub use row::{load_rows, Row, RowExt};
pub use schema::{all_schemas, apply_schema, resolve_value, schema_for, ComponentSchema, PropertyMapping};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Replay options and settings
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Log every phase at info level
    pub debug_mode: bool,

    /// Image worker threads
    pub max_concurrent_images: usize,

    /// Per-request image timeout in milliseconds
    pub image_timeout_ms: u64,

    /// Largest accepted image body in bytes
    pub max_image_bytes: u64,

    /// Where containers are searched
    pub scope: Scope,

    /// Whether image fields are fetched at all
    pub fetch_images: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            debug_mode: false,
            max_concurrent_images: 4,
            image_timeout_ms: 30_000,
            max_image_bytes: 10 * 1024 * 1024,
            scope: Scope::Page,
            fetch_images: true,
        }
    }
}

/// Replay a row file into a document file with default options
pub fn replay_file(document_path: &str, rows_path: &str, output_path: &str) -> Result<ImportStats> {
    replay_file_with_options(document_path, rows_path, output_path, ReplayOptions::default())
}

/// Replay with custom options
pub fn replay_file_with_options(
    document_path: &str,
    rows_path: &str,
    output_path: &str,
    options: ReplayOptions,
) -> Result<ImportStats> {
    if options.debug_mode {
        log::info!("{} v{}", NAME, VERSION);
        log::info!("Replaying '{}' into '{}' -> '{}'", rows_path, document_path, output_path);
        log::debug!("Replay options: {:?}", options);
    }

    let mut doc = Document::load(document_path)?;
    let rows = load_rows(rows_path)?;

    let debug_mode = options.debug_mode;
    let stats = ImportSession::new(options).run(&mut doc, &rows, &mut NullProgress)?;
    doc.save(output_path)?;

    if debug_mode {
        log::info!("Replay successful!");
        log::info!("Containers: {}", stats.container_count);
        log::info!("Properties applied: {}", stats.properties_applied);
        log::info!("Replay time: {}ms", stats.elapsed_ms);
        log::debug!("Full stats: {:?}", stats);
    }

    Ok(stats)
}
