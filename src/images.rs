//! Image fetching and fill application
//!
//! Image fields found while replaying containers become [`ImageTask`]s. Once
//! every container has been processed the tasks go through a bounded worker
//! pool: workers fetch and decode each distinct URL, and the calling thread
//! applies the decoded images as fills. A failed task never affects its
//! siblings; the layer is painted translucent red and the failure recorded.

use crate::document::{Document, Fill, NodeId, ScaleMode};
use crate::error::{ReplayError, Result};
use crate::row::Row;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

pub const SPRITE_LIST_PREFIX: &str = "SPRITE_LIST:";

/// Field names that always carry an image URL
pub const IMAGE_FIELDS: &[&str] = &[
    "#FaviconImage",
    "#OrganicImage",
    "#ThumbImage",
    "#Image1",
    "#Image2",
    "#Image3",
    "#EQuote-AuthorAvatar",
    "#QuoteImage",
];

const DEFAULT_SPRITE_SIZE: f32 = 16.0;

pub fn is_image_field(name: &str) -> bool {
    let normalized = name.trim().to_lowercase();
    if !normalized.starts_with('#') {
        return false;
    }
    IMAGE_FIELDS.iter().any(|f| f.to_lowercase() == normalized) || normalized.ends_with("image")
}

pub fn is_favicon_field(name: &str) -> bool {
    name.to_lowercase().contains("favicon")
}

/// One layer waiting for an image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTask {
    pub layer: NodeId,
    pub field_name: String,
    pub url: String,
    pub row_index: usize,
}

/// Failure record for one task
#[derive(Debug, Clone, Serialize)]
pub struct ImageError {
    pub layer: String,
    pub field_name: String,
    pub url: String,
    pub message: String,
}

/// Row value for a field, falling back to a case-insensitive key match
fn lookup<'a>(row: &'a Row, field: &str) -> &'a str {
    if let Some(value) = row.get(field) {
        return value;
    }
    let wanted = field.to_lowercase();
    row.iter()
        .find(|(key, _)| key.to_lowercase() == wanted)
        .map(|(_, value)| value.as_str())
        .unwrap_or("")
}

/// Shape layers under `container` whose name is an image field with data in the row
pub fn collect_tasks(doc: &Document, container: NodeId, row: &Row, row_index: usize) -> Vec<ImageTask> {
    doc.descendants(container)
        .into_iter()
        .filter_map(|id| {
            let node = doc.node(id);
            if !node.kind.is_shape() || !is_image_field(&node.name) {
                return None;
            }
            let value = lookup(row, &node.name).trim();
            if value.is_empty() {
                return None;
            }
            Some(ImageTask {
                layer: id,
                field_name: node.name.clone(),
                url: value.to_string(),
                row_index,
            })
        })
        .collect()
}

fn parse_sprite_list(value: &str) -> Option<Vec<String>> {
    let urls: Vec<String> = value
        .strip_prefix(SPRITE_LIST_PREFIX)?
        .split('|')
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect();
    Some(urls)
}

/// Replace `SPRITE_LIST:` values on favicon tasks with concrete URLs.
///
/// A list seen on a new row is activated and its first URL used. Later rows
/// whose favicon value is not a URL take the next entry; an explicit URL
/// overrides the list without consuming an entry. All favicon layers of the
/// same row share one resolved URL.
pub fn resolve_sprite_lists(tasks: &mut [ImageTask]) {
    let mut active: Option<Vec<String>> = None;
    let mut next = 0;
    let mut last_row: Option<usize> = None;
    let mut row_url: Option<String> = None;

    for task in tasks.iter_mut().filter(|t| is_favicon_field(&t.field_name)) {
        let raw = task.url.trim().to_string();
        let list = parse_sprite_list(&raw);

        if last_row != Some(task.row_index) {
            last_row = Some(task.row_index);
            row_url = None;

            if let Some(urls) = list {
                if urls.is_empty() {
                    log::warn!("Empty sprite list for row {}", task.row_index);
                    active = None;
                } else {
                    row_url = Some(urls[0].clone());
                    next = 1;
                    active = Some(urls);
                }
            } else if raw.starts_with("http") || raw.starts_with("//") {
                row_url = Some(raw);
            } else if let Some(urls) = &active {
                if next < urls.len() {
                    row_url = Some(urls[next].clone());
                    next += 1;
                } else {
                    log::warn!("Sprite list exhausted at row {}", task.row_index);
                }
            }
        } else if row_url.is_none() {
            if let Some(urls) = list.filter(|u| !u.is_empty()) {
                row_url = Some(urls[0].clone());
                next = 1;
                active = Some(urls);
            }
        }

        if let Some(url) = &row_url {
            task.url = url.clone();
        }
    }
}

/// CSS-style sprite crop carried after the URL: `url|position|size`
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteCrop {
    pub position: String,
    pub size: Option<String>,
}

pub fn split_sprite(value: &str) -> (&str, Option<SpriteCrop>) {
    let mut parts = value.splitn(3, '|');
    let url = parts.next().unwrap_or("");
    match parts.next().map(str::trim) {
        Some(position) if !position.is_empty() => {
            let size = parts.next().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
            (
                url,
                Some(SpriteCrop {
                    position: position.to_string(),
                    size,
                }),
            )
        }
        _ => (url, None),
    }
}

/// Absolute http(s) URL for a task value
pub fn normalize_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.starts_with(SPRITE_LIST_PREFIX) {
        return Err(ReplayError::fetch(url, "unresolved sprite list"));
    }
    if let Some(rest) = url.strip_prefix("//") {
        return Ok(format!("https://{}", rest));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(url.to_string());
    }
    Err(ReplayError::fetch(url, "not an http(s) URL"))
}

fn px_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(-?\d+(?:\.\d+)?)px").expect("valid px regex"))
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid number regex"))
}

fn zero_then_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"0px\s*[-\d]").expect("valid position regex"))
}

/// Background offset `(x, y)` in pixels from a CSS position string
pub fn parse_sprite_offset(position: &str) -> (f32, f32) {
    let px: Vec<f32> = px_regex()
        .captures_iter(position)
        .filter_map(|c| c[1].parse().ok())
        .collect();

    match px.len() {
        0 => {
            let nums: Vec<f32> = number_regex()
                .find_iter(position)
                .filter_map(|m| m.as_str().parse().ok())
                .collect();
            (nums.first().copied().unwrap_or(0.0), nums.get(1).copied().unwrap_or(0.0))
        }
        1 => {
            // "px" always contains an x, so only a y marker can move the value
            let value = px[0];
            if position.to_lowercase().contains('y') && zero_then_value_regex().is_match(position) {
                (0.0, value)
            } else {
                (value, 0.0)
            }
        }
        _ => (px[0], px[1]),
    }
}

/// Edge length of one sprite cell
pub fn sprite_cell_size(size: Option<&str>, offset: (f32, f32), layer: (f32, f32)) -> f32 {
    let layer_min = layer.0.min(layer.1);
    let fallback = if layer_min > 0.0 { layer_min } else { DEFAULT_SPRITE_SIZE };

    if let Some(size) = size {
        return px_regex()
            .captures(size)
            .and_then(|c| c[1].parse::<f32>().ok())
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_SPRITE_SIZE);
    }

    let along_axis = match offset {
        (x, y) if x != 0.0 && y == 0.0 => x.abs(),
        (x, y) if x == 0.0 && y != 0.0 => y.abs(),
        _ => return fallback,
    };
    [32.0, 20.0, 16.0]
        .into_iter()
        .find(|cell| along_axis % *cell == 0.0)
        .unwrap_or(fallback)
}

/// Crop transform selecting one sprite cell of an image
pub fn sprite_transform(sprite: &SpriteCrop, image: (u32, u32), layer: (f32, f32)) -> [[f32; 3]; 2] {
    let (offset_x, offset_y) = parse_sprite_offset(&sprite.position);
    let cell = sprite_cell_size(sprite.size.as_deref(), (offset_x, offset_y), layer);
    let width = image.0.max(1) as f32;
    let height = image.1.max(1) as f32;
    [
        [cell / width, 0.0, -offset_x / width],
        [0.0, cell / height, -offset_y / height],
    ]
}

/// Fetches raw image bytes
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(timeout))
                .build(),
        );
        Self { agent, max_bytes }
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(code)) => {
                return Err(ReplayError::fetch(url, format!("HTTP {}", code)));
            }
            Err(e) => return Err(ReplayError::fetch(url, e.to_string())),
        };

        response
            .into_body()
            .with_config()
            .limit(self.max_bytes)
            .read_to_vec()
            .map_err(|e| ReplayError::fetch(url, e.to_string()))
    }
}

/// Image bytes that passed format validation
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Check the magic bytes and read the pixel dimensions
pub fn decode_image(url: &str, bytes: Vec<u8>) -> Result<DecodedImage> {
    if bytes.is_empty() {
        return Err(ReplayError::image(url, "empty response"));
    }

    let format = image::guess_format(&bytes)
        .map_err(|_| ReplayError::image(url, "unrecognised image format"))?;
    if !matches!(
        format,
        image::ImageFormat::Png | image::ImageFormat::Jpeg | image::ImageFormat::Gif | image::ImageFormat::WebP
    ) {
        return Err(ReplayError::image(url, format!("unsupported format {:?}", format)));
    }

    let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| ReplayError::image(url, e.to_string()))?
        .into_dimensions()
        .map_err(|e| ReplayError::image(url, e.to_string()))?;

    Ok(DecodedImage { bytes, width, height })
}

/// Outcome of one pool run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageStats {
    pub total: usize,
    pub applied: usize,
    pub failed: usize,
    pub unique_urls: usize,
    pub errors: Vec<ImageError>,
    pub elapsed_ms: u64,
}

impl ImageStats {
    pub fn print_summary(&self) {
        println!("Images:");
        println!("  Tasks: {}", self.total);
        println!("  Distinct URLs: {}", self.unique_urls);
        println!("  Applied: {}", self.applied);
        println!("  Failed: {}", self.failed);
        for error in &self.errors {
            println!("    {} ({}): {}", error.field_name, error.url, error.message);
        }
    }
}

struct PreparedTask {
    task: ImageTask,
    sprite: Option<SpriteCrop>,
}

/// Cached outcome for one URL
enum Fetched {
    Ready { hash: String, width: u32, height: u32 },
    Failed(String),
}

pub struct ImagePool {
    fetcher: Arc<dyn ImageFetcher>,
    max_concurrent: usize,
}

impl ImagePool {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn run(&self, mut tasks: Vec<ImageTask>, doc: &mut Document) -> ImageStats {
        let start = Instant::now();
        let mut stats = ImageStats {
            total: tasks.len(),
            ..ImageStats::default()
        };
        if tasks.is_empty() {
            return stats;
        }

        log::info!("Processing {} image tasks", tasks.len());
        resolve_sprite_lists(&mut tasks);

        // Group tasks by fetch URL so every URL is requested once
        let mut urls: Vec<String> = Vec::new();
        let mut waiting: HashMap<String, Vec<PreparedTask>> = HashMap::new();
        for task in tasks {
            let (base, sprite) = split_sprite(&task.url);
            match normalize_url(base) {
                Ok(url) => {
                    if !waiting.contains_key(&url) {
                        urls.push(url.clone());
                    }
                    waiting.entry(url).or_default().push(PreparedTask { task, sprite });
                }
                Err(e) => {
                    let message = e.to_string();
                    mark_failed(doc, &mut stats, &task, &message);
                }
            }
        }
        stats.unique_urls = urls.len();

        let urls = Arc::new(urls);
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel::<(usize, Result<DecodedImage>)>();
        let workers = self.max_concurrent.min(urls.len()).max(1);

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let urls = Arc::clone(&urls);
            let counter = Arc::clone(&counter);
            let fetcher = Arc::clone(&self.fetcher);
            let tx = tx.clone();
            handles.push(thread::spawn(move || loop {
                let i = counter.fetch_add(1, Ordering::Relaxed);
                if i >= urls.len() {
                    break;
                }
                let url = &urls[i];
                let result = fetcher.fetch(url).and_then(|bytes| decode_image(url, bytes));
                if tx.send((i, result)).is_err() {
                    break;
                }
            }));
        }
        drop(tx);

        for (i, result) in rx {
            let url = &urls[i];
            let fetched = match result {
                Ok(image) => {
                    let hash = doc.add_image(&image.bytes, image.width, image.height);
                    log::debug!("   Loaded {} ({}x{}, {} bytes)", url, image.width, image.height, image.bytes.len());
                    Fetched::Ready {
                        hash,
                        width: image.width,
                        height: image.height,
                    }
                }
                Err(e) => {
                    log::warn!("Image fetch failed: {}", e);
                    Fetched::Failed(e.to_string())
                }
            };

            for prepared in waiting.remove(url).unwrap_or_default() {
                apply_one(doc, &mut stats, prepared, &fetched);
            }
        }

        for handle in handles {
            if handle.join().is_err() {
                log::warn!("Image worker panicked");
            }
        }

        // Workers that died before reporting leave tasks behind
        for (url, prepared) in waiting {
            for p in prepared {
                mark_failed(doc, &mut stats, &p.task, &format!("no result for {}", url));
            }
        }

        stats.elapsed_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Images done: {} applied, {} failed ({} distinct URLs, {}ms)",
            stats.applied,
            stats.failed,
            stats.unique_urls,
            stats.elapsed_ms
        );
        stats
    }
}

fn apply_one(doc: &mut Document, stats: &mut ImageStats, prepared: PreparedTask, fetched: &Fetched) {
    let task = &prepared.task;
    let (hash, width, height) = match fetched {
        Fetched::Ready { hash, width, height } => (hash, *width, *height),
        Fetched::Failed(message) => {
            mark_failed(doc, stats, task, message);
            return;
        }
    };

    if doc.is_removed(task.layer) {
        log::warn!("   Layer for {} was removed", task.field_name);
        stats.failed += 1;
        return;
    }
    let layer = doc.node(task.layer);
    if !layer.kind.is_shape() {
        log::warn!("   Unsupported layer type {:?} for {}", layer.kind, task.field_name);
        stats.failed += 1;
        return;
    }

    let fill = match &prepared.sprite {
        Some(sprite) => Fill::Image {
            image_hash: hash.clone(),
            scale_mode: ScaleMode::Crop,
            transform: Some(sprite_transform(sprite, (width, height), (layer.width, layer.height))),
        },
        None => {
            let scale_mode = if task.field_name.to_lowercase().contains("organicimage") {
                ScaleMode::Fit
            } else {
                ScaleMode::Fill
            };
            Fill::Image {
                image_hash: hash.clone(),
                scale_mode,
                transform: None,
            }
        }
    };

    doc.set_fills(task.layer, vec![fill]);
    stats.applied += 1;
}

fn mark_failed(doc: &mut Document, stats: &mut ImageStats, task: &ImageTask, message: &str) {
    log::warn!("   Image for {} failed: {}", task.field_name, message);
    doc.set_fills(
        task.layer,
        vec![Fill::Solid {
            r: 1.0,
            g: 0.0,
            b: 0.0,
            opacity: 0.3,
        }],
    );
    stats.failed += 1;
    stats.errors.push(ImageError {
        layer: doc.node(task.layer).id.clone(),
        field_name: task.field_name.clone(),
        url: task.url.clone(),
        message: message.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;
    use crate::row::row_from;
    use std::sync::Mutex;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[derive(Default)]
    struct MockFetcher {
        responses: HashMap<String, Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
            self.responses.insert(url.to_string(), bytes);
            self
        }
    }

    impl ImageFetcher for MockFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| ReplayError::fetch(url, "HTTP 404"))
        }
    }

    fn task(layer: NodeId, field: &str, url: &str, row_index: usize) -> ImageTask {
        ImageTask {
            layer,
            field_name: field.to_string(),
            url: url.to_string(),
            row_index,
        }
    }

    #[test]
    fn test_image_field_names() {
        assert!(is_image_field("#OrganicImage"));
        assert!(is_image_field("#thumbimage"));
        assert!(is_image_field("#Image2"));
        assert!(is_image_field("#EQuote-AuthorAvatar"));
        assert!(!is_image_field("OrganicImage"));
        assert!(!is_image_field("#OrganicTitle"));
    }

    #[test]
    fn test_collect_tasks_shapes_with_data_only() {
        let mut doc = Document::new("p");
        let container = doc.append(None, Node::instance("ESnippet"));
        let thumb = doc.append(Some(container), Node::rectangle("#OrganicImage", 100.0, 80.0));
        doc.append(Some(container), Node::rectangle("#ThumbImage", 10.0, 10.0));
        doc.append(Some(container), Node::text("#FaviconImage", ""));
        let row = row_from([
            ("#organicimage", "https://img.test/a.png"),
            ("#ThumbImage", "  "),
            ("#FaviconImage", "https://img.test/f.png"),
        ]);

        let tasks = collect_tasks(&doc, container, &row, 3);
        assert_eq!(tasks, vec![task(thumb, "#OrganicImage", "https://img.test/a.png", 3)]);
    }

    #[test]
    fn test_sprite_list_is_consumed_across_rows() {
        let l = NodeId(0);
        let mut tasks = vec![
            task(l, "#FaviconImage", "SPRITE_LIST:https://s.test/1|https://s.test/2|https://s.test/3", 0),
            task(l, "#FaviconImage", "SPRITE_LIST:https://s.test/1|https://s.test/2|https://s.test/3", 0),
            task(l, "#OrganicImage", "https://img.test/x.png", 1),
            task(l, "#FaviconImage", "-", 1),
            task(l, "#FaviconImage", "https://explicit.test/f.png", 2),
            task(l, "#FaviconImage", "-", 3),
            task(l, "#FaviconImage", "-", 4),
        ];
        resolve_sprite_lists(&mut tasks);

        let urls: Vec<&str> = tasks.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://s.test/1",
                "https://s.test/1",
                "https://img.test/x.png",
                "https://s.test/2",
                "https://explicit.test/f.png",
                "https://s.test/3",
                "-",
            ]
        );
    }

    #[test]
    fn test_split_sprite_and_normalize() {
        assert_eq!(split_sprite("https://a.test/s.png"), ("https://a.test/s.png", None));
        let (url, sprite) = split_sprite("//a.test/s.png|0px -32px|16px");
        assert_eq!(url, "//a.test/s.png");
        assert_eq!(
            sprite,
            Some(SpriteCrop {
                position: "0px -32px".into(),
                size: Some("16px".into())
            })
        );
        assert_eq!(normalize_url(url).unwrap(), "https://a.test/s.png");
        assert!(normalize_url("data:image/png;base64,xx").is_err());
        assert!(normalize_url("SPRITE_LIST:https://a").is_err());
    }

    #[test]
    fn test_sprite_offsets_and_cell_size() {
        assert_eq!(parse_sprite_offset("0px -32px"), (0.0, -32.0));
        assert_eq!(parse_sprite_offset("-20px"), (-20.0, 0.0));
        assert_eq!(parse_sprite_offset("y 10px -4"), (0.0, 10.0));
        assert_eq!(parse_sprite_offset("5 7"), (5.0, 7.0));

        assert_eq!(sprite_cell_size(Some("24px"), (0.0, -48.0), (16.0, 16.0)), 24.0);
        assert_eq!(sprite_cell_size(None, (0.0, -64.0), (16.0, 16.0)), 32.0);
        assert_eq!(sprite_cell_size(None, (0.0, -40.0), (16.0, 16.0)), 20.0);
        assert_eq!(sprite_cell_size(None, (0.0, -7.0), (12.0, 14.0)), 12.0);
        assert_eq!(sprite_cell_size(None, (0.0, 0.0), (0.0, 0.0)), 16.0);
    }

    #[test]
    fn test_sprite_transform() {
        let sprite = SpriteCrop {
            position: "0px -32px".into(),
            size: Some("16px".into()),
        };
        let t = sprite_transform(&sprite, (16, 64), (16.0, 16.0));
        assert_eq!(t, [[1.0, 0.0, 0.0], [0.0, 0.25, 0.5]]);
    }

    #[test]
    fn test_decode_rejects_non_images() {
        assert!(decode_image("u", Vec::new()).is_err());
        assert!(decode_image("u", b"<html></html>".to_vec()).is_err());
        let decoded = decode_image("u", png(3, 2)).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
    }

    #[test]
    fn test_pool_applies_fills_and_isolates_failures() {
        let mut doc = Document::new("p");
        let container = doc.append(None, Node::instance("ESnippet"));
        let organic = doc.append(Some(container), Node::rectangle("#OrganicImage", 100.0, 100.0));
        let thumb = doc.append(Some(container), Node::rectangle("#ThumbImage", 50.0, 50.0));
        let favicon = doc.append(Some(container), Node::rectangle("#FaviconImage", 16.0, 16.0));
        let broken = doc.append(Some(container), Node::rectangle("#Image1", 10.0, 10.0));
        let invalid = doc.append(Some(container), Node::rectangle("#Image2", 10.0, 10.0));

        let fetcher = Arc::new(
            MockFetcher::default()
                .with("https://img.test/a.png", png(4, 4))
                .with("https://img.test/sprite.png", png(16, 64)),
        );
        let tasks = vec![
            task(organic, "#OrganicImage", "https://img.test/a.png", 0),
            task(thumb, "#ThumbImage", "//img.test/a.png", 0),
            task(favicon, "#FaviconImage", "https://img.test/sprite.png|0px -16px|16px", 0),
            task(broken, "#Image1", "https://img.test/missing.png", 0),
            task(invalid, "#Image2", "ftp://img.test/a.png", 0),
        ];

        let pool = ImagePool::new(fetcher.clone(), 4);
        let stats = pool.run(tasks, &mut doc);

        assert_eq!(stats.total, 5);
        assert_eq!(stats.applied, 3);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.unique_urls, 3);
        assert_eq!(stats.errors.len(), 2);

        let calls = fetcher.calls.lock().unwrap();
        assert_eq!(calls.iter().filter(|u| u.as_str() == "https://img.test/a.png").count(), 1);

        match &doc.node(organic).fills[0] {
            Fill::Image { scale_mode, .. } => assert_eq!(*scale_mode, ScaleMode::Fit),
            other => panic!("unexpected fill {:?}", other),
        }
        match &doc.node(thumb).fills[0] {
            Fill::Image { scale_mode, .. } => assert_eq!(*scale_mode, ScaleMode::Fill),
            other => panic!("unexpected fill {:?}", other),
        }
        match &doc.node(favicon).fills[0] {
            Fill::Image {
                scale_mode, transform, ..
            } => {
                assert_eq!(*scale_mode, ScaleMode::Crop);
                assert_eq!(*transform, Some([[1.0, 0.0, 0.0], [0.0, 0.25, 0.25]]));
            }
            other => panic!("unexpected fill {:?}", other),
        }
        assert!(matches!(doc.node(broken).fills[0], Fill::Solid { opacity, .. } if opacity == 0.3));
        assert!(matches!(doc.node(invalid).fills[0], Fill::Solid { r, .. } if r == 1.0));
        assert_eq!(doc.images().len(), 2);
    }

    #[test]
    fn test_pool_skips_removed_layers() {
        let mut doc = Document::new("p");
        let layer = doc.append(None, Node::rectangle("#ThumbImage", 10.0, 10.0));
        doc.remove(layer);
        let fetcher = Arc::new(MockFetcher::default().with("https://img.test/a.png", png(2, 2)));

        let stats = ImagePool::new(fetcher, 2).run(vec![task(layer, "#ThumbImage", "https://img.test/a.png", 0)], &mut doc);
        assert_eq!(stats.applied, 0);
        assert_eq!(stats.failed, 1);
        assert!(doc.node(layer).fills.is_empty());
    }
}
