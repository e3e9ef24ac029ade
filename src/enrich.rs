//! Row enrichment pass
//!
//! Scraped rows are often missing fields that can be recovered from sibling
//! fields (a host from the favicon URL, a shop name from the host). This pass
//! runs once per (row, container) before the schema engine and produces a new
//! row; the input row is never touched.

use crate::row::{Row, RowExt};
use regex::Regex;
use std::sync::OnceLock;

const MAX_HOST_LEN: usize = 80;

type FallbackTransform = fn(&str) -> String;

/// One fallback chain: fill `target` from the first non-blank `sources` entry
struct FieldFallback {
    target: &'static str,
    sources: &'static [&'static str],
    transform: Option<FallbackTransform>,
}

const FIELD_FALLBACKS: &[FieldFallback] = &[
    FieldFallback {
        target: "#OrganicText",
        sources: &["#OrganicTitle"],
        transform: None,
    },
    FieldFallback {
        target: "#OrganicHost",
        sources: &["#ShopName"],
        transform: None,
    },
    FieldFallback {
        target: "#ShopName",
        sources: &["#OrganicHost"],
        transform: None,
    },
    FieldFallback {
        target: "#FaviconImage",
        sources: &["#OrganicHost", "#ShopName"],
        transform: Some(favicon_url_for_host),
    },
    FieldFallback {
        target: "#ProductRating",
        sources: &["#ShopInfo-Ugc"],
        transform: Some(normalize_rating),
    },
    FieldFallback {
        target: "#ButtonView",
        sources: &["#SnippetType"],
        transform: Some(button_view_for_snippet_type),
    },
];

/// Containers whose rows may take their host from the favicon URL
const FAVICON_HOST_CONTAINERS: &[&str] = &["ESnippet", "Snippet"];

fn favicon_host_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/favicon/v2/([^?]+)").expect("static favicon regex"))
}

fn rating_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(?:[.,]\d+)?").expect("static rating regex"))
}

/// Produce an enriched copy of `row` for a container named `container_name`
pub fn enrich_row(row: &Row, container_name: &str) -> Row {
    let mut out = row.clone();

    if FAVICON_HOST_CONTAINERS.contains(&container_name) && !out.has_value("#OrganicHost") {
        if let Some(host) = host_from_favicon(out.field("#FaviconImage")) {
            log::debug!("Derived #OrganicHost '{}' from favicon URL", host);
            out.insert("#OrganicHost".to_string(), host);
        }
    }

    for fallback in FIELD_FALLBACKS {
        if out.has_value(fallback.target) {
            continue;
        }

        for source in fallback.sources {
            let raw = out.trimmed(source);
            if raw.is_empty() {
                continue;
            }
            let value = match fallback.transform {
                Some(transform) => transform(raw),
                None => raw.to_string(),
            };
            if value.is_empty() {
                continue;
            }
            log::debug!("Filled {} from {}", fallback.target, source);
            out.insert(fallback.target.to_string(), value);
            break;
        }
    }

    out
}

/// Recover a host name from a `/favicon/v2/<encoded>` URL
pub fn host_from_favicon(favicon: &str) -> Option<String> {
    let captures = favicon_host_regex().captures(favicon)?;
    let encoded = captures.get(1)?.as_str();
    let decoded = urlencoding::decode(encoded).ok()?.into_owned();

    let host = if decoded.starts_with("http") {
        match url::Url::parse(&decoded) {
            Ok(parsed) => parsed.host_str().map(str::to_string).unwrap_or_default(),
            Err(_) => decoded,
        }
    } else {
        decoded.split('/').next().unwrap_or("").to_string()
    };

    let host: String = host.trim().chars().take(MAX_HOST_LEN).collect();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Builds a favicon URL from a host or a URL-like shop name
fn favicon_url_for_host(value: &str) -> String {
    let bare = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .unwrap_or(value);
    let host = bare.split('/').next().unwrap_or("");
    if host.contains('.') {
        format!("https://favicon.yandex.net/favicon/v2/{}?size=32", host)
    } else {
        String::new()
    }
}

/// Read the leading number of ratings like `4.8`, `4,8/5` or `4.8★` and
/// render it with one decimal as `4,8`. Halves round up.
fn normalize_rating(raw: &str) -> String {
    let Some(prefix) = rating_prefix_regex().find(raw) else {
        return String::new();
    };
    match prefix.as_str().replace(',', ".").parse::<f64>() {
        Ok(value) if (0.0..=5.0).contains(&value) => {
            let rounded = (value * 10.0).round() / 10.0;
            format!("{:.1}", rounded).replace('.', ",")
        }
        _ => String::new(),
    }
}

fn button_view_for_snippet_type(snippet_type: &str) -> String {
    match snippet_type {
        "EShopItem" => "secondary",
        "EOfferItem" => "white",
        _ => "primaryLong",
    }
    .to_string()
}
