//! Snippet card structure: thumb fallback, sitelinks, promo text, clipping
//! and the host label in the path block

use super::HookContext;
use crate::document::{NodeId, NodeKind};
use crate::row::RowExt;
use regex::Regex;
use std::sync::OnceLock;

const THUMB_NAMES: &[&str] = &["EThumb", "Organic-OfferThumb", "Thumb"];
const SITELINK_CONTAINERS: &[&str] = &["Sitelinks", "Block / Snippet-staff / Sitelinks"];
const PROMO_LAYERS: &[&str] = &["#Promo", "InfoSection-Text", "PromoText"];
const PATH_BLOCKS: &[&str] = &["Block / Snippet-staff / Path", "Path"];
const MAX_SITELINKS: usize = 4;

fn host_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[a-z0-9.-]+\.[a-z]{2,}$").expect("static host regex"))
}

pub fn apply_esnippet_structure(ctx: &mut HookContext<'_>) {
    apply_thumb_fallback(ctx);
    apply_sitelinks(ctx);
    apply_promo_text(ctx);
    apply_clip_fix(ctx);
    apply_path_host(ctx);
}

fn first_by_names(ctx: &HookContext<'_>, names: &[&str]) -> Option<NodeId> {
    names
        .iter()
        .find_map(|name| ctx.doc.find_first_by_name(ctx.container, name))
}

/// The placeholder thumb can stay visible after `withThumb` is switched off
fn apply_thumb_fallback(ctx: &mut HookContext<'_>) {
    if ctx.row.is_true("#withThumb") {
        return;
    }
    if let Some(thumb) = first_by_names(ctx, THUMB_NAMES) {
        ctx.doc.set_visible(thumb, false);
        log::debug!("   [esnippet] thumb hidden");
    }
}

fn apply_sitelinks(ctx: &mut HookContext<'_>) {
    if !ctx.row.is_true("#Sitelinks") {
        return;
    }
    let Some(block) = first_by_names(ctx, SITELINK_CONTAINERS) else {
        return;
    };

    let texts: Vec<String> = (1..=MAX_SITELINKS)
        .map(|i| ctx.row.trimmed(&format!("#Sitelink_{}", i)).to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if texts.is_empty() {
        return;
    }

    // Named layers: #Sitelink_N or Sitelink_N
    let mut filled = 0;
    for (i, text) in texts.iter().enumerate() {
        let n = i + 1;
        let layer = ctx
            .doc
            .find_text_by_name(block, &format!("#Sitelink_{}", n))
            .or_else(|| ctx.doc.find_text_by_name(block, &format!("Sitelink_{}", n)));
        if let Some(layer) = layer {
            ctx.doc.set_text(layer, text);
            filled += 1;
        }
    }
    if filled > 0 {
        return;
    }

    // Item instances: first text inside each Sitelinks-Item
    let items = ctx.doc.find_all(block, |n| n.name.contains("Sitelinks-Item"));
    for (item, text) in items.iter().zip(&texts) {
        if let Some(layer) = ctx.doc.find_first_text(*item, |_| true) {
            ctx.doc.set_text(layer, text);
            filled += 1;
        }
    }
    if filled > 0 {
        return;
    }

    // Title text layers
    let titles = ctx
        .doc
        .find_all(block, |n| n.kind == NodeKind::Text && n.name.contains("Title"));
    for (layer, text) in titles.iter().zip(&texts) {
        ctx.doc.set_text(*layer, text);
    }
}

fn apply_promo_text(ctx: &mut HookContext<'_>) {
    let promo = ctx.row.trimmed("#Promo");
    if promo.is_empty() {
        return;
    }
    let layer = PROMO_LAYERS
        .iter()
        .find_map(|name| ctx.doc.find_text_by_name(ctx.container, name));
    if let Some(layer) = layer {
        ctx.doc.set_text(layer, promo);
        log::debug!("   [esnippet] promo text set");
    }
}

fn apply_clip_fix(ctx: &mut HookContext<'_>) {
    if let Some(left) = ctx.doc.find_first_by_name(ctx.container, "content__left") {
        if ctx.doc.node(left).kind == NodeKind::Frame {
            ctx.doc.node_mut(left).clips_content = false;
        }
    }
}

fn apply_path_host(ctx: &mut HookContext<'_>) {
    let host = ctx.row.trimmed("#OrganicHost");
    if host.is_empty() {
        return;
    }
    let Some(path) = first_by_names(ctx, PATH_BLOCKS) else {
        return;
    };
    let label = ctx
        .doc
        .find_first_text(path, |n| host_label_regex().is_match(n.characters.trim()));
    if let Some(label) = label {
        ctx.doc.set_text(label, host);
    }
}
