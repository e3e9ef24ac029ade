//! Fill `#Field` text layers straight from the row

use super::HookContext;
use crate::row::RowExt;

/// Every cached text layer named after a row field gets that field's value
pub fn apply_text_fields(ctx: &mut HookContext<'_>) {
    let mut filled = 0;
    for &id in ctx.cache.texts() {
        let name = &ctx.doc.node(id).name;
        if !name.starts_with('#') {
            continue;
        }
        let value = ctx.row.trimmed(name);
        if value.is_empty() {
            continue;
        }
        let value = value.to_string();
        if ctx.doc.set_text(id, &value) {
            filled += 1;
        }
    }
    if filled > 0 {
        log::debug!("   [text-fields] {} text layers filled", filled);
    }
}
