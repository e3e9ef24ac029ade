//! Flat key-value row model for one scraped snippet
//!
//! Keys are `#`-prefixed semantic field names (`#OrganicPrice`, `#ShopName`).
//! Values are always strings; booleans travel as the literals `"true"` and
//! `"false"`. An absent key and a blank value both mean "not observed".

use crate::error::{ReplayError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;

pub type Row = HashMap<String, String>;

/// Read-side helpers shared by transforms, hooks and the resolver
pub trait RowExt {
    /// Raw value of a field, `""` when absent
    fn field(&self, name: &str) -> &str;

    /// True iff the field exists and is non-blank after trimming
    fn has_value(&self, name: &str) -> bool {
        !self.field(name).trim().is_empty()
    }

    /// True iff the field is exactly the literal `"true"`
    fn is_true(&self, name: &str) -> bool {
        self.field(name) == "true"
    }

    /// Trimmed value of a field
    fn trimmed(&self, name: &str) -> &str {
        self.field(name).trim()
    }
}

impl RowExt for Row {
    fn field(&self, name: &str) -> &str {
        self.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Build a row from literal pairs
pub fn row_from<I, K, V>(pairs: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Load an array of rows from a JSON file
pub fn load_rows(path: &str) -> Result<Vec<Row>> {
    let content = fs::read_to_string(path).map_err(|e| ReplayError::file_not_found(path, e))?;
    parse_rows(&content)
}

/// Parse rows from JSON text.
///
/// Strings are kept verbatim, booleans and numbers are stringified and
/// `null` values are treated as absent.
pub fn parse_rows(content: &str) -> Result<Vec<Row>> {
    let value: Value = serde_json::from_str(content)?;
    let items = match value {
        Value::Array(items) => items,
        // Relay payloads wrap the rows: { "rows": [...] }
        Value::Object(mut obj) => match obj.remove("rows") {
            Some(Value::Array(items)) => items,
            _ => return Err(ReplayError::invalid_format("expected an array of rows or {\"rows\": [...]}")),
        },
        _ => return Err(ReplayError::invalid_format("expected an array of rows")),
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(ReplayError::invalid_format(format!("row {} is not an object", index)));
        };

        let mut row = Row::with_capacity(fields.len());
        for (key, value) in fields {
            let text = match value {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Null => continue,
                other => {
                    return Err(ReplayError::invalid_format(format!(
                        "row {} field '{}' has unsupported value {}",
                        index, key, other
                    )))
                }
            };
            row.insert(key, text);
        }
        rows.push(row);
    }

    Ok(rows)
}
