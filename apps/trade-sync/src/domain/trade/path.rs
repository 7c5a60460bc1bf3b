//! Dotted-path lookup into broker-native JSON records.
//!
//! Paths are plain key traversal (`data.positions.NRML`). There is no
//! array-index or wildcard syntax.

use serde_json::Value;

/// Resolve a dotted `path` against `record`.
///
/// An empty (or whitespace-only) path returns the record itself, which is how
/// brokers whose response body *is* the trades array are described. Any
/// missing key, `null` value, or non-object intermediate resolves to `None`.
#[must_use]
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    if path.is_empty() {
        return Some(record);
    }

    let mut current = record;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            _ => return None,
        };
        if current.is_null() {
            return None;
        }
    }

    Some(current)
}
