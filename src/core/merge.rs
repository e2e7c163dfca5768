//! Deep structural merge of YAML documents.
//!
//! - Mappings merge key-by-key: base keys keep their order, overlay-only keys
//!   are appended in overlay order, shared keys recurse.
//! - Sequences and scalars in the overlay replace the base value wholesale.
//! - A null overlay (empty document, or a bare `key:` inside a mapping) leaves
//!   the base value alone.
//!
//! Merging is deterministic and idempotent: applying the same overlay twice
//! gives the same document as applying it once.

use serde_yaml_ng::{Mapping, Value};

/// Structural kind of a YAML value, for conflict reporting.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "empty document",
        Value::Bool(_) | Value::Number(_) | Value::String(_) => "scalar",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Top-level kinds of base and overlay disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeConflict {
    pub base: &'static str,
    pub overlay: &'static str,
}

/// Merge `overlay` onto `base`.
///
/// Fails only when both documents are non-empty and their top-level kinds
/// differ (e.g. a sequence onto a mapping). Below the top level a kind change
/// is an ordinary replacement.
pub fn merge(base: Value, overlay: Value) -> Result<Value, TypeConflict> {
    if !base.is_null() && !overlay.is_null() && kind_of(&base) != kind_of(&overlay) {
        return Err(TypeConflict {
            base: kind_of(&base),
            overlay: kind_of(&overlay),
        });
    }
    Ok(merge_values(base, overlay))
}

fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (base, Value::Null) => base,
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            Value::Mapping(merge_mappings(base, overlay))
        }
        (_, overlay) => overlay,
    }
}

fn merge_mappings(mut base: Mapping, overlay: Mapping) -> Mapping {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => {
                let current = std::mem::take(existing);
                *existing = merge_values(current, value);
            }
            None => {
                base.insert(key, value);
            }
        }
    }
    base
}

/// Parse a document; blank input is the empty document.
pub fn parse_document(content: &str) -> Result<Value, serde_yaml_ng::Error> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml_ng::from_str(content)
}

/// Serialize a document; the empty document serializes to an empty string.
pub fn render_document(doc: &Value) -> Result<String, serde_yaml_ng::Error> {
    if doc.is_null() {
        return Ok(String::new());
    }
    serde_yaml_ng::to_string(doc)
}
