//! JSON Schema dereferencing for structured-output contracts.
//!
//! Schema generators emit documents full of local `$ref` indirection and
//! authoring-tool metadata; not every validator downstream accepts either.
//! [`dereference`] produces a fully self-contained copy: every local
//! reference inlined, non-portable metadata keys stripped at any depth.

use serde_json::{Map, Value};

use crate::errors::SchemaError;

/// Metadata keys removed from every mapping node after resolution.
const METADATA_KEYS: &[&str] = &["$schema"];

/// Resolves every local `$ref` in `schema` and strips non-portable metadata
/// keys, returning a fully self-contained copy.
///
/// The input is never mutated; a document without references still comes
/// back as a fresh clone. Reference chains are followed depth-first; a cycle
/// is a fatal [`SchemaError::CircularReference`], and cleanup never runs on a
/// partially resolved document. The operation is idempotent.
pub fn dereference(schema: &Value) -> Result<Value, SchemaError> {
    let mut resolved = resolve_node(schema, schema, &mut Vec::new())?;
    strip_metadata(&mut resolved);
    Ok(resolved)
}

fn resolve_node(root: &Value, node: &Value, stack: &mut Vec<String>) -> Result<Value, SchemaError> {
    match node {
        Value::Object(map) => {
            // A $ref node is replaced wholesale; sibling keys are dropped,
            // matching standard resolver behaviour.
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                return resolve_reference(root, reference, stack);
            }
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                out.insert(key.clone(), resolve_node(root, value, stack)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_node(root, item, stack))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        scalar => Ok(scalar.clone()),
    }
}

fn resolve_reference(
    root: &Value,
    reference: &str,
    stack: &mut Vec<String>,
) -> Result<Value, SchemaError> {
    let Some(pointer) = reference.strip_prefix('#') else {
        return Err(SchemaError::UnsupportedReference {
            reference: reference.to_string(),
        });
    };
    if stack.iter().any(|seen| seen == pointer) {
        return Err(SchemaError::CircularReference {
            pointer: pointer.to_string(),
        });
    }
    let target = root
        .pointer(pointer)
        .ok_or_else(|| SchemaError::UnresolvedPointer {
            pointer: pointer.to_string(),
        })?;
    stack.push(pointer.to_string());
    let resolved = resolve_node(root, target, stack);
    stack.pop();
    resolved
}

fn strip_metadata(node: &mut Value) {
    match node {
        Value::Object(map) => {
            for key in METADATA_KEYS {
                map.remove(*key);
            }
            for value in map.values_mut() {
                strip_metadata(value);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                strip_metadata(item);
            }
        }
        _ => {}
    }
}
