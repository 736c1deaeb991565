//! Response normalizer: raw body text → [`ResultEnvelope`].
//!
//! Upstream endpoints disagree on two things: whether the payload is wrapped in
//! `{success, data, message}` or returned bare, and how field names are cased
//! (`ProductCode`, `productCode`, `product_code`, `PRODUCTCODE`). The
//! normalizer resolves both:
//!
//! 1. blank body → failure, "empty response";
//! 2. every object key in the parsed tree is folded to its compact form
//!    (lowercase, separators removed), which is the name every model field
//!    deserializes from;
//! 3. a root object with `success: false` is a failure carrying the upstream
//!    messages, whatever its `data` holds;
//! 4. a root object with `success: true` whose `data` fits the target type is
//!    taken as the wrapped envelope, as-is;
//! 5. otherwise the whole tree is deserialized as the bare target type and
//!    wrapped as a success with no messages;
//! 6. otherwise failure, "failed to parse response".
//!
//! [`normalize_list`] adds a best-effort recovery for list operations: it looks
//! for any nested `data` property whose content is a non-empty list of the
//! target type.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Map, Value};
use tracing::debug;

use crate::envelope::WireEnvelope;
use crate::{ClientError, ResultEnvelope};

/// Normalizes `raw` into an envelope of `T`.
pub fn normalize<T: DeserializeOwned>(raw: &str) -> ResultEnvelope<T> {
    match parse_tree(raw) {
        Ok(tree) => normalize_tree(tree).unwrap_or_else(ResultEnvelope::from_error),
        Err(error) => ResultEnvelope::from_error(error),
    }
}

/// Normalizes `raw` into an envelope of `Vec<T>`, falling back to the nested
/// `data` search when the regular cascade fails.
pub fn normalize_list<T: DeserializeOwned>(raw: &str) -> ResultEnvelope<Vec<T>> {
    let tree = match parse_tree(raw) {
        Ok(tree) => tree,
        Err(error) => return ResultEnvelope::from_error(error),
    };

    match normalize_tree::<Vec<T>>(tree.clone()) {
        Ok(envelope) => envelope,
        Err(error) => match recover_nested_list(&tree) {
            Some(items) => {
                debug!(count = items.len(), "recovered list from nested data property");
                ResultEnvelope::success(items)
            }
            None => ResultEnvelope::from_error(error),
        },
    }
}

fn parse_tree(raw: &str) -> Result<Value, ClientError> {
    if raw.trim().is_empty() {
        return Err(ClientError::EmptyResponse);
    }
    let value: Value = serde_json::from_str(raw).map_err(|err| {
        debug!(error = %err, "response body is not JSON");
        ClientError::ParseFailure
    })?;
    Ok(fold_keys(value))
}

fn normalize_tree<T: DeserializeOwned>(tree: Value) -> Result<ResultEnvelope<T>, ClientError> {
    match tree.get("success") {
        Some(Value::Bool(false)) => return Ok(wrapped_failure(tree)),
        Some(Value::Bool(true)) => {
            match serde_json::from_value::<WireEnvelope<T>>(tree.clone()) {
                Ok(wire) => return Ok(wire.into_envelope()),
                Err(err) => debug!(error = %err, "wrapped envelope did not match target type"),
            }
        }
        _ => {}
    }

    serde_json::from_value::<T>(tree)
        .map(ResultEnvelope::success)
        .map_err(|err| {
            debug!(error = %err, "bare value did not match target type");
            ClientError::ParseFailure
        })
}

/// A `success: false` envelope never yields data, so its `data` is skipped
/// unread and only the messages are kept.
fn wrapped_failure<T>(tree: Value) -> ResultEnvelope<T> {
    match serde_json::from_value::<WireEnvelope<IgnoredAny>>(tree) {
        Ok(wire) => wire.into_failure(),
        Err(err) => {
            debug!(error = %err, "failure envelope carries unreadable messages");
            ResultEnvelope::failure(Vec::new())
        }
    }
}

/// Depth-first search for the first `data` property that deserializes into a
/// non-empty `Vec<T>`.
fn recover_nested_list<T: DeserializeOwned>(tree: &Value) -> Option<Vec<T>> {
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        match node {
            Value::Object(map) => {
                if let Some(candidate) = map.get("data") {
                    if let Ok(items) = serde_json::from_value::<Vec<T>>(candidate.clone()) {
                        if !items.is_empty() {
                            return Some(items);
                        }
                    }
                }
                // Reverse keeps the traversal in document order.
                stack.extend(map.values().rev());
            }
            Value::Array(items) => stack.extend(items.iter().rev()),
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Key folding
// ---------------------------------------------------------------------------

/// Recursively rewrites every object key with [`fold_key`].
///
/// When two keys of one object fold to the same name, the later one wins.
pub fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut folded = Map::with_capacity(map.len());
            for (key, inner) in map {
                folded.insert(fold_key(&key), fold_keys(inner));
            }
            Value::Object(folded)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}

/// Lowercases `key` and drops `_`, `-` and whitespace, so every casing of one
/// identifier folds to the same string (`ProductCode`, `PRODUCT_CODE` and
/// `productcode` all become `productcode`).
pub fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|ch| !(*ch == '_' || *ch == '-' || ch.is_whitespace()))
        .flat_map(char::to_lowercase)
        .collect()
}
