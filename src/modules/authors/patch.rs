//! Applying patch documents to candidate book state.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchRejection {
    #[error("patch document is malformed: {0}")]
    Malformed(String),

    #[error("patch operation failed: {0}")]
    OperationFailed(String),

    #[error("patched document is not a valid {target}: {reason}")]
    ShapeMismatch { target: &'static str, reason: String },
}

/// Applies an ordered list of operations to a JSON document.
///
/// Implementations must be atomic: when an operation fails the document is
/// left as it was.
pub trait DocumentPatcher: Send + Sync {
    fn apply(&self, document: &mut Value, operations: &Value) -> Result<(), PatchRejection>;
}

/// RFC 6902 JSON Patch (add, remove, replace, move, copy, test).
///
/// Member names in `path` and `from` match the document's members
/// case-insensitively, so `/Title` addresses `title`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPatcher;

impl DocumentPatcher for JsonPatcher {
    fn apply(&self, document: &mut Value, operations: &Value) -> Result<(), PatchRejection> {
        let operations = align_member_case(document, operations);
        let patch: json_patch::Patch = serde_json::from_value(operations)
            .map_err(|e| PatchRejection::Malformed(e.to_string()))?;

        json_patch::patch(document, &patch.0)
            .map_err(|e| PatchRejection::OperationFailed(e.to_string()))
    }
}

/// Rewrite the first segment of every pointer to the casing `document` uses.
fn align_member_case(document: &Value, operations: &Value) -> Value {
    let mut aligned = operations.clone();
    let Some(members) = document.as_object() else {
        return aligned;
    };

    for op in aligned
        .as_array_mut()
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
    {
        for key in ["path", "from"] {
            let Some(Value::String(pointer)) = op.get_mut(key) else {
                continue;
            };
            let Some(rest) = pointer.strip_prefix('/') else {
                continue;
            };
            let (segment, tail) = match rest.split_once('/') {
                Some((segment, tail)) => (segment, Some(tail)),
                None => (rest, None),
            };
            if members.contains_key(segment) {
                continue;
            }
            if let Some(member) = members.keys().find(|m| m.eq_ignore_ascii_case(segment)) {
                *pointer = match tail {
                    Some(tail) => format!("/{member}/{tail}"),
                    None => format!("/{member}"),
                };
            }
        }
    }
    aligned
}

/// Run `operations` against `candidate` and read the result back as the same type.
pub fn patch_candidate<T>(
    patcher: &dyn DocumentPatcher,
    candidate: &T,
    operations: &Value,
) -> Result<T, PatchRejection>
where
    T: Serialize + DeserializeOwned,
{
    let target = short_type_name::<T>();
    let mut document =
        serde_json::to_value(candidate).map_err(|e| PatchRejection::ShapeMismatch {
            target,
            reason: e.to_string(),
        })?;

    patcher.apply(&mut document, operations)?;

    serde_json::from_value(document).map_err(|e| PatchRejection::ShapeMismatch {
        target,
        reason: e.to_string(),
    })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
