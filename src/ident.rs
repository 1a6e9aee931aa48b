//! Deterministic ID Factory - content-addressed identifiers
//!
//! Identifiers are derived purely from semantic inputs, so re-running with
//! the same inputs yields the same identifier in any process, forever.
//! Collision resistance is a correctness requirement here: it is what
//! distinguishes otherwise-identical re-registrations with different
//! parameters.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Number of hex characters in a derived identifier (64 bits of digest).
pub const ID_HEX_LEN: usize = 16;

/// Derive a content-addressed identifier from ordered semantic parts.
///
/// Parts are length-prefixed before hashing so that `["ab", "c"]` and
/// `["a", "bc"]` derive different identifiers.
///
/// # Example
///
/// ```rust
/// use glyphtrace::ident::derive_id;
///
/// let a = derive_id(&["quire_continuity", "f1r", "f1v"]);
/// let b = derive_id(&["quire_continuity", "f1r", "f1v"]);
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 16);
/// ```
#[must_use]
pub fn derive_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    let mut id = String::with_capacity(ID_HEX_LEN);
    for byte in &digest[..ID_HEX_LEN / 2] {
        id.push_str(&format!("{byte:02x}"));
    }
    id
}

/// Derive an identifier from a name plus a JSON parameter mapping.
///
/// The mapping is canonicalized (object keys sorted recursively) before
/// hashing, so insertion order never affects the identifier.
#[must_use]
pub fn derive_keyed_id(name: &str, params: &Value) -> String {
    derive_id(&[name, &canonical_json(params)])
}

/// Render a JSON value in canonical form: object keys sorted recursively,
/// no insignificant whitespace.
///
/// Scalars and arrays serialize as `serde_json` renders them; only object
/// key order is normalized.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", parts.join(","))
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let parts: Vec<String> = keys
                .iter()
                .map(|k| format!("{}:{}", Value::String((*k).clone()), canonical_json(&map[*k])))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
        scalar => scalar.to_string(),
    }
}
