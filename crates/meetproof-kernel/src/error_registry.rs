//! Canonical error kind -> numeric code registry.
//!
//! Clients decode `(err uN)` results against this table, so it is exposed
//! as a deterministic JSON surface.

use crate::error::ErrorKind;
use serde::Serialize;
use serde_json::{Value, json};

pub const ERROR_CODE_REGISTRY_KIND: &str = "meetproof.error_code_registry.v1";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCodeMapping {
    pub kind: &'static str,
    pub code: u32,
}

pub fn error_code_registry() -> Vec<ErrorCodeMapping> {
    ErrorKind::ALL
        .iter()
        .map(|kind| ErrorCodeMapping {
            kind: kind.as_str(),
            code: kind.code(),
        })
        .collect()
}

pub fn error_code_registry_json() -> Value {
    json!({
        "schema": 1,
        "registryKind": ERROR_CODE_REGISTRY_KIND,
        "mappings": error_code_registry(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_sorted_by_code() {
        let registry = error_code_registry();
        assert!(registry.windows(2).all(|pair| pair[0].code < pair[1].code));
    }

    #[test]
    fn registry_json_surface_is_deterministic() {
        let first = error_code_registry_json();
        let second = error_code_registry_json();
        assert_eq!(first, second);
        assert_eq!(
            first.get("registryKind").and_then(Value::as_str),
            Some(ERROR_CODE_REGISTRY_KIND)
        );
    }
}
