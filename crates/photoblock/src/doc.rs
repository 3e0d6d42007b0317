//! Thin field accessors over `serde_json::Value` document nodes.
//!
//! Loaders treat a wrong-typed field the same as an absent one, so a
//! required read fails with `MissingField` and an optional read falls back
//! to its default.

use serde_json::Value;

use crate::error::BlockError;

/// Read a required string field.
pub(crate) fn req_str<'a>(node: &'a Value, field: &'static str) -> Result<&'a str, BlockError> {
    node.get(field)
        .and_then(Value::as_str)
        .ok_or(BlockError::MissingField { field })
}

/// Read a required finite-number field.
pub(crate) fn req_f64(node: &Value, field: &'static str) -> Result<f64, BlockError> {
    node.get(field)
        .and_then(Value::as_f64)
        .ok_or(BlockError::MissingField { field })
}

pub(crate) fn opt_str<'a>(node: &'a Value, field: &str) -> Option<&'a str> {
    node.get(field).and_then(Value::as_str)
}

/// `None` when the field is absent, negative, fractional, or too large.
pub(crate) fn opt_u32(node: &Value, field: &str) -> Option<u32> {
    node.get(field)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
}

pub(crate) fn opt_f64(node: &Value, field: &str) -> Option<f64> {
    node.get(field).and_then(Value::as_f64)
}

pub(crate) fn arr<'a>(node: &'a Value, field: &str) -> Option<&'a [Value]> {
    node.get(field).and_then(Value::as_array).map(Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_string_present_and_absent() {
        let node = json!({"filename": "a.ntf", "entryIndex": 3});

        assert_eq!(req_str(&node, "filename").unwrap(), "a.ntf");
        assert!(matches!(
            req_str(&node, "missing"),
            Err(BlockError::MissingField { field: "missing" })
        ));
        // Wrong type reads as absent.
        assert!(req_str(&node, "entryIndex").is_err());
    }

    #[test]
    fn optional_uint_rejects_non_integers() {
        let node = json!({"a": 3, "b": -1, "c": 1.5, "d": "7"});

        assert_eq!(opt_u32(&node, "a"), Some(3));
        assert_eq!(opt_u32(&node, "b"), None);
        assert_eq!(opt_u32(&node, "c"), None);
        assert_eq!(opt_u32(&node, "d"), None);
        assert_eq!(opt_u32(&node, "e"), None);
    }

    #[test]
    fn array_access() {
        let node = json!({"images": [1, 2, 3], "name": "x"});

        assert_eq!(arr(&node, "images").unwrap().len(), 3);
        assert!(arr(&node, "name").is_none());
        assert!(arr(&node, "missing").is_none());
    }
}
