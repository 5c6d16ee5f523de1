// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Storage representation shared by every variant.

use serde_json::Value;

use crate::error::{FieldError, FieldErrorKind, ValidationError};

/// Semi-structured storage form of a payload or row.
///
/// `serde_json::Map` is `BTreeMap`-backed (the `preserve_order` feature is
/// never enabled in this workspace), so iteration and serialization order are
/// stable across processes.
pub type Document = serde_json::Map<String, Value>;

/// Well-known key holding the discriminator in every payload document.
pub const DISCRIMINATOR_KEY: &str = "type";

/// Converts an arbitrary JSON value into a [`Document`].
///
/// Request bodies usually arrive as `serde_json::Value`; anything other than
/// an object is rejected with `InvalidFieldType` at the root path.
///
/// # Errors
///
/// Returns a [`ValidationError`] when `value` is not a JSON object.
pub fn document_from_value(value: Value) -> Result<Document, ValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ValidationError::single(
            "",
            FieldErrorKind::InvalidFieldType {
                expected: "object",
                found: json_type_name(&other),
            },
        )),
    }
}

/// Collects an `UnknownField` error for every key `is_declared` refuses.
pub(crate) fn undeclared_keys(
    document: &Document,
    is_declared: impl Fn(&str) -> bool,
) -> Option<ValidationError> {
    let errors = document
        .keys()
        .filter(|key| !is_declared(key.as_str()))
        .map(|key| FieldError::new(key.as_str(), FieldErrorKind::UnknownField))
        .collect();
    ValidationError::from_errors(errors)
}

/// Short name of a JSON value's type, used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
