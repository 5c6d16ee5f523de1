// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Opaque record identifiers.

use core::fmt;
use core::str::FromStr;

use serde_json::Value;
use uuid::Uuid;

use crate::document::json_type_name;
use crate::error::FieldErrorKind;

/// Opaque identifier of a stored record (a UUID).
///
/// Callers mint ids with [`RecordId::generate`] before building a record; the
/// codec never invents one so that cast stays deterministic.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(Uuid);

impl RecordId {
    /// A fresh random (v4) identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Casts a textual UUID from input or storage.
    pub fn coerce(value: &Value) -> Result<Self, FieldErrorKind> {
        const EXPECTED: &str = "UUID string";
        match value {
            Value::String(text) => text
                .trim()
                .parse()
                .map_err(|_| FieldErrorKind::InvalidFieldType {
                    expected: EXPECTED,
                    found: "string",
                }),
            other => Err(FieldErrorKind::InvalidFieldType {
                expected: EXPECTED,
                found: json_type_name(other),
            }),
        }
    }

    /// Canonical storage form (lowercase hyphenated).
    pub fn to_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(text).map(Self)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uppercase_input_dumps_lowercase() {
        let id = RecordId::coerce(&json!("67E55044-10B1-426F-9247-BB680E5FE0C8")).unwrap();
        assert_eq!(id.to_value(), json!("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert_eq!(RecordId::coerce(&id.to_value()).unwrap(), id);
    }

    #[test]
    fn rejects_non_uuid_input() {
        assert_eq!(
            RecordId::coerce(&json!("abc")).unwrap_err().code(),
            "invalid_field_type"
        );
        assert_eq!(
            RecordId::coerce(&json!(42)).unwrap_err(),
            FieldErrorKind::InvalidFieldType {
                expected: "UUID string",
                found: "number"
            }
        );
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }
}
