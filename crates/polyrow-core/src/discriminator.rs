// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Discriminator enumerations.

use core::fmt;
use core::hash::Hash;

use serde_json::Value;

use crate::document::{json_type_name, Document, DISCRIMINATOR_KEY};
use crate::error::{FieldErrorKind, ValidationError};

/// A closed enumeration of payload tags with a stable textual form.
///
/// The textual form is what lands in storage under [`DISCRIMINATOR_KEY`]; the
/// enumerant is what code matches on. Keeping both explicit lets an internal
/// type be renamed without touching stored rows.
///
/// Implementations must keep `as_str` injective. `ALL` lists every enumerant
/// once, in declaration order.
pub trait Discriminator:
    Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static
{
    /// Every enumerant, in declaration order.
    const ALL: &'static [Self];

    /// Storage text for this enumerant.
    fn as_str(self) -> &'static str;

    /// Failure-safe conversion from storage text.
    ///
    /// Unrecognised text yields `None`; this never panics.
    fn parse(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == text)
    }
}

/// Reads the discriminator of a string-keyed document.
///
/// - absent, `null` or blank → `MissingField`
/// - not a string → `InvalidFieldType`
/// - text outside `D::ALL` → `UnknownVariant`
///
/// Surrounding whitespace is ignored, as for every other coerced field.
/// Errors are reported at [`DISCRIMINATOR_KEY`].
pub(crate) fn read_discriminator<D: Discriminator>(
    document: &Document,
) -> Result<D, ValidationError> {
    match document.get(DISCRIMINATOR_KEY) {
        None | Some(Value::Null) => Err(ValidationError::missing(DISCRIMINATOR_KEY)),
        Some(Value::String(text)) if text.trim().is_empty() => {
            Err(ValidationError::missing(DISCRIMINATOR_KEY))
        }
        Some(Value::String(text)) => D::parse(text.trim()).ok_or_else(|| {
            ValidationError::single(
                DISCRIMINATOR_KEY,
                FieldErrorKind::UnknownVariant { tag: text.clone() },
            )
        }),
        Some(other) => Err(ValidationError::single(
            DISCRIMINATOR_KEY,
            FieldErrorKind::InvalidFieldType {
                expected: "discriminator string",
                found: json_type_name(other),
            },
        )),
    }
}
