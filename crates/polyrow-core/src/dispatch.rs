// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Polymorphic dispatch.
//!
//! Finds the discriminator of a raw payload, resolves its codec in a
//! [`VariantRegistry`] and delegates. Resolution never falls back to a default
//! variant: an unresolvable tag is always an error.

use tracing::debug;

use crate::discriminator::{read_discriminator, Discriminator};
use crate::document::{undeclared_keys, Document, DISCRIMINATOR_KEY};
use crate::error::{FieldErrorKind, ValidationError};
use crate::registry::VariantRegistry;
use crate::variant::{Payload, VariantCodec};

/// Unvalidated payload input, in any of the shapes callers hold.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload<P: Payload> {
    /// An already-typed payload. Re-cast through its own variant.
    Typed(P),
    /// Trusted input whose discriminator is already an enumerant.
    Tagged {
        /// Discriminator.
        kind: P::Kind,
        /// Variant fields; a `"type"` entry, if any, is ignored.
        fields: Document,
    },
    /// External input carrying the discriminator as text under `"type"`.
    Untagged(Document),
}

impl<P: Payload> RawPayload<P> {
    /// Shorthand for [`RawPayload::Tagged`].
    pub fn tagged(kind: P::Kind, fields: Document) -> Self {
        Self::Tagged { kind, fields }
    }
}

impl<P: Payload> From<Document> for RawPayload<P> {
    fn from(document: Document) -> Self {
        Self::Untagged(document)
    }
}

/// Validates and coerces `input` into a payload.
///
/// Failure cases:
/// - `"type"` missing or blank → `MissingField`
/// - `"type"` not text → `InvalidFieldType`
/// - text outside the enumeration, or an enumerant without a registered
///   codec → `UnknownVariant`
/// - any variant field failure, plus `UnknownField` per undeclared key when
///   the registry's config rejects unknown fields
///
/// # Errors
///
/// Returns every failure found as a [`ValidationError`].
///
/// # Typed Input
///
/// [`RawPayload::Typed`] is dumped and cast again through the codec the
/// registry holds for its kind, never through the value's own type. The
/// registry decides which variants a process accepts: a typed payload whose
/// kind is not registered fails with `UnknownVariant`, exactly as its stored
/// row would fail in [`load`], and the unknown-field policy of the registry
/// still applies.
pub fn cast<P: Payload>(
    input: RawPayload<P>,
    registry: &VariantRegistry<P>,
) -> Result<P, ValidationError> {
    match input {
        RawPayload::Typed(payload) => {
            let fields = payload.dump();
            cast_resolved(payload.kind(), &fields, registry)
        }
        RawPayload::Tagged { kind, fields } => cast_resolved(kind, &fields, registry),
        RawPayload::Untagged(fields) => {
            let kind = read_discriminator::<P::Kind>(&fields).inspect_err(|err| {
                debug!(%err, "discriminator rejected");
            })?;
            cast_resolved(kind, &fields, registry)
        }
    }
}

/// Storage form of `payload`, produced by its own variant.
pub fn dump<P: Payload>(payload: &P) -> Document {
    payload.dump()
}

/// Rebuilds a payload from a stored document.
///
/// Follows the discriminator path of [`cast`]; the unknown-field policy does
/// not apply, so rows written under a looser config still load.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the discriminator does not resolve or the
/// codec rejects the document.
pub fn load<P: Payload>(
    stored: &Document,
    registry: &VariantRegistry<P>,
) -> Result<P, ValidationError> {
    let kind = read_discriminator::<P::Kind>(stored)?;
    resolve(kind, registry)?.load(stored)
}

fn cast_resolved<P: Payload>(
    kind: P::Kind,
    fields: &Document,
    registry: &VariantRegistry<P>,
) -> Result<P, ValidationError> {
    let codec = resolve(kind, registry)?;
    debug!(kind = kind.as_str(), codec = codec.type_name(), "dispatching cast");
    let undeclared = if registry.config().is_strict() {
        let declared = codec.fields();
        undeclared_keys(fields, |key| key == DISCRIMINATOR_KEY || declared.contains(&key))
    } else {
        None
    };
    match (codec.cast(fields), undeclared) {
        (Ok(payload), None) => Ok(payload),
        (Ok(_), Some(err)) | (Err(err), None) => Err(err),
        (Err(cast_err), Some(extra)) => Err(cast_err.merge(extra)),
    }
}

fn resolve<P: Payload>(
    kind: P::Kind,
    registry: &VariantRegistry<P>,
) -> Result<&dyn VariantCodec<P>, ValidationError> {
    registry.resolve(kind).ok_or_else(|| {
        debug!(kind = kind.as_str(), "no codec registered");
        ValidationError::single(
            DISCRIMINATOR_KEY,
            FieldErrorKind::UnknownVariant {
                tag: kind.as_str().to_owned(),
            },
        )
    })
}
