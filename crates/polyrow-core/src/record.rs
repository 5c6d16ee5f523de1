// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Record envelope: shared fields plus one resolved payload.
//!
//! A record moves through three states. A [`Draft`] holds unvalidated input;
//! [`Draft::validate`] either yields a [`Record`] or a [`ValidationError`]
//! listing every failing field of the envelope *and* the payload. There is no
//! partially valid record.
//!
//! Row shape:
//!
//! ```text
//! { "id": "<uuid>", "amount": "100.00", "data": { "type": "...", ... } }
//! ```

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::amount::Amount;
use crate::coerce::FieldReader;
use crate::dispatch::{self, RawPayload};
use crate::document::{json_type_name, undeclared_keys, Document};
use crate::error::{FieldErrorKind, ValidationError};
use crate::id::RecordId;
use crate::registry::VariantRegistry;
use crate::variant::Payload;

/// Row key holding the payload document.
pub const PAYLOAD_KEY: &str = "data";
const ID_KEY: &str = "id";
const AMOUNT_KEY: &str = "amount";

/// Fields common to every record regardless of variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedFields {
    /// Record identifier.
    pub id: RecordId,
    /// Signed monetary amount.
    pub amount: Amount,
}

impl SharedFields {
    /// Declared top-level keys, excluding [`PAYLOAD_KEY`].
    pub const FIELDS: &'static [&'static str] = &[ID_KEY, AMOUNT_KEY];

    fn cast(raw: &Document) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(raw);
        let id = fields.required(ID_KEY, RecordId::coerce);
        let amount = fields.required(AMOUNT_KEY, Amount::coerce);
        fields.finish_with(|| {
            Some(Self {
                id: id?,
                amount: amount?,
            })
        })
    }

    fn write(&self, out: &mut Document) {
        out.insert(ID_KEY.to_owned(), self.id.to_value());
        out.insert(AMOUNT_KEY.to_owned(), self.amount.to_value());
    }
}

/// Failure to turn row bytes back into a [`Record`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a JSON object.
    #[error("[ROW_CORRUPT] {0}")]
    Corrupt(#[from] serde_json::Error),
    /// The row parsed but did not load.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A validated record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<P: Payload> {
    shared: SharedFields,
    payload: P,
}

impl<P: Payload> Record<P> {
    pub(crate) fn new(shared: SharedFields, payload: P) -> Self {
        Self { shared, payload }
    }

    /// Assembles a record from typed parts, re-casting the payload through
    /// `registry` so that a hand-built payload gets the same checks as input.
    ///
    /// # Errors
    ///
    /// Payload failures prefixed with [`PAYLOAD_KEY`]; see [`Draft::validate`].
    pub fn from_parts(
        shared: SharedFields,
        payload: P,
        registry: &VariantRegistry<P>,
    ) -> Result<Self, ValidationError> {
        Draft::new(shared, RawPayload::Typed(payload)).validate(registry)
    }

    /// Validates a request-shaped document in one step.
    ///
    /// # Errors
    ///
    /// See [`Draft::validate`].
    pub fn cast(input: Document, registry: &VariantRegistry<P>) -> Result<Self, ValidationError> {
        Draft::from_document(input).validate(registry)
    }

    /// Row form of the record. Total and deterministic.
    pub fn dump(&self) -> Document {
        let mut row = Document::new();
        self.shared.write(&mut row);
        row.insert(
            PAYLOAD_KEY.to_owned(),
            Value::Object(dispatch::dump(&self.payload)),
        );
        row
    }

    /// Rebuilds a record from a row produced by [`dump`](Self::dump).
    ///
    /// # Errors
    ///
    /// Every shared-field and payload failure; payload paths are prefixed with
    /// [`PAYLOAD_KEY`].
    #[instrument(skip_all, level = "debug")]
    pub fn load(row: &Document, registry: &VariantRegistry<P>) -> Result<Self, ValidationError> {
        let shared = SharedFields::cast(row);
        let payload = match row.get(PAYLOAD_KEY) {
            Some(Value::Object(stored)) => {
                dispatch::load(stored, registry).map_err(|err| err.nest(PAYLOAD_KEY))
            }
            other => Err(payload_shape_error(other)),
        };
        let (shared, payload) = both(shared, payload)?;
        Ok(Self::new(shared, payload))
    }

    /// Row bytes for a backing store.
    ///
    /// # Errors
    ///
    /// Serialization failure from `serde_json`.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.dump())
    }

    /// Inverse of [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// [`DecodeError::Corrupt`] when the bytes are not a JSON object,
    /// [`DecodeError::Invalid`] when the row does not load.
    pub fn decode(bytes: &[u8], registry: &VariantRegistry<P>) -> Result<Self, DecodeError> {
        let row: Document = serde_json::from_slice(bytes)?;
        Ok(Self::load(&row, registry)?)
    }

    /// Record identifier.
    pub fn id(&self) -> RecordId {
        self.shared.id
    }

    /// Monetary amount.
    pub fn amount(&self) -> Amount {
        self.shared.amount
    }

    /// Shared fields.
    pub fn shared(&self) -> &SharedFields {
        &self.shared
    }

    /// Resolved payload.
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Discriminator of the payload.
    pub fn kind(&self) -> P::Kind {
        self.payload.kind()
    }

    /// Splits the record into its parts.
    pub fn into_parts(self) -> (SharedFields, P) {
        (self.shared, self.payload)
    }
}

/// Unvalidated record input.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft<P: Payload> {
    shared: Document,
    payload: Result<RawPayload<P>, ValidationError>,
}

impl<P: Payload> Draft<P> {
    /// Captures a request-shaped document; the payload sits under
    /// [`PAYLOAD_KEY`] with its discriminator as text.
    pub fn from_document(mut input: Document) -> Self {
        let payload = match input.remove(PAYLOAD_KEY) {
            Some(Value::Object(fields)) => Ok(RawPayload::Untagged(fields)),
            other => Err(payload_shape_error(other.as_ref())),
        };
        Self {
            shared: input,
            payload,
        }
    }

    /// Draft with typed shared fields and any payload shape.
    pub fn new(shared: SharedFields, payload: RawPayload<P>) -> Self {
        let mut fields = Document::new();
        shared.write(&mut fields);
        Self {
            shared: fields,
            payload: Ok(payload),
        }
    }

    /// Validates shared fields and payload together.
    ///
    /// # Errors
    ///
    /// The union of shared-field errors, payload errors (prefixed with
    /// [`PAYLOAD_KEY`]) and, under a strict config, undeclared top-level keys.
    #[instrument(skip_all, level = "debug")]
    pub fn validate(self, registry: &VariantRegistry<P>) -> Result<Record<P>, ValidationError> {
        let undeclared = if registry.config().is_strict() {
            undeclared_keys(&self.shared, |key| SharedFields::FIELDS.contains(&key))
        } else {
            None
        };
        let shared = match (SharedFields::cast(&self.shared), undeclared) {
            (Ok(shared), None) => Ok(shared),
            (Ok(_), Some(err)) | (Err(err), None) => Err(err),
            (Err(cast_err), Some(extra)) => Err(cast_err.merge(extra)),
        };
        let payload = self
            .payload
            .and_then(|raw| dispatch::cast(raw, registry).map_err(|err| err.nest(PAYLOAD_KEY)));

        let (shared, payload) = both(shared, payload).inspect_err(|err| {
            debug!(failures = err.len(), "record rejected");
        })?;
        debug!(id = %shared.id, "record accepted");
        Ok(Record::new(shared, payload))
    }
}

fn both<A, B>(
    left: Result<A, ValidationError>,
    right: Result<B, ValidationError>,
) -> Result<(A, B), ValidationError> {
    match (left, right) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(err), Ok(_)) | (Ok(_), Err(err)) => Err(err),
        (Err(a), Err(b)) => Err(a.merge(b)),
    }
}

fn payload_shape_error(value: Option<&Value>) -> ValidationError {
    match value {
        None | Some(Value::Null) => ValidationError::missing(PAYLOAD_KEY),
        Some(other) => ValidationError::single(
            PAYLOAD_KEY,
            FieldErrorKind::InvalidFieldType {
                expected: "object",
                found: json_type_name(other),
            },
        ),
    }
}
