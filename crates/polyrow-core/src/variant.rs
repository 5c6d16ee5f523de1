// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Variant codec contract.
//!
//! Two traits split the work the same way a typed codec and its type-erased
//! registry entry usually do:
//!
//! - [`Variant`] is implemented once per payload struct. It is static (no
//!   `self` receiver for cast/load) and knows its discriminator at compile
//!   time through [`Variant::KIND`].
//! - [`VariantCodec`] is the object-safe view the registry stores, produced
//!   automatically for every `Variant`.
//!
//! [`Payload`] is implemented by the closed sum type gathering all variants of
//! one feed; its `kind`/`dump` dispatch by the value's own identity.

use core::fmt;
use core::marker::PhantomData;

use serde_json::Value;

use crate::discriminator::Discriminator;
use crate::document::{Document, DISCRIMINATOR_KEY};
use crate::error::ValidationError;

/// A resolved, always-valid payload of some variant.
///
/// Usually an enum with one arm per [`Variant`]; `kind` and `dump` are an
/// exhaustive match over those arms.
pub trait Payload: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Discriminator enumeration for this payload family.
    type Kind: Discriminator;

    /// Discriminator of this value.
    fn kind(&self) -> Self::Kind;

    /// Storage form, produced by the value's own variant.
    fn dump(&self) -> Document;
}

/// Cast/dump/load contract for one payload shape.
///
/// Contract:
/// - `cast` accepts loosely typed input, reports every failing field, and
///   ignores any caller-supplied discriminator; the stored tag is always
///   [`Self::KIND`].
/// - `write_fields` + [`dump`](Variant::dump) are total and deterministic.
/// - `load(dump(v)) == v` for every value `v`.
/// - None of the operations touch ambient state (time, randomness, I/O).
pub trait Variant: Sized + Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Payload family this variant belongs to.
    type Payload: Payload;

    /// Discriminator this variant is stored under.
    const KIND: <Self::Payload as Payload>::Kind;

    /// Declared field names, excluding the discriminator.
    const FIELDS: &'static [&'static str];

    /// Validates and coerces raw input.
    ///
    /// # Errors
    ///
    /// Returns every missing, mistyped or constraint-violating field.
    fn cast(raw: &Document) -> Result<Self, ValidationError>;

    /// Writes the variant's own fields (not the discriminator) into `out`.
    /// Optional fields that are unset are left out.
    fn write_fields(&self, out: &mut Document);

    /// Wraps the variant in its payload family.
    fn into_payload(self) -> Self::Payload;

    /// Rebuilds the variant from a document produced by [`dump`](Variant::dump).
    ///
    /// # Errors
    ///
    /// Same as [`cast`](Variant::cast); never fails on this variant's own dumps.
    fn load(stored: &Document) -> Result<Self, ValidationError> {
        Self::cast(stored)
    }

    /// Re-casts a hand-assembled value through its storage form.
    ///
    /// Public constructors of a variant end with this, so they accept exactly
    /// the values [`cast`](Variant::cast) accepts and normalise them the same
    /// way.
    ///
    /// # Errors
    ///
    /// Whatever `cast` reports for the dumped value.
    fn checked(self) -> Result<Self, ValidationError> {
        Self::cast(&self.dump())
    }

    /// Storage form: the discriminator plus [`write_fields`](Variant::write_fields).
    fn dump(&self) -> Document {
        let mut out = Document::new();
        out.insert(
            DISCRIMINATOR_KEY.to_owned(),
            Value::String(Self::KIND.as_str().to_owned()),
        );
        self.write_fields(&mut out);
        out
    }
}

/// Object-safe codec entry stored in a [`VariantRegistry`](crate::VariantRegistry).
pub trait VariantCodec<P: Payload>: Send + Sync {
    /// Discriminator handled by this codec.
    fn kind(&self) -> P::Kind;

    /// Rust type name of the variant, for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Declared field names, excluding the discriminator.
    fn fields(&self) -> &'static [&'static str];

    /// Casts raw input into the payload family.
    ///
    /// # Errors
    ///
    /// Forwards the variant's [`ValidationError`].
    fn cast(&self, raw: &Document) -> Result<P, ValidationError>;

    /// Loads a stored document into the payload family.
    ///
    /// # Errors
    ///
    /// Forwards the variant's [`ValidationError`].
    fn load(&self, stored: &Document) -> Result<P, ValidationError>;
}

pub(crate) struct ErasedVariant<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> ErasedVariant<V> {
    pub(crate) const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V: Variant> VariantCodec<V::Payload> for ErasedVariant<V> {
    fn kind(&self) -> <V::Payload as Payload>::Kind {
        V::KIND
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<V>()
    }

    fn fields(&self) -> &'static [&'static str] {
        V::FIELDS
    }

    fn cast(&self, raw: &Document) -> Result<V::Payload, ValidationError> {
        V::cast(raw).map(Variant::into_payload)
    }

    fn load(&self, stored: &Document) -> Result<V::Payload, ValidationError> {
        V::load(stored).map(Variant::into_payload)
    }
}
