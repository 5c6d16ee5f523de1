// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Polymorphic record codec.
//!
//! `polyrow-core` stores heterogeneous, variant-shaped payloads in a single
//! schemaless column while still enforcing a per-variant schema. The pieces,
//! leaf first:
//!
//! - [`Variant`]: the cast/dump/load contract each payload shape implements.
//! - [`VariantRegistry`]: an immutable discriminator → codec table, frozen at
//!   startup through [`RegistryBuilder`].
//! - [`dispatch`]: resolves the discriminator of raw input (typed or textual)
//!   and delegates to the registered codec.
//! - [`Record`]: the envelope combining [`SharedFields`] (id + amount) with one
//!   resolved payload; validation is all-or-nothing.
//!
//! # Storage Shape
//!
//! The storage form of a payload is a [`Document`]: a string-keyed JSON object
//! carrying the discriminator under [`DISCRIMINATOR_KEY`] next to the
//! variant's own fields. Documents are `BTreeMap`-backed, so dumping the same
//! payload twice yields byte-identical rows.
//!
//! # Failure Semantics
//!
//! Invalid input is an everyday event, never a programming error. Every codec,
//! dispatcher and envelope operation returns a [`ValidationError`] listing all
//! failing fields. Only registry misconfiguration ([`RegistryError`]) is meant
//! to stop a process, and only at startup.
#![forbid(unsafe_code)]

pub mod amount;
pub mod coerce;
pub mod config;
pub mod discriminator;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod id;
pub mod record;
pub mod registry;
pub mod store;
pub mod variant;

#[cfg(test)]
pub(crate) mod fixtures;

pub use amount::{Amount, ParseAmountError};
pub use coerce::FieldReader;
pub use config::{CodecConfig, ConfigError, ConfigService, ConfigStore, UnknownFields};
pub use discriminator::Discriminator;
pub use dispatch::{cast, dump, load, RawPayload};
pub use document::{Document, DISCRIMINATOR_KEY};
pub use error::{FieldError, FieldErrorKind, RegistryError, ValidationError};
pub use id::RecordId;
pub use record::{DecodeError, Draft, Record, SharedFields, PAYLOAD_KEY};
pub use registry::{RegistryBuilder, VariantRegistry};
pub use store::{MemoryStore, RecordStore, StoreError};
pub use variant::{Payload, Variant, VariantCodec};
