// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Activity feed payloads for `polyrow-core`.
//!
//! Every feed row shares an id and an amount; what happened is carried by one
//! of the variants below, stored under `"data"` with its discriminator:
//!
//! | `type`     | Variant             |
//! |------------|---------------------|
//! | `deposit`  | [`Deposit`]         |
//! | `interest` | [`Interest`]        |
//! | `card`     | [`CardTransaction`] |
//!
//! ```text
//! { "id": "…", "amount": "100.00",
//!   "data": { "type": "deposit", "initiated_at": "2021-01-01T00:00:00Z" } }
//! ```
//!
//! Adding a variant means a new struct, a new [`ActivityKind`] enumerant, a new
//! [`ActivityPayload`] arm and one more `register` call in
//! [`registry_builder`]. Existing rows are untouched.
#![forbid(unsafe_code)]

use core::fmt;

use polyrow_core::{
    CodecConfig, Discriminator, Document, Payload, Record, RegistryBuilder, RegistryError,
    Variant, VariantRegistry,
};
use tracing::debug;

mod card;
mod deposit;
mod interest;

pub use card::CardTransaction;
pub use deposit::Deposit;
pub use interest::Interest;

/// Discriminator of an activity payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActivityKind {
    /// Funds arriving in the account.
    Deposit,
    /// Interest accrued on the balance.
    Interest,
    /// A card purchase or refund.
    Card,
}

impl Discriminator for ActivityKind {
    const ALL: &'static [Self] = &[Self::Deposit, Self::Interest, Self::Card];

    fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Interest => "interest",
            Self::Card => "card",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved activity payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActivityPayload {
    /// See [`Deposit`].
    Deposit(Deposit),
    /// See [`Interest`].
    Interest(Interest),
    /// See [`CardTransaction`].
    Card(CardTransaction),
}

impl Payload for ActivityPayload {
    type Kind = ActivityKind;

    fn kind(&self) -> ActivityKind {
        match self {
            Self::Deposit(_) => Deposit::KIND,
            Self::Interest(_) => Interest::KIND,
            Self::Card(_) => CardTransaction::KIND,
        }
    }

    fn dump(&self) -> Document {
        match self {
            Self::Deposit(inner) => inner.dump(),
            Self::Interest(inner) => inner.dump(),
            Self::Card(inner) => inner.dump(),
        }
    }
}

impl From<Deposit> for ActivityPayload {
    fn from(value: Deposit) -> Self {
        Self::Deposit(value)
    }
}

impl From<Interest> for ActivityPayload {
    fn from(value: Interest) -> Self {
        Self::Interest(value)
    }
}

impl From<CardTransaction> for ActivityPayload {
    fn from(value: CardTransaction) -> Self {
        Self::Card(value)
    }
}

/// One row of the activity feed.
pub type Activity = Record<ActivityPayload>;

/// Registry over the activity payload family.
pub type ActivityRegistry = VariantRegistry<ActivityPayload>;

/// Builder with every activity variant registered.
///
/// # Errors
///
/// Only on a duplicate registration, which would be a bug in this crate.
pub fn registry_builder(
    config: CodecConfig,
) -> Result<RegistryBuilder<ActivityPayload>, RegistryError> {
    let mut builder = RegistryBuilder::with_config(config);
    builder.register::<Deposit>()?;
    builder.register::<Interest>()?;
    builder.register::<CardTransaction>()?;
    debug!("activity variants registered");
    Ok(builder)
}

/// Complete activity registry built with `config`.
///
/// # Errors
///
/// [`RegistryError`] if a declared kind lacks a codec.
pub fn registry(config: CodecConfig) -> Result<ActivityRegistry, RegistryError> {
    registry_builder(config)?.build_complete()
}

/// Complete activity registry with the default config.
///
/// # Errors
///
/// Same as [`registry`].
pub fn default_registry() -> Result<ActivityRegistry, RegistryError> {
    registry(CodecConfig::default())
}
