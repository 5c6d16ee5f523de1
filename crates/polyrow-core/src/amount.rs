// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Monetary amounts.
//!
//! An [`Amount`] is a signed [`Decimal`] with at most [`Amount::SCALE`]
//! fractional digits. Storage text is always the canonical `"-12.30"` form so
//! that dumping is lossless and deterministic; binary floating point never
//! touches a stored amount.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use crate::document::json_type_name;
use crate::error::FieldErrorKind;

/// Signed decimal amount with at most two fractional digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

/// Reasons a decimal string is not a valid [`Amount`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseAmountError {
    /// Not a decimal number, or out of the representable range.
    #[error("invalid decimal amount: {0}")]
    Invalid(#[from] rust_decimal::Error),
    /// More fractional digits than [`Amount::SCALE`].
    #[error("amount has more than {} fractional digits", Amount::SCALE)]
    TooPrecise,
}

impl Amount {
    /// Number of fractional digits.
    pub const SCALE: u32 = 2;

    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Builds an amount from minor units (`12345` → `123.45`).
    pub fn from_minor(minor: i64) -> Self {
        Self::from_decimal(Decimal::new(minor, Self::SCALE))
    }

    /// Builds an amount from whole units.
    pub fn from_major(major: i64) -> Self {
        Self::from_decimal(Decimal::from(major))
    }

    /// Wraps `value`, failing when it carries more than [`Self::SCALE`]
    /// fractional digits that are not zeros.
    ///
    /// # Errors
    ///
    /// [`ParseAmountError::TooPrecise`].
    pub fn try_from_decimal(value: Decimal) -> Result<Self, ParseAmountError> {
        let value = value.normalize();
        if value.scale() > Self::SCALE {
            return Err(ParseAmountError::TooPrecise);
        }
        Ok(Self::from_decimal(value))
    }

    fn from_decimal(value: Decimal) -> Self {
        // `-0` and `0` share one storage form.
        if value.is_zero() {
            Self::ZERO
        } else {
            Self(value)
        }
    }

    /// The underlying decimal.
    pub const fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Casts user or stored input.
    ///
    /// Accepts JSON integers, JSON decimals and decimal strings. JSON decimals
    /// go through their shortest textual form, so `100.1` is accepted while a
    /// float artefact such as `0.30000000000000004` is rejected as too precise.
    pub fn coerce(value: &Value) -> Result<Self, FieldErrorKind> {
        const EXPECTED: &str = "decimal amount with at most 2 fractional digits";
        let mismatch = || FieldErrorKind::InvalidFieldType {
            expected: EXPECTED,
            found: json_type_name(value),
        };
        match value {
            Value::Number(number) => match number.as_i64() {
                Some(major) => Ok(Self::from_major(major)),
                None => number.to_string().parse().map_err(|_| mismatch()),
            },
            Value::String(text) => text.parse().map_err(|_| mismatch()),
            _ => Err(mismatch()),
        }
    }

    /// Canonical storage form (a decimal string).
    pub fn to_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str_exact(text.trim())?;
        if value.scale() > Self::SCALE {
            return Err(ParseAmountError::TooPrecise);
        }
        Ok(Self::from_decimal(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fixed = self.0;
        fixed.rescale(Self::SCALE);
        fmt::Display::fmt(&fixed, f)
    }
}
