// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deposit payload.

use chrono::{DateTime, Utc};
use polyrow_core::coerce::{self, FieldReader};
use polyrow_core::{Document, FieldErrorKind, ValidationError, Variant};

use crate::{ActivityKind, ActivityPayload};

const INITIATED_AT: &str = "initiated_at";
const COMPLETED_AT: &str = "completed_at";

/// Funds arriving in the account.
///
/// A deposit is pending until `completed_at` is set; completion can never
/// precede initiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deposit {
    initiated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Deposit {
    /// Builds a deposit under the same rules as [`Variant::cast`].
    ///
    /// # Errors
    ///
    /// Every field that `cast` would reject for the same values.
    pub fn new(
        initiated_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        Self {
            initiated_at,
            completed_at,
        }
        .checked()
    }

    /// A pending deposit.
    ///
    /// # Errors
    ///
    /// Only when `initiated_at` has no storable form.
    pub fn pending(initiated_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        Self::new(initiated_at, None)
    }

    /// When the transfer was started.
    pub fn initiated_at(&self) -> DateTime<Utc> {
        self.initiated_at
    }

    /// When the funds settled, if they have.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Whether the funds have settled.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

fn completion_error(
    initiated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
) -> Option<FieldErrorKind> {
    completed_at
        .filter(|end| *end < initiated_at)
        .map(|_| FieldErrorKind::constraint("must not precede initiated_at"))
}

impl Variant for Deposit {
    type Payload = ActivityPayload;
    const KIND: ActivityKind = ActivityKind::Deposit;
    const FIELDS: &'static [&'static str] = &[INITIATED_AT, COMPLETED_AT];

    fn cast(raw: &Document) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(raw);
        let initiated_at = fields.required(INITIATED_AT, coerce::timestamp);
        let completed_at = fields.optional(COMPLETED_AT, coerce::timestamp);
        if let Some(kind) = initiated_at.and_then(|start| completion_error(start, completed_at)) {
            fields.reject(COMPLETED_AT, kind);
        }
        fields.finish_with(|| {
            Some(Self {
                initiated_at: initiated_at?,
                completed_at,
            })
        })
    }

    fn write_fields(&self, out: &mut Document) {
        out.insert(INITIATED_AT.into(), coerce::timestamp_value(&self.initiated_at));
        if let Some(at) = &self.completed_at {
            out.insert(COMPLETED_AT.into(), coerce::timestamp_value(at));
        }
    }

    fn into_payload(self) -> ActivityPayload {
        ActivityPayload::Deposit(self)
    }
}
