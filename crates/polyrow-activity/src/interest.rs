// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Interest accrual payload.

use chrono::NaiveDate;
use polyrow_core::coerce::{self, FieldReader};
use polyrow_core::{Document, FieldErrorKind, ValidationError, Variant};
use serde_json::Value;

use crate::{ActivityKind, ActivityPayload};

const ACCRUED_ON: &str = "accrued_on";
const RATE_BPS: &str = "rate_bps";

/// Interest accrued on the balance for one day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interest {
    accrued_on: NaiveDate,
    rate_bps: Option<u32>,
}

impl Interest {
    /// Highest accepted rate (1000%).
    pub const MAX_RATE_BPS: u32 = 100_000;

    /// Builds an accrual under the same rules as [`Variant::cast`].
    ///
    /// # Errors
    ///
    /// Every field that `cast` would reject for the same values.
    pub fn new(accrued_on: NaiveDate, rate_bps: Option<u32>) -> Result<Self, ValidationError> {
        Self {
            accrued_on,
            rate_bps,
        }
        .checked()
    }

    /// Calendar day the interest accrued on.
    pub fn accrued_on(&self) -> NaiveDate {
        self.accrued_on
    }

    /// Annual rate in basis points, when the source reports it.
    pub fn rate_bps(&self) -> Option<u32> {
        self.rate_bps
    }
}

fn rate_error(rate_bps: Option<u32>) -> Option<FieldErrorKind> {
    rate_bps
        .filter(|rate| *rate > Interest::MAX_RATE_BPS)
        .map(|_| {
            FieldErrorKind::constraint(format!(
                "must be at most {} basis points",
                Interest::MAX_RATE_BPS
            ))
        })
}

impl Variant for Interest {
    type Payload = ActivityPayload;
    const KIND: ActivityKind = ActivityKind::Interest;
    const FIELDS: &'static [&'static str] = &[ACCRUED_ON, RATE_BPS];

    fn cast(raw: &Document) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(raw);
        let accrued_on = fields.required(ACCRUED_ON, coerce::date);
        let rate_bps = fields.optional(RATE_BPS, coerce::uint32);
        if let Some(kind) = rate_error(rate_bps) {
            fields.reject(RATE_BPS, kind);
        }
        fields.finish_with(|| {
            Some(Self {
                accrued_on: accrued_on?,
                rate_bps,
            })
        })
    }

    fn write_fields(&self, out: &mut Document) {
        out.insert(ACCRUED_ON.into(), coerce::date_value(&self.accrued_on));
        if let Some(rate) = self.rate_bps {
            out.insert(RATE_BPS.into(), Value::from(rate));
        }
    }

    fn into_payload(self) -> ActivityPayload {
        ActivityPayload::Interest(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        polyrow_core::document::document_from_value(value).unwrap()
    }

    #[test]
    fn rate_is_optional_and_coerced() {
        let plain = Interest::cast(&doc(json!({"accrued_on": "2021-03-31"}))).unwrap();
        assert_eq!(plain.rate_bps(), None);

        let rated =
            Interest::cast(&doc(json!({"accrued_on": "2021-03-31", "rate_bps": "425"}))).unwrap();
        assert_eq!(rated.rate_bps(), Some(425));
        assert_eq!(rated.dump().get(RATE_BPS), Some(&json!(425)));
    }

    #[test]
    fn absurd_rates_are_rejected() {
        let err = Interest::cast(&doc(json!({"accrued_on": "2021-03-31", "rate_bps": 100_001})))
            .unwrap_err();
        assert!(err.has(RATE_BPS, &FieldErrorKind::constraint("")));
        assert!(Interest::cast(&doc(json!({
            "accrued_on": "2021-03-31",
            "rate_bps": Interest::MAX_RATE_BPS
        })))
        .is_ok());
    }

    #[test]
    fn timestamps_are_not_dates() {
        let err = Interest::cast(&doc(json!({"accrued_on": "2021-03-31T00:00:00Z"})))
            .unwrap_err();
        assert_eq!(
            err.find(ACCRUED_ON).map(|e| e.kind.code()),
            Some("invalid_field_type")
        );
    }

    #[test]
    fn hand_built_interest_obeys_cast_rules() {
        let day = NaiveDate::from_ymd_opt(2021, 3, 31).unwrap();
        let err = Interest::new(day, Some(500_000)).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.has(RATE_BPS, &FieldErrorKind::constraint("")));

        let interest = Interest::new(day, Some(Interest::MAX_RATE_BPS)).unwrap();
        assert_eq!(Interest::load(&interest.dump()).unwrap(), interest);
        assert_eq!(interest.accrued_on(), day);
    }
}
