// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Card transaction payload.

use chrono::{DateTime, Utc};
use polyrow_core::coerce::{self, FieldReader};
use polyrow_core::{Document, FieldErrorKind, ValidationError, Variant};
use serde_json::Value;

use crate::{ActivityKind, ActivityPayload};

const MERCHANT_NAME: &str = "merchant_name";
const CARD_LAST4: &str = "card_last4";
const AUTHORIZED_AT: &str = "authorized_at";
const MERCHANT_CATEGORY: &str = "merchant_category";
const SETTLED_AT: &str = "settled_at";

/// A card purchase (negative amount) or refund (positive amount).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardTransaction {
    merchant_name: String,
    card_last4: String,
    authorized_at: DateTime<Utc>,
    merchant_category: Option<String>,
    settled_at: Option<DateTime<Utc>>,
}

impl CardTransaction {
    /// Builds a transaction under the same rules as [`Variant::cast`],
    /// trimming text the way `cast` does.
    ///
    /// # Errors
    ///
    /// Every field that `cast` would reject for the same values.
    pub fn new(
        merchant_name: impl Into<String>,
        card_last4: impl Into<String>,
        authorized_at: DateTime<Utc>,
        merchant_category: Option<String>,
        settled_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        Self {
            merchant_name: merchant_name.into(),
            card_last4: card_last4.into(),
            authorized_at,
            merchant_category,
            settled_at,
        }
        .checked()
    }

    /// Merchant as printed on the statement, trimmed.
    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    /// Last four digits of the card number.
    pub fn card_last4(&self) -> &str {
        &self.card_last4
    }

    /// When the authorization was granted.
    pub fn authorized_at(&self) -> DateTime<Utc> {
        self.authorized_at
    }

    /// ISO 18245 merchant category code.
    pub fn merchant_category(&self) -> Option<&str> {
        self.merchant_category.as_deref()
    }

    /// When the transaction settled.
    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }
}

/// Text of exactly four ASCII digits; numbers are refused so leading zeros
/// can never be lost.
fn four_digits(value: &Value) -> Result<String, FieldErrorKind> {
    let text = coerce::text(value)?;
    let text = text.trim();
    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        Ok(text.to_owned())
    } else {
        Err(FieldErrorKind::constraint("must be exactly 4 digits"))
    }
}

fn trimmed_text(value: &Value) -> Result<String, FieldErrorKind> {
    coerce::text(value).map(|text| text.trim().to_owned())
}

fn settlement_error(
    authorized_at: DateTime<Utc>,
    settled_at: Option<DateTime<Utc>>,
) -> Option<FieldErrorKind> {
    settled_at
        .filter(|settled| *settled < authorized_at)
        .map(|_| FieldErrorKind::constraint("must not precede authorized_at"))
}

impl Variant for CardTransaction {
    type Payload = ActivityPayload;
    const KIND: ActivityKind = ActivityKind::Card;
    const FIELDS: &'static [&'static str] = &[
        MERCHANT_NAME,
        CARD_LAST4,
        AUTHORIZED_AT,
        MERCHANT_CATEGORY,
        SETTLED_AT,
    ];

    fn cast(raw: &Document) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(raw);
        let merchant_name = fields.required(MERCHANT_NAME, trimmed_text);
        let card_last4 = fields.required(CARD_LAST4, four_digits);
        let authorized_at = fields.required(AUTHORIZED_AT, coerce::timestamp);
        let merchant_category = fields.optional(MERCHANT_CATEGORY, four_digits);
        let settled_at = fields.optional(SETTLED_AT, coerce::timestamp);
        if let Some(kind) =
            authorized_at.and_then(|authorized| settlement_error(authorized, settled_at))
        {
            fields.reject(SETTLED_AT, kind);
        }
        fields.finish_with(|| {
            Some(Self {
                merchant_name: merchant_name?,
                card_last4: card_last4?,
                authorized_at: authorized_at?,
                merchant_category,
                settled_at,
            })
        })
    }

    fn write_fields(&self, out: &mut Document) {
        out.insert(MERCHANT_NAME.into(), Value::String(self.merchant_name.clone()));
        out.insert(CARD_LAST4.into(), Value::String(self.card_last4.clone()));
        out.insert(AUTHORIZED_AT.into(), coerce::timestamp_value(&self.authorized_at));
        if let Some(mcc) = &self.merchant_category {
            out.insert(MERCHANT_CATEGORY.into(), Value::String(mcc.clone()));
        }
        if let Some(at) = &self.settled_at {
            out.insert(SETTLED_AT.into(), coerce::timestamp_value(at));
        }
    }

    fn into_payload(self) -> ActivityPayload {
        ActivityPayload::Card(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        polyrow_core::document::document_from_value(value).unwrap()
    }

    fn purchase() -> Value {
        json!({
            "merchant_name": "  Corner Cafe ",
            "card_last4": "0042",
            "authorized_at": "2021-06-01T12:30:00Z",
            "merchant_category": "5814"
        })
    }

    #[test]
    fn purchase_casts_and_trims() {
        let card = CardTransaction::cast(&doc(purchase())).unwrap();
        assert_eq!(card.merchant_name(), "Corner Cafe");
        assert_eq!(card.card_last4(), "0042");
        assert_eq!(card.merchant_category(), Some("5814"));
        assert_eq!(card.settled_at(), None);
    }

    #[test]
    fn numeric_last4_is_a_type_error() {
        let mut input = purchase();
        input["card_last4"] = json!(42);
        let err = CardTransaction::cast(&doc(input)).unwrap_err();
        assert_eq!(
            err.find(CARD_LAST4).map(|e| e.kind.code()),
            Some("invalid_field_type")
        );
    }

    #[test]
    fn malformed_digit_fields_are_constraint_errors() {
        let mut input = purchase();
        input["card_last4"] = json!("42");
        input["merchant_category"] = json!("58a4");
        let err = CardTransaction::cast(&doc(input)).unwrap_err();
        assert!(err.has(CARD_LAST4, &FieldErrorKind::constraint("")));
        assert!(err.has(MERCHANT_CATEGORY, &FieldErrorKind::constraint("")));
    }

    #[test]
    fn blank_merchant_is_missing() {
        let mut input = purchase();
        input["merchant_name"] = json!("   ");
        let err = CardTransaction::cast(&doc(input)).unwrap_err();
        assert!(err.has(MERCHANT_NAME, &FieldErrorKind::MissingField));
    }

    #[test]
    fn settlement_cannot_precede_authorization() {
        let mut input = purchase();
        input["settled_at"] = json!("2021-05-31T00:00:00Z");
        let err = CardTransaction::cast(&doc(input)).unwrap_err();
        assert!(err.has(SETTLED_AT, &FieldErrorKind::constraint("")));
    }

    #[test]
    fn hand_built_transaction_is_normalised_like_input() {
        let at = Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 0).unwrap();
        let card = CardTransaction::new("  Cafe ", "0042", at, None, None).unwrap();
        assert_eq!(card.merchant_name(), "Cafe");
        assert_eq!(CardTransaction::load(&card.dump()).unwrap(), card);
        assert_eq!(CardTransaction::cast(&card.dump()).unwrap(), card);
    }

    #[test]
    fn hand_built_transaction_obeys_cast_rules() {
        let at = Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2021, 5, 31, 0, 0, 0).unwrap();
        let err =
            CardTransaction::new(" ", "42", at, Some("58a4".into()), Some(before)).unwrap_err();
        assert!(err.has(MERCHANT_NAME, &FieldErrorKind::MissingField));
        assert!(err.has(CARD_LAST4, &FieldErrorKind::constraint("")));
        assert!(err.has(MERCHANT_CATEGORY, &FieldErrorKind::constraint("")));
        assert!(err.has(SETTLED_AT, &FieldErrorKind::constraint("")));
        assert_eq!(err.len(), 4);
    }
}
