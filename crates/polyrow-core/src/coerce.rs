// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Field-level casting.
//!
//! [`FieldReader`] walks one [`Document`], applies a coercion per declared
//! field and collects every failure instead of stopping at the first one. The
//! free functions are the coercions shared by variants; each has a matching
//! `*_value` helper producing the canonical storage form, so that
//! `coerce(value(x)) == x` holds for every `x` the coercion can return.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;

use crate::document::{json_type_name, Document};
use crate::error::{FieldError, FieldErrorKind, ValidationError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Collects per-field coercion results for one document.
///
/// A value counts as absent when the key is missing, `null`, or a string that
/// is blank after trimming.
#[derive(Debug)]
pub struct FieldReader<'a> {
    document: &'a Document,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    /// Starts reading `document`.
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            errors: Vec::new(),
        }
    }

    /// Reads a required field. Records `MissingField` when absent.
    pub fn required<T, F>(&mut self, key: &str, coerce: F) -> Option<T>
    where
        F: FnOnce(&Value) -> Result<T, FieldErrorKind>,
    {
        match present(self.document.get(key)) {
            Some(value) => self.apply(key, value, coerce),
            None => {
                self.errors
                    .push(FieldError::new(key, FieldErrorKind::MissingField));
                None
            }
        }
    }

    /// Reads an optional field. Absence is not an error.
    pub fn optional<T, F>(&mut self, key: &str, coerce: F) -> Option<T>
    where
        F: FnOnce(&Value) -> Result<T, FieldErrorKind>,
    {
        let value = present(self.document.get(key))?;
        self.apply(key, value, coerce)
    }

    /// Records a failure discovered outside of coercion (cross-field rules).
    pub fn reject(&mut self, key: &str, kind: FieldErrorKind) {
        self.errors.push(FieldError::new(key, kind));
    }

    /// Whether no failure has been recorded so far.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ends the pass, failing with every recorded error.
    ///
    /// # Errors
    ///
    /// Returns the aggregated [`ValidationError`] if any field failed.
    pub fn finish(self) -> Result<(), ValidationError> {
        match ValidationError::from_errors(self.errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Ends the pass and assembles the value from the fields read so far.
    ///
    /// `build` runs only when every field succeeded; it returns `None` only if
    /// a required field was never read, which is reported at the root path.
    ///
    /// # Errors
    ///
    /// Returns the aggregated [`ValidationError`] if any field failed.
    pub fn finish_with<T, F>(self, build: F) -> Result<T, ValidationError>
    where
        F: FnOnce() -> Option<T>,
    {
        self.finish()?;
        build().ok_or_else(|| {
            ValidationError::single("", FieldErrorKind::constraint("incomplete record"))
        })
    }

    fn apply<T, F>(&mut self, key: &str, value: &Value, coerce: F) -> Option<T>
    where
        F: FnOnce(&Value) -> Result<T, FieldErrorKind>,
    {
        match coerce(value) {
            Ok(out) => Some(out),
            Err(kind) => {
                self.errors.push(FieldError::new(key, kind));
                None
            }
        }
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(other) => Some(other),
    }
}

fn mismatch(expected: &'static str, value: &Value) -> FieldErrorKind {
    FieldErrorKind::InvalidFieldType {
        expected,
        found: json_type_name(value),
    }
}

/// Plain string. Numbers and booleans are not stringified.
pub fn text(value: &Value) -> Result<String, FieldErrorKind> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(mismatch("string", other)),
    }
}

/// RFC 3339 timestamp, normalised to UTC.
pub fn timestamp(value: &Value) -> Result<DateTime<Utc>, FieldErrorKind> {
    const EXPECTED: &str = "RFC 3339 timestamp";
    let at = match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| mismatch(EXPECTED, value))?,
        other => return Err(mismatch(EXPECTED, other)),
    };
    check_timestamp(&at)?;
    Ok(at)
}

/// Rejects timestamps whose UTC year has no four-digit storage form.
fn check_timestamp(at: &DateTime<Utc>) -> Result<(), FieldErrorKind> {
    four_digit_year(at.year())
}

fn check_date(day: &NaiveDate) -> Result<(), FieldErrorKind> {
    four_digit_year(day.year())
}

fn four_digit_year(year: i32) -> Result<(), FieldErrorKind> {
    if (0..=9999).contains(&year) {
        Ok(())
    } else {
        Err(FieldErrorKind::constraint("year must be between 0000 and 9999"))
    }
}

/// Canonical storage text for a timestamp (`Z` suffix, minimal sub-second
/// digits).
pub fn timestamp_value(at: &DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Calendar date in `YYYY-MM-DD` form.
pub fn date(value: &Value) -> Result<NaiveDate, FieldErrorKind> {
    const EXPECTED: &str = "date (YYYY-MM-DD)";
    match value {
        Value::String(text) => {
            let day = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
                .map_err(|_| mismatch(EXPECTED, value))?;
            check_date(&day)?;
            Ok(day)
        }
        other => Err(mismatch(EXPECTED, other)),
    }
}

/// Canonical storage text for a date.
pub fn date_value(day: &NaiveDate) -> Value {
    Value::String(day.format(DATE_FORMAT).to_string())
}

/// Non-negative integer that fits in `u32`. Digit strings are accepted.
pub fn uint32(value: &Value) -> Result<u32, FieldErrorKind> {
    const EXPECTED: &str = "non-negative 32-bit integer";
    let parsed = match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| mismatch(EXPECTED, value))
}
