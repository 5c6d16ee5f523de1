// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for casting, loading and registry construction.
//!
//! Validation failures are data, not faults: a [`ValidationError`] is a
//! non-empty, deterministically ordered set of [`FieldError`]s that callers
//! surface to end users or logs. [`RegistryError`] is the only startup-time
//! failure and signals programmer misconfiguration.

use core::fmt;
use thiserror::Error;

/// What went wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
pub enum FieldErrorKind {
    /// A required field is absent, `null`, or a blank string.
    #[error("is required")]
    MissingField,
    /// The field is present but could not be coerced to the declared type.
    #[error("expected {expected}, found {found}")]
    InvalidFieldType {
        /// Human-readable description of the accepted shape.
        expected: &'static str,
        /// JSON type (or offending text class) that was supplied.
        found: &'static str,
    },
    /// The discriminator does not resolve to a registered codec: the text
    /// names no enumerant, or the enumerant has no codec in this registry.
    #[error("unknown variant `{tag}`")]
    UnknownVariant {
        /// Discriminator text as supplied.
        tag: String,
    },
    /// The field is not declared by the variant (strict mode only).
    #[error("is not a declared field")]
    UnknownField,
    /// The field is well-typed but violates a variant-level rule.
    #[error("{message}")]
    Constraint {
        /// Description of the violated rule.
        message: String,
    },
}

impl FieldErrorKind {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidFieldType { .. } => "invalid_field_type",
            Self::UnknownVariant { .. } => "unknown_variant",
            Self::UnknownField => "unknown_field",
            Self::Constraint { .. } => "constraint",
        }
    }

    /// Builds a [`FieldErrorKind::Constraint`] from any message.
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }
}

/// A failure attached to one field path (`"initiated_at"`, `"data.type"`).
///
/// The empty path denotes the value itself (for example a payload that is not
/// an object at all).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
#[error("{}: {kind}", path_label(.path))]
pub struct FieldError {
    /// Dotted path of the offending field.
    pub path: String,
    /// Failure classification.
    pub kind: FieldErrorKind,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(path: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

fn path_label(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

/// Aggregated validation failure produced by cast or load.
///
/// Invariants:
/// - never empty;
/// - sorted by `(path, kind)` with duplicates removed, so two runs over the
///   same input report identical errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[VALIDATION_FAILED] {}", Listing(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

struct Listing<'a>(&'a [FieldError]);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl ValidationError {
    /// A failure on exactly one field.
    pub fn single(path: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            errors: vec![FieldError::new(path, kind)],
        }
    }

    /// Shorthand for a [`FieldErrorKind::MissingField`] failure.
    pub fn missing(path: impl Into<String>) -> Self {
        Self::single(path, FieldErrorKind::MissingField)
    }

    /// Builds a validation error from collected field errors.
    ///
    /// Returns `None` when `errors` is empty, which callers treat as success.
    pub fn from_errors(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        let mut errors = errors;
        errors.sort();
        errors.dedup();
        Some(Self { errors })
    }

    /// All field errors, sorted by path.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Consumes the error and returns the field errors.
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Number of field errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`; present for API symmetry with [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First error reported for `path`, if any.
    pub fn find(&self, path: &str) -> Option<&FieldError> {
        self.errors.iter().find(|err| err.path == path)
    }

    /// Whether `path` carries an error with the same classification code.
    pub fn has(&self, path: &str, kind: &FieldErrorKind) -> bool {
        self.errors
            .iter()
            .any(|err| err.path == path && err.kind.code() == kind.code())
    }

    /// Prefixes every path with `prefix` (used when a payload sits inside an
    /// envelope).
    #[must_use]
    pub fn nest(self, prefix: &str) -> Self {
        let errors = self
            .errors
            .into_iter()
            .map(|err| {
                let path = if err.path.is_empty() {
                    prefix.to_owned()
                } else {
                    format!("{prefix}.{}", err.path)
                };
                FieldError::new(path, err.kind)
            })
            .collect();
        Self::normalized(errors)
    }

    /// Union of two error sets.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let mut errors = self.errors;
        errors.extend(other.errors);
        Self::normalized(errors)
    }

    fn normalized(mut errors: Vec<FieldError>) -> Self {
        errors.sort();
        errors.dedup();
        Self { errors }
    }
}

/// Startup-time registry misconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two codecs were registered for the same discriminator.
    #[error("[REGISTRY_DUPLICATE_KIND] `{kind}` already handled by {existing}, refusing {rejected}")]
    DuplicateKind {
        /// Discriminator text.
        kind: &'static str,
        /// Type name of the codec already registered.
        existing: &'static str,
        /// Type name of the codec that was refused.
        rejected: &'static str,
    },
    /// Some declared discriminators have no codec.
    #[error("[REGISTRY_INCOMPLETE] no codec registered for: {}", .missing.join(", "))]
    MissingVariants {
        /// Discriminator texts lacking a codec, in declaration order.
        missing: Vec<&'static str>,
    },
}
