// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Discriminator → codec table.
//!
//! The registry is assembled once at startup through [`RegistryBuilder`] and
//! frozen by [`RegistryBuilder::build`]. A frozen [`VariantRegistry`] has no
//! mutation API: adding a variant means a new deployment, which keeps dispatch
//! total and auditable. Lookups are plain reads, so one registry can be shared
//! by reference (or `Arc`) across threads without locking.

use std::collections::BTreeMap;
use std::fmt;

use tracing::info;

use crate::config::CodecConfig;
use crate::discriminator::Discriminator;
use crate::error::RegistryError;
use crate::variant::{ErasedVariant, Payload, Variant, VariantCodec};

/// Mutable assembly stage of a [`VariantRegistry`].
pub struct RegistryBuilder<P: Payload> {
    codecs: BTreeMap<P::Kind, Box<dyn VariantCodec<P>>>,
    config: CodecConfig,
}

impl<P: Payload> Default for RegistryBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> RegistryBuilder<P> {
    /// Empty builder with the default [`CodecConfig`].
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Empty builder carrying `config` into the frozen registry.
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            codecs: BTreeMap::new(),
            config,
        }
    }

    /// Registers the codec of variant `V` under `V::KIND`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateKind`] if a codec is already
    /// registered for the same discriminator; the builder is left unchanged.
    pub fn register<V>(&mut self) -> Result<(), RegistryError>
    where
        V: Variant<Payload = P>,
    {
        let codec = ErasedVariant::<V>::new();
        if let Some(existing) = self.codecs.get(&V::KIND) {
            return Err(RegistryError::DuplicateKind {
                kind: V::KIND.as_str(),
                existing: existing.type_name(),
                rejected: codec.type_name(),
            });
        }
        self.codecs.insert(V::KIND, Box::new(codec));
        Ok(())
    }

    /// Freezes the table.
    ///
    /// When [`CodecConfig::require_all_variants`] is set this behaves like
    /// [`build_complete`](Self::build_complete).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingVariants`] only in the completeness
    /// mode described above.
    pub fn build(self) -> Result<VariantRegistry<P>, RegistryError> {
        if self.config.require_all_variants {
            return self.build_complete();
        }
        Ok(self.freeze())
    }

    /// Freezes the table, requiring a codec for every `Kind::ALL` entry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingVariants`] listing uncovered
    /// discriminators in declaration order.
    pub fn build_complete(self) -> Result<VariantRegistry<P>, RegistryError> {
        let missing: Vec<&'static str> = P::Kind::ALL
            .iter()
            .filter(|kind| !self.codecs.contains_key(kind))
            .map(|kind| kind.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(RegistryError::MissingVariants { missing });
        }
        Ok(self.freeze())
    }

    fn freeze(self) -> VariantRegistry<P> {
        let registry = VariantRegistry {
            codecs: self.codecs,
            config: self.config,
        };
        info!(
            variants = registry.len(),
            kinds = ?registry.kinds().map(Discriminator::as_str).collect::<Vec<_>>(),
            "variant registry frozen"
        );
        registry
    }
}

/// Immutable discriminator → codec table.
pub struct VariantRegistry<P: Payload> {
    codecs: BTreeMap<P::Kind, Box<dyn VariantCodec<P>>>,
    config: CodecConfig,
}

impl<P: Payload> VariantRegistry<P> {
    /// Starts a new [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder<P> {
        RegistryBuilder::new()
    }

    /// Codec registered for `kind`, if any.
    pub fn resolve(&self, kind: P::Kind) -> Option<&dyn VariantCodec<P>> {
        self.codecs.get(&kind).map(AsRef::as_ref)
    }

    /// Whether `kind` has a codec.
    pub fn contains(&self, kind: P::Kind) -> bool {
        self.codecs.contains_key(&kind)
    }

    /// Registered discriminators in `Ord` order.
    pub fn kinds(&self) -> impl Iterator<Item = P::Kind> + '_ {
        self.codecs.keys().copied()
    }

    /// Declared discriminators without a codec, in declaration order.
    pub fn missing_kinds(&self) -> Vec<P::Kind> {
        P::Kind::ALL
            .iter()
            .copied()
            .filter(|kind| !self.codecs.contains_key(kind))
            .collect()
    }

    /// Number of registered codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Whether no codec is registered.
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Configuration the registry was built with.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl<P: Payload> fmt::Debug for VariantRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantRegistry")
            .field(
                "codecs",
                &self
                    .codecs
                    .iter()
                    .map(|(kind, codec)| (kind.as_str(), codec.type_name()))
                    .collect::<BTreeMap<_, _>>(),
            )
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Circle, Shape, ShapeKind, Square, Triangle};

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut builder = RegistryBuilder::<Shape>::new();
        builder.register::<Circle>().unwrap();
        let err = builder.register::<Circle>().unwrap_err();
        match err {
            RegistryError::DuplicateKind {
                kind,
                existing,
                rejected,
            } => {
                assert_eq!(kind, "circle");
                assert_eq!(existing, rejected);
            }
            RegistryError::MissingVariants { .. } => panic!("wrong error: {err:?}"),
        }
        // First registration survives.
        assert_eq!(builder.build().unwrap().len(), 1);
    }

    #[test]
    fn build_complete_lists_missing_kinds() {
        let mut builder = RegistryBuilder::<Shape>::new();
        builder.register::<Square>().unwrap();
        let err = builder.build_complete().unwrap_err();
        assert_eq!(
            err,
            RegistryError::MissingVariants {
                missing: vec!["circle", "triangle"]
            }
        );
    }

    #[test]
    fn config_can_demand_completeness() {
        let config = CodecConfig {
            require_all_variants: true,
            ..CodecConfig::default()
        };
        let mut builder = RegistryBuilder::<Shape>::with_config(config);
        builder.register::<Circle>().unwrap();
        assert!(matches!(
            builder.build(),
            Err(RegistryError::MissingVariants { .. })
        ));
    }

    #[test]
    fn partial_registry_resolves_only_registered_kinds() {
        let registry = fixtures::partial_registry();
        assert!(registry.resolve(ShapeKind::Circle).is_some());
        assert!(registry.resolve(ShapeKind::Triangle).is_none());
        assert_eq!(registry.missing_kinds(), vec![ShapeKind::Triangle]);
        assert_eq!(
            registry.kinds().collect::<Vec<_>>(),
            vec![ShapeKind::Circle, ShapeKind::Square]
        );
    }

    #[test]
    fn full_registry_is_complete() {
        let registry = fixtures::full_registry();
        assert!(registry.missing_kinds().is_empty());
        assert_eq!(
            registry.resolve(ShapeKind::Triangle).map(|c| c.fields()),
            Some(<Triangle as Variant>::FIELDS)
        );
    }

    #[test]
    fn debug_lists_kinds_and_type_names() {
        let text = format!("{:?}", fixtures::partial_registry());
        assert!(text.contains("\"circle\""));
        assert!(text.contains("Square"));
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VariantRegistry<Shape>>();
    }
}
