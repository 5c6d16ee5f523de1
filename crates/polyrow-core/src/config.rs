// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Codec configuration and its storage port.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Policy for input keys a variant does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFields {
    /// Drop undeclared keys silently.
    #[default]
    Ignore,
    /// Report every undeclared key as `UnknownField`.
    Reject,
}

/// Runtime knobs of the codec, carried by a built registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Handling of undeclared keys during cast. Load is never strict.
    pub unknown_fields: UnknownFields,
    /// Make [`RegistryBuilder::build`](crate::RegistryBuilder::build) demand a
    /// codec for every declared discriminator.
    pub require_all_variants: bool,
}

impl CodecConfig {
    /// Key under which the codec config is persisted.
    pub const KEY: &'static str = "codec";

    /// Whether cast rejects undeclared keys.
    pub fn is_strict(&self) -> bool {
        self.unknown_fields == UnknownFields::Reject
    }
}

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent, `Io`/`Other` on backend failure.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;

    /// Persist a raw config blob.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("[CONFIG_NOT_FOUND] not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("[CONFIG_IO] {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("[CONFIG_SERDE] {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all error variant.
    #[error("[CONFIG_OTHER] {0}")]
    Other(String),
}

/// Serializes config values as JSON and delegates storage to a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing.
    ///
    /// # Errors
    ///
    /// Store failures other than `NotFound`, and malformed JSON.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Like [`load`](Self::load), falling back to `T::default()` when missing.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_or_default<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        let loaded = self.load(key)?;
        if loaded.is_none() {
            debug!(key, "config missing; using defaults");
        }
        Ok(loaded.unwrap_or_default())
    }

    /// Serialize and persist a config value for `key`.
    ///
    /// # Errors
    ///
    /// Serialization or store failure.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Loads the [`CodecConfig`] stored under [`CodecConfig::KEY`].
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load); unknown config keys are a `Serde` error.
    pub fn codec_config(&self) -> Result<CodecConfig, ConfigError> {
        self.load_or_default(CodecConfig::KEY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore {
        blobs: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl ConfigStore for MapStore {
        fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
            self.blobs
                .borrow()
                .get(key)
                .cloned()
                .ok_or(ConfigError::NotFound)
        }

        fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
            self.blobs.borrow_mut().insert(key.to_owned(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let service = ConfigService::new(MapStore::default());
        let config = service.codec_config().unwrap();
        assert_eq!(config, CodecConfig::default());
        assert!(!config.is_strict());
    }

    #[test]
    fn save_then_load_round_trips() {
        let service = ConfigService::new(MapStore::default());
        let config = CodecConfig {
            unknown_fields: UnknownFields::Reject,
            require_all_variants: true,
        };
        service.save(CodecConfig::KEY, &config).unwrap();
        assert_eq!(service.codec_config().unwrap(), config);
    }

    #[test]
    fn partial_json_uses_field_defaults() {
        let store = MapStore::default();
        store
            .save_raw(CodecConfig::KEY, br#"{"unknown_fields":"reject"}"#)
            .unwrap();
        let config = ConfigService::new(store).codec_config().unwrap();
        assert!(config.is_strict());
        assert!(!config.require_all_variants);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let store = MapStore::default();
        store
            .save_raw(CodecConfig::KEY, br#"{"payload_key":"body"}"#)
            .unwrap();
        let err = ConfigService::new(store).codec_config().unwrap_err();
        assert!(matches!(err, ConfigError::Serde(_)));
    }

    #[test]
    fn empty_blob_counts_as_missing() {
        let store = MapStore::default();
        store.save_raw(CodecConfig::KEY, b"").unwrap();
        let service = ConfigService::new(store);
        assert!(service.load::<CodecConfig>(CodecConfig::KEY).unwrap().is_none());
    }
}
