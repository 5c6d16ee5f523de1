// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Row persistence port.
//!
//! The codec does not own storage; [`RecordStore`] is the narrow call
//! interface it expects from one. Rows cross the boundary as encoded bytes
//! (see [`Record::encode`]) so a store never needs to understand payloads.
//! [`MemoryStore`] is the in-process implementation used by tests and demos.
//!
//! # Absence Semantics
//!
//! [`get`](RecordStore::get) returns `Ok(None)` for unknown ids. Error variants
//! are reserved for write conflicts and rows that no longer load.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::ValidationError;
use crate::id::RecordId;
use crate::record::{DecodeError, Record};
use crate::registry::VariantRegistry;
use crate::variant::Payload;

/// Errors raised by a [`RecordStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// `insert` found a row with the same id.
    #[error("[STORE_DUPLICATE] record {0} already exists")]
    Duplicate(RecordId),
    /// `update` found no row with the id.
    #[error("[STORE_NOT_FOUND] record {0} does not exist")]
    NotFound(RecordId),
    /// Stored bytes are not a JSON row.
    #[error("[STORE_CORRUPT_ROW] record {id}: {source}")]
    Corrupt {
        /// Row id.
        id: RecordId,
        /// Parse failure.
        source: serde_json::Error,
    },
    /// Stored row parsed but did not load against the registry.
    #[error("[STORE_INVALID_ROW] record {id}: {source}")]
    Invalid {
        /// Row id.
        id: RecordId,
        /// Load failure.
        source: ValidationError,
    },
    /// A record could not be encoded.
    #[error("[STORE_ENCODE] {0}")]
    Encode(#[from] serde_json::Error),
}

/// Synchronous record persistence.
pub trait RecordStore<P: Payload> {
    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// [`StoreError::Duplicate`] if the id is taken; the store is unchanged.
    fn insert(&mut self, record: &Record<P>) -> Result<(), StoreError>;

    /// Loads the record stored under `id`. Returns `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// [`StoreError::Corrupt`] or [`StoreError::Invalid`] when the stored row
    /// cannot be turned back into a record.
    fn get(
        &self,
        id: &RecordId,
        registry: &VariantRegistry<P>,
    ) -> Result<Option<Record<P>>, StoreError>;

    /// Replaces an existing record.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no row has the record's id.
    fn update(&mut self, record: &Record<P>) -> Result<(), StoreError>;

    /// Whether a row exists for `id`.
    fn contains(&self, id: &RecordId) -> bool;
}

/// In-memory [`RecordStore`] keeping encoded rows ordered by id.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    rows: BTreeMap<RecordId, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows stored.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw bytes stored for `id`.
    pub fn raw(&self, id: &RecordId) -> Option<&[u8]> {
        self.rows.get(id).map(Vec::as_slice)
    }

    /// Writes bytes for `id` without validation, replacing any previous row.
    ///
    /// Meant for migrations and fixtures that need rows the codec would not
    /// produce.
    pub fn insert_raw(&mut self, id: RecordId, bytes: Vec<u8>) {
        self.rows.insert(id, bytes);
    }
}

impl<P: Payload> RecordStore<P> for MemoryStore {
    #[instrument(skip_all, level = "debug", fields(id = %record.id()))]
    fn insert(&mut self, record: &Record<P>) -> Result<(), StoreError> {
        let id = record.id();
        if self.rows.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        let bytes = record.encode()?;
        debug!(bytes = bytes.len(), "row inserted");
        self.rows.insert(id, bytes);
        Ok(())
    }

    #[instrument(skip_all, level = "debug", fields(id = %id))]
    fn get(
        &self,
        id: &RecordId,
        registry: &VariantRegistry<P>,
    ) -> Result<Option<Record<P>>, StoreError> {
        let Some(bytes) = self.rows.get(id) else {
            return Ok(None);
        };
        match Record::decode(bytes, registry) {
            Ok(record) => Ok(Some(record)),
            Err(DecodeError::Corrupt(source)) => {
                warn!(%source, "stored row is not valid JSON");
                Err(StoreError::Corrupt { id: *id, source })
            }
            Err(DecodeError::Invalid(source)) => {
                warn!(%source, "stored row failed to load");
                Err(StoreError::Invalid { id: *id, source })
            }
        }
    }

    #[instrument(skip_all, level = "debug", fields(id = %record.id()))]
    fn update(&mut self, record: &Record<P>) -> Result<(), StoreError> {
        let id = record.id();
        let Some(slot) = self.rows.get_mut(&id) else {
            return Err(StoreError::NotFound(id));
        };
        *slot = record.encode()?;
        debug!(bytes = slot.len(), "row updated");
        Ok(())
    }

    fn contains(&self, id: &RecordId) -> bool {
        self.rows.contains_key(id)
    }
}
