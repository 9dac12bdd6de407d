use log::{error, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{KeyValueStore, StoreError};

/// Key under which the whole log is stored as one JSON array
pub const DURATIONS_KEY: &str = "durations";

/// One completed session as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRecord {
    pub start: String,
    pub end: String,
    pub duration: u64,
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode duration log: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only list of completed sessions behind a key-value store
#[derive(Debug)]
pub struct DurationLog<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> DurationLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read-modify-write of the stored list. Unparsable stored content is
    /// replaced by a list holding just `record`.
    pub fn append(&self, record: DurationRecord) -> Result<(), LogError> {
        let mut records = decode(self.store.get(DURATIONS_KEY)?);
        records.push(record);
        let encoded = serde_json::to_string(&records)?;
        self.store.set(DURATIONS_KEY, &encoded)?;
        Ok(())
    }

    /// All stored records in insertion order; empty on any failure
    pub fn load_all(&self) -> Vec<DurationRecord> {
        match self.store.get(DURATIONS_KEY) {
            Ok(raw) => decode(raw),
            Err(e) => {
                error!("Failed to load durations: {e}");
                Vec::new()
            }
        }
    }
}

fn decode(raw: Option<String>) -> Vec<DurationRecord> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<DurationRecord>>(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Ignoring malformed duration log: {e}");
            Vec::new()
        }
    }
}
