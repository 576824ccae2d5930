use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::domain::repository::{KeyValueStorage, Partition};
use crate::error::RelayError;

struct Entry {
    value: Vec<u8>,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process key-value storage. Expiry is lazy: an entry past its expiry
/// reads as absent and is dropped on the next access. Backs the test suite
/// and single-node deployments that do not want a Redis dependency.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<HashMap<(Partition, String), Entry>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    async fn put(
        &self,
        partition: Partition,
        key: &str,
        value: &[u8],
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), RelayError> {
        let mut inner = self.inner.lock().unwrap();
        inner.insert(
            (partition, key.to_owned()),
            Entry {
                value: value.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, partition: Partition, key: &str) -> Result<Option<Vec<u8>>, RelayError> {
        let mut inner = self.inner.lock().unwrap();
        let map_key = (partition, key.to_owned());
        match inner.get(&map_key) {
            Some(entry) if entry.is_expired(Utc::now()) => {
                inner.remove(&map_key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, partition: Partition, key: &str) -> Result<(), RelayError> {
        let mut inner = self.inner.lock().unwrap();
        inner.remove(&(partition, key.to_owned()));
        Ok(())
    }
}
