use chrono::{DateTime, Utc};
use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::{KeyValueStorage, Partition};
use crate::error::RelayError;

/// Key-value storage over a shared Redis pool. Partitions map to key
/// prefixes; absolute expiries become millisecond TTLs at write time.
#[derive(Clone)]
pub struct RedisStorage {
    pub pool: Pool,
}

fn storage_key(partition: Partition, key: &str) -> String {
    format!("{}:{}", partition.as_str(), key)
}

impl KeyValueStorage for RedisStorage {
    async fn put(
        &self,
        partition: Partition,
        key: &str,
        value: &[u8],
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), RelayError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| RelayError::Internal(e.into()))?;
        let key = storage_key(partition, key);
        match expires_at {
            Some(expires_at) => {
                let ttl_ms = (expires_at - Utc::now()).num_milliseconds();
                if ttl_ms <= 0 {
                    // Writing an entry that is already expired: remove any live
                    // value so the key reads as absent, same as a lapsed TTL.
                    let (): () = conn
                        .del(&key)
                        .await
                        .map_err(|e: deadpool_redis::redis::RedisError| {
                            RelayError::Internal(e.into())
                        })?;
                } else {
                    let (): () = conn.pset_ex(&key, value, ttl_ms as u64).await.map_err(
                        |e: deadpool_redis::redis::RedisError| RelayError::Internal(e.into()),
                    )?;
                }
            }
            None => {
                let (): () = conn
                    .set(&key, value)
                    .await
                    .map_err(|e: deadpool_redis::redis::RedisError| RelayError::Internal(e.into()))?;
            }
        }
        Ok(())
    }

    async fn get(&self, partition: Partition, key: &str) -> Result<Option<Vec<u8>>, RelayError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| RelayError::Internal(e.into()))?;
        let value: Option<Vec<u8>> = conn
            .get(storage_key(partition, key))
            .await
            .map_err(|e| RelayError::Internal(e.into()))?;
        Ok(value)
    }

    async fn delete(&self, partition: Partition, key: &str) -> Result<(), RelayError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| RelayError::Internal(e.into()))?;
        let (): () = conn
            .del(storage_key(partition, key))
            .await
            .map_err(|e| RelayError::Internal(e.into()))?;
        Ok(())
    }
}
