//! Single-use link/token store over the `links` partition.
//!
//! A token id names one pending submission. Ids are generated server-side
//! with enough randomness to be secret-equivalent; guessing one must be
//! computationally infeasible. The existence pre-check in `push_link` and the
//! read-before-delete in `destroy_link` are check-then-act, not atomic —
//! concurrent callers racing on the same id can both proceed (accepted,
//! documented limitation of the non-transactional storage contract).

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use rand::RngExt;

use crate::codec::{self, SmartFormPayload};
use crate::domain::repository::{KeyValueStorage, Partition};
use crate::error::RelayError;

/// Charset for generating link ids (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 32 chars over a 36-symbol alphabet ≈ 165 bits of randomness.
pub const LINK_ID_LEN: usize = 32;

pub fn generate_link_id() -> String {
    let mut rng = rand::rng();
    (0..LINK_ID_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Write `payload` under `id`. Fails with `LinkIdInUse` when a live entry
/// already exists — a defensive check, not a normal-path error, given the
/// generator's collision probability.
pub async fn push_link<S: KeyValueStorage>(
    storage: &S,
    id: &str,
    payload: &SmartFormPayload,
    expires_at: Option<DateTime<Utc>>,
) -> Result<(), RelayError> {
    if storage.get(Partition::Links, id).await?.is_some() {
        return Err(RelayError::LinkIdInUse);
    }
    let bytes = serde_json::to_vec(&codec::encode(payload)).context("serialize link payload")?;
    storage.put(Partition::Links, id, &bytes, expires_at).await
}

/// Generate an id and store `payload` under it — the composition used by the
/// verify-email path.
pub async fn provision_link<S: KeyValueStorage>(
    storage: &S,
    payload: &SmartFormPayload,
    expires_at: Option<DateTime<Utc>>,
) -> Result<String, RelayError> {
    let id = generate_link_id();
    push_link(storage, &id, payload, expires_at).await?;
    Ok(id)
}

/// True iff a live (non-expired) entry exists for `id`.
pub async fn is_link_valid<S: KeyValueStorage>(storage: &S, id: &str) -> Result<bool, RelayError> {
    Ok(storage.get(Partition::Links, id).await?.is_some())
}

pub async fn get_link_form_data<S: KeyValueStorage>(
    storage: &S,
    id: &str,
) -> Result<SmartFormPayload, RelayError> {
    let bytes = storage
        .get(Partition::Links, id)
        .await?
        .ok_or(RelayError::LinkIdNotFound)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| RelayError::InvalidPayload(format!("stored link payload is corrupt: {e}")))?;
    codec::decode(&value)
}

pub async fn destroy_link<S: KeyValueStorage>(storage: &S, id: &str) -> Result<(), RelayError> {
    if storage.get(Partition::Links, id).await?.is_none() {
        return Err(RelayError::LinkIdNotFound);
    }
    storage.delete(Partition::Links, id).await
}
