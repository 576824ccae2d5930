//! Per-email rate-limit guard over the `timeouts` partition.
//!
//! Timeouts only ever extend: a write whose expiry is earlier than the
//! stored one is rejected, never silently ignored or shortened. Records are
//! never actively deleted — an expired record simply reads as not timed out.

use anyhow::Context as _;
use chrono::{Duration, Utc};

use crate::domain::repository::{KeyValueStorage, Partition};
use crate::domain::types::{EmailTimeout, TimeoutReason};
use crate::error::RelayError;

pub async fn push_email_timeout<S: KeyValueStorage>(
    storage: &S,
    email: &str,
    timeout: EmailTimeout,
) -> Result<(), RelayError> {
    if let Some(bytes) = storage.get(Partition::Timeouts, email).await? {
        let current: EmailTimeout = serde_json::from_slice(&bytes)
            .with_context(|| format!("stored timeout for {email:?} is corrupt"))?;
        if current.expires > timeout.expires {
            return Err(RelayError::TimeoutShorterThanCurrent(email.to_owned()));
        }
    }
    let bytes = serde_json::to_vec(&timeout).context("serialize email timeout")?;
    storage.put(Partition::Timeouts, email, &bytes, None).await
}

pub async fn is_email_timed_out<S: KeyValueStorage>(
    storage: &S,
    email: &str,
) -> Result<bool, RelayError> {
    let Some(bytes) = storage.get(Partition::Timeouts, email).await? else {
        return Ok(false);
    };
    let timeout: EmailTimeout = serde_json::from_slice(&bytes)
        .with_context(|| format!("stored timeout for {email:?} is corrupt"))?;
    Ok(timeout.expires > Utc::now())
}

/// Convenience composition: timeout `email` for `duration_secs` from now.
pub async fn timeout_email<S: KeyValueStorage>(
    storage: &S,
    email: &str,
    duration_secs: i64,
    reason: TimeoutReason,
) -> Result<(), RelayError> {
    let timeout = EmailTimeout {
        reason,
        expires: Utc::now() + Duration::seconds(duration_secs),
    };
    push_email_timeout(storage, email, timeout).await
}
