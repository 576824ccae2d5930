//! Read/write access to per-form configuration in the `forms` partition.

use anyhow::Context as _;

use crate::domain::repository::{KeyValueStorage, Partition};
use crate::domain::types::FormReference;
use crate::error::RelayError;

pub async fn get_form<S: KeyValueStorage>(
    storage: &S,
    key: &str,
) -> Result<FormReference, RelayError> {
    let bytes = storage
        .get(Partition::Forms, key)
        .await?
        .ok_or_else(|| RelayError::FormNotFound(key.to_owned()))?;
    let form = serde_json::from_slice(&bytes)
        .with_context(|| format!("stored form reference for key {key:?} is corrupt"))?;
    Ok(form)
}

/// Administrative write, not used on the hot request path. Last-write-wins.
pub async fn push_form<S: KeyValueStorage>(
    storage: &S,
    key: &str,
    form: &FormReference,
) -> Result<(), RelayError> {
    let bytes = serde_json::to_vec(form).context("serialize form reference")?;
    storage.put(Partition::Forms, key, &bytes, None).await
}
