#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use crate::codec::SmartFormPayload;
use crate::domain::types::{EmailMessage, MailgunCreds};
use crate::error::RelayError;

/// Logical key namespaces within the storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Forms,
    Timeouts,
    Links,
}

impl Partition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forms => "forms",
            Self::Timeouts => "timeouts",
            Self::Links => "links",
        }
    }
}

/// Port for the key-value storage backend.
///
/// `put` offers no overwrite protection — callers needing uniqueness must
/// check existence first and accept the check-then-act race (no transactions
/// are assumed of the backend). An entry written with `expires_at` becomes
/// unreadable once that instant passes; an entry whose expiry already passed
/// is indistinguishable from an absent one.
pub trait KeyValueStorage: Send + Sync {
    async fn put(
        &self,
        partition: Partition,
        key: &str,
        value: &[u8],
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), RelayError>;

    /// Absent (or expired) reads as `Ok(None)`, never an error.
    async fn get(&self, partition: Partition, key: &str) -> Result<Option<Vec<u8>>, RelayError>;

    /// Idempotent — deleting an absent key is not an error at this layer.
    async fn delete(&self, partition: Partition, key: &str) -> Result<(), RelayError>;
}

/// Port for the outbound email collaborator. A non-2xx answer from the
/// collaborator is a definitive failure; no retry is performed.
pub trait Mailer: Send + Sync {
    async fn send(&self, creds: &MailgunCreds, message: &EmailMessage) -> Result<(), RelayError>;
}

/// Port for delivering a verified submission to the destination form
/// endpoint. A non-2xx answer is a definitive failure; no retry is performed.
pub trait FormRelay: Send + Sync {
    async fn deliver(&self, form_url: &str, payload: &SmartFormPayload) -> Result<(), RelayError>;
}
