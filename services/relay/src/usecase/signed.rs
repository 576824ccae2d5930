//! Stateless signed-resubmission protocol.
//!
//! The redemption URL carries the serialized payload and a hex SHA-256 over
//! `data ‖ form_url ‖ secret`; nothing is stored server-side. This variant
//! deliberately offers no single-use guarantee — a signed URL stays
//! redeemable indefinitely and arbitrarily many times. Replay protection is
//! out of scope here; deployments that need it use the stateful link store.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub fn sign(data: &str, form_url: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hasher.update(form_url.as_bytes());
    hasher.update(secret.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Recompute the signature from the redeemer-supplied data and the resolved
/// form URL, and compare in constant time.
pub fn verify(data: &str, form_url: &str, secret: &str, signature: &str) -> bool {
    let expected = sign(data, form_url, secret);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
