//! Deterministic state digests.
//!
//! Two independent executions of the same call sequence MUST produce the
//! same digest.
//!
//! Algorithm:
//! 1. Serialize the state to a `serde_json::Value` (object keys sorted)
//! 2. Render compactly, no whitespace
//! 3. digest = "mp1_" || hex_lower(SHA256(bytes))

use crate::commitment::encode_hex;
use crate::engine::MeetProof;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub const STATE_DIGEST_PREFIX: &str = "mp1_";

/// Digest of any serializable value under the canonical rendering.
pub fn canonical_digest<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_value(value)?;
    let bytes = serde_json::to_vec(&canonical)?;
    let hash = Sha256::digest(&bytes);
    Ok(format!("{STATE_DIGEST_PREFIX}{}", encode_hex(&hash)))
}

impl MeetProof {
    /// Digest of the full contract state.
    pub fn state_digest(&self) -> Result<String, serde_json::Error> {
        canonical_digest(self)
    }
}
