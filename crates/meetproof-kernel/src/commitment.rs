//! Secret commitments.
//!
//! A session commits to its secret verbatim and a participant proves
//! membership by reproducing the same bytes. Anyone able to read ledger
//! state or call data can recover the secret; the commitment is an
//! equality check, not a hiding scheme.

use crate::error::MeetProofError;
use serde::{Deserialize, Serialize};

pub const MIN_SECRET_LEN: usize = 4;
pub const MAX_SECRET_LEN: usize = 32;

/// Stored session commitment (the raw secret bytes).
///
/// Serialized as lowercase hex. `Debug` prints only the length.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(#[serde(with = "hex_bytes")] Vec<u8>);

impl Commitment {
    /// Commit to `secret` after checking its length.
    pub fn commit(secret: &[u8]) -> Result<Self, MeetProofError> {
        validate_secret_length(secret)?;
        Ok(Self(secret.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Commitment({} bytes)", self.0.len())
    }
}

pub fn validate_secret_length(secret: &[u8]) -> Result<(), MeetProofError> {
    if !(MIN_SECRET_LEN..=MAX_SECRET_LEN).contains(&secret.len()) {
        return Err(MeetProofError::InvalidSecretLength { len: secret.len() });
    }
    Ok(())
}

/// Byte-exact equality between the stored commitment and a provided secret.
pub fn matches(stored: &Commitment, provided: &[u8]) -> bool {
    stored.as_bytes() == provided
}

/// Lowercase hex encoding.
pub fn encode_hex(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(DIGITS[(byte >> 4) as usize] as char);
        out.push(DIGITS[(byte & 0x0f) as usize] as char);
    }
    out
}

/// Decode hex (either case). Whitespace is not accepted.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, HexDecodeError> {
    let bytes = text.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(HexDecodeError::OddLength(bytes.len()));
    }
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for (index, pair) in bytes.chunks_exact(2).enumerate() {
        let hi = hex_value(pair[0]).ok_or(HexDecodeError::InvalidDigit {
            index: index * 2,
            digit: pair[0] as char,
        })?;
        let lo = hex_value(pair[1]).ok_or(HexDecodeError::InvalidDigit {
            index: index * 2 + 1,
            digit: pair[1] as char,
        })?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexDecodeError {
    #[error("hex string has odd length {0}")]
    OddLength(usize),

    #[error("invalid hex digit {digit:?} at offset {index}")]
    InvalidDigit { index: usize, digit: char },
}

/// Serde adapter: `Vec<u8>` as a hex string.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_hex(&text).map_err(serde::de::Error::custom)
    }
}
