//! Error types for MeetProof kernel operations.
//!
//! Every rejection is a value: the first failing precondition names the
//! error and the call leaves no trace in state.

use crate::context::Principal;
use crate::session::SessionId;
use serde::{Deserialize, Serialize};

/// Stable error kind, carried across the ledger boundary with its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidLocation,
    InvalidSecret,
    SessionNotFound,
    SessionExpired,
    AlreadyParticipated,
    OutOfRange,
    SessionFull,
    InvalidParticipantBounds,
    InvalidRadius,
    ContractPaused,
    InvalidDuration,
    SessionIdExhausted,
    NotAuthorized,
}

impl ErrorKind {
    /// All kinds, in code order.
    pub const ALL: [ErrorKind; 13] = [
        ErrorKind::InvalidLocation,
        ErrorKind::InvalidSecret,
        ErrorKind::SessionNotFound,
        ErrorKind::SessionExpired,
        ErrorKind::AlreadyParticipated,
        ErrorKind::OutOfRange,
        ErrorKind::SessionFull,
        ErrorKind::InvalidParticipantBounds,
        ErrorKind::InvalidRadius,
        ErrorKind::ContractPaused,
        ErrorKind::InvalidDuration,
        ErrorKind::SessionIdExhausted,
        ErrorKind::NotAuthorized,
    ];

    pub const fn code(self) -> u32 {
        match self {
            ErrorKind::InvalidLocation => 100,
            ErrorKind::InvalidSecret => 101,
            ErrorKind::SessionNotFound => 102,
            ErrorKind::SessionExpired => 103,
            ErrorKind::AlreadyParticipated => 104,
            ErrorKind::OutOfRange => 105,
            ErrorKind::SessionFull => 106,
            ErrorKind::InvalidParticipantBounds => 107,
            ErrorKind::InvalidRadius => 108,
            ErrorKind::ContractPaused => 109,
            ErrorKind::InvalidDuration => 110,
            ErrorKind::SessionIdExhausted => 111,
            ErrorKind::NotAuthorized => 401,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidLocation => "INVALID_LOCATION",
            ErrorKind::InvalidSecret => "INVALID_SECRET",
            ErrorKind::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorKind::SessionExpired => "SESSION_EXPIRED",
            ErrorKind::AlreadyParticipated => "ALREADY_PARTICIPATED",
            ErrorKind::OutOfRange => "OUT_OF_RANGE",
            ErrorKind::SessionFull => "SESSION_FULL",
            ErrorKind::InvalidParticipantBounds => "INVALID_PARTICIPANT_BOUNDS",
            ErrorKind::InvalidRadius => "INVALID_RADIUS",
            ErrorKind::ContractPaused => "CONTRACT_PAUSED",
            ErrorKind::InvalidDuration => "INVALID_DURATION",
            ErrorKind::SessionIdExhausted => "SESSION_ID_EXHAUSTED",
            ErrorKind::NotAuthorized => "NOT_AUTHORIZED",
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.as_str(), self.code())
    }
}

/// Errors returned by the engine's mutating operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeetProofError {
    /// The contract is paused; no mutation is accepted.
    #[error("contract is paused")]
    ContractPaused,

    /// Caller is not the contract owner.
    #[error("caller {caller} is not authorized")]
    NotAuthorized { caller: Principal },

    /// Secret length outside `[MIN_SECRET_LEN, MAX_SECRET_LEN]`.
    #[error("secret length {len} outside [{min}, {max}]", min = crate::commitment::MIN_SECRET_LEN, max = crate::commitment::MAX_SECRET_LEN)]
    InvalidSecretLength { len: usize },

    /// Provided secret does not reproduce the session commitment.
    #[error("secret does not match commitment of session {session_id}")]
    SecretMismatch { session_id: SessionId },

    #[error("location out of bounds: lat={lat} lon={lon}")]
    InvalidLocation { lat: i64, lon: i64 },

    #[error("radius {radius} outside [{min}, {max}]", min = crate::geo::MIN_RADIUS, max = crate::geo::MAX_RADIUS)]
    InvalidRadius { radius: u64 },

    #[error("invalid participant bounds: min={min} max={max}")]
    InvalidParticipantBounds { min: u64, max: u64 },

    #[error("duration must be at least one block")]
    InvalidDuration,

    #[error("session id space exhausted")]
    SessionIdExhausted,

    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    #[error("session {session_id} expired at block {deadline_block} (current block {current_block})")]
    SessionExpired {
        session_id: SessionId,
        deadline_block: u64,
        current_block: u64,
    },

    #[error("session {session_id} is full ({max_participants} participants)")]
    SessionFull {
        session_id: SessionId,
        max_participants: u64,
    },

    #[error("{participant} already participated in session {session_id}")]
    AlreadyParticipated {
        session_id: SessionId,
        participant: Principal,
    },

    #[error("location is outside the radius of session {session_id}")]
    OutOfRange { session_id: SessionId },
}

impl MeetProofError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeetProofError::ContractPaused => ErrorKind::ContractPaused,
            MeetProofError::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            MeetProofError::InvalidSecretLength { .. } | MeetProofError::SecretMismatch { .. } => {
                ErrorKind::InvalidSecret
            }
            MeetProofError::InvalidLocation { .. } => ErrorKind::InvalidLocation,
            MeetProofError::InvalidRadius { .. } => ErrorKind::InvalidRadius,
            MeetProofError::InvalidParticipantBounds { .. } => ErrorKind::InvalidParticipantBounds,
            MeetProofError::InvalidDuration => ErrorKind::InvalidDuration,
            MeetProofError::SessionIdExhausted => ErrorKind::SessionIdExhausted,
            MeetProofError::SessionNotFound(_) => ErrorKind::SessionNotFound,
            MeetProofError::SessionExpired { .. } => ErrorKind::SessionExpired,
            MeetProofError::SessionFull { .. } => ErrorKind::SessionFull,
            MeetProofError::AlreadyParticipated { .. } => ErrorKind::AlreadyParticipated,
            MeetProofError::OutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }

    /// Numeric code as surfaced to the calling transaction.
    pub fn code(&self) -> u32 {
        self.kind().code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn observed_codes_are_pinned() {
        assert_eq!(ErrorKind::InvalidLocation.code(), 100);
        assert_eq!(ErrorKind::InvalidSecret.code(), 101);
        assert_eq!(ErrorKind::InvalidRadius.code(), 108);
        assert_eq!(ErrorKind::NotAuthorized.code(), 401);
    }

    #[test]
    fn codes_are_distinct() {
        let codes: BTreeSet<u32> = ErrorKind::ALL.iter().map(|kind| kind.code()).collect();
        assert_eq!(codes.len(), ErrorKind::ALL.len());
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ErrorKind::from_code(999), None);
    }

    #[test]
    fn both_secret_failures_share_one_code() {
        let short = MeetProofError::InvalidSecretLength { len: 3 };
        let mismatch = MeetProofError::SecretMismatch {
            session_id: SessionId(1),
        };
        assert_eq!(short.code(), 101);
        assert_eq!(mismatch.code(), 101);
        assert_eq!(short.to_string(), "secret length 3 outside [4, 32]");
    }

    #[test]
    fn kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::InvalidParticipantBounds)
            .expect("kind should serialize");
        assert_eq!(json, "\"INVALID_PARTICIPANT_BOUNDS\"");
    }
}
