//! Session and participation records.

use crate::commitment::Commitment;
use crate::context::Principal;
use crate::geo::Location;
use serde::{Deserialize, Serialize};

/// Session identifier. Assigned from 1 upward, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl SessionId {
    pub const FIRST: SessionId = SessionId(1);

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inputs to `create_session`, as submitted by the creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    #[serde(with = "crate::commitment::hex_bytes")]
    pub secret: Vec<u8>,
    pub location: Location,
    pub radius: u64,
    pub duration_blocks: u64,
    pub min_participants: u64,
    pub max_participants: u64,
}

/// A registered meeting session.
///
/// Immutable once created except for `participant_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub creator: Principal,
    pub secret_commitment: Commitment,
    pub location: Location,
    pub radius: u64,
    pub duration_blocks: u64,
    pub min_participants: u64,
    pub max_participants: u64,
    pub created_at_block: u64,
    pub participant_count: u64,
}

impl Session {
    /// Last block at which participation is still accepted.
    pub fn deadline_block(&self) -> u64 {
        self.created_at_block.saturating_add(self.duration_blocks)
    }

    pub fn is_expired(&self, block_height: u64) -> bool {
        block_height > self.deadline_block()
    }

    pub fn is_full(&self) -> bool {
        self.participant_count >= self.max_participants
    }

    pub fn is_confirmed(&self) -> bool {
        self.participant_count >= self.min_participants
    }

    pub fn status(&self, block_height: u64) -> SessionStatus {
        let expired = self.is_expired(block_height);
        let full = self.is_full();
        SessionStatus {
            open: !expired && !full,
            confirmed: self.is_confirmed(),
            expired,
            full,
        }
    }
}

/// Independently observable session flags at a given block.
///
/// `confirmed` is informational and coexists with `open`: a confirmed
/// session keeps accepting participants until it is full or expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub open: bool,
    pub confirmed: bool,
    pub expired: bool,
    pub full: bool,
}

impl SessionStatus {
    /// Single-word summary. Expiry outranks fullness, mirroring the order
    /// in which participation checks them.
    pub fn phase(&self) -> SessionPhase {
        if self.expired {
            SessionPhase::Expired
        } else if self.full {
            SessionPhase::Full
        } else if self.confirmed {
            SessionPhase::Confirmed
        } else {
            SessionPhase::Open
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Open,
    Confirmed,
    Expired,
    Full,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Expired | SessionPhase::Full)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Open => "open",
            SessionPhase::Confirmed => "confirmed",
            SessionPhase::Expired => "expired",
            SessionPhase::Full => "full",
        }
    }
}

/// One principal's recorded claim on one session. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub session_id: SessionId,
    pub participant: Principal,
    pub block: u64,
}
