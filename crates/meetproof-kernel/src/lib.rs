//! # MeetProof Kernel
//!
//! Sessions bind a shared secret to a geofenced location and a block
//! deadline. Participants prove presence by reproducing the secret from
//! within the radius before the deadline.
//!
//! The kernel is pure: the host ledger injects the caller and block height
//! and owns persistence and transaction ordering. Every verdict is computed
//! with integer arithmetic only.
//!
//! ## Architecture
//!
//! ```text
//! GeoValidator          ← fixed-point bounds + squared-distance proximity
//! CommitmentVerifier    ← secret length + byte equality
//! AccessControl         ← single owner, pause switch
//!     │
//! SessionRegistry       ← id counter + session arena
//!     │
//! ParticipationTracker  ← (session, principal) set + claim validation
//!     │
//! MeetProof             ← engine: owns all state, applies serialized calls
//! ```

pub mod access;
pub mod commitment;
pub mod context;
pub mod digest;
pub mod engine;
pub mod error;
pub mod error_registry;
pub mod geo;
pub mod participation;
pub mod registry;
pub mod session;

pub use access::{AccessControl, ContractConfig};
pub use commitment::{Commitment, MAX_SECRET_LEN, MIN_SECRET_LEN};
pub use context::{CallContext, Principal};
pub use digest::{STATE_DIGEST_PREFIX, canonical_digest};
pub use engine::{Call, CallOutcome, EngineEvent, MeetProof};
pub use error::{ErrorKind, MeetProofError};
pub use error_registry::{error_code_registry, error_code_registry_json};
pub use geo::{Location, MAX_RADIUS, MIN_RADIUS};
pub use participation::{ParticipationReceipt, ParticipationTracker};
pub use registry::SessionRegistry;
pub use session::{Participation, Session, SessionId, SessionParams, SessionPhase, SessionStatus};
