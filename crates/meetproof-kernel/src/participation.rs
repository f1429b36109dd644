//! Participation claims: validation and recording.

use crate::access::AccessControl;
use crate::commitment::matches;
use crate::context::{CallContext, Principal};
use crate::error::MeetProofError;
use crate::geo::{Location, within_radius};
use crate::registry::SessionRegistry;
use crate::session::{Participation, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a successful claim changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipationReceipt {
    pub session_id: SessionId,
    pub participant_count: u64,
    /// True only for the claim that first reached `min_participants`.
    pub confirmed_now: bool,
}

/// Set of recorded participations, keyed by (session, participant).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipationTracker {
    records: BTreeMap<SessionId, BTreeMap<Principal, Participation>>,
}

impl ParticipationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a claim and record it.
    ///
    /// Order: pause gate, session exists, not expired, not full, caller has
    /// not participated, secret matches, location within radius. The
    /// registry and tracker are only touched after the last check.
    pub fn verify_participation(
        &mut self,
        access: &AccessControl,
        registry: &mut SessionRegistry,
        ctx: &CallContext,
        session_id: SessionId,
        secret: &[u8],
        location: Location,
    ) -> Result<ParticipationReceipt, MeetProofError> {
        access.require_not_paused()?;
        let session = registry
            .session(session_id)
            .ok_or(MeetProofError::SessionNotFound(session_id))?;

        if session.is_expired(ctx.block_height) {
            return Err(MeetProofError::SessionExpired {
                session_id,
                deadline_block: session.deadline_block(),
                current_block: ctx.block_height,
            });
        }
        if session.is_full() {
            return Err(MeetProofError::SessionFull {
                session_id,
                max_participants: session.max_participants,
            });
        }
        if self.has_participated(session_id, &ctx.caller) {
            return Err(MeetProofError::AlreadyParticipated {
                session_id,
                participant: ctx.caller.clone(),
            });
        }
        if !matches(&session.secret_commitment, secret) {
            return Err(MeetProofError::SecretMismatch { session_id });
        }
        if !within_radius(location, session.location, session.radius) {
            return Err(MeetProofError::OutOfRange { session_id });
        }

        let session = registry
            .session_mut(session_id)
            .ok_or(MeetProofError::SessionNotFound(session_id))?;
        let was_confirmed = session.is_confirmed();
        session.participant_count += 1;
        let confirmed_now = !was_confirmed && session.is_confirmed();

        self.records.entry(session_id).or_default().insert(
            ctx.caller.clone(),
            Participation {
                session_id,
                participant: ctx.caller.clone(),
                block: ctx.block_height,
            },
        );

        tracing::info!(
            session_id = session_id.get(),
            participant = %ctx.caller,
            block = ctx.block_height,
            count = session.participant_count,
            "participation recorded"
        );
        if confirmed_now {
            tracing::info!(session_id = session_id.get(), "session confirmed");
        }

        Ok(ParticipationReceipt {
            session_id,
            participant_count: session.participant_count,
            confirmed_now,
        })
    }

    pub fn has_participated(&self, session_id: SessionId, participant: &Principal) -> bool {
        self.participation(session_id, participant).is_some()
    }

    pub fn participation(
        &self,
        session_id: SessionId,
        participant: &Principal,
    ) -> Option<&Participation> {
        self.records
            .get(&session_id)
            .and_then(|by_participant| by_participant.get(participant))
    }

    /// Participations of one session, ordered by principal.
    pub fn participants(&self, session_id: SessionId) -> impl Iterator<Item = &Participation> {
        self.records
            .get(&session_id)
            .into_iter()
            .flat_map(|by_participant| by_participant.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionParams;

    const SECRET: &[u8] = b"correct horse battery staple";
    const HERE: Location = Location::new(40_000_000, -74_000_000);

    struct Fixture {
        access: AccessControl,
        registry: SessionRegistry,
        tracker: ParticipationTracker,
    }

    impl Fixture {
        fn with_session(min: u64, max: u64) -> (Self, SessionId) {
            let access = AccessControl::new(Principal::new("deployer"));
            let mut registry = SessionRegistry::new();
            let id = registry
                .create_session(
                    &access,
                    &CallContext::new(Principal::new("creator"), 100),
                    SessionParams {
                        secret: SECRET.to_vec(),
                        location: HERE,
                        radius: 100,
                        duration_blocks: 10,
                        min_participants: min,
                        max_participants: max,
                    },
                )
                .expect("session should be created");
            (
                Self {
                    access,
                    registry,
                    tracker: ParticipationTracker::new(),
                },
                id,
            )
        }

        fn claim(
            &mut self,
            who: &str,
            block: u64,
            id: SessionId,
            secret: &[u8],
            location: Location,
        ) -> Result<ParticipationReceipt, MeetProofError> {
            self.tracker.verify_participation(
                &self.access,
                &mut self.registry,
                &CallContext::new(Principal::new(who), block),
                id,
                secret,
                location,
            )
        }

        fn count(&self, id: SessionId) -> u64 {
            self.registry
                .session(id)
                .map(|s| s.participant_count)
                .unwrap_or_default()
        }
    }

    #[test]
    fn happy_path_records_once() {
        let (mut fx, id) = Fixture::with_session(2, 5);
        let receipt = fx
            .claim("wallet_2", 101, id, SECRET, HERE)
            .expect("claim should succeed");
        assert_eq!(receipt.participant_count, 1);
        assert!(!receipt.confirmed_now);
        assert!(fx.tracker.has_participated(id, &Principal::new("wallet_2")));
        assert_eq!(
            fx.tracker
                .participation(id, &Principal::new("wallet_2"))
                .map(|p| p.block),
            Some(101)
        );

        assert_eq!(
            fx.claim("wallet_2", 102, id, SECRET, HERE),
            Err(MeetProofError::AlreadyParticipated {
                session_id: id,
                participant: Principal::new("wallet_2"),
            })
        );
        assert_eq!(fx.count(id), 1);
    }

    #[test]
    fn confirmation_fires_once_and_session_stays_open() {
        let (mut fx, id) = Fixture::with_session(2, 4);
        assert!(!fx.claim("a", 100, id, SECRET, HERE).expect("a").confirmed_now);
        assert!(fx.claim("b", 100, id, SECRET, HERE).expect("b").confirmed_now);
        assert!(!fx.claim("c", 100, id, SECRET, HERE).expect("c").confirmed_now);
        let status = fx.registry.session(id).expect("session").status(100);
        assert!(status.open && status.confirmed);
    }

    #[test]
    fn full_session_rejects() {
        let (mut fx, id) = Fixture::with_session(1, 2);
        fx.claim("a", 100, id, SECRET, HERE).expect("a");
        fx.claim("b", 100, id, SECRET, HERE).expect("b");
        assert_eq!(
            fx.claim("c", 100, id, SECRET, HERE),
            Err(MeetProofError::SessionFull {
                session_id: id,
                max_participants: 2
            })
        );
        // Full is checked before the duplicate check.
        assert_eq!(
            fx.claim("a", 100, id, SECRET, HERE).map_err(|e| e.code()),
            Err(106)
        );
        assert_eq!(fx.tracker.participants(id).count(), 2);
    }

    #[test]
    fn expiry_is_checked_against_the_inclusive_deadline() {
        let (mut fx, id) = Fixture::with_session(1, 5);
        assert!(fx.claim("a", 110, id, SECRET, HERE).is_ok());
        assert_eq!(
            fx.claim("b", 111, id, SECRET, HERE),
            Err(MeetProofError::SessionExpired {
                session_id: id,
                deadline_block: 110,
                current_block: 111,
            })
        );
    }

    #[test]
    fn rejections_follow_the_check_order() {
        let (mut fx, id) = Fixture::with_session(1, 5);
        let far = Location::new(41_000_000, -74_000_000);

        assert_eq!(
            fx.claim("a", 100, SessionId(9), b"wrong", far),
            Err(MeetProofError::SessionNotFound(SessionId(9)))
        );
        // Wrong secret and out of range: secret first.
        assert_eq!(
            fx.claim("a", 100, id, b"wrong", far),
            Err(MeetProofError::SecretMismatch { session_id: id })
        );
        assert_eq!(
            fx.claim("a", 100, id, SECRET, far),
            Err(MeetProofError::OutOfRange { session_id: id })
        );
        // Expired beats everything after it.
        assert_eq!(
            fx.claim("a", 200, id, b"wrong", far).map_err(|e| e.code()),
            Err(103)
        );
        assert_eq!(fx.count(id), 0);
        assert_eq!(fx.tracker, ParticipationTracker::new());
    }

    #[test]
    fn paused_contract_blocks_claims() {
        let (mut fx, id) = Fixture::with_session(1, 5);
        let owner = Principal::new("deployer");
        fx.access.set_paused(&owner, true).expect("owner may pause");
        assert_eq!(
            fx.claim("a", 100, id, SECRET, HERE),
            Err(MeetProofError::ContractPaused)
        );
        fx.access.set_paused(&owner, false).expect("owner may unpause");
        assert!(fx.claim("a", 100, id, SECRET, HERE).is_ok());
    }

    #[test]
    fn nearby_claims_are_accepted() {
        let (mut fx, id) = Fixture::with_session(1, 5);
        // ~55 m north.
        let near = Location::new(HERE.lat + 500, HERE.lon);
        assert!(fx.claim("a", 100, id, SECRET, near).is_ok());
    }
}
