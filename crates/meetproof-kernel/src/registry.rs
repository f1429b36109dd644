//! Session registry: creation, id allocation, lookup.

use crate::access::AccessControl;
use crate::commitment::{Commitment, validate_secret_length};
use crate::context::CallContext;
use crate::error::MeetProofError;
use crate::geo::{validate_location, validate_radius};
use crate::session::{Session, SessionId, SessionParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arena of sessions keyed by id, plus the id counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRegistry {
    last_session_id: u64,
    sessions: BTreeMap<SessionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a new session.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// pause gate, secret length, location, radius, participant bounds,
    /// duration. Nothing is written until every check has passed.
    pub fn create_session(
        &mut self,
        access: &AccessControl,
        ctx: &CallContext,
        params: SessionParams,
    ) -> Result<SessionId, MeetProofError> {
        access.require_not_paused()?;
        validate_secret_length(&params.secret)?;
        validate_location(params.location.lat, params.location.lon)?;
        validate_radius(params.radius)?;
        if params.min_participants == 0 || params.min_participants > params.max_participants {
            return Err(MeetProofError::InvalidParticipantBounds {
                min: params.min_participants,
                max: params.max_participants,
            });
        }
        if params.duration_blocks == 0 {
            return Err(MeetProofError::InvalidDuration);
        }

        let id = self
            .last_session_id
            .checked_add(1)
            .map(SessionId)
            .ok_or(MeetProofError::SessionIdExhausted)?;
        let secret_commitment = Commitment::commit(&params.secret)?;

        let session = Session {
            id,
            creator: ctx.caller.clone(),
            secret_commitment,
            location: params.location,
            radius: params.radius,
            duration_blocks: params.duration_blocks,
            min_participants: params.min_participants,
            max_participants: params.max_participants,
            created_at_block: ctx.block_height,
            participant_count: 0,
        };
        tracing::info!(
            session_id = id.get(),
            creator = %ctx.caller,
            block = ctx.block_height,
            deadline = session.deadline_block(),
            "session created"
        );

        self.last_session_id = id.get();
        self.sessions.insert(id, session);
        Ok(id)
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub(crate) fn session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Number of sessions ever created (ids are dense).
    pub fn session_count(&self) -> u64 {
        self.last_session_id
    }

    /// Sessions in ascending id order.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Principal;
    use crate::geo::Location;

    fn params() -> SessionParams {
        SessionParams {
            secret: vec![97; 32],
            location: Location::new(40_000_000, -74_000_000),
            radius: 100,
            duration_blocks: 10,
            min_participants: 2,
            max_participants: 5,
        }
    }

    fn ctx(block: u64) -> CallContext {
        CallContext::new(Principal::new("wallet_1"), block)
    }

    #[test]
    fn ids_are_dense_from_one() {
        let access = AccessControl::new(Principal::new("deployer"));
        let mut registry = SessionRegistry::new();
        for expected in 1..=3 {
            let id = registry
                .create_session(&access, &ctx(7), params())
                .expect("creation should succeed");
            assert_eq!(id, SessionId(expected));
        }
        assert_eq!(registry.session_count(), 3);
        let first = registry.session(SessionId(1)).expect("session 1 exists");
        assert_eq!(first.created_at_block, 7);
        assert_eq!(first.participant_count, 0);
        assert_eq!(first.secret_commitment.as_bytes(), &[97; 32]);
        assert_eq!(first.creator, Principal::new("wallet_1"));
    }

    #[test]
    fn first_failing_check_wins() {
        let access = AccessControl::new(Principal::new("deployer"));
        let mut registry = SessionRegistry::new();

        // Bad secret and bad location: the secret is checked first.
        let mut both = params();
        both.secret = b"abc".to_vec();
        both.location = Location::new(95_000_000, 0);
        assert_eq!(
            registry.create_session(&access, &ctx(1), both),
            Err(MeetProofError::InvalidSecretLength { len: 3 })
        );

        // Bad location and bad radius: location first.
        let mut loc_radius = params();
        loc_radius.location = Location::new(95_000_000, 0);
        loc_radius.radius = 5;
        assert_eq!(
            registry
                .create_session(&access, &ctx(1), loc_radius)
                .map_err(|e| e.code()),
            Err(100)
        );

        // Bad radius and bad bounds: radius first.
        let mut radius_bounds = params();
        radius_bounds.radius = 5;
        radius_bounds.min_participants = 9;
        assert_eq!(
            registry
                .create_session(&access, &ctx(1), radius_bounds)
                .map_err(|e| e.code()),
            Err(108)
        );

        assert_eq!(registry.session_count(), 0);
    }

    #[test]
    fn participant_bounds_and_duration_are_checked() {
        let access = AccessControl::new(Principal::new("deployer"));
        let mut registry = SessionRegistry::new();

        let mut zero_min = params();
        zero_min.min_participants = 0;
        assert_eq!(
            registry.create_session(&access, &ctx(1), zero_min),
            Err(MeetProofError::InvalidParticipantBounds { min: 0, max: 5 })
        );

        let mut inverted = params();
        inverted.min_participants = 6;
        assert!(matches!(
            registry.create_session(&access, &ctx(1), inverted),
            Err(MeetProofError::InvalidParticipantBounds { min: 6, max: 5 })
        ));

        let mut equal = params();
        equal.min_participants = 5;
        assert!(registry.create_session(&access, &ctx(1), equal).is_ok());

        let mut no_duration = params();
        no_duration.duration_blocks = 0;
        assert_eq!(
            registry.create_session(&access, &ctx(1), no_duration),
            Err(MeetProofError::InvalidDuration)
        );
        assert_eq!(registry.session_count(), 1);
    }

    #[test]
    fn paused_contract_rejects_before_validation() {
        let owner = Principal::new("deployer");
        let mut access = AccessControl::new(owner.clone());
        access.set_paused(&owner, true).expect("owner may pause");
        let mut registry = SessionRegistry::new();

        let mut invalid = params();
        invalid.secret = b"abc".to_vec();
        assert_eq!(
            registry.create_session(&access, &ctx(1), invalid),
            Err(MeetProofError::ContractPaused)
        );
        assert_eq!(registry, SessionRegistry::new());
    }
}
