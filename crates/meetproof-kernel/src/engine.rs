//! The engine: one value owning all contract state.
//!
//! Each external operation runs to completion against `&mut self` and
//! either commits every change or none; validation always precedes the
//! first write. The host ledger serializes calls, so there is no interior
//! locking here.

use crate::access::AccessControl;
use crate::context::{CallContext, Principal};
use crate::error::{ErrorKind, MeetProofError};
use crate::geo::Location;
use crate::participation::{ParticipationReceipt, ParticipationTracker};
use crate::registry::SessionRegistry;
use crate::session::{Participation, Session, SessionId, SessionParams, SessionStatus};
use serde::{Deserialize, Serialize};

/// Complete contract state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetProof {
    config: AccessControl,
    registry: SessionRegistry,
    participations: ParticipationTracker,
}

impl MeetProof {
    /// Fresh deployment owned by `owner`.
    pub fn deploy(owner: Principal) -> Self {
        Self {
            config: AccessControl::new(owner),
            registry: SessionRegistry::new(),
            participations: ParticipationTracker::new(),
        }
    }

    pub fn create_session(
        &mut self,
        ctx: &CallContext,
        params: SessionParams,
    ) -> Result<SessionId, MeetProofError> {
        self.registry.create_session(&self.config, ctx, params)
    }

    pub fn verify_participation(
        &mut self,
        ctx: &CallContext,
        session_id: SessionId,
        secret: &[u8],
        location: Location,
    ) -> Result<ParticipationReceipt, MeetProofError> {
        self.participations.verify_participation(
            &self.config,
            &mut self.registry,
            ctx,
            session_id,
            secret,
            location,
        )
    }

    pub fn set_contract_paused(
        &mut self,
        ctx: &CallContext,
        paused: bool,
    ) -> Result<(), MeetProofError> {
        self.config.set_paused(&ctx.caller, paused)?;
        tracing::info!(owner = %ctx.caller, paused, "contract pause changed");
        Ok(())
    }

    /// Run one serialized call and report its outcome with emitted events.
    pub fn apply(&mut self, ctx: &CallContext, call: &Call) -> CallOutcome {
        let result = match call {
            Call::CreateSession(params) => {
                self.create_session(ctx, params.clone()).map(|id| CallOutcome::Ok {
                    session_id: Some(id),
                    events: vec![EngineEvent::SessionCreated {
                        session_id: id,
                        creator: ctx.caller.clone(),
                    }],
                })
            }
            Call::VerifyParticipation {
                session_id,
                secret,
                location,
            } => self
                .verify_participation(ctx, *session_id, secret, *location)
                .map(|receipt| {
                    let mut events = vec![EngineEvent::ParticipationRecorded {
                        session_id: receipt.session_id,
                        participant: ctx.caller.clone(),
                        participant_count: receipt.participant_count,
                    }];
                    if receipt.confirmed_now {
                        events.push(EngineEvent::SessionConfirmed {
                            session_id: receipt.session_id,
                        });
                    }
                    CallOutcome::Ok {
                        session_id: None,
                        events,
                    }
                }),
            Call::SetContractPaused { paused } => {
                self.set_contract_paused(ctx, *paused)
                    .map(|()| CallOutcome::Ok {
                        session_id: None,
                        events: vec![EngineEvent::PauseChanged { paused: *paused }],
                    })
            }
        };

        result.unwrap_or_else(|err| {
            tracing::debug!(
                call = call.name(),
                caller = %ctx.caller,
                block = ctx.block_height,
                code = err.code(),
                "call rejected: {err}"
            );
            CallOutcome::Err {
                kind: err.kind(),
                code: err.code(),
            }
        })
    }

    pub fn owner(&self) -> &Principal {
        self.config.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.config.is_paused()
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.registry.session(id)
    }

    pub fn session_status(&self, id: SessionId, block_height: u64) -> Option<SessionStatus> {
        self.registry.session(id).map(|s| s.status(block_height))
    }

    pub fn session_count(&self) -> u64 {
        self.registry.session_count()
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.registry.sessions()
    }

    pub fn has_participated(&self, id: SessionId, participant: &Principal) -> bool {
        self.participations.has_participated(id, participant)
    }

    pub fn participation(&self, id: SessionId, participant: &Principal) -> Option<&Participation> {
        self.participations.participation(id, participant)
    }

    pub fn participants(&self, id: SessionId) -> impl Iterator<Item = &Participation> {
        self.participations.participants(id)
    }
}

/// A serializable external call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Call {
    CreateSession(SessionParams),
    #[serde(rename_all = "camelCase")]
    VerifyParticipation {
        session_id: SessionId,
        #[serde(with = "crate::commitment::hex_bytes")]
        secret: Vec<u8>,
        location: Location,
    },
    SetContractPaused {
        paused: bool,
    },
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::CreateSession(_) => "create-session",
            Call::VerifyParticipation { .. } => "verify-participation",
            Call::SetContractPaused { .. } => "set-contract-paused",
        }
    }
}

/// Result of one call as seen by the calling transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallOutcome {
    #[serde(rename_all = "camelCase")]
    Ok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        events: Vec<EngineEvent>,
    },
    Err {
        kind: ErrorKind,
        code: u32,
    },
}

impl CallOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, CallOutcome::Ok { .. })
    }

    pub fn error_code(&self) -> Option<u32> {
        match self {
            CallOutcome::Ok { .. } => None,
            CallOutcome::Err { code, .. } => Some(*code),
        }
    }
}

/// Notifications emitted by committed calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    #[serde(rename_all = "camelCase")]
    SessionCreated {
        session_id: SessionId,
        creator: Principal,
    },
    #[serde(rename_all = "camelCase")]
    ParticipationRecorded {
        session_id: SessionId,
        participant: Principal,
        participant_count: u64,
    },
    #[serde(rename_all = "camelCase")]
    SessionConfirmed { session_id: SessionId },
    PauseChanged { paused: bool },
}
