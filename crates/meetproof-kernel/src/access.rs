//! Single-owner access control and the pause switch.

use crate::context::Principal;
use crate::error::MeetProofError;
use serde::{Deserialize, Serialize};

/// Deployment-wide configuration. Created once, never destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    pub owner: Principal,
    pub paused: bool,
}

/// The only mutator of [`ContractConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessControl {
    config: ContractConfig,
}

impl AccessControl {
    pub fn new(owner: Principal) -> Self {
        Self {
            config: ContractConfig {
                owner,
                paused: false,
            },
        }
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    pub fn owner(&self) -> &Principal {
        &self.config.owner
    }

    pub fn is_paused(&self) -> bool {
        self.config.paused
    }

    pub fn is_owner(&self, caller: &Principal) -> bool {
        self.config.owner == *caller
    }

    pub fn set_paused(&mut self, caller: &Principal, value: bool) -> Result<(), MeetProofError> {
        if !self.is_owner(caller) {
            return Err(MeetProofError::NotAuthorized {
                caller: caller.clone(),
            });
        }
        self.config.paused = value;
        Ok(())
    }

    pub fn require_not_paused(&self) -> Result<(), MeetProofError> {
        if self.config.paused {
            return Err(MeetProofError::ContractPaused);
        }
        Ok(())
    }
}
