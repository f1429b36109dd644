//! Call context supplied by the host ledger.
//!
//! The kernel never reads a clock or an identity on its own. Every mutating
//! call receives:
//! 1. **Caller**: the principal that signed the transaction
//! 2. **Block height**: the ledger's monotonic logical clock
//!
//! Both are opaque to the kernel beyond equality and ordering.

use serde::{Deserialize, Serialize};

/// Externally verifiable caller identity.
///
/// In practice this is a ledger address; the kernel only compares it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(pub String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The host-supplied envelope of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Principal,
    pub block_height: u64,
}

impl CallContext {
    pub fn new(caller: Principal, block_height: u64) -> Self {
        Self {
            caller,
            block_height,
        }
    }
}
