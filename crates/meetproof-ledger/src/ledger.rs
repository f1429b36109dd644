//! The host ledger handle.
//!
//! Supplies what the kernel consumes from its host: caller identity per
//! call, the block counter, persistence with atomic commit, and a total
//! order over calls (the ledger lock).
//!
//! Every mutation runs under the lock as load, step, save, journal append.
//! The journal record is written only after the new state is installed; if
//! the append fails the previous state is reinstalled.

use crate::journal::{
    JournalEntry, JournalError, JournalRecord, append_record, journal_path, read_records_from_path,
};
use crate::lock::LedgerLock;
use crate::state::{LedgerFileError, LedgerState};
use meetproof_kernel::{Call, CallOutcome, MeetProof, Principal};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What one committed transaction produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub seq: u64,
    pub block: u64,
    pub caller: Principal,
    pub call: &'static str,
    pub outcome: CallOutcome,
    pub state_digest: String,
}

/// Result of re-executing the journal from genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub records: usize,
    pub calls: u64,
    pub block_height: u64,
    pub final_digest: String,
    /// Whether the replayed state equals the persisted state file.
    pub matches_ledger: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger already deployed at {0}")]
    AlreadyDeployed(String),

    #[error("ledger lock busy: {lock_path} (held by {holder})")]
    LockBusy { lock_path: String, holder: String },

    #[error("failed to acquire ledger lock {lock_path}: {message}")]
    LockIo { lock_path: String, message: String },

    #[error(transparent)]
    File(#[from] LedgerFileError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error("state digest failed: {0}")]
    Digest(String),

    #[error("journal does not start with a deploy record")]
    MissingDeploy,

    #[error("journal diverges at seq {seq}: {detail}")]
    Divergence { seq: u64, detail: String },
}

/// Apply `call` from `caller` at the state's current block.
///
/// Rejections are outcomes, not errors: they still consume a sequence
/// number and produce a journal entry.
fn apply_call(
    state: &mut LedgerState,
    caller: &Principal,
    call: &Call,
) -> Result<(TxReceipt, JournalEntry), LedgerError> {
    let seq = state.last_seq.checked_add(1).ok_or_else(|| {
        LedgerFileError::Corrupt("journal sequence exhausted".to_string())
    })?;
    let ctx = state.call_context(caller.clone());
    let outcome = state.contract.apply(&ctx, call);
    let state_digest = digest_of(&state.contract)?;
    state.last_seq = seq;

    let entry = JournalEntry::Call {
        seq,
        block: ctx.block_height,
        caller: caller.clone(),
        call: call.clone(),
        outcome: outcome.clone(),
        state_digest: state_digest.clone(),
    };
    let receipt = TxReceipt {
        seq,
        block: ctx.block_height,
        caller: ctx.caller,
        call: call.name(),
        outcome,
        state_digest,
    };
    Ok((receipt, entry))
}

fn digest_of(contract: &MeetProof) -> Result<String, LedgerError> {
    contract
        .state_digest()
        .map_err(|e| LedgerError::Digest(e.to_string()))
}

/// A ledger rooted at one state file (plus its journal and lock).
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn journal_path(&self) -> PathBuf {
        journal_path(&self.path)
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the genesis state and its journal record. Refuses to overwrite.
    pub fn deploy(&self, owner: Principal, block_height: u64) -> Result<LedgerState, LedgerError> {
        let _lock = LedgerLock::acquire(&self.path)?;
        let journal = self.journal_path();
        for existing in [&self.path, &journal] {
            if existing.exists() {
                return Err(LedgerError::AlreadyDeployed(existing.display().to_string()));
            }
        }

        let state = LedgerState::genesis(owner.clone(), block_height);
        let state_digest = digest_of(&state.contract)?;
        state.save(&self.path)?;
        let record = JournalRecord::new(JournalEntry::Deploy {
            owner: owner.clone(),
            block_height,
            state_digest,
        });
        if let Err(err) = append_record(&journal, &record) {
            let _ = fs::remove_file(&self.path);
            return Err(err.into());
        }

        tracing::info!(
            owner = %owner,
            block = block_height,
            path = %self.path.display(),
            "ledger deployed"
        );
        Ok(state)
    }

    pub fn load(&self) -> Result<LedgerState, LedgerError> {
        Ok(LedgerState::load(&self.path)?)
    }

    /// Execute one call from `caller` in the current block.
    ///
    /// Engine rejections are committed outcomes: they are journaled and
    /// returned in the receipt, never as `Err`.
    pub fn transact(&self, caller: Principal, call: Call) -> Result<TxReceipt, LedgerError> {
        let receipt = self.commit(|state| apply_call(state, &caller, &call))?;
        tracing::info!(
            seq = receipt.seq,
            block = receipt.block,
            caller = %receipt.caller,
            call = receipt.call,
            ok = receipt.outcome.is_ok(),
            "transaction committed"
        );
        Ok(receipt)
    }

    /// Advance the block counter by `blocks`. Returns the new height.
    pub fn mine(&self, blocks: u64) -> Result<u64, LedgerError> {
        let height = self.commit(|state| {
            let block_height = state.advance(blocks)?;
            Ok((
                block_height,
                JournalEntry::Mine {
                    blocks,
                    block_height,
                },
            ))
        })?;
        tracing::info!(blocks, height, "blocks mined");
        Ok(height)
    }

    fn commit<T, F>(&self, step: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut LedgerState) -> Result<(T, JournalEntry), LedgerError>,
    {
        self.commit_with(step, |state, path| state.save(path))
    }

    /// One locked transaction with a pluggable state writer.
    fn commit_with<T, F, W>(&self, step: F, write: W) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut LedgerState) -> Result<(T, JournalEntry), LedgerError>,
        W: Fn(&LedgerState, &Path) -> Result<(), LedgerFileError>,
    {
        let _lock = LedgerLock::acquire(&self.path)?;
        let previous = LedgerState::load(&self.path)?;
        let mut next = previous.clone();
        let (value, entry) = step(&mut next)?;

        write(&next, &self.path)?;
        if let Err(err) = append_record(self.journal_path(), &JournalRecord::new(entry)) {
            if let Err(restore) = write(&previous, &self.path) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %restore,
                    "failed to reinstall ledger state after journal error"
                );
            }
            return Err(err.into());
        }
        Ok(value)
    }

    /// Re-execute the journal from its deploy record and compare every
    /// outcome and digest with what was recorded.
    pub fn replay(&self) -> Result<ReplayReport, LedgerError> {
        let _lock = LedgerLock::acquire(&self.path)?;
        let records = read_records_from_path(self.journal_path())?;
        let record_count = records.len();
        let mut records = records.into_iter();

        let Some(JournalRecord {
            entry:
                JournalEntry::Deploy {
                    owner,
                    block_height,
                    state_digest,
                },
            ..
        }) = records.next()
        else {
            return Err(LedgerError::MissingDeploy);
        };

        let mut state = LedgerState::genesis(owner, block_height);
        let genesis_digest = digest_of(&state.contract)?;
        if genesis_digest != state_digest {
            return Err(LedgerError::Divergence {
                seq: 0,
                detail: format!("genesis digest {genesis_digest} != recorded {state_digest}"),
            });
        }

        let mut calls = 0u64;
        for record in records {
            match record.entry {
                JournalEntry::Deploy { .. } => {
                    return Err(LedgerError::Divergence {
                        seq: state.last_seq,
                        detail: "unexpected second deploy record".to_string(),
                    });
                }
                JournalEntry::Mine {
                    blocks,
                    block_height,
                } => {
                    let replayed = state.advance(blocks)?;
                    if replayed != block_height {
                        return Err(LedgerError::Divergence {
                            seq: state.last_seq,
                            detail: format!(
                                "mined to block {replayed}, journal says {block_height}"
                            ),
                        });
                    }
                }
                JournalEntry::Call {
                    seq,
                    block,
                    caller,
                    call,
                    outcome,
                    state_digest,
                } => {
                    if Some(seq) != state.last_seq.checked_add(1) {
                        return Err(LedgerError::Divergence {
                            seq,
                            detail: format!("expected seq {}", state.last_seq.saturating_add(1)),
                        });
                    }
                    if block != state.block_height {
                        return Err(LedgerError::Divergence {
                            seq,
                            detail: format!(
                                "recorded at block {block}, replay is at block {}",
                                state.block_height
                            ),
                        });
                    }

                    let ctx = state.call_context(caller);
                    let replayed = state.contract.apply(&ctx, &call);
                    if replayed != outcome {
                        return Err(LedgerError::Divergence {
                            seq,
                            detail: format!("outcome {replayed:?} != recorded {outcome:?}"),
                        });
                    }
                    let digest = digest_of(&state.contract)?;
                    if digest != state_digest {
                        return Err(LedgerError::Divergence {
                            seq,
                            detail: format!("digest {digest} != recorded {state_digest}"),
                        });
                    }
                    state.last_seq = seq;
                    calls += 1;
                }
            }
        }

        let persisted = self.load()?;
        Ok(ReplayReport {
            records: record_count,
            calls,
            block_height: state.block_height,
            final_digest: digest_of(&state.contract)?,
            matches_ledger: persisted == state,
        })
    }
}
