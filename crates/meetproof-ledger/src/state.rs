//! Ledger state file: block counter plus contract state, one JSON document.
//!
//! A save installs the new document with a rename, so a reader sees either
//! the old state or the new one.

use meetproof_kernel::{CallContext, MeetProof, Principal};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const LEDGER_STATE_SCHEMA: u32 = 1;
pub const LEDGER_STATE_KIND: &str = "meetproof.ledger_state.v1";

fn default_kind() -> String {
    LEDGER_STATE_KIND.to_string()
}

/// Everything the host ledger persists between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    pub schema: u32,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub block_height: u64,
    /// Journal sequence number of the last applied call.
    #[serde(default)]
    pub last_seq: u64,
    pub contract: MeetProof,
}

impl LedgerState {
    pub fn genesis(owner: Principal, block_height: u64) -> Self {
        Self {
            schema: LEDGER_STATE_SCHEMA,
            kind: LEDGER_STATE_KIND.to_string(),
            block_height,
            last_seq: 0,
            contract: MeetProof::deploy(owner),
        }
    }

    /// Context for a call submitted by `caller` in the current block.
    pub fn call_context(&self, caller: Principal) -> CallContext {
        CallContext::new(caller, self.block_height)
    }

    /// Advance the block counter. Fails on overflow, never moves backward.
    pub fn advance(&mut self, blocks: u64) -> Result<u64, LedgerFileError> {
        self.block_height = self
            .block_height
            .checked_add(blocks)
            .ok_or(LedgerFileError::BlockOverflow {
                height: self.block_height,
                blocks,
            })?;
        Ok(self.block_height)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LedgerFileError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(io_error(path))?;
        let text = String::from_utf8(bytes).map_err(|_| {
            LedgerFileError::Corrupt(format!("{}: state is not UTF-8", path.display()))
        })?;
        if text.contains('\0') {
            return Err(LedgerFileError::Corrupt(format!(
                "{}: state contains NUL byte(s)",
                path.display()
            )));
        }

        let state: LedgerState = serde_json::from_str(&text)
            .map_err(|e| LedgerFileError::Parse(format!("{}: {e}", path.display())))?;
        if state.schema != LEDGER_STATE_SCHEMA || state.kind != LEDGER_STATE_KIND {
            return Err(LedgerFileError::Corrupt(format!(
                "{}: unsupported ledger state {} v{}",
                path.display(),
                state.kind,
                state.schema
            )));
        }
        Ok(state)
    }

    /// Replace the state file: stage a sibling file, fsync it, rename it over
    /// `path`, then fsync the directory so the rename itself is durable.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LedgerFileError> {
        let path = path.as_ref();
        let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = dir {
            fs::create_dir_all(dir).map_err(io_error(dir))?;
        }

        let mut body = serde_json::to_vec_pretty(self)
            .map_err(|e| LedgerFileError::Serialize(e.to_string()))?;
        body.push(b'\n');

        let staged = staged_path(path, self.last_seq);
        let installed = write_synced(&staged, &body).and_then(|()| {
            fs::rename(&staged, path).map_err(|e| {
                LedgerFileError::Io(format!("{} -> {}: {e}", staged.display(), path.display()))
            })
        });
        if let Err(err) = installed {
            let _ = fs::remove_file(&staged);
            return Err(err);
        }

        if let Some(dir) = dir {
            File::open(dir)
                .and_then(|handle| handle.sync_all())
                .map_err(io_error(dir))?;
        }
        Ok(())
    }
}

/// `<ledger>.<pid>.<seq>.staged`, next to the ledger so the rename stays on
/// one filesystem.
fn staged_path(path: &Path, seq: u64) -> PathBuf {
    let mut staged: OsString = path.as_os_str().to_os_string();
    staged.push(format!(".{}.{seq}.staged", std::process::id()));
    PathBuf::from(staged)
}

fn write_synced(path: &Path, body: &[u8]) -> Result<(), LedgerFileError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(io_error(path))?;
    file.write_all(body).map_err(io_error(path))?;
    file.sync_all().map_err(io_error(path))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> LedgerFileError {
    move |e| LedgerFileError::Io(format!("{}: {e}", path.display()))
}

/// Errors from reading or writing the ledger state file.
#[derive(Debug, thiserror::Error)]
pub enum LedgerFileError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("corrupted ledger: {0}")]
    Corrupt(String),

    #[error("block height {height} cannot advance by {blocks}")]
    BlockOverflow { height: u64, blocks: u64 },
}
