//! `<ledger>.lock`: at most one writer per ledger.
//!
//! The lock file is created exclusively and records who holds it, so a lock
//! left behind by a crashed process can be identified and removed by hand.

use crate::ledger::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub fn ledger_lock_path(ledger_path: &Path) -> PathBuf {
    let mut path: OsString = ledger_path.as_os_str().to_os_string();
    path.push(".lock");
    PathBuf::from(path)
}

/// Contents of a held lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockHolder {
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
}

impl LockHolder {
    /// The recorded holder, if the lock file exists and is well-formed.
    pub fn read(lock_path: &Path) -> Option<Self> {
        let text = fs::read_to_string(lock_path).ok()?;
        serde_json::from_str(text.trim()).ok()
    }
}

/// Exclusive hold on one ledger. Released when dropped.
#[derive(Debug)]
pub struct LedgerLock {
    path: PathBuf,
}

impl LedgerLock {
    pub fn acquire(ledger_path: &Path) -> Result<Self, LedgerError> {
        let path = ledger_lock_path(ledger_path);
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| lock_io(&path, e))?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = LockHolder::read(&path).map_or_else(
                    || "unknown holder".to_string(),
                    |h| format!("pid {} since {}", h.pid, h.acquired_at.to_rfc3339()),
                );
                return Err(LedgerError::LockBusy {
                    lock_path: path.display().to_string(),
                    holder,
                });
            }
            Err(e) => return Err(lock_io(&path, e)),
        };

        // From here on the file is ours; dropping `lock` removes it.
        let lock = Self { path };
        let holder = LockHolder {
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        let line = serde_json::to_string(&holder).map_err(|e| lock_io(&lock.path, e))?;
        writeln!(file, "{line}").map_err(|e| lock_io(&lock.path, e))?;
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lock_io(lock_path: &Path, err: impl Display) -> LedgerError {
    LedgerError::LockIo {
        lock_path: lock_path.display().to_string(),
        message: err.to_string(),
    }
}
