//! # meetproof-ledger
//!
//! Host-ledger stand-in for the MeetProof kernel.
//!
//! This crate provides:
//! - `LedgerState` (block counter + contract state, one JSON file)
//! - lock-scoped transactions: state installed first, then journaled
//! - an append-only transaction journal with deterministic replay
//!
//! ## Data model
//!
//! ```text
//! ledger.json                (latest committed state)
//! ledger.json.journal.jsonl  (deploy, mine, call records in commit order)
//! ledger.json.lock           (held by one deploy, transaction, or replay)
//! ```

pub mod journal;
pub mod ledger;
pub mod lock;
pub mod state;

pub use journal::{
    JOURNAL_SCHEMA, JournalEntry, JournalError, JournalRecord, append_record, journal_path,
    read_records, read_records_from_path,
};
pub use ledger::{Ledger, LedgerError, ReplayReport, TxReceipt};
pub use lock::{LedgerLock, LockHolder, ledger_lock_path};
pub use state::{LEDGER_STATE_KIND, LEDGER_STATE_SCHEMA, LedgerFileError, LedgerState};
