//! Transaction journal: one JSON line per ledger record.
//!
//! `meetproof.tx.v1` records the deployment, every block advance, and every
//! call with its outcome and the resulting state digest. Rejected calls are
//! journaled too; they just leave the digest unchanged.

use chrono::{DateTime, Utc};
use meetproof_kernel::{Call, CallOutcome, Principal};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub const JOURNAL_SCHEMA: &str = "meetproof.tx.v1";

fn default_journal_schema() -> String {
    JOURNAL_SCHEMA.to_string()
}

/// `<ledger>.journal.jsonl` next to the state file.
pub fn journal_path(ledger_path: &Path) -> PathBuf {
    let mut path: OsString = ledger_path.as_os_str().to_os_string();
    path.push(".journal.jsonl");
    PathBuf::from(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum JournalEntry {
    #[serde(rename_all = "camelCase")]
    Deploy {
        owner: Principal,
        block_height: u64,
        state_digest: String,
    },
    #[serde(rename_all = "camelCase")]
    Mine { blocks: u64, block_height: u64 },
    #[serde(rename_all = "camelCase")]
    Call {
        seq: u64,
        block: u64,
        caller: Principal,
        #[serde(flatten)]
        call: Call,
        outcome: CallOutcome,
        state_digest: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalRecord {
    #[serde(default = "default_journal_schema")]
    pub schema: String,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: JournalEntry,
}

impl JournalRecord {
    pub fn new(entry: JournalEntry) -> Self {
        Self {
            schema: JOURNAL_SCHEMA.to_string(),
            recorded_at: Utc::now(),
            entry,
        }
    }
}

pub fn read_records(reader: impl BufRead) -> Result<Vec<JournalRecord>, JournalError> {
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| JournalError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: JournalRecord = serde_json::from_str(trimmed)
            .map_err(|e| JournalError::Parse(line_no + 1, e.to_string()))?;
        if record.schema != JOURNAL_SCHEMA {
            return Err(JournalError::Parse(
                line_no + 1,
                format!("unsupported journal schema `{}`", record.schema),
            ));
        }
        records.push(record);
    }
    Ok(records)
}

pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<JournalRecord>, JournalError> {
    let path = path.as_ref();
    let file =
        File::open(path).map_err(|e| JournalError::Io(0, format!("{}: {e}", path.display())))?;
    read_records(BufReader::new(file))
}

/// Append one record and fsync before returning.
pub fn append_record(path: impl AsRef<Path>, record: &JournalRecord) -> Result<(), JournalError> {
    let path = path.as_ref();
    let line = serde_json::to_string(record).map_err(|e| JournalError::Serialize(e.to_string()))?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| JournalError::Io(0, format!("{}: {e}", path.display())))?;
    writeln!(file, "{line}").map_err(|e| JournalError::Io(0, format!("{}: {e}", path.display())))?;
    file.sync_all()
        .map_err(|e| JournalError::Io(0, format!("{}: {e}", path.display())))?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("serialization error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetproof_kernel::{ErrorKind, SessionId};
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "meetproof-journal-{prefix}-{}-{unique}.jsonl",
            std::process::id()
        ))
    }

    #[test]
    fn journal_path_appends_suffix() {
        assert_eq!(
            journal_path(Path::new(".meetproof/ledger.json")),
            PathBuf::from(".meetproof/ledger.json.journal.jsonl")
        );
    }

    #[test]
    fn append_then_read_preserves_order() {
        let path = temp_path("append");
        let deploy = JournalRecord::new(JournalEntry::Deploy {
            owner: Principal::new("deployer"),
            block_height: 0,
            state_digest: "mp1_genesis".to_string(),
        });
        let call = JournalRecord::new(JournalEntry::Call {
            seq: 1,
            block: 0,
            caller: Principal::new("wallet_1"),
            call: Call::SetContractPaused { paused: true },
            outcome: CallOutcome::Err {
                kind: ErrorKind::NotAuthorized,
                code: 401,
            },
            state_digest: "mp1_genesis".to_string(),
        });
        append_record(&path, &deploy).expect("append deploy");
        append_record(&path, &call).expect("append call");

        let records = read_records_from_path(&path).expect("journal should read");
        assert_eq!(records, vec![deploy, call]);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn call_record_is_flat_on_the_wire() {
        let record = JournalRecord::new(JournalEntry::Call {
            seq: 2,
            block: 5,
            caller: Principal::new("wallet_2"),
            call: Call::SetContractPaused { paused: false },
            outcome: CallOutcome::Ok {
                session_id: Some(SessionId(1)),
                events: Vec::new(),
            },
            state_digest: "mp1_x".to_string(),
        });
        let value = serde_json::to_value(&record).expect("record should serialize");
        assert_eq!(value["record"], "call");
        assert_eq!(value["call"], "set_contract_paused");
        assert_eq!(value["paused"], false);
        assert_eq!(value["outcome"]["sessionId"], 1);
        assert_eq!(value["schema"], JOURNAL_SCHEMA);
    }

    #[test]
    fn read_reports_line_of_bad_record() {
        let input = "# header\n\n{not json}\n";
        match read_records(input.as_bytes()) {
            Err(JournalError::Parse(line, _)) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
