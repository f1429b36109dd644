//! Host-ledger transactions, journaling, and replay over real files.

use meetproof_kernel::{
    Call, CallOutcome, ErrorKind, Location, Principal, SessionId, SessionParams,
};
use meetproof_ledger::{
    JournalEntry, JournalRecord, Ledger, LedgerError, append_record, ledger_lock_path,
    read_records_from_path,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "meetproof-ledger-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const HERE: Location = Location::new(40_000_000, -74_000_000);

fn create_call() -> Call {
    Call::CreateSession(SessionParams {
        secret: vec![97; 32],
        location: HERE,
        radius: 100,
        duration_blocks: 10,
        min_participants: 2,
        max_participants: 5,
    })
}

fn verify_call(secret: Vec<u8>) -> Call {
    Call::VerifyParticipation {
        session_id: SessionId(1),
        secret,
        location: HERE,
    }
}

fn deployed(dir: &TempDirGuard) -> Ledger {
    let ledger = Ledger::open(dir.path().join(".meetproof/ledger.json"));
    ledger
        .deploy(Principal::new("deployer"), 1)
        .expect("deploy should succeed");
    ledger
}

#[test]
fn transactions_commit_in_order_and_replay_cleanly() {
    let dir = TempDirGuard::new("replay");
    let ledger = deployed(&dir);

    let created = ledger
        .transact(Principal::new("wallet_1"), create_call())
        .expect("create should commit");
    assert_eq!(created.seq, 1);
    assert_eq!(created.block, 1);
    assert!(matches!(
        created.outcome,
        CallOutcome::Ok {
            session_id: Some(SessionId(1)),
            ..
        }
    ));

    assert_eq!(ledger.mine(3).expect("mine should commit"), 4);

    let joined = ledger
        .transact(Principal::new("wallet_2"), verify_call(vec![97; 32]))
        .expect("verify should commit");
    assert!(joined.outcome.is_ok());
    assert_eq!(joined.block, 4);

    let rejected = ledger
        .transact(Principal::new("wallet_3"), verify_call(b"nope".to_vec()))
        .expect("rejections still commit");
    assert_eq!(
        rejected.outcome,
        CallOutcome::Err {
            kind: ErrorKind::InvalidSecret,
            code: 101
        }
    );
    assert_eq!(rejected.state_digest, joined.state_digest);

    let state = ledger.load().expect("state should load");
    assert_eq!(state.last_seq, 3);
    assert_eq!(state.block_height, 4);
    assert_eq!(
        state.contract.session(SessionId(1)).map(|s| s.participant_count),
        Some(1)
    );

    let report = ledger.replay().expect("replay should succeed");
    assert_eq!(report.records, 5);
    assert_eq!(report.calls, 3);
    assert_eq!(report.block_height, 4);
    assert_eq!(report.final_digest, rejected.state_digest);
    assert!(report.matches_ledger);
    assert!(!ledger_lock_path(ledger.path()).exists());
}

#[test]
fn deploy_refuses_to_overwrite() {
    let dir = TempDirGuard::new("redeploy");
    let ledger = deployed(&dir);
    assert!(matches!(
        ledger.deploy(Principal::new("someone"), 0),
        Err(LedgerError::AlreadyDeployed(_))
    ));
}

#[test]
fn held_lock_rejects_transactions_without_side_effects() {
    let dir = TempDirGuard::new("lock");
    let ledger = deployed(&dir);
    let lock = ledger_lock_path(ledger.path());
    fs::write(&lock, "pid=0\n").expect("lock fixture should write");

    assert!(matches!(
        ledger.transact(Principal::new("wallet_1"), create_call()),
        Err(LedgerError::LockBusy { .. })
    ));
    fs::remove_file(&lock).expect("lock fixture should be removable");

    assert_eq!(ledger.load().expect("state").last_seq, 0);
    let records = read_records_from_path(ledger.journal_path()).expect("journal");
    assert_eq!(records.len(), 1);
}

#[test]
fn tampered_journal_is_reported_as_divergence() {
    let dir = TempDirGuard::new("tamper");
    let ledger = deployed(&dir);
    ledger
        .transact(Principal::new("wallet_1"), create_call())
        .expect("create should commit");

    // A forged record claiming a participation succeeded with a bad secret.
    append_record(
        ledger.journal_path(),
        &JournalRecord::new(JournalEntry::Call {
            seq: 2,
            block: 1,
            caller: Principal::new("mallory"),
            call: verify_call(b"forged".to_vec()),
            outcome: CallOutcome::Ok {
                session_id: None,
                events: Vec::new(),
            },
            state_digest: "mp1_forged".to_string(),
        }),
    )
    .expect("forged record should append");

    match ledger.replay() {
        Err(LedgerError::Divergence { seq, detail }) => {
            assert_eq!(seq, 2);
            assert!(detail.contains("outcome"), "unexpected detail: {detail}");
        }
        other => panic!("expected divergence, got {other:?}"),
    }
}

#[test]
fn pause_round_trip_through_the_ledger() {
    let dir = TempDirGuard::new("pause");
    let ledger = deployed(&dir);

    let denied = ledger
        .transact(Principal::new("wallet_1"), Call::SetContractPaused { paused: true })
        .expect("commit");
    assert_eq!(denied.outcome.error_code(), Some(401));

    let paused = ledger
        .transact(Principal::new("deployer"), Call::SetContractPaused { paused: true })
        .expect("commit");
    assert!(paused.outcome.is_ok());

    let blocked = ledger
        .transact(Principal::new("wallet_1"), create_call())
        .expect("commit");
    assert_eq!(blocked.outcome.error_code(), Some(109));
    assert!(ledger.load().expect("state").contract.is_paused());
}

#[test]
fn replay_is_refused_while_the_lock_is_held() {
    let dir = TempDirGuard::new("replay-lock");
    let ledger = deployed(&dir);
    let lock = ledger_lock_path(ledger.path());
    fs::write(&lock, "pid=0\n").expect("lock fixture should write");

    assert!(matches!(
        ledger.replay(),
        Err(LedgerError::LockBusy { .. })
    ));
    fs::remove_file(&lock).expect("lock fixture should be removable");
    assert!(ledger.replay().expect("replay").matches_ledger);
}

#[test]
fn deploy_takes_the_lock_before_checking_for_a_ledger() {
    let dir = TempDirGuard::new("deploy-lock");
    let ledger = Ledger::open(dir.path().join("fresh/ledger.json"));
    let lock = ledger_lock_path(ledger.path());
    fs::create_dir_all(dir.path().join("fresh")).expect("dir should be created");
    fs::write(&lock, "pid=0\n").expect("lock fixture should write");

    assert!(matches!(
        ledger.deploy(Principal::new("deployer"), 0),
        Err(LedgerError::LockBusy { .. })
    ));
    assert!(!ledger.exists());
    assert!(!ledger.journal_path().exists());

    fs::remove_file(&lock).expect("lock fixture should be removable");
    ledger
        .deploy(Principal::new("deployer"), 0)
        .expect("deploy should succeed once the lock is free");
    assert!(!lock.exists());
}
