use meetproof_kernel::commitment::decode_hex;
use meetproof_kernel::{Call, CallOutcome, EngineEvent, Principal};
use meetproof_ledger::{Ledger, LedgerState, TxReceipt};
use serde::Serialize;
use std::fmt::Display;

pub const DEFAULT_LEDGER_PATH: &str = ".meetproof/ledger.json";

pub fn exit_with_error(message: impl Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

pub fn open_ledger_or_exit(path: &str) -> Ledger {
    let ledger = Ledger::open(path);
    if !ledger.exists() {
        exit_with_error(format!(
            "ledger not found: {path} (run `meetproof init --owner <principal>` first)"
        ));
    }
    ledger
}

pub fn load_state_or_exit(ledger: &Ledger) -> LedgerState {
    ledger.load().unwrap_or_else(|e| {
        exit_with_error(format!("failed to load {}: {e}", ledger.path().display()))
    })
}

/// Secret bytes from exactly one of `--secret` (UTF-8) or `--secret-hex`.
pub fn parse_secret(secret: Option<String>, secret_hex: Option<String>) -> Result<Vec<u8>, String> {
    match (secret, secret_hex) {
        (Some(text), None) => Ok(text.into_bytes()),
        (None, Some(hex)) => {
            decode_hex(hex.trim()).map_err(|e| format!("invalid --secret-hex value: {e}"))
        }
        (Some(_), Some(_)) => Err("use either --secret or --secret-hex, not both".to_string()),
        (None, None) => Err("missing --secret or --secret-hex".to_string()),
    }
}

pub fn secret_or_exit(secret: Option<String>, secret_hex: Option<String>) -> Vec<u8> {
    parse_secret(secret, secret_hex).unwrap_or_else(|e| exit_with_error(e))
}

pub fn print_json_or_exit<T: Serialize + ?Sized>(value: &T, what: &str) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|err| {
        eprintln!("error: failed to render {what} json: {err}");
        std::process::exit(2);
    });
    println!("{rendered}");
}

/// Commit one call and report its receipt. Exits 1 when the engine
/// rejected the call, after the receipt has been printed.
pub fn transact_and_report(ledger: &Ledger, caller: String, call: Call, json_output: bool) {
    let receipt = ledger
        .transact(Principal::new(caller), call)
        .unwrap_or_else(|e| exit_with_error(format!("transaction failed: {e}")));
    print_receipt(&receipt, json_output);
    if !receipt.outcome.is_ok() {
        std::process::exit(1);
    }
}

fn print_receipt(receipt: &TxReceipt, json_output: bool) {
    if json_output {
        print_json_or_exit(receipt, receipt.call);
        return;
    }

    println!("meetproof {}", receipt.call);
    println!("  seq: {}", receipt.seq);
    println!("  block: {}", receipt.block);
    println!("  caller: {}", receipt.caller);
    println!("  result: {}", outcome_summary(&receipt.outcome));
    if let CallOutcome::Ok { events, .. } = &receipt.outcome {
        for event in events {
            println!("  event: {}", event_summary(event));
        }
    }
    println!("  state digest: {}", receipt.state_digest);
}

pub fn outcome_summary(outcome: &CallOutcome) -> String {
    match outcome {
        CallOutcome::Ok {
            session_id: Some(id),
            ..
        } => format!("ok (session {id})"),
        CallOutcome::Ok { .. } => "ok".to_string(),
        CallOutcome::Err { kind, code } => format!("rejected {} ({code})", kind.as_str()),
    }
}

pub fn event_summary(event: &EngineEvent) -> String {
    match event {
        EngineEvent::SessionCreated {
            session_id,
            creator,
        } => format!("session {session_id} created by {creator}"),
        EngineEvent::ParticipationRecorded {
            session_id,
            participant,
            participant_count,
        } => format!("{participant} joined session {session_id} ({participant_count} total)"),
        EngineEvent::SessionConfirmed { session_id } => {
            format!("session {session_id} reached its confirmation threshold")
        }
        EngineEvent::PauseChanged { paused } => format!("contract paused: {}", yes_no(*paused)),
    }
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}
