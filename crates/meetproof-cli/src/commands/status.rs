use crate::support::{
    exit_with_error, load_state_or_exit, open_ledger_or_exit, print_json_or_exit, yes_no,
};
use meetproof_ledger::{Ledger, LedgerState};
use serde_json::{Value, json};

pub const LEDGER_STATUS_KIND: &str = "meetproof.ledger_status.v1";

pub fn status_payload(ledger: &Ledger, state: &LedgerState) -> Result<Value, String> {
    let state_digest = state
        .contract
        .state_digest()
        .map_err(|e| format!("failed to digest state: {e}"))?;
    Ok(json!({
        "schema": 1,
        "kind": LEDGER_STATUS_KIND,
        "ledgerPath": ledger.path().display().to_string(),
        "journalPath": ledger.journal_path().display().to_string(),
        "owner": state.contract.owner(),
        "paused": state.contract.is_paused(),
        "blockHeight": state.block_height,
        "lastSeq": state.last_seq,
        "sessionCount": state.contract.session_count(),
        "stateDigest": state_digest,
    }))
}

pub fn run(ledger_path: String, json_output: bool) {
    let ledger = open_ledger_or_exit(&ledger_path);
    let state = load_state_or_exit(&ledger);
    let payload = status_payload(&ledger, &state).unwrap_or_else(|e| exit_with_error(e));

    if json_output {
        print_json_or_exit(&payload, "status");
        return;
    }

    println!("meetproof status {ledger_path}");
    println!();
    println!("  owner: {}", state.contract.owner());
    println!("  paused: {}", yes_no(state.contract.is_paused()));
    println!("  block height: {}", state.block_height);
    println!("  transactions: {}", state.last_seq);
    println!("  sessions: {}", state.contract.session_count());
    println!(
        "  state digest: {}",
        payload
            .get("stateDigest")
            .and_then(Value::as_str)
            .unwrap_or("")
    );
}
