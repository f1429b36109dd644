use crate::support::{exit_with_error, print_json_or_exit};
use meetproof_kernel::Principal;
use meetproof_ledger::Ledger;
use serde_json::json;

pub fn run(ledger_path: String, owner: String, genesis_block: u64, json_output: bool) {
    let ledger = Ledger::open(&ledger_path);
    let state = ledger
        .deploy(Principal::new(owner), genesis_block)
        .unwrap_or_else(|e| exit_with_error(format!("failed to initialize {ledger_path}: {e}")));
    let state_digest = state
        .contract
        .state_digest()
        .unwrap_or_else(|e| exit_with_error(format!("failed to digest state: {e}")));

    if json_output {
        let payload = json!({
            "ledgerPath": ledger.path().display().to_string(),
            "journalPath": ledger.journal_path().display().to_string(),
            "owner": state.contract.owner(),
            "blockHeight": state.block_height,
            "stateDigest": state_digest,
        });
        print_json_or_exit(&payload, "init");
        return;
    }

    println!("meetproof init {ledger_path}");
    println!();
    println!("  owner: {}", state.contract.owner());
    println!("  genesis block: {}", state.block_height);
    println!("  journal: {}", ledger.journal_path().display());
    println!("  state digest: {state_digest}");
}
