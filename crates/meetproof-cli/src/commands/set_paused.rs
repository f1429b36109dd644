use crate::support::{open_ledger_or_exit, transact_and_report};
use meetproof_kernel::Call;

pub fn run(ledger_path: String, caller: String, paused: bool, json_output: bool) {
    let ledger = open_ledger_or_exit(&ledger_path);
    transact_and_report(
        &ledger,
        caller,
        Call::SetContractPaused { paused },
        json_output,
    );
}
