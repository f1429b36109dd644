use crate::support::{exit_with_error, open_ledger_or_exit, print_json_or_exit};
use serde_json::json;

pub fn run(ledger_path: String, blocks: u64, json_output: bool) {
    let ledger = open_ledger_or_exit(&ledger_path);
    let block_height = ledger
        .mine(blocks)
        .unwrap_or_else(|e| exit_with_error(format!("mine failed: {e}")));

    if json_output {
        print_json_or_exit(
            &json!({ "blocks": blocks, "blockHeight": block_height }),
            "mine",
        );
        return;
    }
    println!("meetproof mine {blocks}");
    println!("  block height: {block_height}");
}
