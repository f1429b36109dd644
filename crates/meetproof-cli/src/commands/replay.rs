use crate::support::{exit_with_error, open_ledger_or_exit, print_json_or_exit, yes_no};

pub fn run(ledger_path: String, json_output: bool) {
    let ledger = open_ledger_or_exit(&ledger_path);
    let report = ledger
        .replay()
        .unwrap_or_else(|e| exit_with_error(format!("replay failed: {e}")));

    if json_output {
        print_json_or_exit(&report, "replay");
    } else {
        println!("meetproof replay {ledger_path}");
        println!();
        println!("  records: {}", report.records);
        println!("  calls: {}", report.calls);
        println!("  block height: {}", report.block_height);
        println!("  final digest: {}", report.final_digest);
        println!("  matches ledger: {}", yes_no(report.matches_ledger));
    }

    if !report.matches_ledger {
        std::process::exit(1);
    }
}
