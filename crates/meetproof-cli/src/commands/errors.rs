use crate::support::print_json_or_exit;
use meetproof_kernel::error_registry::ERROR_CODE_REGISTRY_KIND;
use meetproof_kernel::{error_code_registry, error_code_registry_json};

pub fn run(json_output: bool) {
    if json_output {
        print_json_or_exit(&error_code_registry_json(), "error-code registry");
        return;
    }

    let registry = error_code_registry();
    println!("meetproof errors");
    println!("  Schema: 1");
    println!("  Registry kind: {ERROR_CODE_REGISTRY_KIND}");
    println!("  Mappings: {}", registry.len());
    for mapping in registry {
        println!("    {:>4}  {}", mapping.code, mapping.kind);
    }
}
