#![no_main]

// Harness: arbitrary bytes as JSON commands. Decoding may fail but must not
// panic, and anything that decodes must re-encode to an equal command.

use libfuzzer_sys::fuzz_target;
use amm_ledger_core::kernel::Command;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else { return };
    if let Ok(cmd) = Command::from_json(text) {
        let json = cmd.to_json().unwrap();
        assert_eq!(Command::from_json(&json).unwrap(), cmd);
    }
});
