//! Fuzz target for the table readers.
//!
//! This fuzzer tests that the delimited and JSON readers:
//! 1. Never panic on malformed input
//! 2. Only return tables that satisfy the column invariants

#![no_main]

use libfuzzer_sys::fuzz_target;
use tidyshape::TableReader;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let reader = TableReader::new();
    if let Ok(table) = reader.read_bytes(data) {
        for column in table.columns() {
            assert_eq!(column.len(), table.row_count());
        }
    }
    let _ = reader.read_json(data);
});
