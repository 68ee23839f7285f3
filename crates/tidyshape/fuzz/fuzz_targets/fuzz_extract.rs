//! Fuzz target for key extraction.
//!
//! Arbitrary labels run through a fixed key pattern in lenient mode; every
//! row must come back with one value per declared group.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tidyshape::extract::extract;
use tidyshape::{Column, DataType, ExtractMode, KeySpec, Table};

#[derive(Arbitrary, Debug)]
struct Input {
    labels: Vec<Option<String>>,
}

fuzz_target!(|input: Input| {
    if input.labels.len() > 10_000 {
        return;
    }
    let Ok(spec) = KeySpec::new(
        r"(?P<expt>[a-z]+\d*)_(?P<time>\d+)",
        &[("expt", DataType::Categorical), ("time", DataType::Integer)],
    ) else {
        return;
    };

    let rows = input.labels.len();
    let Ok(table) = Table::new(vec![Column::text("label", input.labels)]) else {
        return;
    };
    let keyed = extract(&table, "label", &spec, ExtractMode::Lenient).expect("lenient extraction never fails");
    assert_eq!(keyed.row_count(), rows);
    assert_eq!(keyed.column_names(), vec!["expt", "time"]);
});
