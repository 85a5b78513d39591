#![no_main]

use autocomplete::{match_ranges, parse_rows};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let (body, query) = input.split_once('\0').unwrap_or((input, ""));
    for row in parse_rows(body) {
        // highlight ranges must always slice the label cleanly
        for range in match_ranges(&row.label, query) {
            assert!(row.label.get(range).is_some());
        }
    }
});
