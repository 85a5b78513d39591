#![no_main]

use autocomplete::OptionList;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(list) = OptionList::from_json(input) else {
        return;
    };
    let json = list.to_json().expect("serializing a parsed list");
    let again = OptionList::from_json(&json).expect("reparsing serialized list");
    assert_eq!(again.len(), list.len());
});
