#![no_main]

use libfuzzer_sys::fuzz_target;
use markup::{Descendants, parse_fragment, tokenize};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let _ = tokenize(input);
    let roots = parse_fragment(input);
    for node in Descendants::new(&roots) {
        let _ = node.text_content();
    }
});
