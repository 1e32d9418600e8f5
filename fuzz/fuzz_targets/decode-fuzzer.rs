#![no_main]

use libfuzzer_sys::fuzz_target;
use restable::{Idmap, ResourceTable, parse_qualifiers};

fuzz_target!(|data: &[u8]| {
    // must provide at least a chunk header
    if data.len() < 8 {
        return;
    }

    let _ = ResourceTable::decode(data.to_vec());
    let _ = Idmap::parse(data);

    if let Ok(qualifiers) = std::str::from_utf8(data) {
        let _ = parse_qualifiers(qualifiers);
    }
});
