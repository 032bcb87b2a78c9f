#![no_main]
use libfuzzer_sys::fuzz_target;
use rulecraft_json::parse_json;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(value) = parse_json(input) {
        let printed = value.to_string();
        assert!(
            parse_json(&printed).is_ok(),
            "printed form of a parsed document was rejected: {printed:?}"
        );
    }
});
