#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let once = neue::sanitize::sanitize(s);
        let twice = neue::sanitize::sanitize(&once);
        assert_eq!(once, twice, "sanitizing sanitized HTML changed it");
    }
});
