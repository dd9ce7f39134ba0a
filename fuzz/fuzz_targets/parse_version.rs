#![no_main]

use std::cmp::Ordering;

use libfuzzer_sys::fuzz_target;
use vitals_core::version;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (left, right) = text.split_once('|').unwrap_or((text, text));

    let _ = version::parse(left);
    let forward = version::compare(left, right);
    let backward = version::compare(right, left);
    assert_eq!(forward, backward.reverse());
    assert_eq!(version::compare(left, left), Ordering::Equal);
});
