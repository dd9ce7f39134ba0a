#![no_main]

use libfuzzer_sys::fuzz_target;
use vitals_core::model::{PageRecord, RawAudit};
use vitals_core::page;
use vitals_core::source::PathSourceResolver;

fuzz_target!(|data: &[u8]| {
    let Ok(audit) = serde_json::from_slice::<RawAudit>(data) else {
        return;
    };

    let resolver = PathSourceResolver::new(Some("example.com".to_string()));
    let record = page::diff(&audit, None, &resolver);
    let again = page::diff(&audit, Some(&record), &resolver);

    let encoded = serde_json::to_vec(&again).expect("page record serializes");
    let _ = serde_json::from_slice::<PageRecord>(&encoded);
});
