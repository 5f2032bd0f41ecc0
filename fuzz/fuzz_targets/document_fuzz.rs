#![no_main]
use bindelta::{DeltaDocument, apply_delta};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary documents must either be rejected or apply without panicking.
    let Ok(doc) = DeltaDocument::from_slice(data) else {
        return;
    };
    let base: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
    if let Ok(out) = apply_delta(&base, doc.delta()) {
        let _ = doc.verify_output(&out);
    }
});
