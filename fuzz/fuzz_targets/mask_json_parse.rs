//! Fuzz target for mask JSON documents.
//!
//! This fuzzer feeds arbitrary byte sequences to the mask document reader,
//! checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use masktrace::mask::io_json::from_mask_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_mask_slice(data);
});
