//! Fuzz target for boundary tracing on arbitrary run lengths.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let _ = masktrace::trace::fuzz_trace_bytes(data);
});
