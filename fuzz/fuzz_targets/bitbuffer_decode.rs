//! Fuzz target for bit-packed mask decoding.
//!
//! Output size is capped so that long run codes cannot exhaust memory.

#![no_main]

use libfuzzer_sys::fuzz_target;
use masktrace::mask::BitBuffer;

const MAX_BITS: usize = 1 << 20;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(decoded) = BitBuffer::from_bytes(data.to_vec()).decode_bounded(MAX_BITS) {
        assert!(decoded.len() <= MAX_BITS);
    }
});
