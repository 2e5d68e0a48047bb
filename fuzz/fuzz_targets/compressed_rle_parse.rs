//! Fuzz target for compressed RLE string parsing.
//!
//! Arbitrary UTF-8 input is parsed as a COCO compressed RLE string and,
//! when it parses, re-encoded and parsed again.

#![no_main]

use libfuzzer_sys::fuzz_target;
use masktrace::mask::rle::{decode_compressed_counts, encode_compressed_rle};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(counts) = decode_compressed_counts(text) {
        let again = decode_compressed_counts(&encode_compressed_rle(&counts));
        assert_eq!(again.ok(), Some(counts));
    }
});
