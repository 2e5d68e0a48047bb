//! Bit-packed run-length mask codec.
//!
//! # Wire format
//!
//! A packed mask is a little-endian bit stream (bit `i` lives in byte
//! `i / 8` at position `i % 8`):
//!
//! - 2 bits: version, must be `00`
//! - 1 bit: value of the first run
//! - run codes until the end of the stream, the value flipping after each run:
//!   - `1` for a run of length 1
//!   - `0 1` + 4 bits (LSB first) for lengths `2..16`
//!   - `0 0` + groups of 7 bits (LSB first) each followed by a continuation
//!     bit, for lengths `>= 16`
//!
//! A decoded run of length `0` ends the stream. This is also what the zero
//! padding at the end of a byte-aligned buffer decodes to.

use std::fmt;

use crate::error::MasktraceError;

/// Growth never allocates fewer than this many bits.
const MIN_CAPACITY_BITS: usize = 1024;

/// A growable, bit-addressed buffer.
///
/// Storage is always zero-initialised, so appending zero bits only advances
/// [`BitBuffer::len`] and never writes to the underlying bytes.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuffer {
    /// Creates an empty buffer with no storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with `byte_capacity` bytes preallocated.
    pub fn with_capacity(byte_capacity: usize) -> Self {
        Self {
            bytes: vec![0; byte_capacity],
            len: 0,
        }
    }

    /// Wraps packed bytes; every bit of `bytes` counts as used.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len() * 8;
        Self { bytes, len }
    }

    /// Expands alternating run lengths (starting with `0` bits) into bits.
    pub fn from_runs(runs: &[u32]) -> Self {
        let mut buffer = Self::new();
        let mut value = false;
        for &run in runs {
            buffer.append(value, run as usize);
            value = !value;
        }
        buffer
    }

    /// Encodes alternating RLE counts (starting with background) into the
    /// packed wire format.
    ///
    /// Zero-length runs are dropped and same-valued neighbours merged, so a
    /// leading `0` count makes the first run a foreground run.
    pub fn encode_counts(counts: &[u32]) -> Self {
        let mut runs: Vec<(bool, u64)> = Vec::new();
        let mut value = false;
        for &count in counts {
            if count > 0 {
                match runs.last_mut() {
                    Some((last, len)) if *last == value => *len += count as u64,
                    _ => runs.push((value, count as u64)),
                }
            }
            value = !value;
        }

        let mut buffer = Self::new();
        buffer.append(false, 2);
        buffer.append_bit(runs.first().is_some_and(|&(v, _)| v));
        for &(_, len) in &runs {
            buffer.append_run(len);
        }
        buffer
    }

    /// Number of bits in use.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bits allocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len() * 8
    }

    fn expand(&mut self) {
        let new_size = (self.bytes.len() * 2).max(MIN_CAPACITY_BITS / 8);
        self.bytes.resize(new_size, 0);
    }

    fn reserve_bits(&mut self, additional: usize) {
        while self.len + additional > self.capacity() {
            self.expand();
        }
    }

    /// Appends a single bit.
    pub fn append_bit(&mut self, bit: bool) {
        self.reserve_bits(1);
        if bit {
            self.bytes[self.len >> 3] |= 1u8 << (self.len % 8);
        }
        self.len += 1;
    }

    /// Appends `count` copies of `bit`.
    pub fn append(&mut self, bit: bool, count: usize) {
        self.reserve_bits(count);
        if !bit {
            self.len += count;
            return;
        }

        let mut remaining = count;
        while remaining > 0 {
            if self.len % 8 == 0 && remaining >= 8 {
                self.bytes[self.len >> 3] = 0xff;
                self.len += 8;
                remaining -= 8;
            } else {
                self.bytes[self.len >> 3] |= 1u8 << (self.len % 8);
                self.len += 1;
                remaining -= 1;
            }
        }
    }

    fn append_low_bits(&mut self, value: u64, bits: u32) {
        for shift in 0..bits {
            self.append_bit((value >> shift) & 1 == 1);
        }
    }

    /// Appends the variable-length code for a run of `len` bits.
    ///
    /// `len == 0` produces the short-form code for zero, which decoders
    /// treat as end of stream.
    pub fn append_run(&mut self, len: u64) {
        if len == 1 {
            self.append_bit(true);
        } else if len < 16 {
            self.append_bit(false);
            self.append_bit(true);
            self.append_low_bits(len, 4);
        } else {
            self.append(false, 2);
            let mut rest = len;
            while rest > 127 {
                self.append_low_bits(rest, 7);
                self.append_bit(true);
                rest >>= 7;
            }
            self.append_low_bits(rest, 7);
            self.append_bit(false);
        }
    }

    /// Reads the bit at `position`. Bits past the stored bytes read as `0`.
    #[inline]
    pub fn read_bit(&self, position: usize) -> bool {
        self.bytes
            .get(position >> 3)
            .is_some_and(|&byte| (byte >> (position % 8)) & 1 == 1)
    }

    /// Reads the run code starting at `position`.
    ///
    /// Returns `(bits consumed, run length)`.
    pub fn read_run(&self, position: usize) -> Result<(usize, u64), MasktraceError> {
        if self.read_bit(position) {
            return Ok((1, 1));
        }

        if self.read_bit(position + 1) {
            let mut value = 0u64;
            for shift in 0..4 {
                if self.read_bit(position + 2 + shift) {
                    value |= 1u64 << shift;
                }
            }
            return Ok((6, value));
        }

        let mut cursor = position + 2;
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            for _ in 0..7 {
                if self.read_bit(cursor) {
                    if shift >= u64::BITS {
                        return Err(MasktraceError::RunLengthOverflow { position });
                    }
                    value |= 1u64 << shift;
                }
                shift += 1;
                cursor += 1;
            }
            let more = self.read_bit(cursor);
            cursor += 1;
            if !more {
                break;
            }
        }

        Ok((cursor - position, value))
    }

    /// Decodes a packed buffer into the bit sequence it describes.
    pub fn decode(&self) -> Result<BitBuffer, MasktraceError> {
        self.decode_bounded(usize::MAX)
    }

    /// Like [`BitBuffer::decode`], but stops once `max_bits` bits have been
    /// produced, truncating the final run.
    pub fn decode_bounded(&self, max_bits: usize) -> Result<BitBuffer, MasktraceError> {
        if self.read_bit(0) || self.read_bit(1) {
            return Err(MasktraceError::InvalidVersion);
        }

        let mut out = BitBuffer::new();
        let mut pos = 2;
        let mut value = self.read_bit(pos);
        pos += 1;

        while pos < self.len && out.len < max_bits {
            let (bits, run) = self.read_run(pos)?;
            // NOTE: a zero run ends the stream even if more input follows.
            if run == 0 {
                break;
            }
            pos += bits;

            let room = max_bits - out.len;
            let run = usize::try_from(run).map_or(room, |run| run.min(room));
            out.append(value, run);
            value = !value;
        }

        Ok(out)
    }

    /// The used bits as bytes, padded with zeros to a byte boundary.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes[..self.len.div_ceil(8)].to_vec()
    }

    /// Iterates over the used bits.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |pos| self.read_bit(pos))
    }

    /// Converts the used bits back into alternating run lengths starting with
    /// a `0` run (which is empty when the first bit is set).
    pub fn to_counts(&self) -> Vec<u32> {
        let mut counts = Vec::new();
        if self.len == 0 {
            return counts;
        }

        let mut current = false;
        let mut run = 0u32;
        for bit in self.bits() {
            if bit != current {
                counts.push(run);
                run = 0;
                current = bit;
            }
            run += 1;
        }
        counts.push(run);
        counts
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}
