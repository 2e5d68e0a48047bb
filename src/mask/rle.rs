//! COCO run-length encoding.
//!
//! This module covers the textual "compressed RLE" string format used by
//! COCO and pycocotools, and the expansion of run-length count arrays into
//! dense buffers.
//!
//! # Compressed string format
//!
//! Each value is written as a little-endian varint of 5-bit groups. A group
//! is stored as one character with code `48 + group`, where bit `0x20` marks
//! that more groups follow. If bit `0x10` is set in the last group, the value
//! is sign-extended. From the fourth value on, each value is stored as a
//! delta against the value two positions earlier.
//!
//! # Expansion dialects
//!
//! - [`expand_run_lengths`]: alternating background/foreground runs,
//!   column-major, clamped at the end of the buffer.
//! - [`expand_run_lengths_guarded`]: same, but stops before the first run
//!   that would not fit.
//! - [`expand_run_lengths_row_major`]: same runs, written into a row-major
//!   buffer.
//! - [`expand_labeled_runs`]: `(run length, label)` pairs for multi-category
//!   masks.

use super::model::{Dims, LabelMask, Mask};
use super::order::{ColumnMajor, PixelOrder, RowMajor};
use crate::error::MasktraceError;

const GROUP_BITS: u32 = 5;
const GROUP_MASK: i64 = 0x1f;
const MORE_FLAG: i64 = 0x20;
const SIGN_FLAG: i64 = 0x10;
const CHAR_OFFSET: u8 = 48;

/// Parses a compressed RLE string into the exact integers it encodes.
///
/// # Errors
/// Fails on characters outside `'0'..='o'`, on input that ends in the
/// middle of a value, and on values wider than 64 bits.
///
/// # Example
/// ```
/// use masktrace::mask::rle::parse_compressed_rle;
///
/// assert_eq!(parse_compressed_rle("0`0")?, vec![0, 16]);
/// # Ok::<(), masktrace::MasktraceError>(())
/// ```
pub fn parse_compressed_rle(text: &str) -> Result<Vec<i64>, MasktraceError> {
    let bytes = text.as_bytes();
    let mut values: Vec<i64> = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let start = offset;
        // Wide enough that any bit beyond i64 shows up after the last group.
        let mut wide: i128 = 0;
        let mut group = 0u32;

        loop {
            let byte = *bytes
                .get(offset)
                .ok_or(MasktraceError::UnterminatedRleValue)?;
            let code = match byte.checked_sub(CHAR_OFFSET) {
                Some(code) if code <= 0x3f => code as i64,
                _ => {
                    return Err(MasktraceError::InvalidRleCharacter {
                        offset,
                        character: byte as char,
                    })
                }
            };

            let shift = GROUP_BITS * group;
            if shift >= i64::BITS {
                return Err(MasktraceError::RleValueOverflow { offset: start });
            }
            wide |= ((code & GROUP_MASK) as i128) << shift;
            offset += 1;
            group += 1;

            if code & MORE_FLAG == 0 {
                if code & SIGN_FLAG != 0 {
                    wide |= -1i128 << (GROUP_BITS * group);
                }
                break;
            }
        }

        let mut value =
            i64::try_from(wide).map_err(|_| MasktraceError::RleValueOverflow { offset: start })?;
        if values.len() > 2 {
            value = value
                .checked_add(values[values.len() - 2])
                .ok_or(MasktraceError::RleValueOverflow { offset: start })?;
        }
        values.push(value);
    }

    Ok(values)
}

/// Parses a compressed RLE string into pixel counts.
///
/// Like [`parse_compressed_rle`], but every value must be a valid `u32`
/// run length.
pub fn decode_compressed_counts(text: &str) -> Result<Vec<u32>, MasktraceError> {
    parse_compressed_rle(text)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            u32::try_from(value).map_err(|_| MasktraceError::NegativeRunLength { index, value })
        })
        .collect()
}

/// Encodes run-length counts into the compressed string format.
///
/// This is the inverse of [`parse_compressed_rle`] and produces the same
/// strings as pycocotools.
pub fn encode_compressed_rle(counts: &[u32]) -> String {
    let mut out = String::new();
    for (i, &count) in counts.iter().enumerate() {
        let mut x = count as i64;
        if i > 2 {
            x -= counts[i - 2] as i64;
        }

        loop {
            let mut code = x & GROUP_MASK;
            x >>= GROUP_BITS;
            let more = if code & SIGN_FLAG != 0 { x != -1 } else { x != 0 };
            if more {
                code |= MORE_FLAG;
            }
            out.push(char::from(code as u8 + CHAR_OFFSET));
            if !more {
                break;
            }
        }
    }
    out
}

/// Expands alternating background/foreground runs into a column-major mask.
///
/// Runs that extend past `rows * cols` are clamped at the end of the buffer.
pub fn expand_run_lengths(dims: Dims, counts: &[u32]) -> Mask<ColumnMajor> {
    let mut mask = Mask::empty(dims);
    let cells = mask.cells_mut();
    let mut pos = 0usize;
    let mut value = 0u8;

    for &count in counts {
        if pos >= cells.len() {
            break;
        }
        let end = pos.saturating_add(count as usize).min(cells.len());
        if value == 1 {
            cells[pos..end].fill(1);
        }
        pos = end;
        value ^= 1;
    }

    mask
}

/// Defensive variant of [`expand_run_lengths`].
///
/// Filling stops, without error, before the first run whose accumulated
/// length would exceed the buffer. Nothing of that run is written.
pub fn expand_run_lengths_guarded(dims: Dims, counts: &[u32]) -> Mask<ColumnMajor> {
    let mut mask = Mask::empty(dims);
    let cells = mask.cells_mut();
    let mut total = 0usize;
    let mut value = 0u8;

    for &count in counts {
        let next = total.saturating_add(count as usize);
        if next > cells.len() {
            break;
        }
        if value == 1 {
            cells[total..next].fill(1);
        }
        total = next;
        value ^= 1;
    }

    mask
}

/// Expands `(zeros, ones)` run pairs into a row-major mask.
///
/// Run positions are column-major as in every COCO RLE; each foreground
/// pixel at flat position `p` is stored at `row * cols + col` with
/// `row = p % rows` and `col = p / rows`. Filling stops at the end of the
/// mask.
pub fn expand_run_lengths_row_major(dims: Dims, counts: &[u32]) -> Mask<RowMajor> {
    let mut mask = Mask::empty(dims);
    let (rows, cols) = (mask.rows(), mask.cols());
    let len = dims.len();
    let mut pos = 0usize;

    for pair in counts.chunks(2) {
        pos = pos.saturating_add(pair[0] as usize);
        let ones = pair.get(1).copied().unwrap_or(0) as usize;
        let end = pos.saturating_add(ones).min(len);
        for p in pos..end {
            let (row, col) = ColumnMajor::position(rows, cols, p);
            mask.set(row, col, true);
        }
        pos = pos.saturating_add(ones);
        if pos >= len {
            break;
        }
    }

    mask
}

/// Expands `(run length, label)` pairs into a column-major label mask.
///
/// Runs past the end of the buffer are clamped and a trailing run length
/// without a label is ignored.
pub fn expand_labeled_runs(dims: Dims, pairs: &[u32]) -> LabelMask {
    let mut mask = LabelMask::empty(dims);
    let labels = mask.labels_mut();
    let mut pos = 0usize;

    for pair in pairs.chunks_exact(2) {
        let (run, label) = (pair[0] as usize, pair[1]);
        let end = pos.saturating_add(run).min(labels.len());
        labels[pos..end].fill(label);
        pos = end;
    }

    mask
}

/// Number of foreground pixels described by `counts`.
pub fn area(counts: &[u32]) -> u64 {
    counts.iter().skip(1).step_by(2).map(|&c| c as u64).sum()
}

/// Bounding box `[x, y, width, height]` of the foreground, computed from
/// the runs without expanding them. Returns `None` for an empty mask.
pub fn bbox(dims: Dims, counts: &[u32]) -> Option<[u32; 4]> {
    let height = dims.rows as u64;
    if height == 0 {
        return None;
    }

    let (mut xs, mut xe) = (u64::MAX, 0u64);
    let (mut ys, mut ye) = (u64::MAX, 0u64);
    let mut offset = 0u64;

    for (i, &count) in counts.iter().enumerate() {
        let count = count as u64;
        if i % 2 == 1 && count > 0 {
            let last = offset + count - 1;
            let (x1, y1) = (offset / height, offset % height);
            let (x2, y2) = (last / height, last % height);

            xs = xs.min(x1);
            xe = xe.max(x2 + 1);
            // A run that wraps into the next column touches both the last
            // and the first row.
            if x1 != x2 {
                ys = 0;
                ye = height;
            } else {
                ys = ys.min(y1);
                ye = ye.max(y2 + 1);
            }
        }
        offset += count;
    }

    if xs == u64::MAX {
        return None;
    }
    Some([xs as u32, ys as u32, (xe - xs) as u32, (ye - ys) as u32])
}

/// Cuts `counts` so they cover at most `total` pixels.
///
/// The run that crosses the limit is shortened and everything after it is
/// dropped.
pub fn clamp_counts(counts: &[u32], total: u64) -> Vec<u32> {
    let mut clamped = Vec::with_capacity(counts.len());
    let mut remaining = total;
    for &count in counts {
        if remaining == 0 {
            break;
        }
        let run = (count as u64).min(remaining);
        clamped.push(run as u32);
        remaining -= run;
    }
    clamped
}

/// Sum of all counts, to compare against `rows * cols`.
pub fn total_pixels(counts: &[u32]) -> u64 {
    counts.iter().map(|&c| c as u64).sum()
}
