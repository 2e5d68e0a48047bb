//! Pixel-order marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to distinguish
//! between the two flattening conventions found in RLE mask producers. A
//! mask decoded under one convention cannot be passed where the other is
//! expected without an explicit conversion.

use std::fmt;

/// Addressing rule that maps a `(row, col)` pixel to its flat buffer index.
pub trait PixelOrder {
    /// Short name used in reports and debug output.
    const NAME: &'static str;

    /// Returns the flat index of `(row, col)` in a `rows x cols` buffer.
    fn index(rows: usize, cols: usize, row: usize, col: usize) -> usize;

    /// Inverse of [`PixelOrder::index`].
    fn position(rows: usize, cols: usize, index: usize) -> (usize, usize);
}

/// Marker type for column-major (Fortran order) buffers.
///
/// This is the native order of COCO RLE: flat position `p` is the pixel at
/// `row = p % rows`, `col = p / rows`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnMajor {}

/// Marker type for row-major buffers.
///
/// Pixel `(row, col)` lives at `row * cols + col`. Some decoders write RLE
/// runs into this layout even though the runs themselves are column-major.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowMajor {}

impl PixelOrder for ColumnMajor {
    const NAME: &'static str = "column-major";

    #[inline]
    fn index(rows: usize, _cols: usize, row: usize, col: usize) -> usize {
        col * rows + row
    }

    #[inline]
    fn position(rows: usize, _cols: usize, index: usize) -> (usize, usize) {
        (index % rows, index / rows)
    }
}

impl PixelOrder for RowMajor {
    const NAME: &'static str = "row-major";

    #[inline]
    fn index(_rows: usize, cols: usize, row: usize, col: usize) -> usize {
        row * cols + col
    }

    #[inline]
    fn position(_rows: usize, cols: usize, index: usize) -> (usize, usize) {
        (index / cols, index % cols)
    }
}

impl fmt::Debug for ColumnMajor {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since ColumnMajor has no variants
    }
}

impl fmt::Debug for RowMajor {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since RowMajor has no variants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_major_matches_coco_addressing() {
        // 3 rows x 2 cols: p = 4 is row 1 of column 1
        assert_eq!(ColumnMajor::position(3, 2, 4), (1, 1));
        assert_eq!(ColumnMajor::index(3, 2, 1, 1), 4);
    }

    #[test]
    fn test_row_major_matches_transposed_addressing() {
        assert_eq!(RowMajor::index(3, 2, 1, 1), 3);
        assert_eq!(RowMajor::position(3, 2, 3), (1, 1));
    }
}
