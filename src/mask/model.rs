//! Dense mask buffers.
//!
//! RLE decoders expand into these types, and the tracer can re-encode a
//! column-major [`Mask`] back into run lengths.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

use super::order::{ColumnMajor, PixelOrder, RowMajor};
use crate::error::MasktraceError;

/// Mask dimensions, in the COCO `size` order `[rows, cols]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dims {
    /// Number of rows (image height).
    pub rows: u32,
    /// Number of columns (image width).
    pub cols: u32,
}

impl Dims {
    /// Creates dimensions from a row and column count.
    #[inline]
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Total number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Returns true if the mask has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A dense binary mask whose buffer layout is fixed by `TOrder`.
///
/// Cells hold `0` (background) or `1` (foreground).
#[derive(Clone, PartialEq, Eq)]
pub struct Mask<TOrder> {
    dims: Dims,
    cells: Vec<u8>,
    _order: PhantomData<TOrder>,
}

impl<TOrder: PixelOrder> Mask<TOrder> {
    /// Creates an all-background mask.
    pub fn empty(dims: Dims) -> Self {
        Self {
            dims,
            cells: vec![0; dims.len()],
            _order: PhantomData,
        }
    }

    /// Wraps an existing buffer, which must hold exactly `rows * cols` cells.
    pub fn from_cells(dims: Dims, cells: Vec<u8>) -> Result<Self, MasktraceError> {
        if cells.len() != dims.len() {
            return Err(MasktraceError::InvalidMaskSize {
                rows: dims.rows as u64,
                cols: dims.cols as u64,
                message: format!("buffer holds {} cells", cells.len()),
            });
        }
        Ok(Self {
            dims,
            cells,
            _order: PhantomData,
        })
    }

    /// Builds a mask by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(dims: Dims, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut mask = Self::empty(dims);
        for row in 0..dims.rows as usize {
            for col in 0..dims.cols as usize {
                if f(row, col) {
                    mask.set(row, col, true);
                }
            }
        }
        mask
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.dims.rows as usize
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.dims.cols as usize
    }

    /// The raw buffer in `TOrder` layout.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    pub fn into_cells(self) -> Vec<u8> {
        self.cells
    }

    /// Returns true if the pixel at `(row, col)` is foreground.
    ///
    /// # Panics
    /// Panics if `(row, col)` lies outside the mask.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[TOrder::index(self.rows(), self.cols(), row, col)] != 0
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        let idx = TOrder::index(self.rows(), self.cols(), row, col);
        self.cells[idx] = u8::from(value);
    }

    /// Number of foreground pixels.
    pub fn area(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }
}

impl Mask<ColumnMajor> {
    /// Re-encodes the mask as COCO run lengths.
    ///
    /// The sequence always starts with a background run, which is `0` when
    /// the first pixel is foreground. An empty mask yields an empty sequence.
    pub fn to_counts(&self) -> Vec<u32> {
        let mut counts = Vec::new();
        if self.cells.is_empty() {
            return counts;
        }

        let mut current = 0u8;
        let mut run = 0u32;
        for &cell in &self.cells {
            let value = u8::from(cell != 0);
            if value != current {
                counts.push(run);
                run = 0;
                current = value;
            }
            run += 1;
        }
        counts.push(run);
        counts
    }

    /// Copies the mask into row-major layout.
    pub fn to_row_major(&self) -> Mask<RowMajor> {
        Mask::from_fn(self.dims, |row, col| self.get(row, col))
    }
}

impl Mask<RowMajor> {
    /// Copies the mask into column-major layout.
    pub fn to_column_major(&self) -> Mask<ColumnMajor> {
        Mask::from_fn(self.dims, |row, col| self.get(row, col))
    }
}

impl<TOrder: PixelOrder> fmt::Debug for Mask<TOrder> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mask")
            .field("order", &TOrder::NAME)
            .field("dims", &self.dims)
            .field("area", &self.area())
            .finish()
    }
}

/// A column-major buffer of category labels ("everything" mode output).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMask {
    dims: Dims,
    labels: Vec<u32>,
}

impl LabelMask {
    /// Creates a mask where every pixel carries label `0`.
    pub fn empty(dims: Dims) -> Self {
        Self {
            dims,
            labels: vec![0; dims.len()],
        }
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    #[inline]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub(crate) fn labels_mut(&mut self) -> &mut [u32] {
        &mut self.labels
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        let rows = self.dims.rows as usize;
        let cols = self.dims.cols as usize;
        self.labels[ColumnMajor::index(rows, cols, row, col)]
    }

    /// Distinct labels present in the mask, in ascending order.
    pub fn distinct_labels(&self) -> BTreeSet<u32> {
        self.labels.iter().copied().collect()
    }

    /// Selects the pixels carrying `label` as a binary mask.
    pub fn binary_mask(&self, label: u32) -> Mask<ColumnMajor> {
        let cells = self.labels.iter().map(|&l| u8::from(l == label)).collect();
        Mask {
            dims: self.dims,
            cells,
            _order: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_uses_column_major_buffer() {
        // Only the pixel at row 0, col 1 is set; column-major puts it at index rows.
        let mask: Mask<ColumnMajor> = Mask::from_fn(Dims::new(2, 3), |r, c| r == 0 && c == 1);
        assert_eq!(mask.cells(), &[0, 0, 1, 0, 0, 0]);
        assert!(mask.get(0, 1));
        assert_eq!(mask.area(), 1);
    }

    #[test]
    fn test_row_major_conversion_transposes_buffer() {
        let mask: Mask<ColumnMajor> = Mask::from_fn(Dims::new(2, 3), |r, c| r == 0 && c == 1);
        let row_major = mask.to_row_major();
        assert_eq!(row_major.cells(), &[0, 1, 0, 0, 0, 0]);
        assert_eq!(row_major.to_column_major(), mask);
    }

    #[test]
    fn test_to_counts_starts_with_background() {
        let full: Mask<ColumnMajor> = Mask::from_fn(Dims::new(2, 2), |_, _| true);
        assert_eq!(full.to_counts(), vec![0, 4]);

        let empty: Mask<ColumnMajor> = Mask::empty(Dims::new(2, 2));
        assert_eq!(empty.to_counts(), vec![4]);
    }

    #[test]
    fn test_from_cells_rejects_wrong_length() {
        let result = Mask::<ColumnMajor>::from_cells(Dims::new(2, 2), vec![0; 3]);
        assert!(matches!(
            result,
            Err(MasktraceError::InvalidMaskSize { rows: 2, cols: 2, .. })
        ));
    }

    #[test]
    fn test_label_mask_binary_split() {
        let mut labels = LabelMask::empty(Dims::new(1, 3));
        labels.labels_mut().copy_from_slice(&[0, 7, 7]);
        assert_eq!(labels.distinct_labels().into_iter().collect::<Vec<_>>(), vec![0, 7]);
        assert_eq!(labels.binary_mask(7).cells(), &[0, 1, 1]);
        assert_eq!(labels.get(0, 2), 7);
    }
}
