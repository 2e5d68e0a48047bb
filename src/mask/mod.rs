//! Mask codecs and dense mask buffers.
//!
//! Segmentation masks arrive in one of two run-length encodings:
//!
//! 1. **Compressed RLE** ([`rle`]): the COCO textual format, a string of
//!    5-bit varint groups that decodes to alternating background and
//!    foreground run lengths.
//!
//! 2. **Bit-packed runs** ([`bitbuffer`]): a version header, an initial
//!    bit value and a sequence of variable-length run codes.
//!
//! Both decode to a run-length `counts` sequence, which can be expanded
//! into a typed dense [`Mask`] or handed straight to the tracer.
//!
//! # Pixel order
//!
//! RLE runs always walk the image column by column. Dense buffers carry
//! their layout as a type parameter ([`ColumnMajor`] or [`RowMajor`]) so a
//! buffer built under one convention cannot be read under the other.
//!
//! # Example
//!
//! ```
//! use masktrace::mask::{rle, Dims};
//!
//! let counts = rle::decode_compressed_counts("0`0")?;
//! let mask = rle::expand_run_lengths(Dims::new(4, 4), &counts);
//! assert_eq!(mask.area(), 16);
//! assert_eq!(mask.to_counts(), counts);
//! # Ok::<(), masktrace::MasktraceError>(())
//! ```

pub mod bitbuffer;
mod color;
pub mod io_json;
mod model;
mod order;
pub mod rle;

pub use bitbuffer::BitBuffer;
pub use color::{Color, ColorMap};
pub use io_json::{MaskEntry, MaskKind};
pub use model::{Dims, LabelMask, Mask};
pub use order::{ColumnMajor, PixelOrder, RowMajor};
