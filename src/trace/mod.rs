//! Mask boundary tracing.
//!
//! Tracing turns a column-major RLE mask into closed polygon loops in
//! three steps:
//!
//! 1. [`line_breakpoints`]: the rows at which each column's fill flips.
//! 2. [`SegmentGraph::from_breakpoints`]: the pixel-boundary edges between
//!    neighbouring columns, with straight runs merged into single edges.
//!    Pixels that touch only at a corner meet at a [`Pinch`] vertex, where
//!    the loop walk keeps the foreground connected.
//! 3. [`assemble_paths`]: the graph is walked into loops, and loops nested
//!    inside an odd number of others are reversed so that filling the
//!    result under the nonzero rule leaves holes empty.
//!
//! # Example
//!
//! ```
//! use masktrace::trace::trace_paths;
//!
//! let paths = trace_paths(&[0, 16], 4)?;
//! assert_eq!(paths, vec!["M 0 0 L 0 4 L 4 4 L 4 0"]);
//! # Ok::<(), masktrace::MasktraceError>(())
//! ```

mod assemble;
mod breakpoints;
mod graph;

pub use assemble::{
    assemble_paths, extract_loops, orient_loops, winding_number, EvenOdd, NonzeroWinding,
    PointInPolygon, TracedLoop,
};
pub use breakpoints::{line_breakpoints, Breakpoint};
pub use graph::{Pinch, SegmentGraph, Vertex};

use crate::error::MasktraceError;
use crate::mask::{rle, ColumnMajor, Dims, Mask};

/// Traces the boundary of an RLE mask with nonzero-winding containment.
pub fn trace_counts(counts: &[u32], height: u32) -> Result<Vec<TracedLoop>, MasktraceError> {
    trace_counts_with(counts, height, &NonzeroWinding)
}

/// Traces the boundary of an RLE mask using the given containment test.
pub fn trace_counts_with<P: PointInPolygon + ?Sized>(
    counts: &[u32],
    height: u32,
    containment: &P,
) -> Result<Vec<TracedLoop>, MasktraceError> {
    let breakpoints = line_breakpoints(counts, height);
    let graph = SegmentGraph::from_breakpoints(&breakpoints);
    let (vertices, edges, pinches) = (graph.vertex_count(), graph.edge_count(), graph.pinch_count());

    let loops = assemble_paths(graph, containment)?;

    tracing::debug!(
        columns = breakpoints.len(),
        vertices,
        edges,
        pinches,
        loops = loops.len(),
        holes = loops.iter().filter(|l| l.is_hole()).count(),
        "traced mask"
    );
    Ok(loops)
}

/// Traces the runs of a mask of known size.
///
/// Runs reaching past `rows * cols` are cut at the end of the mask, so the
/// loops always stay inside it.
pub fn trace_sized_with<P: PointInPolygon + ?Sized>(
    dims: Dims,
    counts: &[u32],
    containment: &P,
) -> Result<Vec<TracedLoop>, MasktraceError> {
    let counts = rle::clamp_counts(counts, dims.len() as u64);
    trace_counts_with(&counts, dims.rows, containment)
}

/// [`trace_sized_with`] with nonzero-winding containment.
pub fn trace_sized(dims: Dims, counts: &[u32]) -> Result<Vec<TracedLoop>, MasktraceError> {
    trace_sized_with(dims, counts, &NonzeroWinding)
}

/// Traces an RLE mask straight to path strings.
pub fn trace_paths(counts: &[u32], height: u32) -> Result<Vec<String>, MasktraceError> {
    Ok(trace_counts(counts, height)?
        .iter()
        .map(TracedLoop::to_path_string)
        .collect())
}

/// Traces a dense column-major mask.
pub fn trace_mask(mask: &Mask<ColumnMajor>) -> Result<Vec<TracedLoop>, MasktraceError> {
    trace_counts(&mask.to_counts(), mask.dims().rows)
}

/// Fuzz-only entrypoint: the first byte picks the mask height and every
/// following byte is one run length.
#[cfg(feature = "fuzzing")]
pub fn fuzz_trace_bytes(data: &[u8]) -> Result<(), MasktraceError> {
    let Some((&height, runs)) = data.split_first() else {
        return Ok(());
    };
    let counts: Vec<u32> = runs.iter().map(|&b| b as u32).collect();
    let _ = trace_counts(&counts, height as u32 + 1)?;
    Ok(())
}
