#![allow(dead_code)]

use masktrace::mask::{ColumnMajor, Dims, Mask};
use masktrace::trace::TracedLoop;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Random masks up to `max_rows x max_cols`, with each pixel set at
/// roughly the given percentage.
pub fn arb_mask(max_rows: u32, max_cols: u32, fill_pct: u32) -> BoxedStrategy<Mask<ColumnMajor>> {
    (1..=max_rows, 1..=max_cols)
        .prop_flat_map(move |(rows, cols)| {
            let len = (rows * cols) as usize;
            proptest::collection::vec(0u32..100, len).prop_map(move |rolls| {
                let cells = rolls.into_iter().map(|r| u8::from(r < fill_pct)).collect();
                Mask::from_cells(Dims::new(rows, cols), cells).expect("cells match dims")
            })
        })
        .boxed()
}

/// Arbitrary run-length sequences, not necessarily summing to any size.
pub fn arb_counts(max_runs: usize, max_run: u32) -> BoxedStrategy<Vec<u32>> {
    proptest::collection::vec(0..=max_run, 0..=max_runs).boxed()
}

fn cell(mask: &Mask<ColumnMajor>, row: isize, col: isize) -> bool {
    row >= 0
        && col >= 0
        && (row as usize) < mask.rows()
        && (col as usize) < mask.cols()
        && mask.get(row as usize, col as usize)
}

/// Number of unit pixel edges separating foreground from background,
/// with everything outside the mask counted as background.
pub fn boundary_transitions(mask: &Mask<ColumnMajor>) -> u64 {
    let (rows, cols) = (mask.rows() as isize, mask.cols() as isize);
    let mut total = 0;
    for row in 0..rows {
        for col in 0..=cols {
            if cell(mask, row, col - 1) != cell(mask, row, col) {
                total += 1;
            }
        }
    }
    for col in 0..cols {
        for row in 0..=rows {
            if cell(mask, row - 1, col) != cell(mask, row, col) {
                total += 1;
            }
        }
    }
    total
}

/// Consecutive vertex pairs of a loop, closing edge included.
pub fn loop_edges(l: &TracedLoop) -> Vec<((u32, u32), (u32, u32))> {
    let v = l.vertices();
    (0..v.len())
        .map(|i| {
            let (a, b) = (v[i], v[(i + 1) % v.len()]);
            ((a.x, a.y), (b.x, b.y))
        })
        .collect()
}

/// Fills pixel centers whose summed winding number is nonzero.
pub fn fill_nonzero(loops: &[TracedLoop], dims: Dims) -> Mask<ColumnMajor> {
    Mask::from_fn(dims, |row, col| {
        let (x, y) = (col as f64 + 0.5, row as f64 + 0.5);
        loops.iter().map(|l| l.winding_number(x, y)).sum::<i32>() != 0
    })
}
