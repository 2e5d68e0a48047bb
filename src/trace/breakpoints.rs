//! Per-column fill toggles.

use serde::Serialize;

/// Rows at which the fill of one column flips.
///
/// A column starts as background at row 0 and flips at every listed row.
/// `points` is strictly increasing; a point equal to the mask height
/// closes a run that reaches the bottom of the column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Breakpoint {
    pub column: u32,
    pub points: Vec<u32>,
}

impl Breakpoint {
    pub fn new(column: u32, points: Vec<u32>) -> Self {
        Self { column, points }
    }
}

#[derive(Default)]
struct ColumnCollector {
    finished: Vec<Breakpoint>,
    current: Option<Breakpoint>,
}

impl ColumnCollector {
    fn toggle(&mut self, column: u32, row: u32) {
        if self.current.as_ref().is_some_and(|bp| bp.column != column) {
            self.flush();
        }
        let current = self
            .current
            .get_or_insert_with(|| Breakpoint::new(column, Vec::new()));

        // Two flips at the same row cancel out.
        if current.points.last() == Some(&row) {
            current.points.pop();
        } else {
            current.points.push(row);
        }
    }

    fn flush(&mut self) {
        if let Some(bp) = self.current.take() {
            if !bp.points.is_empty() {
                self.finished.push(bp);
            }
        }
    }

    fn finish(mut self) -> Vec<Breakpoint> {
        self.flush();
        self.finished
    }
}

/// Converts column-major RLE counts into per-column breakpoints.
///
/// Counts are read as `(background, foreground)` pairs; a trailing
/// unpaired count is background and ignored. Columns without any toggle
/// are omitted. A `height` of zero yields no breakpoints.
///
/// ```
/// use masktrace::trace::{line_breakpoints, Breakpoint};
///
/// // 3 rows, one run covering rows 1..3 of column 0 and row 0 of column 1
/// let bps = line_breakpoints(&[1, 3], 3);
/// assert_eq!(bps, vec![Breakpoint::new(0, vec![1, 3]), Breakpoint::new(1, vec![0, 1])]);
/// ```
pub fn line_breakpoints(counts: &[u32], height: u32) -> Vec<Breakpoint> {
    if height == 0 {
        return Vec::new();
    }

    let height64 = height as u64;
    let mut collector = ColumnCollector::default();
    let mut offset = 0u64;

    for pair in counts.chunks_exact(2) {
        offset += pair[0] as u64;
        let start = offset;
        offset += pair[1] as u64;
        let end = offset;

        let (Some(x1), Some(x2)) = (column_of(start, height64), column_of(end, height64)) else {
            break;
        };
        let (y1, y2) = ((start % height64) as u32, (end % height64) as u32);

        if x1 == x2 {
            collector.toggle(x1, y1);
            collector.toggle(x1, y2);
            continue;
        }

        collector.toggle(x1, y1);
        collector.toggle(x1, height);
        for x in x1 + 1..x2 {
            collector.toggle(x, 0);
            collector.toggle(x, height);
        }
        if y2 > 0 {
            collector.toggle(x2, 0);
            collector.toggle(x2, y2);
        }
    }

    collector.finish()
}

/// Column holding flat position `offset`, if it is addressable. The last
/// `u32` column is kept free so the boundary after it still fits.
fn column_of(offset: u64, height: u64) -> Option<u32> {
    u32::try_from(offset / height)
        .ok()
        .filter(|&column| column < u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_square() {
        let bps = line_breakpoints(&[0, 16], 4);
        assert_eq!(bps.len(), 4);
        for (i, bp) in bps.iter().enumerate() {
            assert_eq!(bp.column, i as u32);
            assert_eq!(bp.points, vec![0, 4]);
        }
    }

    #[test]
    fn test_ring() {
        // 6x6 with a 2x2 hole at rows 2..4, cols 2..4
        let bps = line_breakpoints(&[0, 14, 2, 4, 2, 14], 6);
        let points: Vec<Vec<u32>> = bps.iter().map(|bp| bp.points.clone()).collect();
        assert_eq!(
            points,
            vec![
                vec![0, 6],
                vec![0, 6],
                vec![0, 2, 4, 6],
                vec![0, 2, 4, 6],
                vec![0, 6],
                vec![0, 6],
            ]
        );
    }

    #[test]
    fn test_empty_columns_are_omitted() {
        // 2 rows: column 0 full, column 1 empty, column 2 row 1
        let bps = line_breakpoints(&[0, 2, 3, 1], 2);
        assert_eq!(
            bps,
            vec![Breakpoint::new(0, vec![0, 2]), Breakpoint::new(2, vec![1, 2])]
        );
    }

    #[test]
    fn test_zero_length_runs_cancel() {
        // A zero-length background run between two foreground runs
        let bps = line_breakpoints(&[1, 1, 0, 1, 1], 4);
        assert_eq!(bps, vec![Breakpoint::new(0, vec![1, 3])]);
    }

    #[test]
    fn test_zero_height_and_empty_counts() {
        assert!(line_breakpoints(&[0, 4], 0).is_empty());
        assert!(line_breakpoints(&[], 4).is_empty());
        assert!(line_breakpoints(&[16], 4).is_empty());
    }
}
