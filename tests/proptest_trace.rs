use masktrace::trace::{line_breakpoints, trace_counts, trace_mask, SegmentGraph};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn breakpoints_are_strictly_increasing(mask in proptest_helpers::arb_mask(12, 12, 50)) {
        let height = mask.dims().rows;
        let mut last_column = None;
        for bp in line_breakpoints(&mask.to_counts(), height) {
            prop_assert!(last_column.map_or(true, |c| c < bp.column));
            prop_assert!(!bp.points.is_empty());
            prop_assert!(bp.points.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(bp.points.iter().all(|&y| y <= height));
            last_column = Some(bp.column);
        }
    }

    #[test]
    fn only_pinches_have_degree_four(mask in proptest_helpers::arb_mask(12, 12, 50)) {
        let graph = SegmentGraph::from_counts(&mask.to_counts(), mask.dims().rows);
        for v in graph.vertices() {
            let expected = if graph.pinch(v).is_some() { 4 } else { 2 };
            prop_assert_eq!(graph.degree(v), expected, "vertex {:?}", v);
        }
    }

    #[test]
    fn nonzero_fill_of_loops_restores_mask(mask in proptest_helpers::arb_mask(10, 10, 50)) {
        let loops = trace_mask(&mask).expect("trace");
        let filled = proptest_helpers::fill_nonzero(&loops, mask.dims());
        prop_assert_eq!(filled, mask);
    }

    #[test]
    fn loops_never_reuse_an_edge(mask in proptest_helpers::arb_mask(10, 10, 50)) {
        let loops = trace_mask(&mask).expect("trace");
        let mut seen = std::collections::HashSet::new();
        for l in &loops {
            for (a, b) in proptest_helpers::loop_edges(l) {
                prop_assert!(seen.insert((a.min(b), a.max(b))), "edge {:?} twice", (a, b));
            }
        }
    }

    #[test]
    fn loops_consume_every_edge(mask in proptest_helpers::arb_mask(12, 12, 50)) {
        let counts = mask.to_counts();
        let height = mask.dims().rows;
        let edges = SegmentGraph::from_counts(&counts, height).edge_count();
        let loops = trace_counts(&counts, height).expect("trace");

        prop_assert_eq!(loops.iter().map(|l| l.len()).sum::<usize>(), edges);
        prop_assert_eq!(loops.is_empty(), mask.area() == 0);
    }

    #[test]
    fn traced_edges_are_axis_aligned(mask in proptest_helpers::arb_mask(12, 12, 50)) {
        let loops = trace_counts(&mask.to_counts(), mask.dims().rows).expect("trace");
        for l in &loops {
            for ((ax, ay), (bx, by)) in proptest_helpers::loop_edges(l) {
                prop_assert!(ax == bx || ay == by);
                prop_assert!((ax, ay) != (bx, by));
            }
        }
    }

    #[test]
    fn boundary_length_matches_pixel_transitions(mask in proptest_helpers::arb_mask(12, 12, 50)) {
        let loops = trace_counts(&mask.to_counts(), mask.dims().rows).expect("trace");
        let length: u64 = loops
            .iter()
            .flat_map(proptest_helpers::loop_edges)
            .map(|((ax, ay), (bx, by))| (ax.abs_diff(bx) + ay.abs_diff(by)) as u64)
            .sum();

        prop_assert_eq!(length, proptest_helpers::boundary_transitions(&mask));
    }

    #[test]
    fn tracing_is_deterministic(counts in proptest_helpers::arb_counts(20, 9), height in 1u32..8) {
        let first = trace_counts(&counts, height).expect("first trace");
        let second = trace_counts(&counts, height).expect("second trace");
        prop_assert_eq!(first, second);
    }
}
