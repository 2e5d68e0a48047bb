use masktrace::mask::rle::{
    area, bbox, decode_compressed_counts, encode_compressed_rle, expand_run_lengths,
    expand_run_lengths_guarded, expand_run_lengths_row_major, parse_compressed_rle,
};
use masktrace::mask::Dims;
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn compressed_string_restores_counts(counts in proptest_helpers::arb_counts(40, 5000)) {
        let text = encode_compressed_rle(&counts);
        prop_assert!(text.bytes().all(|b| (b'0'..=b'o').contains(&b)));
        prop_assert_eq!(decode_compressed_counts(&text).expect("decode"), counts);
    }

    #[test]
    fn parser_never_panics(text in "[0-~]{0,24}") {
        let _ = parse_compressed_rle(&text);
    }

    #[test]
    fn expansion_restores_mask(mask in proptest_helpers::arb_mask(10, 10, 40)) {
        let counts = mask.to_counts();
        prop_assert_eq!(expand_run_lengths(mask.dims(), &counts), mask.clone());
        prop_assert_eq!(expand_run_lengths_guarded(mask.dims(), &counts), mask.clone());
        prop_assert_eq!(expand_run_lengths_row_major(mask.dims(), &counts), mask.to_row_major());
    }

    #[test]
    fn area_and_bbox_match_dense_mask(mask in proptest_helpers::arb_mask(10, 10, 30)) {
        let counts = mask.to_counts();
        prop_assert_eq!(area(&counts), mask.area() as u64);

        let (mut x0, mut y0, mut x1, mut y1) = (usize::MAX, usize::MAX, 0, 0);
        for row in 0..mask.rows() {
            for col in 0..mask.cols() {
                if mask.get(row, col) {
                    x0 = x0.min(col);
                    y0 = y0.min(row);
                    x1 = x1.max(col + 1);
                    y1 = y1.max(row + 1);
                }
            }
        }
        let expected = (x0 != usize::MAX)
            .then(|| [x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32]);

        // Runs wrapping across columns widen the box to the full height,
        // so only the horizontal extent is exact in general.
        let got = bbox(mask.dims(), &counts);
        prop_assert_eq!(got.is_some(), expected.is_some());
        if let (Some(got), Some(expected)) = (got, expected) {
            prop_assert_eq!(got[0], expected[0]);
            prop_assert_eq!(got[2], expected[2]);
            prop_assert!(got[1] <= expected[1]);
            prop_assert!(got[1] + got[3] >= expected[1] + expected[3]);
        }
    }

    #[test]
    fn expansion_stays_in_bounds(
        counts in proptest_helpers::arb_counts(30, 40),
        rows in 0u32..8,
        cols in 0u32..8,
    ) {
        let dims = Dims::new(rows, cols);
        let clamped = expand_run_lengths(dims, &counts);
        let guarded = expand_run_lengths_guarded(dims, &counts);

        prop_assert_eq!(clamped.cells().len(), dims.len());
        prop_assert!(guarded.area() <= clamped.area());
        prop_assert!(clamped.area() as u64 <= area(&counts));
    }
}
