//! Mask inspection and statistics.
//!
//! Produces a structured report per mask document: pixel coverage,
//! bounding boxes, traced loop counts and a per-label area histogram.

mod report;

pub use report::{InspectReport, LabelArea, LabelsSection, MaskStats, SummarySection};

use std::collections::HashMap;

use crate::error::MasktraceError;
use crate::mask::{rle, MaskEntry};
use crate::trace::trace_counts;

/// Options for mask inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Number of top labels to show in the histogram.
    pub top_labels: usize,
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            top_labels: 10,
            bar_width: 20,
        }
    }
}

/// Inspect a set of masks and produce a report.
///
/// Every mask is traced, so malformed run lengths surface here as errors.
pub fn inspect_masks(
    entries: &[MaskEntry],
    opts: &InspectOptions,
) -> Result<InspectReport, MasktraceError> {
    let masks = entries
        .iter()
        .map(compute_mask_stats)
        .collect::<Result<Vec<_>, _>>()?;

    let summary = compute_summary(&masks);
    let labels = compute_labels(&masks, opts.top_labels);

    Ok(InspectReport {
        summary,
        labels,
        masks,
        bar_width: opts.bar_width,
    })
}

fn compute_mask_stats(entry: &MaskEntry) -> Result<MaskStats, MasktraceError> {
    let pixels = entry.dims.rows as u64 * entry.dims.cols as u64;
    let counts_total = rle::total_pixels(&entry.counts);
    let counts = rle::clamp_counts(&entry.counts, pixels);
    let loops = trace_counts(&counts, entry.dims.rows)?;

    if counts_total != pixels {
        tracing::warn!(
            index = entry.index,
            counts_total,
            pixels,
            "run lengths do not cover the mask exactly"
        );
    }

    Ok(MaskStats {
        index: entry.index,
        label: entry.label.clone(),
        dims: entry.dims,
        pixels,
        area: rle::area(&counts),
        bbox: rle::bbox(entry.dims, &counts),
        loops: loops.len(),
        holes: loops.iter().filter(|l| l.is_hole()).count(),
        vertices: loops.iter().map(|l| l.len()).sum(),
        counts_total,
    })
}

fn compute_summary(masks: &[MaskStats]) -> SummarySection {
    SummarySection {
        masks: masks.len(),
        empty_masks: masks.iter().filter(|m| m.area == 0).count(),
        size_mismatches: masks.iter().filter(|m| m.counts_total != m.pixels).count(),
        total_area: masks.iter().map(|m| m.area).sum(),
        total_loops: masks.iter().map(|m| m.loops).sum(),
        total_holes: masks.iter().map(|m| m.holes).sum(),
    }
}

fn compute_labels(masks: &[MaskStats], top_n: usize) -> LabelsSection {
    let mut areas: HashMap<String, u64> = HashMap::new();
    for mask in masks {
        let label = mask
            .label
            .clone()
            .unwrap_or_else(|| "(unlabeled)".to_string());
        *areas.entry(label).or_insert(0) += mask.area;
    }

    // Largest area first, then by name for deterministic output
    let mut sorted: Vec<(String, u64)> = areas.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total_distinct = sorted.len();
    let total_area = sorted.iter().map(|(_, area)| area).sum();
    let other_area = sorted.iter().skip(top_n).map(|(_, area)| area).sum();
    sorted.truncate(top_n);

    LabelsSection {
        top_n,
        total_distinct,
        total_area,
        entries: sorted
            .into_iter()
            .map(|(label, area)| LabelArea { label, area })
            .collect(),
        other_area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::{Dims, MaskKind};

    fn entry(index: usize, label: Option<&str>, rows: u32, cols: u32, counts: &[u32]) -> MaskEntry {
        MaskEntry {
            index,
            label: label.map(str::to_string),
            kind: MaskKind::Binary,
            dims: Dims::new(rows, cols),
            counts: counts.to_vec(),
        }
    }

    fn sample_entries() -> Vec<MaskEntry> {
        vec![
            entry(0, Some("ring"), 6, 6, &[0, 14, 2, 4, 2, 14]),
            entry(1, Some("square"), 4, 4, &[0, 16]),
            entry(2, Some("ring"), 4, 4, &[16]),
            entry(3, None, 4, 4, &[5, 2, 2, 2]),
        ]
    }

    #[test]
    fn test_mask_stats() {
        let report = inspect_masks(&sample_entries(), &InspectOptions::default()).unwrap();

        let ring = &report.masks[0];
        assert_eq!(ring.area, 32);
        assert_eq!(ring.loops, 2);
        assert_eq!(ring.holes, 1);
        assert_eq!(ring.vertices, 8);
        assert_eq!(ring.bbox, Some([0, 0, 6, 6]));

        let partial = &report.masks[3];
        assert_eq!(partial.counts_total, 11);
        assert_eq!(partial.bbox, Some([1, 1, 2, 2]));
    }

    #[test]
    fn test_overlong_runs_are_cut_at_mask_end() {
        let entries = vec![entry(0, Some("over"), 2, 2, &[0, 10])];
        let report = inspect_masks(&entries, &InspectOptions::default()).unwrap();

        let stats = &report.masks[0];
        assert_eq!(stats.counts_total, 10);
        assert_eq!(stats.area, 4);
        assert_eq!(stats.bbox, Some([0, 0, 2, 2]));
        assert_eq!(stats.loops, 1);
        assert_eq!(stats.vertices, 4);
        assert_eq!(report.summary.size_mismatches, 1);
    }

    #[test]
    fn test_summary_counts() {
        let report = inspect_masks(&sample_entries(), &InspectOptions::default()).unwrap();

        assert_eq!(report.summary.masks, 4);
        assert_eq!(report.summary.empty_masks, 1);
        assert_eq!(report.summary.size_mismatches, 1);
        assert_eq!(report.summary.total_area, 52);
        assert_eq!(report.summary.total_holes, 1);
    }

    #[test]
    fn test_label_histogram() {
        let opts = InspectOptions {
            top_labels: 2,
            ..Default::default()
        };
        let report = inspect_masks(&sample_entries(), &opts).unwrap();

        assert_eq!(report.labels.total_distinct, 3);
        assert_eq!(report.labels.entries.len(), 2);
        assert_eq!(report.labels.entries[0].label, "ring");
        assert_eq!(report.labels.entries[0].area, 32);
        assert_eq!(report.labels.other_area, 4);
    }

    #[test]
    fn test_display_output() {
        let report = inspect_masks(&sample_entries(), &InspectOptions::default()).unwrap();
        let output = format!("{}", report);

        assert!(output.contains("Mask Inspection Report"));
        assert!(output.contains("Summary"));
        assert!(output.contains("Labels"));
        assert!(output.contains("Masks"));
        assert!(output.contains("square"));
    }
}
