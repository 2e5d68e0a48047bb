//! Inspect report types and terminal formatting.

use serde::Serialize;
use std::fmt;

use crate::mask::Dims;

/// Inner width of the report boxes, in characters.
const BOX_WIDTH: usize = 59;

/// The result of inspecting a mask document.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    pub summary: SummarySection,
    pub labels: LabelsSection,
    /// Per-mask statistics, in document order.
    pub masks: Vec<MaskStats>,
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

/// Totals over all masks.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SummarySection {
    pub masks: usize,
    /// Masks without a single foreground pixel.
    pub empty_masks: usize,
    /// Masks whose run lengths do not sum to `rows * cols`.
    pub size_mismatches: usize,
    pub total_area: u64,
    pub total_loops: usize,
    pub total_holes: usize,
}

/// Foreground area per label.
#[derive(Clone, Debug, Serialize)]
pub struct LabelsSection {
    pub top_n: usize,
    pub total_distinct: usize,
    pub total_area: u64,
    /// Top labels, largest area first.
    pub entries: Vec<LabelArea>,
    /// Area of the labels not in the top N.
    pub other_area: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LabelArea {
    pub label: String,
    pub area: u64,
}

/// Statistics for one mask.
#[derive(Clone, Debug, Serialize)]
pub struct MaskStats {
    pub index: usize,
    pub label: Option<String>,
    pub dims: Dims,
    /// `rows * cols`.
    pub pixels: u64,
    /// Foreground pixels.
    pub area: u64,
    /// `[x, y, width, height]` of the foreground.
    pub bbox: Option<[u32; 4]>,
    pub loops: usize,
    pub holes: usize,
    /// Vertices over all traced loops.
    pub vertices: usize,
    /// Sum of all run lengths.
    pub counts_total: u64,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "╭─────────────────────────────────────────────────────────────╮")?;
        writeln!(f, "│                 Mask Inspection Report                      │")?;
        writeln!(f, "╰─────────────────────────────────────────────────────────────╯")?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;

        self.fmt_labels(f)?;
        writeln!(f)?;

        self.fmt_masks(f)?;

        Ok(())
    }
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        box_top(f, "Summary")?;
        box_line(f, "")?;
        box_line(f, &format!("  Masks:         {:>10}", format_number(s.masks as u64)))?;
        box_line(f, &format!("  Foreground:    {:>10} px", format_number(s.total_area)))?;
        box_line(f, &format!("  Loops:         {:>10}", format_number(s.total_loops as u64)))?;
        box_line(f, &format!("  Holes:         {:>10}", format_number(s.total_holes as u64)))?;
        box_line(f, "")?;

        if s.empty_masks == 0 && s.size_mismatches == 0 {
            box_line(f, "  ✓ No issues detected")?;
        } else {
            box_line(f, "  Issues found:")?;
            if s.empty_masks > 0 {
                box_line(
                    f,
                    &format!(
                        "    ⚠ Empty masks:       {:>7} / {:>7}  ({:>5})",
                        format_number(s.empty_masks as u64),
                        format_number(s.masks as u64),
                        fmt_percent(s.empty_masks as u64, s.masks as u64)
                    ),
                )?;
            }
            if s.size_mismatches > 0 {
                box_line(
                    f,
                    &format!(
                        "    ✗ Size mismatch:     {:>7} / {:>7}  ({:>5})",
                        format_number(s.size_mismatches as u64),
                        format_number(s.masks as u64),
                        fmt_percent(s.size_mismatches as u64, s.masks as u64)
                    ),
                )?;
            }
        }

        box_line(f, "")?;
        box_bottom(f)
    }

    fn fmt_labels(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = &self.labels;

        let header = if l.total_distinct > l.top_n {
            format!("Labels (top {} of {})", l.top_n, l.total_distinct)
        } else {
            format!("Labels ({})", l.total_distinct)
        };
        box_top(f, &header)?;
        box_line(f, "")?;

        if l.entries.is_empty() {
            box_line(f, "  No masks found.")?;
        } else {
            let max_area = l.entries.iter().map(|e| e.area).max().unwrap_or(0);

            for entry in &l.entries {
                self.fmt_label_row(f, &truncate_label(&entry.label, 16), entry.area, max_area)?;
            }
            if l.other_area > 0 {
                self.fmt_label_row(f, "(other)", l.other_area, max_area)?;
            }
        }

        box_line(f, "")?;
        box_bottom(f)
    }

    fn fmt_label_row(
        &self,
        f: &mut fmt::Formatter<'_>,
        label: &str,
        area: u64,
        max_area: u64,
    ) -> fmt::Result {
        box_line(
            f,
            &format!(
                "  {:<16} {:>9} {:>6}  {}",
                label,
                format_number(area),
                fmt_percent(area, self.labels.total_area),
                render_bar(area, max_area, self.bar_width)
            ),
        )
    }

    fn fmt_masks(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        box_top(f, "Masks")?;
        box_line(f, "")?;

        if self.masks.is_empty() {
            box_line(f, "  No masks found.")?;
        }
        for m in &self.masks {
            let label = m.label.as_deref().unwrap_or("-");
            box_line(
                f,
                &format!("  #{:<4} {:<16} {:>11}", m.index, truncate_label(label, 16), m.dims.to_string()),
            )?;
            let bbox = match m.bbox {
                Some([x, y, w, h]) => format!("[{x}, {y}, {w}, {h}]"),
                None => "-".to_string(),
            };
            box_line(
                f,
                &format!(
                    "        area {:>9} ({:>6})  bbox {}",
                    format_number(m.area),
                    fmt_percent(m.area, m.pixels),
                    bbox
                ),
            )?;
            box_line(
                f,
                &format!(
                    "        loops {}  holes {}  vertices {}",
                    m.loops, m.holes, m.vertices
                ),
            )?;
        }

        box_line(f, "")?;
        box_bottom(f)
    }
}

fn box_top(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let used = title.chars().count() + 3;
    writeln!(f, "┌─ {} {}┐", title, "─".repeat(BOX_WIDTH.saturating_sub(used)))
}

fn box_bottom(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "└{}┘", "─".repeat(BOX_WIDTH))
}

/// Writes `content` inside the box, padded to the box width.
fn box_line(f: &mut fmt::Formatter<'_>, content: &str) -> fmt::Result {
    let padding = BOX_WIDTH.saturating_sub(content.chars().count() + 1);
    writeln!(f, "│ {}{}│", content, " ".repeat(padding))
}

/// Format a number with thousands separators.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a percentage, handling zero denominators.
fn fmt_percent(numerator: u64, denominator: u64) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", (numerator as f64 / denominator as f64) * 100.0)
    }
}

fn render_bar(value: u64, max_value: u64, width: usize) -> String {
    if max_value == 0 || width == 0 {
        return String::new();
    }
    let filled = ((value as u128 * width as u128) / max_value as u128).min(width as u128) as usize;
    "█".repeat(filled) + &"░".repeat(width - filled)
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_fmt_percent() {
        assert_eq!(fmt_percent(0, 0), "n/a");
        assert_eq!(fmt_percent(32, 36), "88.9%");
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(5, 10, 10), "█████░░░░░");
        assert_eq!(render_bar(0, 0, 10), "");
    }

    #[test]
    fn test_truncate_label_counts_chars() {
        assert_eq!(truncate_label("ring", 10), "ring");
        assert_eq!(truncate_label("très-long-libellé", 8), "très-lo…");
    }
}
