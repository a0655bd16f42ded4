//! Plain-text rendering of the session history table and distribution chart.

use std::fmt::Write;

use crate::session::{ClassificationRecord, Distribution};

/// Segment glyphs of the distribution ring, assigned to labels in order.
const SEGMENT_GLYPHS: [char; 6] = ['█', '▓', '▒', '░', '◆', '●'];

/// A bounded-height view over the history table.
///
/// At most `max_visible_rows` data rows are shown under the header; longer
/// histories scroll with the `scroll` offset passed to [`TableView::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableView {
    pub max_visible_rows: usize,
    /// Comments longer than this many characters are cut with an ellipsis
    pub comment_width: usize,
}

impl Default for TableView {
    fn default() -> Self {
        Self {
            max_visible_rows: 5,
            comment_width: 48,
        }
    }
}

impl TableView {
    /// First row index a scroll request actually lands on
    pub fn clamp_scroll(&self, total_rows: usize, scroll: usize) -> usize {
        scroll.min(total_rows.saturating_sub(self.max_visible_rows))
    }

    /// Renders the header plus the visible window of `records` starting at `scroll`.
    ///
    /// Returns an empty string for an empty history.
    pub fn render(&self, records: &[ClassificationRecord], scroll: usize) -> String {
        if records.is_empty() {
            return String::new();
        }

        let start = self.clamp_scroll(records.len(), scroll);
        let end = (start + self.max_visible_rows).min(records.len());
        let window = &records[start..end];

        let index_width = (records.len() - 1).to_string().len().max(1);
        let comment_width = window.iter()
            .map(|r| display_comment(r.comment(), self.comment_width).chars().count())
            .chain(std::iter::once("Comment".len()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>iw$}  {:<cw$}  Classification",
            "",
            "Comment",
            iw = index_width,
            cw = comment_width
        );
        for (offset, record) in window.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>iw$}  {:<cw$}  {}",
                start + offset,
                display_comment(record.comment(), self.comment_width),
                record.label(),
                iw = index_width,
                cw = comment_width
            );
        }
        if records.len() > self.max_visible_rows {
            let _ = writeln!(out, "rows {}-{} of {}", start + 1, end, records.len());
        }
        out
    }
}

fn display_comment(comment: &str, width: usize) -> String {
    let flat: String = comment.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= width {
        return flat;
    }
    let mut cut: String = flat.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Splits `width` cells between the labels proportionally to their counts.
///
/// Uses largest remainders so the cells always add up to `width`; ties go to
/// the label listed first.
fn segment_widths(distribution: &Distribution, width: usize) -> Vec<usize> {
    let total = distribution.total();
    if total == 0 {
        return Vec::new();
    }

    let mut widths: Vec<usize> = distribution.entries().iter()
        .map(|(_, count)| count * width / total)
        .collect();
    let mut remainders: Vec<(usize, usize)> = distribution.entries().iter()
        .enumerate()
        .map(|(i, (_, count))| (i, count * width % total))
        .collect();
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let assigned: usize = widths.iter().sum();
    for &(i, _) in remainders.iter().take(width - assigned) {
        widths[i] += 1;
    }
    widths
}

/// Renders the label distribution as a ring of segments with a horizontal legend.
///
/// ```text
///   ╭──────────────────────────────────────────╮
///   │ ████████████████████▓▓▓▓▓▓▓▓▓▓▒▒▒▒▒▒▒▒▒▒ │  4 total
///   ╰──────────────────────────────────────────╯
///   █ NOT_CYBERBULLYING 2 (50.0%)   ▓ GENDER 1 (25.0%)   ▒ AGE 1 (25.0%)
/// ```
///
/// Returns an empty string for an empty distribution.
pub fn render_distribution(distribution: &Distribution, width: usize) -> String {
    let total = distribution.total();
    if total == 0 || width == 0 {
        return String::new();
    }

    let widths = segment_widths(distribution, width);
    let ring: String = widths.iter()
        .enumerate()
        .flat_map(|(i, &w)| std::iter::repeat(glyph(i)).take(w))
        .collect();

    let legend: Vec<String> = distribution.entries().iter()
        .enumerate()
        .map(|(i, (label, count))| {
            let percent = *count as f64 * 100.0 / total as f64;
            format!("{} {} {} ({:.1}%)", glyph(i), label, count, percent)
        })
        .collect();

    let border = "─".repeat(width + 2);
    let mut out = String::new();
    let _ = writeln!(out, "  ╭{}╮", border);
    let _ = writeln!(out, "  │ {} │  {} total", ring, total);
    let _ = writeln!(out, "  ╰{}╯", border);
    let _ = writeln!(out, "  {}", legend.join("   "));
    out
}

fn glyph(index: usize) -> char {
    SEGMENT_GLYPHS[index % SEGMENT_GLYPHS.len()]
}
