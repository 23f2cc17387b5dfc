use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells <= 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Truncate and right-pad with spaces to exactly `cells` terminal cells.
pub fn fit_to_width(s: &str, cells: usize) -> String {
    let mut out = truncate_to_width(s, cells);
    let w = display_width(&out);
    out.extend(std::iter::repeat_n(' ', cells.saturating_sub(w)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_wide_chars() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("작업"), 4);
    }

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("hello world", 6), "hello\u{2026}");
        assert_eq!(truncate_to_width("작업제목", 5), "작업\u{2026}");
        assert_eq!(truncate_to_width("hello", 1), "\u{2026}");
        assert_eq!(truncate_to_width("hello", 0), "");
    }

    #[test]
    fn truncate_keeps_clusters_whole() {
        // regional-indicator pair is one cluster
        assert_eq!(truncate_to_width("a\u{1F1F0}\u{1F1F7}bc", 3), "a\u{2026}");
        assert_eq!(
            truncate_to_width("a\u{1F1F0}\u{1F1F7}bc", 4),
            "a\u{1F1F0}\u{1F1F7}\u{2026}"
        );

        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        let title = format!("{family} trip planning");
        let out = truncate_to_width(&title, 6);
        assert!(out.ends_with('\u{2026}'));
        assert!(out.starts_with(family) || !out.contains('\u{200D}'));
    }

    #[test]
    fn fit_pads_to_exact_width() {
        assert_eq!(fit_to_width("ab", 4), "ab  ");
        assert_eq!(fit_to_width("작업제목", 5), "작업\u{2026}");
        assert_eq!(display_width(&fit_to_width("작업제목", 6)), 6);
    }
}
