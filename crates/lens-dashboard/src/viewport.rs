//! Screen-line arithmetic shared by every view.
//!
//! Scrolling keeps the cursor line a quarter of the list height below the
//! top of the window and never scrolls past
//! `max(0, total - list_lines + scroll_off)`.

use std::ops::Range;

/// Title, stats, summary and a blank line.
pub const HEADER_MIN_LINES: usize = 4;
/// Blank line and key hints.
pub const FOOTER_LINES: usize = 2;
pub const MIN_CONTENT_HEIGHT: usize = 5;
/// Lines the list header takes out of the content area.
pub const LIST_HEADER_LINES: usize = 2;
/// Minimum list heights per view.
pub const FLAT_MIN_LIST_LINES: usize = 5;
pub const WS_MIN_LIST_LINES: usize = 3;
pub const GROUPED_MIN_LIST_LINES: usize = 5;

/// Vertical layout for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub header_lines: usize,
    pub footer_lines: usize,
    pub content_height: usize,
}

impl Viewport {
    /// Layout for a terminal `height` lines tall. An active scope adds a
    /// line to the header; the scope input box adds two.
    #[must_use]
    pub fn compute(height: u16, has_scope: bool, scope_input_open: bool) -> Self {
        let mut header_lines = HEADER_MIN_LINES;
        if has_scope {
            header_lines += 1;
        }
        if scope_input_open {
            header_lines += 2;
        }
        let content_height = usize::from(height)
            .saturating_sub(header_lines + FOOTER_LINES)
            .max(MIN_CONTENT_HEIGHT);
        Self {
            header_lines,
            footer_lines: FOOTER_LINES,
            content_height,
        }
    }

    /// Lines available to list rows, never fewer than `min`.
    #[must_use]
    pub const fn list_lines(self, min: usize) -> usize {
        let lines = self.content_height.saturating_sub(LIST_HEADER_LINES);
        if lines < min { min } else { lines }
    }
}

#[must_use]
pub const fn scroll_off(list_lines: usize) -> usize {
    list_lines / 4
}

/// Largest scroll offset for a list of `total_lines`.
#[must_use]
pub const fn max_scroll(total_lines: usize, list_lines: usize) -> usize {
    (total_lines + scroll_off(list_lines)).saturating_sub(list_lines)
}

/// Scroll offset that keeps `cursor_line` visible with the scroll-off margin.
#[must_use]
pub fn scroll_for(cursor_line: usize, total_lines: usize, list_lines: usize) -> usize {
    cursor_line
        .saturating_sub(scroll_off(list_lines))
        .min(max_scroll(total_lines, list_lines))
}

/// Rows moved by page up / page down: half a screen, at least three.
#[must_use]
pub fn page_size(height: u16) -> usize {
    (usize::from(height).saturating_sub(8) / 2).max(3)
}

/// Slice of `total` lines shown for `scroll` and `visible` lines.
#[must_use]
pub fn window(total: usize, scroll: usize, visible: usize) -> Range<usize> {
    if total == 0 {
        return 0..0;
    }
    let start = scroll.min(total - 1);
    let end = (scroll + visible).min(total);
    start..end.max(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_height_has_floor() {
        let vp = Viewport::compute(8, false, false);
        assert_eq!(vp.content_height, MIN_CONTENT_HEIGHT);
        let vp = Viewport::compute(40, true, true);
        assert_eq!(vp.header_lines, 7);
        assert_eq!(vp.content_height, 31);
    }

    #[test]
    fn scroll_is_clamped() {
        // 20 list lines: scroll-off 5, max scroll 105 - 20 = 85 for 100 lines
        assert_eq!(scroll_for(3, 100, 20), 0);
        assert_eq!(scroll_for(50, 100, 20), 45);
        assert_eq!(scroll_for(99, 100, 20), 85);
        // short lists never scroll
        assert_eq!(scroll_for(9, 10, 20), 0);
    }

    #[test]
    fn page_size_floor() {
        assert_eq!(page_size(10), 3);
        assert_eq!(page_size(24), 8);
    }

    #[test]
    fn window_bounds() {
        assert_eq!(window(0, 3, 10), 0..0);
        assert_eq!(window(5, 10, 10), 4..5);
        assert_eq!(window(50, 10, 10), 10..20);
    }
}
