//! Scroll state for list-style views.

use std::time::{Duration, Instant};

/// Direction for mouse scroll input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    fn sign(self) -> i32 {
        match self {
            ScrollDirection::Up => -1,
            ScrollDirection::Down => 1,
        }
    }
}

/// Stateful tracker for mouse scroll accumulation. Trackpads deliver a
/// rapid tick stream, so closely spaced events scroll one line instead of
/// three.
#[derive(Debug, Default)]
pub struct MouseScrollState {
    last_event_at: Option<Instant>,
}

impl MouseScrollState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a scroll event and return the line delta to apply.
    pub fn on_scroll(&mut self, direction: ScrollDirection) -> i32 {
        let now = Instant::now();
        let is_trackpad = self
            .last_event_at
            .is_some_and(|last| now.duration_since(last) < Duration::from_millis(35));
        self.last_event_at = Some(now);

        let lines_per_tick = if is_trackpad { 1 } else { 3 };
        direction.sign() * lines_per_tick
    }
}

/// Offset-based scroll position for a list of known length.
///
/// Views call `follow`/`follow_end` every frame, so both are sticky: a
/// wheel scroll that moves the followed row out of view wins until the
/// cursor moves again (or the reader returns to the end).
#[derive(Debug, Clone, Copy)]
pub struct ListScroll {
    offset: usize,
    /// Cursor position the view last chased, if any.
    followed: Option<usize>,
    /// Pinned to the last page until the user scrolls away from it.
    pinned_to_end: bool,
}

impl Default for ListScroll {
    fn default() -> Self {
        Self {
            offset: 0,
            followed: None,
            pinned_to_end: true,
        }
    }
}

impl ListScroll {
    /// First visible row.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Apply a signed line delta, clamped so the list never scrolls past
    /// its last page.
    pub fn scroll_by(&mut self, delta: i32, total: usize, visible: usize) {
        let max_offset = total.saturating_sub(visible);
        self.offset = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            self.offset
                .saturating_add(delta.unsigned_abs() as usize)
                .min(max_offset)
        };
        self.pinned_to_end = self.offset >= max_offset;
    }

    /// Keep `index` visible while it moves. A repeated call with the same
    /// index is a no-op, so a wheel scroll that leaves the cursor
    /// off-screen is not undone on the next frame.
    pub fn follow(&mut self, index: usize, visible: usize) {
        if visible == 0 || self.followed == Some(index) {
            return;
        }
        self.followed = Some(index);
        if index < self.offset {
            self.offset = index;
        } else if index >= self.offset + visible {
            self.offset = index + 1 - visible;
        }
    }

    /// Keep the end of the list visible as it grows, but only while the
    /// view is already at the end; a reader scrolled back stays put.
    pub fn follow_end(&mut self, total: usize, visible: usize) {
        if self.pinned_to_end {
            self.offset = total.saturating_sub(visible.max(1));
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_by_clamps_to_last_page() {
        let mut scroll = ListScroll::default();
        scroll.scroll_by(100, 10, 4);
        assert_eq!(scroll.offset(), 6);
        scroll.scroll_by(-100, 10, 4);
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn wheel_scroll_is_not_undone_by_an_idle_cursor() {
        let mut scroll = ListScroll::default();
        scroll.follow(19, 5);
        assert_eq!(scroll.offset(), 15);

        // Scrolling back up leaves the cursor off-screen; the per-frame
        // follow of the unchanged cursor must not snap back down.
        scroll.scroll_by(-3, 20, 5);
        assert_eq!(scroll.offset(), 12);
        scroll.follow(19, 5);
        assert_eq!(scroll.offset(), 12);

        // Moving the cursor chases it again.
        scroll.follow(18, 5);
        assert_eq!(scroll.offset(), 14);
    }

    #[test]
    fn follow_end_sticks_only_while_at_the_end() {
        let mut scroll = ListScroll::default();
        scroll.follow_end(10, 4);
        assert_eq!(scroll.offset(), 6);
        // New row while pinned: stay at the end.
        scroll.follow_end(11, 4);
        assert_eq!(scroll.offset(), 7);

        // Reader scrolls back through history.
        scroll.scroll_by(-2, 11, 4);
        assert_eq!(scroll.offset(), 5);
        // New rows must not yank the view back down.
        scroll.follow_end(12, 4);
        assert_eq!(scroll.offset(), 5);

        // Returning to the end re-pins.
        scroll.scroll_by(100, 12, 4);
        scroll.follow_end(13, 4);
        assert_eq!(scroll.offset(), 9);
    }

    #[test]
    fn follow_keeps_cursor_in_window() {
        let mut scroll = ListScroll::default();
        scroll.follow(7, 5);
        assert_eq!(scroll.offset(), 3);
        scroll.follow(1, 5);
        assert_eq!(scroll.offset(), 1);
        scroll.follow(3, 5);
        assert_eq!(scroll.offset(), 1);
    }
}
