use gpui::{Pixels, ScrollHandle, point, px};

/// Near-bottom distance used to resume follow mode.
const AUTO_FOLLOW_RESUME_THRESHOLD: Pixels = px(24.);
/// Small delta used to ignore floating-point scroll jitter.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// Keeps the newest message in view while the visitor is at the tail of the thread.
///
/// Scrolling is best-effort: an empty or zero-height list simply has nothing to scroll.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    pending_scroll_to_bottom: bool,
    follow_bottom: bool,
    last_scroll_offset: Pixels,
    last_max_offset: Pixels,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            pending_scroll_to_bottom: false,
            follow_bottom: true,
            last_scroll_offset: Pixels::ZERO,
            last_max_offset: Pixels::ZERO,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    /// Every thread mutation reveals the newest message, even after a manual scroll.
    pub fn request_scroll_to_bottom(&mut self) {
        self.pending_scroll_to_bottom = true;
        self.follow_bottom = true;
    }

    pub fn reset(&mut self) {
        self.last_scroll_offset = Pixels::ZERO;
        self.last_max_offset = Pixels::ZERO;
        self.follow_bottom = true;
        self.pending_scroll_to_bottom = true;
    }

    pub fn update_follow_state(&mut self) {
        let offset = self.scroll_handle.offset().y;
        let max_offset = self.scroll_handle.max_offset().height;
        let offset_delta = f32::from(offset) - f32::from(self.last_scroll_offset);
        let max_delta = (f32::from(max_offset) - f32::from(self.last_max_offset)).abs();
        let content_size_changed = max_delta > SCROLL_DELTA_EPSILON;
        let user_scrolled_up = offset_delta > SCROLL_DELTA_EPSILON && !content_size_changed;
        let user_scrolled_down = offset_delta < -SCROLL_DELTA_EPSILON && !content_size_changed;

        if self.pending_scroll_to_bottom || content_size_changed {
            self.follow_bottom = true;
        } else if self.follow_bottom {
            if user_scrolled_up {
                self.follow_bottom = false;
            }
        } else if user_scrolled_down && is_near_tail(offset, max_offset) {
            self.follow_bottom = true;
        }

        self.last_scroll_offset = offset;
        self.last_max_offset = max_offset;
    }

    /// Moves to the tail when following. Returns whether a scroll was applied.
    pub fn apply_pending_scroll(&mut self) -> bool {
        let should_scroll = self.follow_bottom || self.pending_scroll_to_bottom;

        if should_scroll {
            let max_offset = self.scroll_handle.max_offset().height;
            let current_x = self.scroll_handle.offset().x;
            self.scroll_handle
                .set_offset(point(current_x, tail_offset(max_offset)));
        }

        self.pending_scroll_to_bottom = false;
        should_scroll
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

/// GPUI scrolls down with negative Y offsets; the tail sits at `-max_offset`.
fn tail_offset(max_offset: Pixels) -> Pixels {
    if max_offset > Pixels::ZERO {
        -max_offset
    } else {
        Pixels::ZERO
    }
}

fn is_near_tail(offset: Pixels, max_offset: Pixels) -> bool {
    if max_offset <= Pixels::ZERO {
        return true;
    }
    (offset + max_offset).abs() <= AUTO_FOLLOW_RESUME_THRESHOLD
}
