//! Selection cursor for the two-row list states.

use crate::screen::textfit;

/// Circular selection over a list, plus the horizontal pan offset of
/// the selected label. Moving the selection resets the pan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListCursor {
    index: usize,
    scroll: usize,
}

impl ListCursor {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Restores a previous position, clamped into the list.
    pub fn restore(&mut self, index: usize, len: usize) {
        self.index = if len == 0 { 0 } else { index.min(len - 1) };
        self.scroll = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Moves down one entry, wrapping past the end. Empty lists are
    /// left untouched (never a modulo by zero).
    pub fn down(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.index = (self.index + 1) % len;
        self.scroll = 0;
    }

    /// Moves up one entry, wrapping from the first to the last.
    pub fn up(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.index = if self.index == 0 {
            len - 1
        } else {
            self.index - 1
        };
        self.scroll = 0;
    }

    pub fn pan_right(&mut self, label_len: usize) {
        self.scroll = textfit::scroll_right(self.scroll, label_len);
    }

    pub fn pan_left(&mut self, label_len: usize) {
        self.scroll = textfit::scroll_left(self.scroll, label_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_both_directions() {
        let mut c = ListCursor::default();
        c.up(3);
        assert_eq!(c.index(), 2);
        c.down(3);
        assert_eq!(c.index(), 0);
        c.down(3);
        c.down(3);
        c.down(3);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn empty_list_is_a_no_op() {
        let mut c = ListCursor::default();
        c.down(0);
        c.up(0);
        assert_eq!(c, ListCursor::default());
    }

    #[test]
    fn moving_resets_pan() {
        let mut c = ListCursor::default();
        c.pan_right(25);
        assert_eq!(c.scroll(), 10);
        c.down(4);
        assert_eq!(c.scroll(), 0);
    }

    #[test]
    fn restore_clamps_into_list() {
        let mut c = ListCursor::default();
        c.restore(7, 3);
        assert_eq!(c.index(), 2);
        c.restore(1, 0);
        assert_eq!(c.index(), 0);
    }
}
