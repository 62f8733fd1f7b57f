// ── Page carousel and edit mode ──
//
// View/Edit state machine plus the current-page pointer. The pointer
// survives mode toggles; page changes are ignored while editing.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum Mode {
    #[default]
    View,
    Edit,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardSession {
    mode: Mode,
    selected_page: usize,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Edit
    }

    pub fn selected_page(&self) -> usize {
        self.selected_page
    }

    /// Flip between View and Edit. Returns the new mode.
    pub fn toggle_edit_mode(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::View => Mode::Edit,
            Mode::Edit => Mode::View,
        };
        debug!(mode = %self.mode, page = self.selected_page, "mode changed");
        self.mode
    }

    /// Carousel reported a page change. Ignored in Edit mode or when the
    /// index is out of range; returns whether the pointer moved.
    pub fn on_page_change(&mut self, index: usize, page_count: usize) -> bool {
        if self.is_editing() || index >= page_count || index == self.selected_page {
            return false;
        }
        self.selected_page = index;
        true
    }

    /// Step forward, wrapping to the first page.
    pub fn next_page(&mut self, page_count: usize) -> bool {
        if page_count == 0 {
            return false;
        }
        self.on_page_change((self.selected_page + 1) % page_count, page_count)
    }

    /// Step back, wrapping to the last page.
    pub fn prev_page(&mut self, page_count: usize) -> bool {
        if page_count == 0 {
            return false;
        }
        let prev = self
            .selected_page
            .checked_sub(1)
            .unwrap_or(page_count - 1)
            .min(page_count - 1);
        self.on_page_change(prev, page_count)
    }

    /// Jump to a page regardless of mode (e.g. right after adding one).
    pub fn select_page(&mut self, index: usize, page_count: usize) {
        if index < page_count {
            self.selected_page = index;
        }
    }

    /// Keep the pointer valid after pages were removed.
    pub fn clamp(&mut self, page_count: usize) {
        if self.selected_page >= page_count {
            self.selected_page = page_count.saturating_sub(1);
        }
    }

    // ── Presentation ─────────────────────────────────────────────────

    /// Indices of the pages the carousel shows: all of them in View,
    /// only the selected one in Edit.
    pub fn visible_pages(&self, page_count: usize) -> Vec<usize> {
        if page_count == 0 {
            Vec::new()
        } else if self.is_editing() {
            vec![self.selected_page.min(page_count - 1)]
        } else {
            (0..page_count).collect()
        }
    }

    /// Position of the selected page among the visible ones.
    pub fn carousel_position(&self, page_count: usize) -> usize {
        if self.is_editing() {
            0
        } else {
            self.selected_page.min(page_count.saturating_sub(1))
        }
    }

    pub fn show_indicators(&self, page_count: usize) -> bool {
        self.visible_pages(page_count).len() > 1
    }

    pub fn show_add_affordance(&self) -> bool {
        self.is_editing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_view_on_first_page() {
        let session = DashboardSession::new();
        assert_eq!(session.mode(), Mode::View);
        assert_eq!(session.selected_page(), 0);
        assert!(!session.show_add_affordance());
    }

    #[test]
    fn page_changes_apply_in_view_only() {
        let mut session = DashboardSession::new();
        assert!(session.on_page_change(2, 3));
        assert_eq!(session.selected_page(), 2);

        session.toggle_edit_mode();
        assert!(!session.on_page_change(0, 3));
        assert!(!session.next_page(3));
        assert_eq!(session.selected_page(), 2);
    }

    #[test]
    fn pointer_survives_toggles() {
        let mut session = DashboardSession::new();
        session.on_page_change(1, 2);
        session.toggle_edit_mode();
        session.toggle_edit_mode();
        assert_eq!(session.mode(), Mode::View);
        assert_eq!(session.selected_page(), 1);
    }

    #[test]
    fn navigation_wraps() {
        let mut session = DashboardSession::new();
        assert!(session.prev_page(3));
        assert_eq!(session.selected_page(), 2);
        assert!(session.next_page(3));
        assert_eq!(session.selected_page(), 0);
        assert!(!session.next_page(1));
        assert!(!session.on_page_change(5, 3));
    }

    #[test]
    fn edit_mode_shows_one_page_without_indicators() {
        let mut session = DashboardSession::new();
        session.on_page_change(1, 3);
        assert_eq!(session.visible_pages(3), vec![0, 1, 2]);
        assert!(session.show_indicators(3));
        assert!(!session.show_indicators(1));

        session.toggle_edit_mode();
        assert_eq!(session.visible_pages(3), vec![1]);
        assert_eq!(session.carousel_position(3), 0);
        assert!(!session.show_indicators(3));
        assert!(session.show_add_affordance());
    }

    #[test]
    fn clamp_follows_removed_pages() {
        let mut session = DashboardSession::new();
        session.on_page_change(2, 3);
        session.clamp(2);
        assert_eq!(session.selected_page(), 1);
    }
}
