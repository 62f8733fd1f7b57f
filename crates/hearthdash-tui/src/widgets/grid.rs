//! Grid geometry: maps layout-engine cells onto terminal rectangles.

use ratatui::layout::Rect;

use hearthdash_core::{Breakpoint, GridItem};

/// Pixels one terminal column stands for when picking a breakpoint.
pub const CELL_PX: u32 = 8;

/// Terminal rows per grid row.
pub const ROW_HEIGHT: u16 = 3;

/// Breakpoint for a content area `width` columns wide.
pub fn breakpoint_for(width: u16) -> Breakpoint {
    Breakpoint::for_width(u32::from(width) * CELL_PX)
}

/// Terminal rectangle of a grid item, with the grid scrolled down by
/// `row_offset` rows. Items wider or further right than `columns` are
/// pulled back onto the grid. `None` when the item is off screen
/// vertically.
pub fn cell_rect(area: Rect, item: &GridItem, columns: u16, row_offset: u16) -> Option<Rect> {
    if item.y < row_offset {
        return None;
    }
    let columns = columns.max(1);
    let w = item.w.min(columns);
    let col = item.x.min(columns - w);

    let col_width = (area.width / columns).max(1);
    let x = col.saturating_mul(col_width);
    let y = (item.y - row_offset).saturating_mul(ROW_HEIGHT);
    if x >= area.width || y >= area.height {
        return None;
    }

    let width = w.saturating_mul(col_width).min(area.width - x);
    let height = item.h.saturating_mul(ROW_HEIGHT).min(area.height - y);
    if width == 0 || height == 0 {
        return None;
    }
    Some(Rect::new(area.x + x, area.y + y, width, height))
}

/// Smallest row offset that keeps `item` fully visible in `area`.
pub fn scroll_to(area: Rect, item: &GridItem) -> u16 {
    let visible_rows = (area.height / ROW_HEIGHT).max(1);
    item.y
        .saturating_add(item.h)
        .saturating_sub(visible_rows)
        .min(item.y)
}
