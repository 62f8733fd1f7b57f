// ── Layout engine ──
//
// Projects a page's widget descriptors onto the responsive grid and
// carries grid edits back as layout rectangles. Every breakpoint gets
// the same item list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::model::{LayoutRect, WidgetDescriptor};

/// Responsive breakpoints, widest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    strum::Display,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Breakpoint {
    Lg,
    Md,
    Sm,
    Xs,
    Xxs,
}

impl Breakpoint {
    /// Smallest width (in pixels) at which this breakpoint applies.
    pub const fn min_width(self) -> u32 {
        match self {
            Self::Lg => 1200,
            Self::Md => 996,
            Self::Sm => 768,
            Self::Xs => 480,
            Self::Xxs => 0,
        }
    }

    pub const fn columns(self) -> u16 {
        match self {
            Self::Lg => 12,
            Self::Md => 10,
            Self::Sm => 6,
            Self::Xs => 4,
            Self::Xxs => 2,
        }
    }

    /// The widest breakpoint whose minimum fits in `width`.
    pub fn for_width(width: u32) -> Self {
        Self::iter()
            .find(|bp| width >= bp.min_width())
            .unwrap_or(Self::Xxs)
    }
}

/// One grid entry. `i` is the widget's position on its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridItem {
    pub i: String,
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
    /// Frozen items cannot be dragged or resized.
    #[serde(rename = "static")]
    pub is_static: bool,
}

impl GridItem {
    pub fn rect(&self) -> LayoutRect {
        LayoutRect::new(self.x, self.y, self.w, self.h)
    }
}

pub type ResponsiveLayout = BTreeMap<Breakpoint, Vec<GridItem>>;

/// Grid items for one page. Outside edit mode every item is static.
pub fn grid_items(widgets: &[WidgetDescriptor], edit_mode: bool) -> Vec<GridItem> {
    widgets
        .iter()
        .enumerate()
        .map(|(i, widget)| GridItem {
            i: i.to_string(),
            x: widget.layout.x,
            y: widget.layout.y,
            w: widget.layout.w,
            h: widget.layout.h,
            is_static: !edit_mode,
        })
        .collect()
}

/// The same item list under every breakpoint.
pub fn responsive_layout(widgets: &[WidgetDescriptor], edit_mode: bool) -> ResponsiveLayout {
    let items = grid_items(widgets, edit_mode);
    Breakpoint::iter().map(|bp| (bp, items.clone())).collect()
}

/// Rectangles in item order, ready for `DashboardModel::update_layout`.
pub fn rects_from_grid(items: &[GridItem]) -> Vec<LayoutRect> {
    items.iter().map(GridItem::rect).collect()
}

// ── Grid edits ───────────────────────────────────────────────────────

/// A single keyboard-driven drag or resize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEdit {
    Move { dx: i16, dy: i16 },
    Resize { dw: i16, dh: i16 },
}

/// Apply an edit to `items[index]`, keeping the item inside `columns`
/// and at least one cell large. Only the axes the edit touches are
/// clamped; an item already past `columns` keeps its `x` on a vertical
/// move.
///
/// Returns `false` (and leaves the item alone) if the index is out of
/// range, the item is static, or the edit changes nothing.
pub fn apply_edit(items: &mut [GridItem], index: usize, edit: GridEdit, columns: u16) -> bool {
    let Some(item) = items.get_mut(index) else {
        return false;
    };
    if item.is_static {
        return false;
    }

    let columns = columns.max(1);
    let before = item.rect();
    match edit {
        GridEdit::Move { dx, dy } => {
            if dx != 0 {
                let max_x = columns.saturating_sub(item.w);
                item.x = offset(item.x, dx).min(max_x);
            }
            item.y = offset(item.y, dy);
        }
        GridEdit::Resize { dw, dh } => {
            if dw != 0 {
                let max_w = columns.saturating_sub(item.x).max(1);
                item.w = offset(item.w, dw).clamp(1, max_w);
            }
            if dh != 0 {
                item.h = offset(item.h, dh).max(1);
            }
        }
    }
    item.rect() != before
}

fn offset(value: u16, delta: i16) -> u16 {
    value.saturating_add_signed(delta)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{DeviceId, WidgetKind};

    fn widgets() -> Vec<WidgetDescriptor> {
        vec![
            WidgetDescriptor::new(WidgetKind::Clock, None, LayoutRect::new(0, 0, 4, 2)),
            WidgetDescriptor::new(
                WidgetKind::Switch,
                Some(DeviceId::from("lamp")),
                LayoutRect::new(4, 0, 2, 2),
            ),
        ]
    }

    #[test]
    fn identifiers_are_positions() {
        let items = grid_items(&widgets(), false);
        let ids: Vec<&str> = items.iter().map(|item| item.i.as_str()).collect();
        assert_eq!(ids, ["0", "1"]);
    }

    #[test]
    fn every_breakpoint_gets_the_same_items() {
        let layout = responsive_layout(&widgets(), true);
        assert_eq!(layout.len(), 5);
        let lg = &layout[&Breakpoint::Lg];
        for items in layout.values() {
            assert_eq!(items, lg);
        }
    }

    #[test]
    fn edit_toggle_only_flips_static() {
        let widgets = widgets();
        let viewing = grid_items(&widgets, false);
        let editing = grid_items(&widgets, true);
        let back = grid_items(&widgets, false);

        assert!(viewing.iter().all(|item| item.is_static));
        assert!(editing.iter().all(|item| !item.is_static));
        assert_eq!(back, viewing);
        assert_eq!(rects_from_grid(&editing), rects_from_grid(&viewing));
    }

    #[test]
    fn breakpoint_thresholds() {
        assert_eq!(Breakpoint::for_width(1920), Breakpoint::Lg);
        assert_eq!(Breakpoint::for_width(1200), Breakpoint::Lg);
        assert_eq!(Breakpoint::for_width(1199), Breakpoint::Md);
        assert_eq!(Breakpoint::for_width(800), Breakpoint::Sm);
        assert_eq!(Breakpoint::for_width(480), Breakpoint::Xs);
        assert_eq!(Breakpoint::for_width(0), Breakpoint::Xxs);
        assert_eq!(Breakpoint::Sm.columns(), 6);
    }

    #[test]
    fn layout_serializes_with_breakpoint_keys() {
        let json = serde_json::to_value(responsive_layout(&widgets()[..1], false)).unwrap();
        assert_eq!(
            json["md"][0],
            serde_json::json!({ "i": "0", "x": 0, "y": 0, "w": 4, "h": 2, "static": true })
        );
    }

    #[test]
    fn static_items_refuse_edits() {
        let mut items = grid_items(&widgets(), false);
        assert!(!apply_edit(&mut items, 0, GridEdit::Move { dx: 1, dy: 0 }, 12));
        assert_eq!(items[0].x, 0);
    }

    #[test]
    fn moves_and_resizes_stay_on_the_grid() {
        let mut items = grid_items(&widgets(), true);

        assert!(apply_edit(&mut items, 1, GridEdit::Move { dx: 10, dy: 1 }, 12));
        assert_eq!(items[1].rect(), LayoutRect::new(10, 1, 2, 2));

        assert!(!apply_edit(&mut items, 1, GridEdit::Resize { dw: 3, dh: 0 }, 12));
        assert!(!apply_edit(&mut items, 0, GridEdit::Move { dx: -5, dy: -5 }, 12));

        assert!(apply_edit(&mut items, 0, GridEdit::Resize { dw: -10, dh: 1 }, 12));
        assert_eq!(items[0].rect(), LayoutRect::new(0, 0, 1, 3));

        assert!(!apply_edit(&mut items, 7, GridEdit::Move { dx: 1, dy: 1 }, 12));
    }

    #[test]
    fn vertical_edits_leave_columns_alone() {
        let mut items = vec![GridItem {
            i: "0".into(),
            x: 8,
            y: 0,
            w: 2,
            h: 2,
            is_static: false,
        }];

        assert!(apply_edit(&mut items, 0, GridEdit::Move { dx: 0, dy: 1 }, 4));
        assert_eq!(items[0].rect(), LayoutRect::new(8, 1, 2, 2));

        assert!(apply_edit(&mut items, 0, GridEdit::Resize { dw: 0, dh: 1 }, 4));
        assert_eq!(items[0].rect(), LayoutRect::new(8, 1, 2, 3));
    }
}
