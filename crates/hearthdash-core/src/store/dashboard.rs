// ── Dashboard model ──
//
// Ordered pages of widget descriptors, mutated only through the
// operations below. Pages and widgets are addressed by position.

use tracing::debug;

use crate::error::CoreError;
use crate::model::{Dashboard, DeviceId, LayoutRect, Page, WidgetDescriptor, WidgetKind};

/// Owner of the page list.
///
/// Every successful mutation marks the model dirty; callers persisting
/// the layout clear the flag with [`take_dirty`](Self::take_dirty).
#[derive(Debug, Clone, Default)]
pub struct DashboardModel {
    dashboard: Dashboard,
    dirty: bool,
}

impl DashboardModel {
    /// Wrap a loaded dashboard. A dashboard without pages gains an empty
    /// one, so there is always a page to show.
    pub fn new(mut dashboard: Dashboard) -> Self {
        if dashboard.pages.is_empty() {
            dashboard.pages.push(Page::new());
        }
        Self {
            dashboard,
            dirty: false,
        }
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn pages(&self) -> &[Page] {
        &self.dashboard.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.dashboard.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.dashboard.pages.len()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Replace the layout rectangles of a page's widgets, positionally.
    ///
    /// Rectangle `i` applies to widget `i`; every other descriptor field
    /// is preserved. The lengths must match.
    pub fn update_layout(&mut self, page: usize, layout: &[LayoutRect]) -> Result<(), CoreError> {
        let target = self.page_mut(page)?;
        if target.widgets.len() != layout.len() {
            return Err(CoreError::LayoutMismatch {
                page,
                expected: target.widgets.len(),
                got: layout.len(),
            });
        }

        let mut changed = false;
        for (widget, rect) in target.widgets.iter_mut().zip(layout) {
            if widget.layout != *rect {
                widget.layout = *rect;
                changed = true;
            }
        }

        if changed {
            debug!(page, "layout updated");
            self.dirty = true;
        }
        Ok(())
    }

    /// Append a widget to a page. Returns its position.
    pub fn add_widget(
        &mut self,
        page: usize,
        descriptor: WidgetDescriptor,
    ) -> Result<usize, CoreError> {
        let target = self.page_mut(page)?;
        debug!(page, kind = %descriptor.kind, "adding widget");
        target.widgets.push(descriptor);
        let index = target.widgets.len() - 1;
        self.dirty = true;
        Ok(index)
    }

    /// Build a descriptor of `kind` at the kind's default size, placed in
    /// the left column below everything already on the page, and append it.
    pub fn add_widget_below(
        &mut self,
        page: usize,
        kind: WidgetKind,
        device_id: Option<DeviceId>,
    ) -> Result<usize, CoreError> {
        let row = self.page_mut(page)?.bottom();
        let (w, h) = kind.default_size();
        let descriptor = WidgetDescriptor::new(kind, device_id, LayoutRect::new(0, row, w, h));
        self.add_widget(page, descriptor)
    }

    /// Remove the widget at `index` from a page and return it.
    pub fn remove_widget(
        &mut self,
        page: usize,
        index: usize,
    ) -> Result<WidgetDescriptor, CoreError> {
        let target = self.page_mut(page)?;
        let count = target.widgets.len();
        if index >= count {
            return Err(CoreError::WidgetOutOfRange { page, index, count });
        }
        let removed = target.widgets.remove(index);
        debug!(page, index, kind = %removed.kind, "removed widget");
        self.dirty = true;
        Ok(removed)
    }

    /// Append an empty page. Returns its position.
    pub fn add_page(&mut self) -> usize {
        self.dashboard.pages.push(Page::new());
        self.dirty = true;
        debug!(pages = self.dashboard.pages.len(), "added page");
        self.dashboard.pages.len() - 1
    }

    /// Remove a page. The last remaining page cannot be removed.
    pub fn remove_page(&mut self, page: usize) -> Result<Page, CoreError> {
        self.page_mut(page)?;
        if self.dashboard.pages.len() == 1 {
            return Err(CoreError::LastPage);
        }
        self.dirty = true;
        Ok(self.dashboard.pages.remove(page))
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut Page, CoreError> {
        let count = self.dashboard.pages.len();
        self.dashboard
            .pages
            .get_mut(index)
            .ok_or(CoreError::PageOutOfRange { index, count })
    }
}

impl From<Dashboard> for DashboardModel {
    fn from(dashboard: Dashboard) -> Self {
        Self::new(dashboard)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::WidgetConfig;

    fn model_with_widgets() -> DashboardModel {
        let mut page = Page::new();
        page.widgets.push(
            WidgetDescriptor::new(
                WidgetKind::Switch,
                Some(DeviceId::from("lamp")),
                LayoutRect::new(0, 0, 2, 2),
            )
            .with_config(WidgetConfig {
                title: Some("Lamp".into()),
                ..WidgetConfig::default()
            }),
        );
        page.widgets.push(WidgetDescriptor::new(
            WidgetKind::Clock,
            None,
            LayoutRect::new(2, 0, 4, 2),
        ));
        DashboardModel::new(Dashboard { pages: vec![page] })
    }

    #[test]
    fn update_layout_replaces_only_rectangles() {
        let mut model = model_with_widgets();
        let before = model.page(0).unwrap().clone();
        let layout = [LayoutRect::new(4, 1, 2, 3), LayoutRect::new(0, 0, 4, 1)];

        model.update_layout(0, &layout).unwrap();

        let after = model.page(0).unwrap();
        for (i, (old, new)) in before.widgets.iter().zip(&after.widgets).enumerate() {
            assert_eq!(new.layout, layout[i]);
            assert_eq!(new.id, old.id);
            assert_eq!(new.kind, old.kind);
            assert_eq!(new.device_id, old.device_id);
            assert_eq!(new.config, old.config);
            assert_eq!(new.style, old.style);
        }
        assert!(model.take_dirty());
    }

    #[test]
    fn update_layout_is_idempotent() {
        let mut model = model_with_widgets();
        let layout = [LayoutRect::new(4, 1, 2, 3), LayoutRect::new(0, 0, 4, 1)];

        model.update_layout(0, &layout).unwrap();
        let once = model.dashboard().clone();
        model.take_dirty();

        model.update_layout(0, &layout).unwrap();
        assert_eq!(model.dashboard(), &once);
        assert!(!model.is_dirty());
    }

    #[test]
    fn update_layout_rejects_length_mismatch() {
        let mut model = model_with_widgets();
        let before = model.dashboard().clone();

        let err = model
            .update_layout(0, &[LayoutRect::new(0, 0, 1, 1)])
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::LayoutMismatch {
                page: 0,
                expected: 2,
                got: 1
            }
        ));
        assert_eq!(model.dashboard(), &before);
    }

    #[test]
    fn update_layout_rejects_missing_page() {
        let mut model = model_with_widgets();
        assert!(matches!(
            model.update_layout(3, &[]),
            Err(CoreError::PageOutOfRange { index: 3, count: 1 })
        ));
    }

    #[test]
    fn add_and_remove_widgets() {
        let mut model = model_with_widgets();
        let widget = WidgetDescriptor::new(WidgetKind::Counter, None, LayoutRect::new(0, 2, 2, 2));
        let id = widget.id;

        assert_eq!(model.add_widget(0, widget).unwrap(), 2);
        assert_eq!(model.page(0).unwrap().widgets.len(), 3);

        let removed = model.remove_widget(0, 2).unwrap();
        assert_eq!(removed.id, id);
        assert!(matches!(
            model.remove_widget(0, 5),
            Err(CoreError::WidgetOutOfRange {
                page: 0,
                index: 5,
                count: 2
            })
        ));
    }

    #[test]
    fn new_widgets_land_below_existing_content() {
        let mut model = model_with_widgets();
        let index = model
            .add_widget_below(0, WidgetKind::Dimmer, Some(DeviceId::from("hall")))
            .unwrap();

        let added = &model.page(0).unwrap().widgets[index];
        assert_eq!(added.layout, LayoutRect::new(0, 2, 4, 1));
        assert_eq!(added.device_id, Some(DeviceId::from("hall")));

        model.add_page();
        let first = model.add_widget_below(1, WidgetKind::Clock, None).unwrap();
        assert_eq!(model.page(1).unwrap().widgets[first].layout.y, 0);
    }

    #[test]
    fn pages_are_added_empty_and_last_page_stays() {
        let mut model = model_with_widgets();
        assert_eq!(model.add_page(), 1);
        assert!(model.page(1).unwrap().widgets.is_empty());

        model.remove_page(0).unwrap();
        assert_eq!(model.page_count(), 1);
        assert!(matches!(model.remove_page(0), Err(CoreError::LastPage)));
    }

    #[test]
    fn empty_dashboard_gains_a_page() {
        let model = DashboardModel::new(Dashboard { pages: Vec::new() });
        assert_eq!(model.page_count(), 1);
        assert!(!model.is_dirty());
    }
}
