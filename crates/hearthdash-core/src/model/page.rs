// ── Pages and the persisted dashboard ──

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::widget::{LayoutRect, WidgetDescriptor, WidgetKind};

/// Stable page identity, independent of the page's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(Uuid);

impl PageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One carousel page: an ordered list of widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default = "PageId::generate")]
    pub id: PageId,
    #[serde(default)]
    pub widgets: Vec<WidgetDescriptor>,
}

impl Page {
    pub fn new() -> Self {
        Self {
            id: PageId::generate(),
            widgets: Vec::new(),
        }
    }

    /// First grid row below every widget on the page.
    pub fn bottom(&self) -> u16 {
        self.widgets
            .iter()
            .map(|w| w.layout.bottom())
            .max()
            .unwrap_or(0)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

/// The whole persisted dashboard: pages in carousel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub pages: Vec<Page>,
}

impl Default for Dashboard {
    /// A single page holding a clock.
    fn default() -> Self {
        let (w, h) = WidgetKind::Clock.default_size();
        let mut page = Page::new();
        page.widgets.push(WidgetDescriptor::new(
            WidgetKind::Clock,
            None,
            LayoutRect::new(0, 0, w, h),
        ));
        Self { pages: vec![page] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_of_empty_page_is_zero() {
        assert_eq!(Page::new().bottom(), 0);
    }

    #[test]
    fn bottom_is_lowest_edge() {
        let mut page = Page::new();
        page.widgets.push(WidgetDescriptor::new(
            WidgetKind::Switch,
            None,
            LayoutRect::new(0, 0, 2, 2),
        ));
        page.widgets.push(WidgetDescriptor::new(
            WidgetKind::Clock,
            None,
            LayoutRect::new(2, 1, 4, 3),
        ));
        assert_eq!(page.bottom(), 4);
    }

    #[test]
    fn default_dashboard_has_one_clock_page() {
        let dashboard = Dashboard::default();
        assert_eq!(dashboard.pages.len(), 1);
        assert_eq!(dashboard.pages[0].widgets[0].kind, WidgetKind::Clock);
    }
}
