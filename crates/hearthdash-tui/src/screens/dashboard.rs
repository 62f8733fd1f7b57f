//! Dashboard screen: the page carousel, its widget grid, and the edit
//! mode popups (add-widget pickers and the color palette).

use std::sync::Arc;

use chrono::Local;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tracing::{debug, warn};

use hearthdash_core::layout::{self, GridEdit};
use hearthdash_core::{
    Breakpoint, Dashboard, DashboardModel, DashboardSession, DeviceSnapshot, Interaction, Mode,
    PALETTE, WidgetKind, WidgetVariant, resolve,
};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::palette::{self, PaletteCursor};
use crate::widgets::{grid, tile};

const DEFAULT_DIMMER_STEP: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Popup {
    /// Color picker for the widget at `widget` on the current page.
    Palette {
        widget: usize,
        cursor: PaletteCursor,
    },
    /// First step of adding a widget: choose its kind.
    KindPicker { cursor: usize },
    /// Second step: bind a device.
    DevicePicker { kind: WidgetKind, cursor: usize },
}

pub struct DashboardScreen {
    model: DashboardModel,
    session: DashboardSession,
    snapshot: Arc<DeviceSnapshot>,
    focus: usize,
    popup: Option<Popup>,
    breakpoint: Breakpoint,
}

impl DashboardScreen {
    pub fn new(model: DashboardModel) -> Self {
        Self {
            model,
            session: DashboardSession::new(),
            snapshot: Arc::new(DeviceSnapshot::default()),
            focus: 0,
            popup: None,
            breakpoint: Breakpoint::Lg,
        }
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    /// The dashboard, if it changed since it was last persisted.
    pub fn take_unsaved(&mut self) -> Option<Dashboard> {
        self.model
            .take_dirty()
            .then(|| self.model.dashboard().clone())
    }

    fn widget_count(&self) -> usize {
        self.model
            .page(self.session.selected_page())
            .map_or(0, |p| p.widgets.len())
    }

    fn clamp_focus(&mut self) {
        self.focus = self.focus.min(self.widget_count().saturating_sub(1));
    }

    fn move_focus(&mut self, forward: bool) {
        let count = self.widget_count();
        if count == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % count
        } else {
            self.focus.checked_sub(1).unwrap_or(count - 1)
        };
    }

    fn change_page(&mut self, forward: bool) {
        let count = self.model.page_count();
        let moved = if forward {
            self.session.next_page(count)
        } else {
            self.session.prev_page(count)
        };
        if moved {
            self.focus = 0;
        }
    }

    fn toggle_edit_mode(&mut self) -> Option<Action> {
        self.popup = None;
        let mode = self.session.toggle_edit_mode();
        if mode == Mode::View {
            return self.take_unsaved().map(Action::SaveLayout);
        }
        None
    }

    // ── View mode ────────────────────────────────────────────────────

    fn activate_focused(&mut self) -> Option<Action> {
        let page = self.model.page(self.session.selected_page())?;
        let descriptor = page.widgets.get(self.focus)?;
        let resolved = resolve(descriptor, &self.snapshot)?;

        if let WidgetVariant::Color(device) = &resolved.variant {
            let swatch = device
                .color()
                .and_then(|c| PALETTE.iter().position(|p| *p == c))
                .unwrap_or(0);
            self.popup = Some(Popup::Palette {
                widget: self.focus,
                cursor: PaletteCursor::Swatch(swatch),
            });
            return None;
        }
        resolved.interact(Interaction::Toggle).map(Action::Command)
    }

    fn adjust_level(&self, up: bool) -> Option<Action> {
        let page = self.model.page(self.session.selected_page())?;
        let descriptor = page.widgets.get(self.focus)?;
        let resolved = resolve(descriptor, &self.snapshot)?;
        let WidgetVariant::Dimmer(device) = &resolved.variant else {
            return None;
        };

        let step = resolved.config().step.unwrap_or(DEFAULT_DIMMER_STEP);
        let level = tile::dimmer_level(device);
        let target = if up {
            level.saturating_add(step).min(100)
        } else {
            level.saturating_sub(step)
        };
        if target == level {
            return None;
        }
        resolved
            .interact(Interaction::SetLevel(target))
            .map(Action::Command)
    }

    fn handle_view_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.change_page(false),
            KeyCode::Right | KeyCode::Char('l') => self.change_page(true),
            KeyCode::Tab | KeyCode::Char('j') | KeyCode::Down => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Char('k') | KeyCode::Up => self.move_focus(false),
            KeyCode::Enter | KeyCode::Char(' ') => return self.activate_focused(),
            KeyCode::Char('+' | '=') => return self.adjust_level(true),
            KeyCode::Char('-') => return self.adjust_level(false),
            KeyCode::Char('e') => return self.toggle_edit_mode(),
            _ => {}
        }
        None
    }

    // ── Edit mode ────────────────────────────────────────────────────

    /// Rectangles are shared by every breakpoint, so edits are bounded by
    /// the widest grid. Narrower grids pull items back in when drawing.
    fn edit_focused(&mut self, edit: GridEdit) {
        let page = self.session.selected_page();
        let Some(current) = self.model.page(page) else {
            return;
        };
        let mut items = layout::grid_items(&current.widgets, true);
        if !layout::apply_edit(&mut items, self.focus, edit, Breakpoint::Lg.columns()) {
            return;
        }
        if let Err(e) = self
            .model
            .update_layout(page, &layout::rects_from_grid(&items))
        {
            warn!(error = %e, "layout update rejected");
        }
    }

    fn remove_focused(&mut self) -> Option<Action> {
        if self.widget_count() == 0 {
            return None;
        }
        let result = self
            .model
            .remove_widget(self.session.selected_page(), self.focus);
        self.clamp_focus();
        match result {
            Ok(removed) => Some(Action::Notify(Notification::info(format!(
                "Removed {} widget",
                removed.kind
            )))),
            Err(e) => Some(Action::Notify(Notification::error(e.to_string()))),
        }
    }

    fn add_page(&mut self) -> Option<Action> {
        let index = self.model.add_page();
        self.session.select_page(index, self.model.page_count());
        self.focus = 0;
        Some(Action::Notify(Notification::info(format!(
            "Added page {}",
            index + 1
        ))))
    }

    fn remove_page(&mut self) -> Option<Action> {
        match self.model.remove_page(self.session.selected_page()) {
            Ok(_) => {
                self.session.clamp(self.model.page_count());
                self.focus = 0;
                Some(Action::Notify(Notification::info("Removed page")))
            }
            Err(e) => Some(Action::Notify(Notification::warning(e.to_string()))),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('e') | KeyCode::Esc => return self.toggle_edit_mode(),
            KeyCode::Left => self.change_page(false),
            KeyCode::Right => self.change_page(true),
            KeyCode::Tab => self.move_focus(true),
            KeyCode::BackTab => self.move_focus(false),
            KeyCode::Char('h') => self.edit_focused(GridEdit::Move { dx: -1, dy: 0 }),
            KeyCode::Char('l') => self.edit_focused(GridEdit::Move { dx: 1, dy: 0 }),
            KeyCode::Char('k') => self.edit_focused(GridEdit::Move { dx: 0, dy: -1 }),
            KeyCode::Char('j') => self.edit_focused(GridEdit::Move { dx: 0, dy: 1 }),
            KeyCode::Char('H') => self.edit_focused(GridEdit::Resize { dw: -1, dh: 0 }),
            KeyCode::Char('L') => self.edit_focused(GridEdit::Resize { dw: 1, dh: 0 }),
            KeyCode::Char('K') => self.edit_focused(GridEdit::Resize { dw: 0, dh: -1 }),
            KeyCode::Char('J') => self.edit_focused(GridEdit::Resize { dw: 0, dh: 1 }),
            KeyCode::Char('a') => self.popup = Some(Popup::KindPicker { cursor: 0 }),
            KeyCode::Char('x') => return self.remove_focused(),
            KeyCode::Char('n') => return self.add_page(),
            KeyCode::Char('d') => return self.remove_page(),
            _ => {}
        }
        None
    }

    // ── Popups ───────────────────────────────────────────────────────

    fn add_widget(&mut self, kind: WidgetKind, device: Option<usize>) -> Option<Action> {
        let device_id = device
            .and_then(|i| self.snapshot.devices().get(i))
            .map(|d| d.id.clone());
        match self
            .model
            .add_widget_below(self.session.selected_page(), kind, device_id)
        {
            Ok(index) => {
                self.focus = index;
                None
            }
            Err(e) => Some(Action::Notify(Notification::error(e.to_string()))),
        }
    }

    fn handle_popup_key(&mut self, popup: Popup, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Esc {
            return None;
        }

        match popup {
            Popup::Palette { widget, cursor } => {
                let (dx, dy) = match key.code {
                    KeyCode::Left | KeyCode::Char('h') => (-1, 0),
                    KeyCode::Right | KeyCode::Char('l') => (1, 0),
                    KeyCode::Up | KeyCode::Char('k') => (0, -1),
                    KeyCode::Down | KeyCode::Char('j') => (0, 1),
                    KeyCode::Enter => return self.pick_color(widget, cursor),
                    _ => (0, 0),
                };
                self.popup = Some(Popup::Palette {
                    widget,
                    cursor: cursor.moved(dx, dy),
                });
                None
            }
            Popup::KindPicker { cursor } => match key.code {
                KeyCode::Enter => {
                    let kind = WidgetKind::KNOWN.get(cursor)?.clone();
                    if kind.requires_device() && !self.snapshot.is_empty() {
                        self.popup = Some(Popup::DevicePicker { kind, cursor: 0 });
                        None
                    } else {
                        self.add_widget(kind, None)
                    }
                }
                code => {
                    let cursor = list_cursor(cursor, WidgetKind::KNOWN.len(), code);
                    self.popup = Some(Popup::KindPicker { cursor });
                    None
                }
            },
            Popup::DevicePicker { kind, cursor } => match key.code {
                KeyCode::Enter => self.add_widget(kind, Some(cursor)),
                code => {
                    let cursor = list_cursor(cursor, self.snapshot.len(), code);
                    self.popup = Some(Popup::DevicePicker { kind, cursor });
                    None
                }
            },
        }
    }

    fn pick_color(&self, widget: usize, cursor: PaletteCursor) -> Option<Action> {
        let color = cursor.color()?;
        let page = self.model.page(self.session.selected_page())?;
        let descriptor = page.widgets.get(widget)?;
        let resolved = resolve(descriptor, &self.snapshot)?;
        debug!(color = %color, widget, "color picked");
        resolved
            .interact(Interaction::PickColor(color))
            .map(Action::Command)
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let editing = self.session.is_editing();
        let badge = if editing { " EDIT " } else { " VIEW " };
        let mut spans = vec![
            Span::styled(badge, theme::mode_badge(editing)),
            Span::styled(
                format!(
                    "  page {}/{}",
                    self.session.selected_page() + 1,
                    self.model.page_count()
                ),
                theme::title_style(),
            ),
        ];

        if self.session.show_add_affordance() {
            for (key, label) in [
                ("a", "add widget"),
                ("n", "add page"),
                ("x", "remove"),
                ("d", "remove page"),
                ("hjkl", "move"),
                ("HJKL", "resize"),
            ] {
                spans.push(Span::styled(format!("  {key} "), theme::key_hint_key()));
                spans.push(Span::styled(label, theme::key_hint()));
            }
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let Some(page) = self.model.page(self.session.selected_page()) else {
            return;
        };

        if page.widgets.is_empty() {
            let hint = if self.session.is_editing() {
                "empty page: press a to add a widget"
            } else {
                "empty page: press e to edit"
            };
            let [line] = Layout::vertical([Constraint::Length(1)])
                .flex(ratatui::layout::Flex::Center)
                .areas(area);
            frame.render_widget(
                Paragraph::new(hint)
                    .style(theme::empty_slot())
                    .alignment(Alignment::Center),
                line,
            );
            return;
        }

        let editing = self.session.is_editing();
        let layouts = layout::responsive_layout(&page.widgets, editing);
        let Some(items) = layouts.get(&self.breakpoint) else {
            return;
        };
        let columns = self.breakpoint.columns();
        let offset = items
            .get(self.focus)
            .map_or(0, |item| grid::scroll_to(area, item));
        let now = Local::now();

        for (index, (item, descriptor)) in items.iter().zip(&page.widgets).enumerate() {
            let Some(rect) = grid::cell_rect(area, item, columns, offset) else {
                continue;
            };
            let resolved = resolve(descriptor, &self.snapshot);
            let state = tile::TileState {
                focused: index == self.focus,
                editing: !item.is_static,
            };
            tile::render_tile(frame, rect, descriptor, resolved.as_ref(), state, now);
        }
    }

    fn render_indicators(&self, frame: &mut Frame, area: Rect) {
        let count = self.model.page_count();
        let active = self.session.carousel_position(count);
        let spans: Vec<Span> = self
            .session
            .visible_pages(count)
            .iter()
            .enumerate()
            .map(|(position, _)| {
                if position == active {
                    Span::styled("● ", theme::indicator_active())
                } else {
                    Span::styled("○ ", theme::indicator_inactive())
                }
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            area,
        );
    }

    fn render_popup(&self, frame: &mut Frame, area: Rect, popup: &Popup) {
        match popup {
            Popup::Palette { widget, cursor } => {
                let title = self
                    .model
                    .page(self.session.selected_page())
                    .and_then(|p| p.widgets.get(*widget))
                    .and_then(|d| resolve(d, &self.snapshot))
                    .map_or_else(|| "color".to_owned(), |r| r.title().to_owned());
                palette::render_palette(frame, area, *cursor, &title);
            }
            Popup::KindPicker { cursor } => {
                let rows: Vec<String> = WidgetKind::KNOWN
                    .iter()
                    .map(|k| k.tag().to_owned())
                    .collect();
                render_list(frame, area, "add widget", &rows, *cursor);
            }
            Popup::DevicePicker { kind, cursor } => {
                let rows: Vec<String> = self
                    .snapshot
                    .devices()
                    .iter()
                    .map(|d| format!("{}  ({}, {})", d.label, d.id, d.kind))
                    .collect();
                render_list(frame, area, &format!("{kind} device"), &rows, *cursor);
            }
        }
    }
}

/// Up/down movement in a list of `len` rows, wrapping.
fn list_cursor(cursor: usize, len: usize, code: KeyCode) -> usize {
    if len == 0 {
        return 0;
    }
    match code {
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => (cursor + 1) % len,
        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
            cursor.checked_sub(1).unwrap_or(len - 1)
        }
        _ => cursor.min(len - 1),
    }
}

fn render_list(frame: &mut Frame, area: Rect, title: &str, rows: &[String], cursor: usize) {
    let width = rows
        .iter()
        .map(String::len)
        .chain(std::iter::once(title.len()))
        .max()
        .unwrap_or(0)
        .saturating_add(8);
    let height = rows.len().saturating_add(2);
    let popup = palette::centered(
        area,
        u16::try_from(width).unwrap_or(u16::MAX),
        u16::try_from(height).unwrap_or(u16::MAX),
    );

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            if i == cursor {
                Line::styled(format!("▸ {row}"), theme::list_selected())
            } else {
                Line::styled(format!("  {row}"), theme::list_row())
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(popup) = self.popup.take() {
            return Ok(self.handle_popup_key(popup, key));
        }
        if self.session.is_editing() {
            Ok(self.handle_edit_key(key))
        } else {
            Ok(self.handle_view_key(key))
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DevicesUpdated(snapshot) => {
                self.snapshot = Arc::clone(snapshot);
                if let Some(Popup::DevicePicker { cursor, .. }) = &mut self.popup {
                    *cursor = (*cursor).min(self.snapshot.len().saturating_sub(1));
                }
            }
            Action::Resize(width, _) => {
                self.breakpoint = grid::breakpoint_for(*width);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let indicators = self.session.show_indicators(self.model.page_count());
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(u16::from(indicators)),
        ])
        .areas(area);

        self.render_header(frame, header);
        self.render_grid(frame, body);
        if indicators {
            self.render_indicators(frame, footer);
        }
        if let Some(popup) = &self.popup {
            self.render_popup(frame, body, popup);
        }
    }

    fn captures_input(&self) -> bool {
        self.popup.is_some()
    }
}
