//! Widget tiles: one bordered box per grid item.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
};

use hearthdash_core::{
    Device, ResolvedWidget, WidgetConfig, WidgetDescriptor, WidgetKind, WidgetVariant,
};

use crate::theme;

const DEFAULT_CLOCK_FORMAT: &str = "%H:%M:%S";

/// How a tile's border is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileState {
    pub focused: bool,
    pub editing: bool,
}

pub fn render_tile(
    frame: &mut Frame,
    area: Rect,
    descriptor: &WidgetDescriptor,
    resolved: Option<&ResolvedWidget<'_>>,
    state: TileState,
    now: DateTime<Local>,
) {
    let border_style = if state.focused {
        theme::border_focused()
    } else if state.editing {
        theme::border_editable()
    } else {
        theme::border_default()
    };

    let title = resolved.map_or_else(
        || {
            descriptor
                .config
                .title
                .clone()
                .unwrap_or_else(|| descriptor.kind.tag().to_owned())
        },
        |r| r.title().to_owned(),
    );

    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(resolved) = resolved else {
        let text = Paragraph::new(empty_text(descriptor))
            .style(theme::empty_slot())
            .alignment(Alignment::Center);
        frame.render_widget(text, centered_line(inner));
        return;
    };

    match &resolved.variant {
        WidgetVariant::Dimmer(device) => render_dimmer(frame, inner, device),
        WidgetVariant::Color(device) => render_color(frame, inner, device),
        variant => {
            let line = value_line(variant, resolved.config(), now);
            frame.render_widget(
                Paragraph::new(line).alignment(Alignment::Center),
                centered_line(inner),
            );
        }
    }
}

fn render_dimmer(frame: &mut Frame, area: Rect, device: &Device) {
    let level = dimmer_level(device);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme::ELECTRIC_YELLOW).bg(theme::BG_HIGHLIGHT))
        .percent(u16::from(level))
        .label(format!("{level}%"));
    frame.render_widget(gauge, centered_line(area));
}

fn render_color(frame: &mut Frame, area: Rect, device: &Device) {
    let [swatch, label] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

    let fill = match device.color() {
        Some(color) => Style::default().bg(theme::rgb(color)),
        None if device.is_on() => Style::default().bg(theme::DIM_WHITE),
        None => Style::default().bg(theme::BG_HIGHLIGHT),
    };
    frame.render_widget(Block::default().style(fill), swatch);
    frame.render_widget(
        Paragraph::new(device.value.clone())
            .style(theme::tile_value())
            .alignment(Alignment::Center),
        label,
    );
}

/// Single-line body for the text-only variants.
pub fn value_line(
    variant: &WidgetVariant,
    config: &WidgetConfig,
    now: DateTime<Local>,
) -> Line<'static> {
    match variant {
        WidgetVariant::Clock => Line::from(Span::styled(
            clock_text(config.format.as_deref(), now),
            theme::tile_value(),
        )),
        WidgetVariant::Switch(device) | WidgetVariant::BinaryState(device) => {
            let (symbol, style) = if device.is_on() {
                ("●", theme::state_on())
            } else {
                ("○", theme::state_off())
            };
            Line::from(vec![
                Span::styled(format!("{symbol} "), style),
                Span::styled(device.value.clone(), style),
            ])
        }
        WidgetVariant::Climate(device) => Line::from(Span::styled(
            with_unit(&device.value, config.unit.as_deref().unwrap_or("°")),
            theme::tile_value(),
        )),
        WidgetVariant::Counter(device) => Line::from(Span::styled(
            with_unit(&device.value, config.unit.as_deref().unwrap_or("")),
            theme::tile_value(),
        )),
        WidgetVariant::Dimmer(device) => {
            Line::from(Span::styled(format!("{}%", dimmer_level(device)), theme::tile_value()))
        }
        WidgetVariant::Color(device) => {
            Line::from(Span::styled(device.value.clone(), theme::tile_value()))
        }
    }
}

/// Body of an empty slot.
pub fn empty_text(descriptor: &WidgetDescriptor) -> String {
    if let WidgetKind::Other(tag) = &descriptor.kind {
        return format!("unsupported widget: {tag}");
    }
    match &descriptor.device_id {
        None => "no device".into(),
        Some(id) => format!("{id} unavailable"),
    }
}

/// Current level of a dimmer, 0-100. Non-numeric values read as 0.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn dimmer_level(device: &Device) -> u8 {
    device
        .numeric_value()
        .map_or(0, |v| v.clamp(0.0, 100.0).round() as u8)
}

/// Format `now` with a strftime pattern; an invalid pattern falls back
/// to `HH:MM:SS`.
pub fn clock_text(format: Option<&str>, now: DateTime<Local>) -> String {
    let mut out = String::new();
    if write!(out, "{}", now.format(format.unwrap_or(DEFAULT_CLOCK_FORMAT))).is_ok() {
        return out;
    }
    now.format(DEFAULT_CLOCK_FORMAT).to_string()
}

fn with_unit(value: &str, unit: &str) -> String {
    if unit.is_empty() {
        value.to_owned()
    } else {
        format!("{value} {unit}")
    }
}

fn centered_line(area: Rect) -> Rect {
    let [line] = Layout::vertical([Constraint::Length(1)])
        .flex(ratatui::layout::Flex::Center)
        .areas(area);
    line
}
