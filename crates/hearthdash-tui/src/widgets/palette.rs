//! Color picker for color widgets: a swatch grid above a hue slider.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use hearthdash_core::{PALETTE, Rgb};

use crate::theme;

/// Swatches per row.
pub const COLUMNS: usize = 8;

/// Positions on the hue slider.
pub const HUE_STEPS: usize = 32;

const SWATCH_ROWS: usize = PALETTE.len().div_ceil(COLUMNS);

/// Hue slider positions under each swatch column.
const STEPS_PER_COLUMN: usize = HUE_STEPS / COLUMNS;

/// Selection inside the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteCursor {
    /// Index into [`PALETTE`].
    Swatch(usize),
    /// Step along the hue slider, `0..HUE_STEPS`.
    Hue(usize),
}

impl PaletteCursor {
    pub fn color(self) -> Option<Rgb> {
        match self {
            Self::Swatch(index) => PALETTE.get(index).copied(),
            Self::Hue(step) => (step < HUE_STEPS).then(|| hue_color(step)),
        }
    }

    /// One step (dx, dy in -1..=1). Rows wrap through the hue slider,
    /// which sits below the last swatch row; columns wrap in place.
    pub fn moved(self, dx: isize, dy: isize) -> Self {
        match self {
            Self::Swatch(index) => {
                let row = index / COLUMNS;
                let col = index % COLUMNS;
                let leaves_grid =
                    (dy > 0 && row == SWATCH_ROWS - 1) || (dy < 0 && row == 0);
                if leaves_grid {
                    Self::Hue(col * STEPS_PER_COLUMN)
                } else {
                    Self::Swatch(move_cursor(index, dx, dy))
                }
            }
            Self::Hue(step) => {
                let col = (step / STEPS_PER_COLUMN).min(COLUMNS - 1);
                if dy > 0 {
                    Self::Swatch(col)
                } else if dy < 0 {
                    Self::Swatch(((SWATCH_ROWS - 1) * COLUMNS + col).min(PALETTE.len() - 1))
                } else {
                    Self::Hue((step % HUE_STEPS + HUE_STEPS).wrapping_add_signed(dx) % HUE_STEPS)
                }
            }
        }
    }
}

/// Color at `step` on the hue slider.
pub fn hue_color(step: usize) -> Rgb {
    let degrees = step % HUE_STEPS * 360 / HUE_STEPS;
    Rgb::from_hue(u16::try_from(degrees).unwrap_or(0))
}

/// Move a swatch index by one step, wrapping around the edges of the grid.
fn move_cursor(cursor: usize, dx: isize, dy: isize) -> usize {
    let col = (cursor % COLUMNS + COLUMNS).wrapping_add_signed(dx) % COLUMNS;
    let row = (cursor / COLUMNS + SWATCH_ROWS).wrapping_add_signed(dy) % SWATCH_ROWS;
    (row * COLUMNS + col).min(PALETTE.len() - 1)
}

pub fn render_palette(frame: &mut Frame, area: Rect, cursor: PaletteCursor, title: &str) {
    // Four cells per swatch, then the hue slider, then the selected hex.
    let width = u16::try_from(COLUMNS * 4 + 3).unwrap_or(u16::MAX);
    let height = u16::try_from(SWATCH_ROWS + 5).unwrap_or(u16::MAX);
    let popup = centered(area, width, height);

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

    let mut lines: Vec<Line> = PALETTE
        .chunks(COLUMNS)
        .enumerate()
        .map(|(row, swatches)| {
            let spans: Vec<Span> = swatches
                .iter()
                .enumerate()
                .flat_map(|(col, color)| {
                    let selected = cursor == PaletteCursor::Swatch(row * COLUMNS + col);
                    let symbol = if selected { "[█]" } else { " █ " };
                    let mut style = Style::default().fg(theme::rgb(*color));
                    if selected {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    [Span::styled(symbol, style), Span::raw(" ")]
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let mut slider = vec![Span::raw(" ")];
    slider.extend((0..HUE_STEPS).map(|step| {
        let style = Style::default().fg(theme::rgb(hue_color(step)));
        if cursor == PaletteCursor::Hue(step) {
            Span::styled("◆", style.add_modifier(Modifier::BOLD))
        } else {
            Span::styled("█", style)
        }
    }));
    lines.push(Line::from(slider));

    lines.push(Line::from(""));
    if let Some(color) = cursor.color() {
        lines.push(Line::from(vec![
            Span::styled(color.to_hex(), theme::tile_value()),
            Span::styled("  ⏎ apply  esc cancel", theme::key_hint()),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// A `width` x `height` rectangle centered in `area`, clipped to it.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
