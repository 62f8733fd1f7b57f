//! SilkCircuit Neon palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

use hearthdash_core::Rgb;

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

pub fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Border of the focused tile or an open popup.
pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Border of a tile that can be dragged (edit mode).
pub fn border_editable() -> Style {
    Style::default()
        .fg(ELECTRIC_YELLOW)
        .add_modifier(Modifier::DIM)
}

/// Primary value text inside a tile.
pub fn tile_value() -> Style {
    Style::default().fg(DIM_WHITE).add_modifier(Modifier::BOLD)
}

pub fn state_on() -> Style {
    Style::default()
        .fg(SUCCESS_GREEN)
        .add_modifier(Modifier::BOLD)
}

pub fn state_off() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Placeholder text for unbound or unknown widgets.
pub fn empty_slot() -> Style {
    Style::default()
        .fg(BORDER_GRAY)
        .add_modifier(Modifier::ITALIC)
}

/// Selected entry in a picker list.
pub fn list_selected() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Mode badge in the header.
pub fn mode_badge(editing: bool) -> Style {
    let bg = if editing { CORAL } else { NEON_CYAN };
    Style::default()
        .fg(BG_DARK)
        .bg(bg)
        .add_modifier(Modifier::BOLD)
}

pub fn indicator_active() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

pub fn indicator_inactive() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}
