//! Slate & Amber colour theme for the Stockdesk TUI.
//!
//! Views import colours and styles from here instead of inline `Color::*`
//! literals. Chart fills arrive from the core as RGBA and are flattened
//! against the base background with [`blend`].

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

use crate::core::analytics::Rgba;

// ── Palette ─────────────────────────────────────────────────────────────────

/// Blue slate: focused borders, headings.
pub const PRIMARY: Color = Color::Rgb(0x5C, 0x7C, 0xFA);
/// Lighter slate: hints, secondary focus.
pub const PRIMARY_LIGHT: Color = Color::Rgb(0x91, 0xA7, 0xFF);
/// Amber: selection, calls to action.
pub const ACCENT: Color = Color::Rgb(0xFF, 0xB3, 0x00);

pub const BG_BASE: Color = Color::Rgb(0x11, 0x14, 0x1B);
pub const BG_SURFACE: Color = Color::Rgb(0x1A, 0x1F, 0x2B);

pub const TEXT: Color = Color::Rgb(0xE4, 0xE6, 0xEB);
pub const TEXT_MUTED: Color = Color::Rgb(0x8A, 0x90, 0x9C);
pub const TEXT_DIM: Color = Color::Rgb(0x4F, 0x55, 0x60);

// ── Semantic ────────────────────────────────────────────────────────────────

pub const ERROR: Color = Color::Rgb(0xEF, 0x53, 0x50);
pub const SUCCESS: Color = Color::Rgb(0x66, 0xBB, 0x6A);
pub const WARNING: Color = Color::Rgb(0xFF, 0xA7, 0x26);
pub const INFO: Color = Color::Rgb(0x42, 0xA5, 0xF5);

/// Background the RGBA chart fills are composited over.
const BLEND_BASE: (u8, u8, u8) = (0x11, 0x14, 0x1B);

/// Flatten an RGBA colour onto the base background.
pub fn blend(color: Rgba) -> Color {
    let a = color.a.clamp(0.0, 1.0);
    let mix = |fg: u8, bg: u8| -> u8 {
        (f32::from(fg) * a + f32::from(bg) * (1.0 - a)).round() as u8
    };
    Color::Rgb(
        mix(color.r, BLEND_BASE.0),
        mix(color.g, BLEND_BASE.1),
        mix(color.b, BLEND_BASE.2),
    )
}

// ── Style helpers ───────────────────────────────────────────────────────────

pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn heading() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Highlighted/selected item.
pub fn highlight() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Key hint style (e.g., "[r]:refresh").
pub fn key_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn brand_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn insert_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(PRIMARY_LIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn error_text() -> Style {
    Style::default().fg(ERROR)
}

// ── Block builders ──────────────────────────────────────────────────────────

pub fn block_focused(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_focused())
}

pub fn block_default(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_default())
}
