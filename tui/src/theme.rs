//! Color theme and spinner for the probe TUI.
//!
//! Kanagawa Wave colors, trimmed to what the probe window uses.

use ratatui::style::{Color, Modifier, Style};

mod colors {
    use super::Color;

    pub const BG_DARK: Color = Color::Rgb(22, 22, 29); // sumiInk0
    pub const BG_PANEL: Color = Color::Rgb(31, 31, 40); // sumiInk3
    pub const BG_HIGHLIGHT: Color = Color::Rgb(42, 42, 55); // sumiInk4
    pub const BG_BORDER: Color = Color::Rgb(84, 84, 109); // sumiInk6

    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_SECONDARY: Color = Color::Rgb(200, 192, 147); // oldWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray

    pub const PRIMARY: Color = Color::Rgb(149, 127, 184); // oniViolet
    pub const CYAN: Color = Color::Rgb(127, 180, 202); // springBlue
    pub const GREEN: Color = Color::Rgb(152, 187, 108); // springGreen
    pub const YELLOW: Color = Color::Rgb(230, 195, 132); // carpYellow
    pub const RED: Color = Color::Rgb(255, 93, 98); // peachRed
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_highlight: colors::BG_HIGHLIGHT,
            bg_border: colors::BG_BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            primary: colors::PRIMARY,
            accent: colors::CYAN,
            success: colors::GREEN,
            warning: colors::YELLOW,
            error: colors::RED,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Advances one frame every 8 ticks (~15 fps at the 8ms render cadence).
#[must_use]
pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[(tick / 8) % SPINNER_FRAMES.len()]
}

pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn button(palette: &Palette, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(palette.bg_dark)
                .bg(palette.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(palette.text_primary)
                .bg(palette.bg_highlight)
        }
    }

    #[must_use]
    pub fn border(palette: &Palette) -> Style {
        Style::default().fg(palette.bg_border)
    }

    #[must_use]
    pub fn timestamp(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }
}
