// Theme system for the TUI
//
// Provides a small set of color themes selectable from the config file.
// Each theme defines colors for all UI elements.

use ratatui::style::Color;
use ratatui::widgets::BorderType;
use serde::{Deserialize, Serialize};

/// Available themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
    Nord,
}

impl ThemeKind {
    /// Get all available themes
    pub fn all() -> &'static [ThemeKind] {
        &[ThemeKind::Dark, ThemeKind::Light, ThemeKind::Nord]
    }

    /// Get the next theme in the cycle
    pub fn next(self) -> Self {
        let themes = Self::all();
        let current = themes.iter().position(|&t| t == self).unwrap_or(0);
        themes[(current + 1) % themes.len()]
    }

    /// Parse a config value, unknown names fall back to dark
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => ThemeKind::Light,
            "nord" => ThemeKind::Nord,
            _ => ThemeKind::Dark,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            ThemeKind::Dark => "Dark",
            ThemeKind::Light => "Light",
            ThemeKind::Nord => "Nord",
        }
    }

    /// Get the theme configuration
    pub fn theme(&self) -> Theme {
        match self {
            ThemeKind::Dark => Theme::dark(),
            ThemeKind::Light => Theme::light(),
            ThemeKind::Nord => Theme::nord(),
        }
    }
}

/// Complete theme definition with all UI colors
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,

    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_type: BorderType,
    pub highlight: Color,
    pub title: Color,

    // Selection
    pub selected_bg: Color,
    pub selected_fg: Color,

    // Toast kinds
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,

    // Certificates
    pub participant_accent: Color,
    pub winner_accent: Color,

    // Log levels
    pub log_error: Color,
    pub log_warn: Color,
    pub log_info: Color,
    pub log_debug: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: "Dark",
            background: Color::Reset,
            foreground: Color::White,
            muted: Color::Gray,
            border: Color::Gray,
            border_type: BorderType::Rounded,
            highlight: Color::Cyan,
            title: Color::Cyan,

            selected_bg: Color::DarkGray,
            selected_fg: Color::Yellow,

            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::LightBlue,

            participant_accent: Color::Rgb(0x1e, 0x3a, 0x8a),
            winner_accent: Color::Rgb(0xb4, 0x53, 0x09),

            log_error: Color::Red,
            log_warn: Color::Yellow,
            log_info: Color::Blue,
            log_debug: Color::DarkGray,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            name: "Light",
            background: Color::White,
            foreground: Color::Black,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_type: BorderType::Plain,
            highlight: Color::Blue,
            title: Color::Blue,

            selected_bg: Color::LightBlue,
            selected_fg: Color::Black,

            success: Color::Green,
            error: Color::Red,
            warning: Color::Rgb(184, 134, 11), // Dark goldenrod
            info: Color::Blue,

            participant_accent: Color::Rgb(0x1e, 0x3a, 0x8a),
            winner_accent: Color::Rgb(0xb4, 0x53, 0x09),

            log_error: Color::Red,
            log_warn: Color::Rgb(184, 134, 11),
            log_info: Color::Blue,
            log_debug: Color::Gray,
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            name: "Nord",
            background: Color::Rgb(46, 52, 64),
            foreground: Color::Rgb(216, 222, 233),
            muted: Color::Rgb(76, 86, 106),
            border: Color::Rgb(76, 86, 106),
            border_type: BorderType::Rounded,
            highlight: Color::Rgb(136, 192, 208),
            title: Color::Rgb(136, 192, 208),

            selected_bg: Color::Rgb(67, 76, 94),
            selected_fg: Color::Rgb(235, 203, 139),

            success: Color::Rgb(163, 190, 140),
            error: Color::Rgb(191, 97, 106),
            warning: Color::Rgb(235, 203, 139),
            info: Color::Rgb(129, 161, 193),

            participant_accent: Color::Rgb(129, 161, 193),
            winner_accent: Color::Rgb(208, 135, 112),

            log_error: Color::Rgb(191, 97, 106),
            log_warn: Color::Rgb(235, 203, 139),
            log_info: Color::Rgb(129, 161, 193),
            log_debug: Color::Rgb(76, 86, 106),
        }
    }
}
