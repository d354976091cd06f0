//! Color theme system for perch.
//!
//! A `Theme` holds the `ratatui::style::Color`s for the chrome (header, list,
//! dividers, footer) plus the raw SGR sequences the preview rows are composed
//! with. Preview rows are built as ANSI strings in `perch-core`, so their
//! colors have to exist in escape-sequence form as well.
//!
//! Two built-in themes are provided:
//!
//! - `dark`: ANSI 16 colors for the chrome; works on any terminal.
//! - `catppuccin_mocha`: Catppuccin Mocha palette in RGB; requires truecolor.

use perch_core::wrap::RowStyle;
use ratatui::style::Color;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Theme {
    // Chrome
    /// Application title in the header row.
    pub title: Color,
    /// Secondary text: directory, counts, key hints, continuation markers.
    pub muted: Color,
    /// Horizontal divider lines.
    pub divider: Color,

    // File list
    /// Background of the selected entry.
    pub selected_bg: Color,
    /// Foreground of the selected entry.
    pub selected_fg: Color,
    pub file_new: Color,
    pub file_modified: Color,
    pub file_deleted: Color,
    pub file_committed: Color,

    // Preview header
    pub stat_added: Color,
    pub stat_deleted: Color,

    // Preview rows, as SGR sequences
    /// Background for added lines.
    pub added_bg: &'static str,
    /// Background for the line preceding a deletion.
    pub deleted_bg: &'static str,
    pub added_gutter: &'static str,
    pub deleted_gutter: &'static str,
    pub neutral_gutter: &'static str,
}

impl Theme {
    /// Returns the built-in dark theme.
    ///
    /// The chrome uses ANSI 16 colors. Diff backgrounds are dim 24-bit tints
    /// because syntax colors are 24-bit anyway.
    pub fn dark() -> Self {
        Self {
            title: Color::Cyan,
            muted: Color::DarkGray,
            divider: Color::DarkGray,

            selected_bg: Color::DarkGray,
            selected_fg: Color::White,
            file_new: Color::Green,
            file_modified: Color::Yellow,
            file_deleted: Color::Red,
            file_committed: Color::Blue,

            stat_added: Color::Green,
            stat_deleted: Color::Red,

            added_bg: "\x1b[48;2;18;40;18m",
            deleted_bg: "\x1b[48;2;45;18;18m",
            added_gutter: "\x1b[32m",
            deleted_gutter: "\x1b[31m",
            neutral_gutter: "\x1b[90m",
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            title: lavender,
            muted: overlay1,
            divider: surface1,

            selected_bg: surface1,
            selected_fg: text,
            file_new: green,
            file_modified: yellow,
            file_deleted: red,
            file_committed: blue,

            stat_added: green,
            stat_deleted: red,

            added_bg: "\x1b[48;2;36;54;47m",
            deleted_bg: "\x1b[48;2;61;38;51m",
            added_gutter: "\x1b[38;2;166;227;161m",
            deleted_gutter: "\x1b[38;2;243;139;168m",
            neutral_gutter: "\x1b[38;2;88;91;112m",
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    /// SGR sequences for composing preview rows.
    pub fn row_style(&self) -> RowStyle<'static> {
        RowStyle {
            added_bg: self.added_bg,
            deleted_bg: self.deleted_bg,
            added_gutter: self.added_gutter,
            deleted_gutter: self.deleted_gutter,
            neutral_gutter: self.neutral_gutter,
        }
    }
}
