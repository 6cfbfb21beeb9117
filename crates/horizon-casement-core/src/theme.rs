//! Theme colors and pixel metrics.
//!
//! Controls read these values through [`UiRuntime::theme`](crate::UiRuntime::theme);
//! they are never mutated while the runtime is running.

use std::time::Duration;

use crate::painter::Color;

/// Colors used by the built-in controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    /// Window and control background.
    pub window: Color,
    /// Normal text.
    pub text: Color,
    /// Disabled text.
    pub disabled_text: Color,
    /// Selection background.
    pub highlight: Color,
    /// Selected text.
    pub highlight_text: Color,
    /// Button faces, headers, scrollbar tracks.
    pub face: Color,
    /// Frames and separators.
    pub shadow: Color,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            window: Color::WHITE,
            text: Color::BLACK,
            disabled_text: Color::rgb(128, 128, 128),
            highlight: Color::rgb(0, 120, 215),
            highlight_text: Color::WHITE,
            face: Color::rgb(240, 240, 240),
            shadow: Color::rgb(160, 160, 160),
        }
    }
}

/// Read-only metrics shared by every control.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeMetrics {
    /// Colors.
    pub colors: ThemeColors,
    /// Width of a vertical scrollbar (height of a horizontal one).
    pub scrollbar_width: i32,
    /// Minimum length of a scrollbar thumb.
    pub min_thumb_length: i32,
    /// Height of a list or tree row.
    pub row_height: i32,
    /// Height of a list header.
    pub header_height: i32,
    /// Width of the leading status-icon column of a list.
    pub status_icon_width: i32,
    /// Distance from a column border that starts a column resize.
    pub column_grab_tolerance: i32,
    /// Idle time after which type-ahead input starts over.
    pub typeahead_timeout: Duration,
    /// Average character width for the default text metrics.
    pub char_width: i32,
    /// Line height for the default text metrics.
    pub line_height: i32,
    /// Horizontal padding inside a tab.
    pub tab_padding: i32,
    /// Height of the tab strip.
    pub tab_height: i32,
    /// Horizontal indent per tree level.
    pub tree_indent: i32,
    /// Thickness of a trackbar thumb.
    pub trackbar_thumb: i32,
    /// Rows shown by an open combo box list.
    pub combo_dropdown_rows: usize,
    /// Text padding inside list cells and edit controls.
    pub text_padding: i32,
}

impl Default for ThemeMetrics {
    fn default() -> Self {
        Self {
            colors: ThemeColors::default(),
            scrollbar_width: 14,
            min_thumb_length: 8,
            row_height: 18,
            header_height: 20,
            status_icon_width: 16,
            column_grab_tolerance: 4,
            typeahead_timeout: Duration::from_secs(1),
            char_width: 7,
            line_height: 16,
            tab_padding: 8,
            tab_height: 22,
            tree_indent: 16,
            trackbar_thumb: 10,
            combo_dropdown_rows: 8,
            text_padding: 2,
        }
    }
}
