//! Logging and debugging facilities for Horizon Casement.
//!
//! This module provides:
//! - Target names for filtering the `tracing` output of each subsystem
//! - Debug visualization of window trees
//!
//! # Tracing Integration
//!
//! Horizon Casement uses the `tracing` crate for instrumentation. Install a
//! subscriber in the host application to see the output:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_casement_core::focus=trace")
//!     .init();
//! ```
//!
//! Hot paths (dispatch, posting, input) log at `trace`, window lifecycle at
//! `debug`, and swallowed behavior failures at `warn`.
//!
//! # Debug Visualization
//!
//! ```
//! use horizon_casement_core::logging::WindowTreeDebug;
//! use horizon_casement_core::{DefaultBehavior, Rect, UiRuntime, WindowParams};
//!
//! let mut ui = UiRuntime::new(Default::default());
//! let root = ui
//!     .create_window(WindowParams::top_level(Rect::from_xywh(0, 0, 100, 100)), DefaultBehavior)
//!     .unwrap();
//! let dump = WindowTreeDebug::new().format_subtree(&ui, root);
//! assert!(dump.contains("Window"));
//! ```

use std::fmt::Write as FmtWrite;

use crate::record::WindowId;
use crate::runtime::UiRuntime;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core runtime target.
    pub const CORE: &str = "horizon_casement_core";
    /// Creation, destruction and message delivery.
    pub const DISPATCH: &str = "horizon_casement_core::dispatch";
    /// Tree linkage, z-order and invalidation.
    pub const TREE: &str = "horizon_casement_core::tree";
    /// The asynchronous message queue.
    pub const QUEUE: &str = "horizon_casement_core::queue";
    /// Activation and keyboard focus.
    pub const FOCUS: &str = "horizon_casement_core::focus";
    /// Timers.
    pub const TIMER: &str = "horizon_casement_core::timer";
    /// Host input translation and capture.
    pub const INPUT: &str = "horizon_casement_core::input";
    /// Persisted preferences.
    pub const PROFILE: &str = "horizon_casement_core::profile";
}

/// Style options for window tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for window tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show window handles.
    pub show_ids: bool,
    /// Whether to show window rectangles.
    pub show_rects: bool,
    /// Whether to show style bits.
    pub show_styles: bool,
    /// Whether to list owned windows under their owner.
    pub show_owned: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_rects: true,
            show_styles: false,
            show_owned: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_styles: true,
            ..Default::default()
        }
    }

    /// Options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_rects: false,
            show_styles: false,
            show_owned: false,
            ..Default::default()
        }
    }
}

/// Renders window trees for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct WindowTreeDebug {
    options: TreeFormatOptions,
}

impl WindowTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every top-level window of the runtime.
    pub fn format_all(&self, ui: &UiRuntime) -> String {
        let mut output = String::new();
        writeln!(output, "Window Tree ({} windows):", ui.window_count()).expect("write to String");
        let roots = ui.top_level_windows();
        if roots.is_empty() {
            writeln!(output, "  (empty)").expect("write to String");
        }
        for root in roots {
            self.format_into(ui, root, false, &mut Vec::new(), &mut output);
        }
        output
    }

    /// Format the subtree rooted at `root`.
    pub fn format_subtree(&self, ui: &UiRuntime, root: WindowId) -> String {
        let mut output = String::new();
        self.format_into(ui, root, false, &mut Vec::new(), &mut output);
        output
    }

    fn format_into(
        &self,
        ui: &UiRuntime,
        id: WindowId,
        owned: bool,
        last_flags: &mut Vec<bool>,
        output: &mut String,
    ) {
        if self
            .options
            .max_depth
            .is_some_and(|max| last_flags.len() > max)
        {
            return;
        }
        let Some(record) = ui.record(id) else {
            return;
        };

        output.push_str(&self.prefix(last_flags));
        if owned {
            output.push_str("owned ");
        }
        output.push_str(record.class_name);
        if !record.text.is_empty() {
            write!(output, " {:?}", record.text).expect("write to String");
        }
        if record.control_id != 0 {
            write!(output, " #{}", record.control_id).expect("write to String");
        }
        if self.options.show_ids {
            write!(output, " [{id:?}]").expect("write to String");
        }
        if self.options.show_rects {
            write!(output, " {:?}", record.rect).expect("write to String");
        }
        if self.options.show_styles {
            write!(output, " {:?}", record.style).expect("write to String");
        }
        if !record.is_alive() {
            output.push_str(" (destroying)");
        }
        output.push('\n');

        let children = record.children.clone();
        let child_count = children.len();
        let owned_windows = if self.options.show_owned {
            record.owned.clone()
        } else {
            Vec::new()
        };
        let total = child_count + owned_windows.len();
        for (index, next) in children.into_iter().chain(owned_windows).enumerate() {
            last_flags.push(index + 1 == total);
            self.format_into(ui, next, index >= child_count, last_flags, output);
            last_flags.pop();
        }
    }

    fn prefix(&self, last_flags: &[bool]) -> String {
        let Some((&is_last, parents)) = last_flags.split_last() else {
            return String::new();
        };
        let (branch, tee, corner, blank) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- ", "    "),
            TreeStyle::Unicode => (
                "\u{2502}   ",
                "\u{251c}\u{2500}\u{2500} ",
                "\u{2514}\u{2500}\u{2500} ",
                "    ",
            ),
            TreeStyle::Compact => ("  ", "- ", "- ", "  "),
        };
        let mut prefix = String::new();
        for &parent_last in parents {
            prefix.push_str(if parent_last { blank } else { branch });
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix
    }
}
