//! Prelude module for Horizon Casement.
//!
//! ```
//! use horizon_casement::prelude::*;
//! ```
//!
//! This provides access to:
//! - the runtime and its configuration (`UiRuntime`, `RuntimeConfig`)
//! - window creation and behaviors (`WindowParams`, `WindowBehavior`, `FnBehavior`)
//! - messages and input (`Message`, `InputEvent`, `Key`, `Modifiers`)
//! - geometry and painting (`Point`, `Size`, `Rect`, `Painter`)
//! - the built-in controls and their requests

// ============================================================================
// Runtime
// ============================================================================

pub use crate::{PostHandle, RuntimeConfig, ThemeMetrics, UiRuntime};

// ============================================================================
// Windows and Behaviors
// ============================================================================

pub use crate::{
    DefaultBehavior, DialogBehavior, FnBehavior, FnDialogBehavior, WindowBehavior, WindowId,
    WindowParams, WindowStyle, ZOrder,
};

// ============================================================================
// Messages and Input
// ============================================================================

pub use crate::{
    FocusDirection, IDCANCEL, IDOK, InputEvent, Key, Message, Modifiers, MouseButton,
    Notification,
};

// ============================================================================
// Geometry and Painting
// ============================================================================

pub use crate::{Color, Insets, Painter, Point, Rect, RecordingPainter, Size, TextMeasure};

// ============================================================================
// Controls
// ============================================================================

pub use crate::controls::{
    Button, ButtonRequest, ButtonStyle, ComboBox, ComboRequest, ControlKind, DialogHandle,
    DialogItem, DialogTemplate, EditControl, EditRequest, EditStyle, Label, ListColumn,
    ListRequest, ListRow, ListStyle, ListView, ProgressBar, ProgressRequest, TabControl,
    TabRequest, Trackbar, TrackbarRequest, TreeRequest, TreeView, create_dialog, end_dialog,
};
