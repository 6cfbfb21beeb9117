//! Core systems for Horizon Casement.
//!
//! Horizon Casement is a retained-mode window substrate: a tree of windows
//! linked by parent, child and owner relations, a message-dispatch protocol
//! with synchronous and queued delivery, per-runtime mouse capture and
//! keyboard focus, and timers. Built-in controls live in the
//! `horizon-casement` crate on top of this one.
//!
//! # Overview
//!
//! - [`UiRuntime`]: owns every window and all UI-thread state.
//! - [`WindowBehavior`]: the behavior ("window procedure") of a window.
//! - [`Message`]: what behaviors receive.
//! - [`PostHandle`]: the thread-safe entry point for posting messages.
//! - [`Painter`], [`TextMeasure`], [`Clipboard`], [`Profile`]: collaborators
//!   supplied by the host.
//!
//! # Example
//!
//! ```
//! use horizon_casement_core::{
//!     DefaultBehavior, Message, Point, Rect, RuntimeConfig, UiRuntime, WindowParams,
//! };
//!
//! let mut ui = UiRuntime::new(RuntimeConfig::default());
//! let frame = ui
//!     .create_window(WindowParams::top_level(Rect::from_xywh(0, 0, 640, 480)), DefaultBehavior)
//!     .unwrap();
//! let panel = ui
//!     .create_window(WindowParams::child(frame, 1, Rect::from_xywh(10, 10, 100, 100)), DefaultBehavior)
//!     .unwrap();
//!
//! assert_eq!(ui.window_from_point(Point::new(50, 50)), Some(panel));
//! assert!(ui.post(panel, Message::Close));
//! ui.flush();
//! assert!(!ui.is_window(panel));
//! ```

mod behavior;
mod capture;
mod clipboard;
mod dispatch;
mod error;
mod focus;
mod geometry;
mod input;
pub mod logging;
mod message;
mod painter;
mod profile;
mod queue;
mod record;
mod runtime;
mod theme;
mod timer;
mod tree;

pub use behavior::{
    AsAny, DefaultBehavior, DialogBehavior, FnBehavior, FnDialogBehavior, SharedBehavior,
    SharedDialogBehavior, WindowBehavior,
};
#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{Clipboard, MemoryClipboard};
pub use dispatch::CREATE_ABORT;
pub use error::{CasementError, Result};
pub use focus::FocusDirection;
pub use geometry::{Insets, Point, Rect, Size};
pub use input::InputEvent;
pub use message::{
    ControlMessage, CreateInfo, DialogCode, IDCANCEL, IDOK, Key, Message, Modifiers, MouseButton,
    Notification,
};
pub use painter::{Color, MonospaceMetrics, PaintOp, Painter, RecordingPainter, TextMeasure};
pub use profile::{
    IniProfile, MemoryProfile, PLACEMENT_SECTION, Profile, format_placement, parse_placement,
};
pub use queue::{MessageQueue, PostHandle};
pub use record::{EXTRA_SLOTS, Lifecycle, WindowId, WindowParams, WindowStyle};
pub use runtime::{DEFAULT_QUEUE_CAPACITY, RuntimeConfig, UiRuntime};
pub use theme::{ThemeColors, ThemeMetrics};
pub use timer::{TimerCallback, TimerKey};
pub use tree::ZOrder;
