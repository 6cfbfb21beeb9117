//! Horizon Casement - a retained-mode window substrate with built-in controls.
//!
//! This is the main crate. It re-exports everything from
//! `horizon-casement-core` (windows, dispatch, focus, capture, timers) and
//! adds the [`controls`] module.
//!
//! # Example
//!
//! ```
//! use horizon_casement::controls::{ButtonRequest, ControlKind, DialogItem, DialogTemplate, create_dialog};
//! use horizon_casement::{DefaultBehavior, IDOK, Message, Rect, RuntimeConfig, UiRuntime, WindowParams};
//!
//! let mut ui = UiRuntime::new(RuntimeConfig::default());
//! let main = ui
//!     .create_window(WindowParams::top_level(Rect::from_xywh(0, 0, 640, 480)), DefaultBehavior)
//!     .unwrap();
//!
//! let template = DialogTemplate::new("Confirm", Rect::from_xywh(200, 150, 220, 90))
//!     .with_item(DialogItem::new(ControlKind::Button, IDOK, Rect::from_xywh(70, 50, 70, 24)).with_text("OK"))
//!     .modal(true);
//! let dialog = create_dialog(&mut ui, Some(main), template, None).unwrap();
//! assert!(!ui.is_enabled(main));
//!
//! let ok = ui.child_by_control_id(dialog.id, IDOK).unwrap();
//! ui.send(ok, Message::control(ButtonRequest::Click));
//! assert_eq!(dialog.result(), Some(IDOK as isize));
//! assert!(ui.is_enabled(main));
//! ```

pub use horizon_casement_core::*;

pub mod controls;
pub mod prelude;
