//! Window behaviors: the single extensibility point of the window tree.
//!
//! A behavior receives every message dispatched to its window and owns the
//! window's private state as ordinary struct fields. The runtime stores
//! behaviors as `Rc<RefCell<dyn WindowBehavior>>`; the `Rc` is cloned for the
//! duration of each dispatch so a behavior that destroys its own window keeps
//! running until it returns.
//!
//! # Example
//!
//! ```
//! use horizon_casement_core::{
//!     FnBehavior, Message, Rect, UiRuntime, WindowParams,
//! };
//!
//! let mut ui = UiRuntime::new(Default::default());
//! let window = ui.create_window(
//!     WindowParams::top_level(Rect::from_xywh(0, 0, 320, 240)),
//!     FnBehavior::new("Main", |ui, hwnd, msg| match msg {
//!         Message::Close => {
//!             ui.destroy_window(hwnd);
//!             Ok(0)
//!         }
//!         _ => Ok(ui.default_handle(hwnd, msg)),
//!     }),
//! );
//! assert!(window.is_some());
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::message::Message;
use crate::painter::Painter;
use crate::record::WindowId;
use crate::runtime::UiRuntime;

/// Upcast helper so behaviors can be downcast to their concrete type.
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The behavior of a window (its "window procedure").
pub trait WindowBehavior: AsAny {
    /// Handle a dispatched message and return the reply.
    ///
    /// Messages the behavior does not care about should be forwarded to
    /// [`UiRuntime::default_handle`]. An `Err` is logged and turned into a
    /// zero reply.
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize>;

    /// Paint the client area. Coordinates are client-relative.
    fn paint(&self, _ui: &UiRuntime, _hwnd: WindowId, _painter: &mut dyn Painter) {}

    /// Class name used in logs and tree dumps.
    fn class_name(&self) -> &'static str {
        "Window"
    }
}

/// Secondary behavior of a dialog window.
///
/// It sees each message before the primary behavior. Returning `Some(reply)`
/// marks the message as handled and skips the primary behavior.
pub trait DialogBehavior: AsAny {
    /// Handle a message sent to the dialog.
    fn handle(
        &mut self,
        ui: &mut UiRuntime,
        hwnd: WindowId,
        msg: &mut Message,
    ) -> Result<Option<isize>>;
}

/// Shared handle to a window behavior.
pub type SharedBehavior = Rc<RefCell<dyn WindowBehavior>>;

/// Shared handle to a dialog behavior.
pub type SharedDialogBehavior = Rc<RefCell<dyn DialogBehavior>>;

/// A behavior built from a closure.
pub struct FnBehavior<F> {
    class_name: &'static str,
    handler: F,
}

impl<F> FnBehavior<F>
where
    F: FnMut(&mut UiRuntime, WindowId, &mut Message) -> Result<isize> + 'static,
{
    /// Wrap a closure as a behavior.
    pub fn new(class_name: &'static str, handler: F) -> Self {
        Self {
            class_name,
            handler,
        }
    }
}

impl<F> WindowBehavior for FnBehavior<F>
where
    F: FnMut(&mut UiRuntime, WindowId, &mut Message) -> Result<isize> + 'static,
{
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        (self.handler)(ui, hwnd, msg)
    }

    fn class_name(&self) -> &'static str {
        self.class_name
    }
}

/// A behavior that only performs the default handling.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBehavior;

impl WindowBehavior for DefaultBehavior {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        Ok(ui.default_handle(hwnd, msg))
    }
}

/// A dialog behavior built from a closure.
pub struct FnDialogBehavior<F> {
    handler: F,
}

impl<F> FnDialogBehavior<F>
where
    F: FnMut(&mut UiRuntime, WindowId, &mut Message) -> Result<Option<isize>> + 'static,
{
    /// Wrap a closure as a dialog behavior.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> DialogBehavior for FnDialogBehavior<F>
where
    F: FnMut(&mut UiRuntime, WindowId, &mut Message) -> Result<Option<isize>> + 'static,
{
    fn handle(
        &mut self,
        ui: &mut UiRuntime,
        hwnd: WindowId,
        msg: &mut Message,
    ) -> Result<Option<isize>> {
        (self.handler)(ui, hwnd, msg)
    }
}
