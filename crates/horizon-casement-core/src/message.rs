//! Messages delivered to window behaviors.
//!
//! Every interaction with a window goes through a [`Message`]: creation and
//! destruction notifications, input, focus and capture changes, timers, and
//! control-specific requests. Messages are delivered synchronously with
//! [`UiRuntime::dispatch`](crate::UiRuntime::dispatch) or queued with
//! [`UiRuntime::post`](crate::UiRuntime::post).
//!
//! Control-specific requests travel as [`Message::Control`] carrying a
//! [`ControlMessage`], a type-erased payload that the receiving control
//! downcasts to its own request type. Query requests carry output fields that
//! the control fills in place.

use std::any::Any;
use std::fmt;

use bitflags::bitflags;

use crate::geometry::{Point, Size};
use crate::record::{WindowId, WindowStyle};

/// Command identifier sent by the default "OK" action of a dialog.
pub const IDOK: u32 = 1;
/// Command identifier sent by the default "Cancel" action of a dialog.
pub const IDCANCEL: u32 = 2;

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 0b0001;
        /// Control key.
        const CTRL  = 0b0010;
        /// Alt/Option key.
        const ALT   = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Modifiers {
    /// Whether Shift is held.
    #[inline]
    pub fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }

    /// Whether Control is held.
    #[inline]
    pub fn ctrl(self) -> bool {
        self.contains(Self::CTRL)
    }

    /// Whether Alt is held.
    #[inline]
    pub fn alt(self) -> bool {
        self.contains(Self::ALT)
    }
}

bitflags! {
    /// What a control wants to receive instead of the dialog navigation keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DialogCode: u8 {
        /// Arrow keys are delivered to the control.
        const WANT_ARROWS = 0b0001;
        /// Tab is delivered to the control.
        const WANT_TAB    = 0b0010;
        /// Enter is delivered to the control.
        const WANT_ENTER  = 0b0100;
        /// Character messages are wanted.
        const WANT_CHARS  = 0b1000;
        /// Every key is delivered to the control.
        const WANT_ALL    = 0b1111;
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Middle button / wheel click.
    Middle,
}

/// Virtual key codes understood by the built-in controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Insert.
    Insert,
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Space bar.
    Space,
    /// Function key F1..F24.
    F(u8),
    /// A character key, reported as the unshifted lowercase character.
    Char(char),
}

/// Parameters handed to a behavior with [`Message::Create`].
#[derive(Debug, Clone, Default)]
pub struct CreateInfo {
    /// Initial window text.
    pub text: String,
    /// Generic window style.
    pub style: WindowStyle,
    /// Control-specific style bits, interpreted by the behavior.
    pub control_style: u32,
    /// Opaque creation parameter.
    pub param: isize,
}

/// A type-erased, control-specific request or payload.
///
/// The sender wraps a concrete value; the receiving control downcasts it to
/// the type it understands and ignores anything else.
pub struct ControlMessage(Box<dyn Any + Send>);

impl ControlMessage {
    /// Wrap a payload.
    pub fn new<T: Any + Send>(payload: T) -> Self {
        Self(Box::new(payload))
    }

    /// Check the payload type.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Borrow the payload as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Mutably borrow the payload as `T` (used to fill query results).
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.downcast_mut::<T>()
    }

    /// Take the payload back out as `T`.
    pub fn into_inner<T: Any>(self) -> Option<T> {
        self.0.downcast::<T>().ok().map(|b| *b)
    }
}

impl fmt::Debug for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ControlMessage(..)")
    }
}

/// A notification sent by a control to its parent.
#[derive(Debug)]
pub struct Notification {
    /// The control that sent the notification.
    pub from: WindowId,
    /// The control identifier of the sender.
    pub control_id: u32,
    /// Control-specific notification code.
    pub code: u32,
    /// Optional payload; some notifications expect the parent to fill it.
    pub data: Option<ControlMessage>,
}

impl Notification {
    /// Downcast the payload.
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_ref().and_then(|d| d.downcast_ref::<T>())
    }

    /// Mutably downcast the payload.
    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.as_mut().and_then(|d| d.downcast_mut::<T>())
    }
}

/// A message delivered to a window behavior.
#[derive(Debug)]
pub enum Message {
    /// No-op message.
    Null,
    /// The window has been linked into the tree. Replying `-1` aborts creation.
    Create(CreateInfo),
    /// The window is about to be destroyed.
    Destroy,
    /// A request to close the window. The default reply destroys it.
    Close,
    /// The client area changed size.
    Size(Size),
    /// The window moved (new origin in parent client coordinates).
    Move(Point),
    /// The window was shown or hidden.
    Show(bool),
    /// The window was enabled or disabled.
    Enable(bool),
    /// The surface became active or inactive.
    Activate(bool),
    /// Replace the window text.
    SetText(String),
    /// Fill the buffer with the window text; replies with its length.
    GetText(String),
    /// Reply with the length of the window text in bytes.
    GetTextLength,
    /// The window received keyboard focus.
    SetFocus {
        /// The window that lost focus.
        previous: Option<WindowId>,
    },
    /// The window is losing keyboard focus.
    KillFocus {
        /// The window about to receive focus.
        next: Option<WindowId>,
    },
    /// The window lost mouse capture.
    CaptureChanged {
        /// The window gaining capture, if any.
        gaining: Option<WindowId>,
    },
    /// The pointer moved (client coordinates).
    MouseMove {
        /// Pointer position.
        pos: Point,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// A mouse button was pressed (client coordinates).
    ButtonDown {
        /// Button.
        button: MouseButton,
        /// Pointer position.
        pos: Point,
        /// Held modifiers.
        modifiers: Modifiers,
        /// Whether the host classified this press as a double click.
        double_click: bool,
    },
    /// A mouse button was released (client coordinates).
    ButtonUp {
        /// Button.
        button: MouseButton,
        /// Pointer position.
        pos: Point,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// The wheel was turned. Positive deltas scroll up/left.
    Wheel {
        /// Wheel delta in notches.
        delta: i32,
        /// Horizontal wheel.
        horizontal: bool,
        /// Pointer position (client coordinates).
        pos: Point,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// A key was pressed.
    KeyDown {
        /// Key.
        key: Key,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// A key was released.
    KeyUp {
        /// Key.
        key: Key,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// A character was typed.
    Char {
        /// The character.
        ch: char,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// A window timer fired.
    Timer {
        /// The timer identifier given to `set_timer`.
        id: u32,
    },
    /// A command from a control, menu or accelerator.
    Command {
        /// Command or control identifier.
        id: u32,
        /// Notification code (0 for menus).
        code: u32,
        /// The control that sent the command.
        source: Option<WindowId>,
    },
    /// A structured notification from a child control.
    Notify(Notification),
    /// Ask which dialog keys the control wants; reply with [`DialogCode`] bits.
    GetDialogCode,
    /// A dialog is about to be shown. Reply nonzero to focus the first tab stop.
    InitDialog,
    /// Cut the selection to the clipboard.
    Cut,
    /// Copy the selection to the clipboard.
    Copy,
    /// Paste from the clipboard.
    Paste,
    /// Delete the selection.
    Clear,
    /// A control-specific request.
    Control(ControlMessage),
    /// Application-defined message.
    User {
        /// Application code.
        code: u32,
        /// First parameter.
        wparam: usize,
        /// Second parameter.
        lparam: isize,
    },
}

impl Message {
    /// Wrap a control-specific request.
    pub fn control<T: Any + Send>(request: T) -> Self {
        Self::Control(ControlMessage::new(request))
    }

    /// Short name of the message, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Create(_) => "Create",
            Self::Destroy => "Destroy",
            Self::Close => "Close",
            Self::Size(_) => "Size",
            Self::Move(_) => "Move",
            Self::Show(_) => "Show",
            Self::Enable(_) => "Enable",
            Self::Activate(_) => "Activate",
            Self::SetText(_) => "SetText",
            Self::GetText(_) => "GetText",
            Self::GetTextLength => "GetTextLength",
            Self::SetFocus { .. } => "SetFocus",
            Self::KillFocus { .. } => "KillFocus",
            Self::CaptureChanged { .. } => "CaptureChanged",
            Self::MouseMove { .. } => "MouseMove",
            Self::ButtonDown { .. } => "ButtonDown",
            Self::ButtonUp { .. } => "ButtonUp",
            Self::Wheel { .. } => "Wheel",
            Self::KeyDown { .. } => "KeyDown",
            Self::KeyUp { .. } => "KeyUp",
            Self::Char { .. } => "Char",
            Self::Timer { .. } => "Timer",
            Self::Command { .. } => "Command",
            Self::Notify(_) => "Notify",
            Self::GetDialogCode => "GetDialogCode",
            Self::InitDialog => "InitDialog",
            Self::Cut => "Cut",
            Self::Copy => "Copy",
            Self::Paste => "Paste",
            Self::Clear => "Clear",
            Self::Control(_) => "Control",
            Self::User { .. } => "User",
        }
    }

    /// Whether this is the end-of-life notification.
    #[inline]
    pub fn is_destroy(&self) -> bool {
        matches!(self, Self::Destroy)
    }

    /// Downcast a control request carried by this message.
    pub fn control_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            Self::Control(payload) => payload.downcast_mut::<T>(),
            _ => None,
        }
    }
}

static_assertions::assert_impl_all!(Message: Send);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Probe {
        answer: i32,
    }

    #[test]
    fn test_control_message_downcast() {
        let mut msg = Message::control(Probe { answer: 1 });
        assert_eq!(msg.name(), "Control");

        let probe = msg.control_mut::<Probe>().unwrap();
        probe.answer = 42;

        assert!(msg.control_mut::<String>().is_none());
        match msg {
            Message::Control(payload) => {
                assert_eq!(payload.into_inner::<Probe>(), Some(Probe { answer: 42 }));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_modifiers_helpers() {
        let mods = Modifiers::SHIFT | Modifiers::CTRL;
        assert!(mods.shift());
        assert!(mods.ctrl());
        assert!(!mods.alt());
    }
}
