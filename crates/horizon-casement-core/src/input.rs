//! Translation of primitive host input into window messages.
//!
//! The host feeds [`InputEvent`]s in screen coordinates. Pointer events go to
//! the capture holder, or to the window under the pointer; a button press
//! also activates the pressed surface. Keyboard events go to the focused
//! window, after dialog navigation keys have been given a chance to act.

use crate::focus::FocusDirection;
use crate::geometry::Point;
use crate::logging::targets;
use crate::message::{DialogCode, IDCANCEL, IDOK, Key, Message, Modifiers, MouseButton};
use crate::record::{WindowId, WindowStyle};
use crate::runtime::UiRuntime;

/// A primitive input event from the host, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The pointer moved.
    PointerMove {
        /// Pointer position.
        pos: Point,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// A pointer button changed state.
    PointerButton {
        /// Button.
        button: MouseButton,
        /// Pressed (`true`) or released.
        pressed: bool,
        /// Pointer position.
        pos: Point,
        /// Held modifiers.
        modifiers: Modifiers,
        /// The host classified the press as a double click.
        double_click: bool,
    },
    /// The wheel turned.
    Wheel {
        /// Delta in notches; positive scrolls up/left.
        delta: i32,
        /// Horizontal wheel.
        horizontal: bool,
        /// Pointer position.
        pos: Point,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// A key changed state.
    Key {
        /// Key.
        key: Key,
        /// Pressed (`true`) or released.
        pressed: bool,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// Text input.
    Text {
        /// The typed character.
        ch: char,
        /// Held modifiers.
        modifiers: Modifiers,
    },
}

impl UiRuntime {
    /// Deliver a host input event. Returns `false` if no window received it.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        tracing::trace!(target: targets::INPUT, ?event, "input");
        match event {
            InputEvent::PointerMove { pos, modifiers } => {
                let Some((target, local)) = self.pointer_target(pos) else {
                    return false;
                };
                self.dispatch(target, &mut Message::MouseMove { pos: local, modifiers });
                true
            }
            InputEvent::PointerButton {
                button,
                pressed,
                pos,
                modifiers,
                double_click,
            } => {
                let Some((target, local)) = self.pointer_target(pos) else {
                    return false;
                };
                if pressed {
                    if self.capture().is_none()
                        && let Some(surface) = self.top_level_of(target)
                        && self.active_window() != Some(surface)
                    {
                        self.set_active_window(surface);
                    }
                    self.dispatch(
                        target,
                        &mut Message::ButtonDown {
                            button,
                            pos: local,
                            modifiers,
                            double_click,
                        },
                    );
                } else {
                    self.dispatch(
                        target,
                        &mut Message::ButtonUp {
                            button,
                            pos: local,
                            modifiers,
                        },
                    );
                }
                true
            }
            InputEvent::Wheel {
                delta,
                horizontal,
                pos,
                modifiers,
            } => {
                let target = self.get_focus().or_else(|| self.window_from_point(pos));
                let Some(target) = target else {
                    return false;
                };
                let local = self.screen_to_client(target, pos).unwrap_or(pos);
                self.dispatch(
                    target,
                    &mut Message::Wheel {
                        delta,
                        horizontal,
                        pos: local,
                        modifiers,
                    },
                );
                true
            }
            InputEvent::Key {
                key,
                pressed,
                modifiers,
            } => {
                let Some(focus) = self.get_focus() else {
                    return false;
                };
                if pressed {
                    if self.dialog_key(focus, key, modifiers) {
                        return true;
                    }
                    self.dispatch(focus, &mut Message::KeyDown { key, modifiers });
                } else {
                    self.dispatch(focus, &mut Message::KeyUp { key, modifiers });
                }
                true
            }
            InputEvent::Text { ch, modifiers } => {
                let Some(focus) = self.get_focus() else {
                    return false;
                };
                if matches!(ch, '\t' | '\r' | '\n' | '\u{1b}') && self.in_dialog(focus) {
                    let code = self.dialog_code(focus);
                    if !code.contains(DialogCode::WANT_CHARS) {
                        return true;
                    }
                }
                self.dispatch(focus, &mut Message::Char { ch, modifiers });
                true
            }
        }
    }

    fn pointer_target(&self, pos: Point) -> Option<(WindowId, Point)> {
        let target = self.capture().or_else(|| self.window_from_point(pos))?;
        let local = self.screen_to_client(target, pos)?;
        Some((target, local))
    }

    fn in_dialog(&self, focus: WindowId) -> bool {
        self.top_level_of(focus)
            .and_then(|s| self.style(s))
            .is_some_and(|s| s.contains(WindowStyle::DIALOG))
    }

    fn dialog_code(&mut self, focus: WindowId) -> DialogCode {
        let reply = self.dispatch(focus, &mut Message::GetDialogCode);
        DialogCode::from_bits_truncate(reply as u8)
    }

    /// Dialog navigation. Returns `true` if the key was consumed.
    fn dialog_key(&mut self, focus: WindowId, key: Key, modifiers: Modifiers) -> bool {
        if !self.in_dialog(focus) {
            return false;
        }
        let Some(surface) = self.top_level_of(focus) else {
            return false;
        };
        let code = self.dialog_code(focus);
        if code.contains(DialogCode::WANT_ALL) {
            return false;
        }
        match key {
            Key::Tab if !code.contains(DialogCode::WANT_TAB) && !modifiers.ctrl() => {
                let direction = if modifiers.shift() {
                    FocusDirection::Previous
                } else {
                    FocusDirection::Next
                };
                self.navigate_focus(direction);
                true
            }
            Key::Left | Key::Up if !code.contains(DialogCode::WANT_ARROWS) => {
                self.navigate_focus(FocusDirection::GroupPrevious);
                true
            }
            Key::Right | Key::Down if !code.contains(DialogCode::WANT_ARROWS) => {
                self.navigate_focus(FocusDirection::GroupNext);
                true
            }
            Key::Enter if !code.contains(DialogCode::WANT_ENTER) => {
                self.dispatch(
                    surface,
                    &mut Message::Command {
                        id: IDOK,
                        code: 0,
                        source: Some(focus),
                    },
                );
                true
            }
            Key::Escape => {
                self.dispatch(
                    surface,
                    &mut Message::Command {
                        id: IDCANCEL,
                        code: 0,
                        source: Some(focus),
                    },
                );
                true
            }
            _ => false,
        }
    }
}
