//! Push buttons, check boxes and radio buttons.
//!
//! A press captures the pointer; the click fires on release only if the
//! pointer is still over the button. Space works the same way from the
//! keyboard. Radio groups follow the window tree: a group runs from a
//! sibling with [`WindowStyle::GROUP`] up to (not including) the next one.

use bitflags::bitflags;
use horizon_casement_core::{
    Key, Message, MouseButton, Painter, Point, Rect, Result, UiRuntime, WindowBehavior, WindowId,
    WindowStyle,
};

use super::{TARGET, command_parent};

pub(crate) const CLASS_NAME: &str = "Button";

/// The button was clicked.
pub const BN_CLICKED: u32 = 0;

bitflags! {
    /// Button style bits, passed as the control style.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ButtonStyle: u32 {
        /// The default push button of a dialog.
        const DEF_PUSH      = 1 << 0;
        /// Check box the application toggles itself.
        const CHECKBOX      = 1 << 1;
        /// Check box that toggles when clicked.
        const AUTO_CHECKBOX = 1 << 2;
        /// Radio button the application checks itself.
        const RADIO         = 1 << 3;
        /// Radio button that checks itself and clears its group when clicked.
        const AUTO_RADIO    = 1 << 4;
    }
}

/// Requests understood by [`Button`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRequest {
    /// Set the check state.
    SetCheck(bool),
    /// Reply 1 if checked.
    GetCheck,
    /// Click the button as the user would.
    Click,
}

/// A button.
#[derive(Debug, Default)]
pub struct Button {
    style: ButtonStyle,
    checked: bool,
    /// Drawn pushed in.
    pressed: bool,
    /// Holding capture after a press.
    tracking: bool,
    has_focus: bool,
}

impl Button {
    /// Create a push button.
    pub fn new() -> Self {
        Self::default()
    }

    /// Style bits.
    pub fn style(&self) -> ButtonStyle {
        self.style
    }

    /// Check state.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Whether the button is drawn pushed in.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn is_radio(&self) -> bool {
        self.style.intersects(ButtonStyle::RADIO | ButtonStyle::AUTO_RADIO)
    }

    fn is_check_box(&self) -> bool {
        self.style.intersects(ButtonStyle::CHECKBOX | ButtonStyle::AUTO_CHECKBOX)
    }

    fn set_pressed(&mut self, ui: &mut UiRuntime, hwnd: WindowId, pressed: bool) {
        if self.pressed != pressed {
            self.pressed = pressed;
            ui.invalidate(hwnd, None);
        }
    }

    fn click(&mut self, ui: &mut UiRuntime, hwnd: WindowId) {
        if self.style.contains(ButtonStyle::AUTO_CHECKBOX) {
            self.checked = !self.checked;
            ui.invalidate(hwnd, None);
        } else if self.style.contains(ButtonStyle::AUTO_RADIO) {
            if !self.checked {
                self.checked = true;
                ui.invalidate(hwnd, None);
            }
            for sibling in radio_group(ui, hwnd) {
                let checked_radio = sibling != hwnd
                    && ui
                        .with_behavior::<Button, _>(sibling, |b| b.is_radio() && b.checked)
                        .unwrap_or(false);
                if checked_radio {
                    ui.send(sibling, Message::control(ButtonRequest::SetCheck(false)));
                }
            }
        }
        tracing::debug!(target: TARGET, ?hwnd, checked = self.checked, "button clicked");
        command_parent(ui, hwnd, BN_CLICKED);
    }
}

/// The siblings sharing `hwnd`'s group, `hwnd` included.
fn radio_group(ui: &UiRuntime, hwnd: WindowId) -> Vec<WindowId> {
    let Some(parent) = ui.parent(hwnd) else {
        return vec![hwnd];
    };
    let siblings = ui.children(parent);
    let Some(index) = siblings.iter().position(|&w| w == hwnd) else {
        return vec![hwnd];
    };
    let starts_group = |w: WindowId| ui.style(w).is_some_and(|s| s.contains(WindowStyle::GROUP));
    let start = (0..=index)
        .rev()
        .find(|&i| starts_group(siblings[i]))
        .unwrap_or(0);
    let end = (index + 1..siblings.len())
        .find(|&i| starts_group(siblings[i]))
        .unwrap_or(siblings.len());
    siblings[start..end].to_vec()
}

impl WindowBehavior for Button {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        match msg {
            Message::Create(info) => {
                self.style = ButtonStyle::from_bits_truncate(info.control_style);
                Ok(0)
            }
            Message::Destroy => {
                if self.tracking && ui.capture() == Some(hwnd) {
                    ui.release_capture();
                }
                self.tracking = false;
                Ok(0)
            }
            Message::SetFocus { .. } => {
                self.has_focus = true;
                ui.invalidate(hwnd, None);
                Ok(0)
            }
            Message::KillFocus { .. } => {
                self.has_focus = false;
                self.set_pressed(ui, hwnd, false);
                Ok(0)
            }
            Message::ButtonDown {
                button: MouseButton::Left,
                ..
            } => {
                if !self.has_focus {
                    ui.set_focus(hwnd);
                }
                self.tracking = true;
                self.set_pressed(ui, hwnd, true);
                ui.set_capture(hwnd);
                Ok(0)
            }
            Message::MouseMove { pos, .. } => {
                if self.tracking {
                    let inside = ui.client_rect(hwnd).is_some_and(|r| r.contains(*pos));
                    self.set_pressed(ui, hwnd, inside);
                }
                Ok(0)
            }
            Message::ButtonUp {
                button: MouseButton::Left,
                pos,
                ..
            } => {
                if !std::mem::take(&mut self.tracking) {
                    return Ok(0);
                }
                if ui.capture() == Some(hwnd) {
                    ui.release_capture();
                }
                let inside = ui.client_rect(hwnd).is_some_and(|r| r.contains(*pos));
                self.set_pressed(ui, hwnd, false);
                if inside {
                    self.click(ui, hwnd);
                }
                Ok(0)
            }
            Message::CaptureChanged { .. } => {
                if self.tracking {
                    self.tracking = false;
                    self.set_pressed(ui, hwnd, false);
                }
                Ok(0)
            }
            Message::KeyDown { key: Key::Space, .. } => {
                self.set_pressed(ui, hwnd, true);
                Ok(0)
            }
            Message::KeyUp { key: Key::Space, .. } => {
                if self.pressed && !self.tracking {
                    self.set_pressed(ui, hwnd, false);
                    self.click(ui, hwnd);
                }
                Ok(0)
            }
            Message::Control(_) => {
                let Some(request) = msg.control_mut::<ButtonRequest>().copied() else {
                    return Ok(0);
                };
                Ok(match request {
                    ButtonRequest::SetCheck(checked) => {
                        if self.checked != checked {
                            self.checked = checked;
                            ui.invalidate(hwnd, None);
                        }
                        1
                    }
                    ButtonRequest::GetCheck => self.checked as isize,
                    ButtonRequest::Click => {
                        self.click(ui, hwnd);
                        1
                    }
                })
            }
            _ => Ok(ui.default_handle(hwnd, msg)),
        }
    }

    fn paint(&self, ui: &UiRuntime, hwnd: WindowId, painter: &mut dyn Painter) {
        let theme = ui.theme();
        let colors = &theme.colors;
        let client = ui.client_rect(hwnd).unwrap_or_default();
        let text = ui.raw_text(hwnd).unwrap_or_default();
        let text_color = if ui.is_enabled(hwnd) {
            colors.text
        } else {
            colors.disabled_text
        };
        let metrics = ui.text_metrics();
        let text_top = client.top + (client.height() - metrics.line_height()) / 2;

        if self.is_check_box() || self.is_radio() {
            painter.fill_rect(client, colors.face);
            let size = 13.min(client.height());
            let mark = Rect::from_xywh(client.left, client.top + (client.height() - size) / 2, size, size);
            painter.fill_rect(mark, if self.pressed { colors.face } else { colors.window });
            painter.frame_rect(mark, colors.shadow);
            if self.checked && self.is_radio() {
                painter.fill_rect(
                    Rect::new(mark.left + 4, mark.top + 4, mark.right - 4, mark.bottom - 4),
                    colors.text,
                );
            } else if self.checked {
                painter.draw_line(
                    Point::new(mark.left + 3, mark.top + 6),
                    Point::new(mark.left + 5, mark.bottom - 4),
                    colors.text,
                );
                painter.draw_line(
                    Point::new(mark.left + 5, mark.bottom - 4),
                    Point::new(mark.right - 3, mark.top + 3),
                    colors.text,
                );
            }
            painter.draw_text(Point::new(mark.right + 4, text_top), text, text_color);
            if self.has_focus {
                let label_width = metrics.text_width(text);
                let focus = Rect::new(
                    mark.right + 2,
                    text_top - 1,
                    mark.right + 6 + label_width,
                    text_top + metrics.line_height() + 1,
                );
                painter.frame_rect(focus, colors.text);
            }
            return;
        }

        painter.fill_rect(client, if self.pressed { colors.shadow } else { colors.face });
        painter.frame_rect(client, colors.shadow);
        if self.style.contains(ButtonStyle::DEF_PUSH) {
            painter.frame_rect(
                Rect::new(client.left + 1, client.top + 1, client.right - 1, client.bottom - 1),
                colors.text,
            );
        }
        let shift = self.pressed as i32;
        let text_left = client.left + (client.width() - metrics.text_width(text)) / 2;
        painter.draw_text(Point::new(text_left + shift, text_top + shift), text, text_color);
        if self.has_focus {
            painter.frame_rect(
                Rect::new(client.left + 3, client.top + 3, client.right - 3, client.bottom - 3),
                colors.text,
            );
        }
    }

    fn class_name(&self) -> &'static str {
        CLASS_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_casement_core::{FnBehavior, Modifiers, RuntimeConfig, WindowParams};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        ui: UiRuntime,
        frame: WindowId,
        clicks: Rc<RefCell<Vec<u32>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut ui = UiRuntime::new(RuntimeConfig::default());
            let clicks = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&clicks);
            let frame = ui
                .create_window(
                    WindowParams::top_level(Rect::from_xywh(0, 0, 300, 300)),
                    FnBehavior::new("Parent", move |ui, hwnd, msg| match msg {
                        Message::Command { id, code: BN_CLICKED, .. } => {
                            sink.borrow_mut().push(*id);
                            Ok(0)
                        }
                        _ => Ok(ui.default_handle(hwnd, msg)),
                    }),
                )
                .unwrap();
            Self { ui, frame, clicks }
        }

        fn button(&mut self, id: u32, y: i32, style: ButtonStyle, group: bool) -> WindowId {
            let mut params = WindowParams::child(self.frame, id, Rect::from_xywh(10, y, 80, 20))
                .with_text(format!("b{id}"))
                .with_control_style(style.bits());
            if group {
                let style = params.style | WindowStyle::GROUP | WindowStyle::TABSTOP;
                params = params.with_style(style);
            }
            self.ui.create_window(params, Button::new()).unwrap()
        }

        fn checked(&mut self, button: WindowId) -> bool {
            self.ui.send(button, Message::control(ButtonRequest::GetCheck)) != 0
        }
    }

    fn left(pos: Point, down: bool) -> Message {
        if down {
            Message::ButtonDown {
                button: MouseButton::Left,
                pos,
                modifiers: Modifiers::empty(),
                double_click: false,
            }
        } else {
            Message::ButtonUp {
                button: MouseButton::Left,
                pos,
                modifiers: Modifiers::empty(),
            }
        }
    }

    #[test]
    fn test_click_fires_on_release_inside() {
        let mut fx = Fixture::new();
        let ok = fx.button(1, 0, ButtonStyle::DEF_PUSH, true);
        fx.ui.send(ok, left(Point::new(5, 5), true));
        assert_eq!(fx.ui.capture(), Some(ok));
        assert!(fx.ui.with_behavior::<Button, _>(ok, |b| b.is_pressed()).unwrap());
        fx.ui.send(ok, left(Point::new(6, 6), false));
        assert_eq!(fx.ui.capture(), None);
        assert_eq!(*fx.clicks.borrow(), vec![1]);
    }

    #[test]
    fn test_release_outside_cancels() {
        let mut fx = Fixture::new();
        let ok = fx.button(1, 0, ButtonStyle::empty(), true);
        fx.ui.send(ok, left(Point::new(5, 5), true));
        fx.ui.send(
            ok,
            Message::MouseMove {
                pos: Point::new(200, 5),
                modifiers: Modifiers::empty(),
            },
        );
        assert!(!fx.ui.with_behavior::<Button, _>(ok, |b| b.is_pressed()).unwrap());
        fx.ui.send(ok, left(Point::new(200, 5), false));
        assert!(fx.clicks.borrow().is_empty());
    }

    #[test]
    fn test_space_clicks_auto_checkbox() {
        let mut fx = Fixture::new();
        let check = fx.button(5, 0, ButtonStyle::AUTO_CHECKBOX, true);
        let space = |down: bool| {
            let modifiers = Modifiers::empty();
            if down {
                Message::KeyDown { key: Key::Space, modifiers }
            } else {
                Message::KeyUp { key: Key::Space, modifiers }
            }
        };
        fx.ui.send(check, space(true));
        fx.ui.send(check, space(false));
        assert!(fx.checked(check));
        fx.ui.send(check, Message::control(ButtonRequest::Click));
        assert!(!fx.checked(check));
        assert_eq!(*fx.clicks.borrow(), vec![5, 5]);
    }

    #[test]
    fn test_plain_checkbox_leaves_state_to_parent() {
        let mut fx = Fixture::new();
        let check = fx.button(5, 0, ButtonStyle::CHECKBOX, true);
        fx.ui.send(check, Message::control(ButtonRequest::Click));
        assert!(!fx.checked(check));
        fx.ui.send(check, Message::control(ButtonRequest::SetCheck(true)));
        assert!(fx.checked(check));
    }

    #[test]
    fn test_auto_radio_clears_its_group_only() {
        let mut fx = Fixture::new();
        let a = fx.button(1, 0, ButtonStyle::AUTO_RADIO, true);
        let b = fx.button(2, 20, ButtonStyle::AUTO_RADIO, false);
        let c = fx.button(3, 40, ButtonStyle::AUTO_RADIO, false);
        let other = fx.button(4, 60, ButtonStyle::AUTO_RADIO, true);

        fx.ui.send(other, Message::control(ButtonRequest::Click));
        fx.ui.send(a, Message::control(ButtonRequest::Click));
        assert!(fx.checked(a));
        fx.ui.send(c, Message::control(ButtonRequest::Click));
        assert!(!fx.checked(a));
        assert!(!fx.checked(b));
        assert!(fx.checked(c));
        assert!(fx.checked(other));
    }

    #[test]
    fn test_push_button_paints_centered_label() {
        let mut fx = Fixture::new();
        fx.button(7, 0, ButtonStyle::empty(), true);
        let mut painter = horizon_casement_core::RecordingPainter::new();
        fx.ui.paint(fx.frame, &mut painter);
        assert_eq!(painter.texts(), vec!["b7"]);
    }
}
