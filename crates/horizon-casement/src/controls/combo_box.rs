//! Drop-down combo box.
//!
//! The open list is a separate top-level [`ComboPopup`] window, owned by the
//! combo's surface and placed below the combo in screen coordinates. It
//! holds mouse capture while open: a release over a row chooses it, a press
//! outside the list dismisses it. Losing capture any other way closes the
//! list as well. Closing is idempotent, so the notifications that cross
//! between the two windows while one of them is busy are harmless.
//!
//! Keyboard input stays with the combo, which keeps the popup's highlighted
//! row in step with its selection.

use bitflags::bitflags;
use horizon_casement_core::{
    DialogCode, Insets, Key, Message, Modifiers, MouseButton, Painter, Point, Rect, Result,
    UiRuntime, WindowBehavior, WindowId, WindowParams, WindowStyle,
};

use super::scroll::{self, ScrollRange};
use super::typeahead::TypeAhead;
use super::{TARGET, command_parent};

pub(crate) const CLASS_NAME: &str = "ComboBox";
pub(crate) const POPUP_CLASS_NAME: &str = "ComboPopup";

/// The selection changed.
pub const CBN_SELCHANGE: u32 = 1;
/// The combo received focus.
pub const CBN_SETFOCUS: u32 = 3;
/// The combo lost focus.
pub const CBN_KILLFOCUS: u32 = 4;
/// The list is about to open.
pub const CBN_DROPDOWN: u32 = 7;
/// The list closed.
pub const CBN_CLOSEUP: u32 = 8;

bitflags! {
    /// Combo box style bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ComboStyle: u32 {
        /// Keep the items sorted (case-insensitive).
        const SORT = 1 << 0;
    }
}

/// Requests understood by [`ComboBox`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboRequest {
    /// Append an item (or insert it in order for sorted combos). Replies
    /// with its index.
    AddString(String),
    /// Insert an item at `index` (clamped). Replies with its index.
    InsertString {
        /// Position.
        index: usize,
        /// Item text.
        text: String,
    },
    /// Remove an item. Replies with the remaining count, or `-1`.
    DeleteString(usize),
    /// Remove every item.
    ResetContent,
    /// Select an item (`None` clears). Replies with the selection, or `-1`.
    SetCurSel(Option<usize>),
    /// Reply with the selection, or `-1`.
    GetCurSel,
    /// Reply with the number of items.
    GetCount,
    /// Filled with an item's text.
    GetItemText {
        /// Item index.
        index: usize,
        /// Filled in.
        text: String,
    },
    /// Reply with the first item at or after `start` (wrapping) whose text
    /// starts with `prefix`, ignoring case, or `-1`.
    FindString {
        /// First item to look at.
        start: Option<usize>,
        /// Text prefix.
        prefix: String,
    },
    /// Open or close the list.
    ShowDropDown(bool),
    /// Reply `1` while the list is open.
    GetDroppedState,
    /// Sent by the open list: the user chose an item.
    PopupChosen(usize),
    /// Sent by the open list: the user dismissed it.
    PopupDismissed,
}

/// A drop-down combo box.
#[derive(Debug, Default)]
pub struct ComboBox {
    style: ComboStyle,
    items: Vec<String>,
    selected: Option<usize>,
    dropped: Option<WindowId>,
    typeahead: TypeAhead,
    has_focus: bool,
}

impl ComboBox {
    /// Create an empty combo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Selected item.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Text of the selected item.
    pub fn selected_text(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.items.get(i))
            .map(String::as_str)
    }

    /// The open list window.
    pub fn dropped(&self) -> Option<WindowId> {
        self.dropped
    }

    fn find(&self, start: Option<usize>, prefix: &str) -> Option<usize> {
        let count = self.items.len();
        if count == 0 {
            return None;
        }
        let prefix = prefix.to_lowercase();
        let first = start.unwrap_or(0) % count;
        (0..count)
            .map(|step| (first + step) % count)
            .find(|&i| self.items[i].to_lowercase().starts_with(&prefix))
    }

    fn insert(&mut self, index: Option<usize>, text: String) -> usize {
        let index = if self.style.contains(ComboStyle::SORT) {
            let key = text.to_lowercase();
            self.items.partition_point(|item| item.to_lowercase() <= key)
        } else {
            index.unwrap_or(self.items.len()).min(self.items.len())
        };
        self.items.insert(index, text);
        if let Some(selected) = self.selected.as_mut()
            && *selected >= index
        {
            *selected += 1;
        }
        index
    }

    /// Select `index`, keeping the open list in step. Returns whether the
    /// selection changed.
    fn select(&mut self, ui: &mut UiRuntime, hwnd: WindowId, index: Option<usize>) -> bool {
        let index = index.filter(|&i| i < self.items.len());
        if index == self.selected {
            return false;
        }
        self.selected = index;
        if let Some(popup) = self.dropped {
            ui.with_behavior_mut::<ComboPopup, _>(popup, |p| p.set_hot(index));
            ui.invalidate(popup, None);
        }
        ui.invalidate(hwnd, None);
        true
    }

    /// Select on behalf of the user and notify the parent.
    fn user_select(&mut self, ui: &mut UiRuntime, hwnd: WindowId, index: usize) {
        if self.select(ui, hwnd, Some(index)) {
            command_parent(ui, hwnd, CBN_SELCHANGE);
        }
    }

    // =========================================================================
    // Drop-down
    // =========================================================================

    fn open_dropdown(&mut self, ui: &mut UiRuntime, hwnd: WindowId) {
        if self.dropped.is_some() {
            return;
        }
        command_parent(ui, hwnd, CBN_DROPDOWN);
        let (Some(anchor), Some(surface)) = (ui.screen_rect(hwnd), ui.top_level_of(hwnd)) else {
            return;
        };
        let theme = ui.theme();
        let rows = self.items.len().clamp(1, theme.combo_dropdown_rows.max(1));
        let height = rows as i32 * theme.row_height + 2;
        let rect = Rect::from_xywh(anchor.left, anchor.bottom, anchor.width(), height);
        let popup = ComboPopup::new(hwnd, self.selected, self.items.len(), rows);
        let params = WindowParams::top_level(rect)
            .with_owner(surface)
            .with_style(WindowStyle::POPUP | WindowStyle::BORDER);
        let Some(popup) = ui.create_window(params, popup) else {
            tracing::warn!(target: TARGET, ?hwnd, "combo list could not be created");
            return;
        };
        self.dropped = Some(popup);
        ui.set_capture(popup);
        ui.invalidate(hwnd, None);
        tracing::debug!(target: TARGET, ?hwnd, ?popup, "combo list opened");
    }

    fn close_dropdown(&mut self, ui: &mut UiRuntime, hwnd: WindowId, notify: bool) {
        let Some(popup) = self.dropped.take() else {
            return;
        };
        if ui.capture() == Some(popup) {
            ui.release_capture();
        }
        ui.destroy_window(popup);
        ui.invalidate(hwnd, None);
        tracing::debug!(target: TARGET, ?hwnd, ?popup, "combo list closed");
        if notify {
            command_parent(ui, hwnd, CBN_CLOSEUP);
        }
    }

    fn toggle_dropdown(&mut self, ui: &mut UiRuntime, hwnd: WindowId) {
        if self.dropped.is_some() {
            self.close_dropdown(ui, hwnd, true);
        } else {
            self.open_dropdown(ui, hwnd);
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    fn key_down(&mut self, ui: &mut UiRuntime, hwnd: WindowId, key: Key, modifiers: Modifiers) -> bool {
        let count = self.items.len();
        let last = count.saturating_sub(1);
        let page = ui.theme().combo_dropdown_rows.max(1);
        let current = self.selected;
        let target = match key {
            Key::F(4) => {
                self.toggle_dropdown(ui, hwnd);
                return true;
            }
            Key::Down | Key::Up if modifiers.alt() => {
                self.toggle_dropdown(ui, hwnd);
                return true;
            }
            Key::Enter | Key::Escape if self.dropped.is_some() => {
                self.close_dropdown(ui, hwnd, true);
                return true;
            }
            _ if count == 0 => return false,
            Key::Up => current.map_or(0, |c| c.saturating_sub(1)),
            Key::Down => current.map_or(0, |c| (c + 1).min(last)),
            Key::PageUp => current.map_or(0, |c| c.saturating_sub(page)),
            Key::PageDown => current.map_or(0, |c| (c + page).min(last)),
            Key::Home => 0,
            Key::End => last,
            _ => return false,
        };
        self.user_select(ui, hwnd, target);
        true
    }

    fn char_input(&mut self, ui: &mut UiRuntime, hwnd: WindowId, ch: char, modifiers: Modifiers) {
        if ch.is_control() || (modifiers.ctrl() && !modifiers.alt()) {
            return;
        }
        let now = ui.now();
        let timeout = ui.theme().typeahead_timeout;
        self.typeahead.push(ch, now, timeout);
        let found = self
            .typeahead
            .find(self.items.len(), self.selected, |i| self.items[i].clone());
        if let Some(index) = found {
            self.user_select(ui, hwnd, index);
        }
    }

    fn request(&mut self, ui: &mut UiRuntime, hwnd: WindowId, request: &mut ComboRequest) -> isize {
        match request {
            ComboRequest::AddString(text) => {
                let index = self.insert(None, std::mem::take(text));
                ui.invalidate(hwnd, None);
                index as isize
            }
            ComboRequest::InsertString { index, text } => {
                let index = self.insert(Some(*index), std::mem::take(text));
                ui.invalidate(hwnd, None);
                index as isize
            }
            ComboRequest::DeleteString(index) => {
                if *index >= self.items.len() {
                    return -1;
                }
                self.close_dropdown(ui, hwnd, true);
                self.items.remove(*index);
                self.selected = match self.selected {
                    Some(s) if s == *index => None,
                    Some(s) if s > *index => Some(s - 1),
                    other => other,
                };
                ui.invalidate(hwnd, None);
                self.items.len() as isize
            }
            ComboRequest::ResetContent => {
                self.close_dropdown(ui, hwnd, true);
                self.items.clear();
                self.selected = None;
                ui.invalidate(hwnd, None);
                0
            }
            ComboRequest::SetCurSel(index) => {
                self.select(ui, hwnd, *index);
                self.selected.map_or(-1, |s| s as isize)
            }
            ComboRequest::GetCurSel => self.selected.map_or(-1, |s| s as isize),
            ComboRequest::GetCount => self.items.len() as isize,
            ComboRequest::GetItemText { index, text } => match self.items.get(*index) {
                Some(item) => {
                    text.clone_from(item);
                    item.len() as isize
                }
                None => -1,
            },
            ComboRequest::FindString { start, prefix } => {
                self.find(*start, prefix).map_or(-1, |i| i as isize)
            }
            ComboRequest::ShowDropDown(show) => {
                if *show {
                    self.open_dropdown(ui, hwnd);
                } else {
                    self.close_dropdown(ui, hwnd, true);
                }
                1
            }
            ComboRequest::GetDroppedState => self.dropped.is_some() as isize,
            ComboRequest::PopupChosen(index) => {
                let index = *index;
                self.close_dropdown(ui, hwnd, true);
                self.user_select(ui, hwnd, index);
                1
            }
            ComboRequest::PopupDismissed => {
                self.close_dropdown(ui, hwnd, true);
                1
            }
        }
    }
}

impl WindowBehavior for ComboBox {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        match msg {
            Message::Create(info) => {
                self.style = ComboStyle::from_bits_truncate(info.control_style);
                Ok(0)
            }
            Message::Destroy => {
                self.close_dropdown(ui, hwnd, false);
                self.items.clear();
                Ok(0)
            }
            Message::GetText(buffer) => {
                buffer.clear();
                buffer.push_str(self.selected_text().unwrap_or_default());
                Ok(buffer.len() as isize)
            }
            Message::GetTextLength => Ok(self.selected_text().map_or(0, str::len) as isize),
            Message::SetFocus { .. } => {
                self.has_focus = true;
                ui.invalidate(hwnd, None);
                command_parent(ui, hwnd, CBN_SETFOCUS);
                Ok(0)
            }
            Message::KillFocus { .. } => {
                self.has_focus = false;
                self.typeahead.reset();
                self.close_dropdown(ui, hwnd, true);
                ui.invalidate(hwnd, None);
                command_parent(ui, hwnd, CBN_KILLFOCUS);
                Ok(0)
            }
            Message::GetDialogCode => {
                let code = if self.dropped.is_some() {
                    DialogCode::WANT_ALL
                } else {
                    DialogCode::WANT_ARROWS | DialogCode::WANT_CHARS
                };
                Ok(code.bits() as isize)
            }
            Message::ButtonDown {
                button: MouseButton::Left,
                ..
            } => {
                if !self.has_focus {
                    ui.set_focus(hwnd);
                }
                self.toggle_dropdown(ui, hwnd);
                Ok(0)
            }
            Message::Wheel {
                delta,
                horizontal: false,
                ..
            } => {
                if let Some(current) = self.selected {
                    let target = (current as i64 - *delta as i64)
                        .clamp(0, self.items.len().saturating_sub(1) as i64);
                    self.user_select(ui, hwnd, target as usize);
                } else if !self.items.is_empty() {
                    self.user_select(ui, hwnd, 0);
                }
                Ok(0)
            }
            Message::KeyDown { key, modifiers } => {
                if self.key_down(ui, hwnd, *key, *modifiers) {
                    Ok(0)
                } else {
                    Ok(ui.default_handle(hwnd, msg))
                }
            }
            Message::Char { ch, modifiers } => {
                self.char_input(ui, hwnd, *ch, *modifiers);
                Ok(0)
            }
            Message::Control(_) => match msg.control_mut::<ComboRequest>() {
                Some(request) => Ok(self.request(ui, hwnd, request)),
                None => Ok(0),
            },
            _ => Ok(ui.default_handle(hwnd, msg)),
        }
    }

    fn paint(&self, ui: &UiRuntime, hwnd: WindowId, painter: &mut dyn Painter) {
        let theme = ui.theme();
        let colors = &theme.colors;
        let client = ui.client_rect(hwnd).unwrap_or_default();
        let enabled = ui.is_enabled(hwnd);
        let button = Rect::new(client.right - theme.scrollbar_width, client.top, client.right, client.bottom);
        let field = Rect::new(client.left, client.top, button.left, client.bottom);

        painter.fill_rect(client, colors.window);
        let text_color = if !enabled {
            colors.disabled_text
        } else if self.has_focus && self.dropped.is_none() {
            let inner = field.inset(Insets::uniform(1));
            painter.fill_rect(inner, colors.highlight);
            colors.highlight_text
        } else {
            colors.text
        };
        if let Some(text) = self.selected_text() {
            painter.push_clip(field);
            let pad = theme.text_padding;
            painter.draw_text(Point::new(field.left + pad, field.top + pad), text, text_color);
            painter.pop_clip();
        }
        painter.fill_rect(button, colors.face);
        let mid = Point::new((button.left + button.right) / 2, (button.top + button.bottom) / 2);
        painter.draw_line(mid.offset(-3, -1), mid.offset(0, 2), colors.text);
        painter.draw_line(mid.offset(0, 2), mid.offset(3, -1), colors.text);
        painter.frame_rect(client, colors.shadow);
    }

    fn class_name(&self) -> &'static str {
        CLASS_NAME
    }
}

// =============================================================================
// Drop-down list window
// =============================================================================

/// The open list of a [`ComboBox`].
#[derive(Debug)]
pub struct ComboPopup {
    combo: WindowId,
    hot: Option<usize>,
    scroll: ScrollRange,
}

impl ComboPopup {
    fn new(combo: WindowId, hot: Option<usize>, count: usize, rows: usize) -> Self {
        let mut range = ScrollRange::default();
        range.set_extent(scroll::units(rows), scroll::units(count));
        if let Some(hot) = hot {
            range.ensure_visible(scroll::units(hot));
        }
        Self {
            combo,
            hot,
            scroll: range,
        }
    }

    /// The combo this list belongs to.
    pub fn combo(&self) -> WindowId {
        self.combo
    }

    /// The highlighted row.
    pub fn hot(&self) -> Option<usize> {
        self.hot
    }

    /// First visible row.
    pub fn top_row(&self) -> usize {
        self.scroll.pos as usize
    }

    fn set_hot(&mut self, hot: Option<usize>) {
        self.hot = hot;
        if let Some(hot) = hot {
            self.scroll.ensure_visible(scroll::units(hot));
        }
    }

    fn row_at(&self, ui: &UiRuntime, hwnd: WindowId, pos: Point) -> Option<usize> {
        let client = ui.client_rect(hwnd)?;
        if !client.inset(Insets::uniform(1)).contains(pos) {
            return None;
        }
        let row = self.scroll.pos + (pos.y - 1) / ui.theme().row_height.max(1);
        (row >= 0 && row < self.scroll.total).then_some(row as usize)
    }
}

impl WindowBehavior for ComboPopup {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        match msg {
            Message::MouseMove { pos, .. } => {
                let row = self.row_at(ui, hwnd, *pos);
                if row.is_some() && row != self.hot {
                    self.hot = row;
                    ui.invalidate(hwnd, None);
                }
                Ok(0)
            }
            Message::ButtonDown { pos, .. } => {
                let client = ui.client_rect(hwnd).unwrap_or_default();
                if !client.contains(*pos) {
                    ui.send(self.combo, Message::control(ComboRequest::PopupDismissed));
                }
                Ok(0)
            }
            Message::ButtonUp {
                button: MouseButton::Left,
                pos,
                ..
            } => {
                if let Some(row) = self.row_at(ui, hwnd, *pos) {
                    ui.send(self.combo, Message::control(ComboRequest::PopupChosen(row)));
                }
                Ok(0)
            }
            Message::Wheel {
                delta,
                horizontal: false,
                ..
            } => {
                if self.scroll.set_pos(self.scroll.pos - *delta) {
                    ui.invalidate(hwnd, None);
                }
                Ok(0)
            }
            Message::CaptureChanged { .. } => {
                ui.send(self.combo, Message::control(ComboRequest::PopupDismissed));
                Ok(0)
            }
            _ => Ok(ui.default_handle(hwnd, msg)),
        }
    }

    fn paint(&self, ui: &UiRuntime, hwnd: WindowId, painter: &mut dyn Painter) {
        let theme = ui.theme();
        let colors = &theme.colors;
        let client = ui.client_rect(hwnd).unwrap_or_default();
        painter.fill_rect(client, colors.window);
        painter.frame_rect(client, colors.shadow);
        let row_height = theme.row_height.max(1);
        let first = self.scroll.pos.max(0) as usize;
        let visible = self.scroll.page.max(0) as usize;
        ui.with_behavior::<ComboBox, _>(self.combo, |combo| {
            for (index, item) in combo.items().iter().enumerate().skip(first).take(visible) {
                let top = client.top + 1 + (index - first) as i32 * row_height;
                let line = Rect::new(client.left + 1, top, client.right - 1, top + row_height);
                let color = if self.hot == Some(index) {
                    painter.fill_rect(line, colors.highlight);
                    colors.highlight_text
                } else {
                    colors.text
                };
                painter.draw_text(
                    Point::new(line.left + theme.text_padding, top + theme.text_padding),
                    item,
                    color,
                );
            }
        });
    }

    fn class_name(&self) -> &'static str {
        POPUP_CLASS_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_casement_core::{FnBehavior, InputEvent, RecordingPainter, RuntimeConfig};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (UiRuntime, WindowId, Rc<RefCell<Vec<u32>>>) {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let codes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&codes);
        let frame = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(100, 100, 300, 300)),
                FnBehavior::new("Parent", move |ui, hwnd, msg| {
                    if let Message::Command { id: 5, code, .. } = msg {
                        sink.borrow_mut().push(*code);
                    }
                    Ok(ui.default_handle(hwnd, msg))
                }),
            )
            .unwrap();
        let combo = ui
            .create_window(
                WindowParams::child(frame, 5, Rect::from_xywh(10, 10, 120, 22)),
                ComboBox::new(),
            )
            .unwrap();
        for item in ["Red", "Green", "Blue", "Black"] {
            ui.send(combo, Message::control(ComboRequest::AddString(item.into())));
        }
        (ui, combo, codes)
    }

    fn press(ui: &mut UiRuntime, pos: Point, pressed: bool) {
        ui.handle_input(InputEvent::PointerButton {
            button: MouseButton::Left,
            pressed,
            pos,
            modifiers: Modifiers::empty(),
            double_click: false,
        });
    }

    fn dropped(ui: &UiRuntime, combo: WindowId) -> Option<WindowId> {
        ui.with_behavior::<ComboBox, _>(combo, |c| c.dropped()).flatten()
    }

    #[test]
    fn test_click_opens_owned_popup_with_capture() {
        let (mut ui, combo, codes) = setup();
        press(&mut ui, Point::new(120, 120), true);
        press(&mut ui, Point::new(120, 120), false);

        let popup = dropped(&ui, combo).expect("list open");
        assert_eq!(ui.capture(), Some(popup));
        assert_eq!(ui.owner(popup), ui.top_level_of(combo));
        // Below the combo: combo spans screen y 110..132.
        assert_eq!(ui.window_rect(popup).map(|r| (r.left, r.top)), Some((110, 132)));
        assert_eq!(ui.get_focus(), Some(combo));
        // Focus arrives once the press has been handled.
        assert_eq!(*codes.borrow(), vec![CBN_DROPDOWN, CBN_SETFOCUS]);
    }

    #[test]
    fn test_choosing_a_row_selects_and_closes() {
        let (mut ui, combo, codes) = setup();
        press(&mut ui, Point::new(120, 120), true);
        press(&mut ui, Point::new(120, 120), false);
        let popup = dropped(&ui, combo).unwrap();

        // Rows are 18px below a 1px border: row 2 spans 37..55.
        press(&mut ui, Point::new(120, 132 + 40), true);
        press(&mut ui, Point::new(120, 132 + 40), false);

        assert!(!ui.is_window(popup));
        assert_eq!(dropped(&ui, combo), None);
        assert_eq!(ui.capture(), None);
        assert_eq!(ui.send(combo, Message::control(ComboRequest::GetCurSel)), 2);
        assert_eq!(ui.text(combo), "Blue");
        let codes = codes.borrow();
        assert_eq!(&codes[codes.len() - 2..], &[CBN_CLOSEUP, CBN_SELCHANGE]);
        assert_eq!(codes.iter().filter(|&&c| c == CBN_CLOSEUP).count(), 1);
    }

    #[test]
    fn test_press_outside_dismisses() {
        let (mut ui, combo, codes) = setup();
        ui.send(combo, Message::control(ComboRequest::ShowDropDown(true)));
        let popup = dropped(&ui, combo).unwrap();
        press(&mut ui, Point::new(350, 350), true);
        assert!(!ui.is_window(popup));
        assert_eq!(ui.capture(), None);
        assert_eq!(ui.send(combo, Message::control(ComboRequest::GetCurSel)), -1);
        assert_eq!(codes.borrow().iter().filter(|&&c| c == CBN_CLOSEUP).count(), 1);
    }

    #[test]
    fn test_destroying_combo_closes_list() {
        let (mut ui, combo, _) = setup();
        ui.send(combo, Message::control(ComboRequest::ShowDropDown(true)));
        let popup = dropped(&ui, combo).unwrap();
        ui.destroy_window(combo);
        assert!(!ui.is_window(popup));
        assert_eq!(ui.capture(), None);
    }

    #[test]
    fn test_keyboard_and_type_ahead() {
        let (mut ui, combo, codes) = setup();
        ui.set_focus(combo);
        ui.send(combo, Message::KeyDown { key: Key::Down, modifiers: Modifiers::empty() });
        assert_eq!(ui.send(combo, Message::control(ComboRequest::GetCurSel)), 0);
        ui.send(combo, Message::KeyDown { key: Key::End, modifiers: Modifiers::empty() });
        assert_eq!(ui.send(combo, Message::control(ComboRequest::GetCurSel)), 3);

        ui.send(combo, Message::Char { ch: 'b', modifiers: Modifiers::empty() });
        assert_eq!(ui.send(combo, Message::control(ComboRequest::GetCurSel)), 2);
        ui.send(combo, Message::Char { ch: 'l', modifiers: Modifiers::empty() });
        assert_eq!(ui.send(combo, Message::control(ComboRequest::GetCurSel)), 2);
        ui.send(combo, Message::Char { ch: 'a', modifiers: Modifiers::empty() });
        assert_eq!(ui.send(combo, Message::control(ComboRequest::GetCurSel)), 3);
        assert_eq!(
            codes.borrow().iter().filter(|&&c| c == CBN_SELCHANGE).count(),
            4
        );
    }

    #[test]
    fn test_alt_down_opens_and_arrows_track_hot_row() {
        let (mut ui, combo, _) = setup();
        ui.set_focus(combo);
        ui.send(combo, Message::KeyDown { key: Key::Down, modifiers: Modifiers::ALT });
        let popup = dropped(&ui, combo).unwrap();
        ui.send(combo, Message::KeyDown { key: Key::Down, modifiers: Modifiers::empty() });
        ui.send(combo, Message::KeyDown { key: Key::Down, modifiers: Modifiers::empty() });
        assert_eq!(ui.with_behavior::<ComboPopup, _>(popup, |p| p.hot()), Some(Some(1)));
        ui.send(combo, Message::KeyDown { key: Key::Enter, modifiers: Modifiers::empty() });
        assert!(!ui.is_window(popup));
        assert_eq!(ui.send(combo, Message::control(ComboRequest::GetCurSel)), 1);
    }

    #[test]
    fn test_sorted_items_and_find() {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let frame = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 100, 100)),
                horizon_casement_core::DefaultBehavior,
            )
            .unwrap();
        let combo = ui
            .create_window(
                WindowParams::child(frame, 1, Rect::from_xywh(0, 0, 80, 20))
                    .with_control_style(ComboStyle::SORT.bits()),
                ComboBox::new(),
            )
            .unwrap();
        for item in ["pear", "Apple", "fig"] {
            ui.send(combo, Message::control(ComboRequest::AddString(item.into())));
        }
        let items = ui.with_behavior::<ComboBox, _>(combo, |c| c.items().to_vec()).unwrap();
        assert_eq!(items, vec!["Apple", "fig", "pear"]);
        let find = |ui: &mut UiRuntime, start, prefix: &str| {
            ui.send(
                combo,
                Message::control(ComboRequest::FindString {
                    start,
                    prefix: prefix.into(),
                }),
            )
        };
        assert_eq!(find(&mut ui, None, "P"), 2);
        assert_eq!(find(&mut ui, Some(2), "a"), 0);
        assert_eq!(find(&mut ui, None, "z"), -1);
    }

    #[test]
    fn test_popup_paints_combo_items() {
        let (mut ui, combo, _) = setup();
        ui.send(combo, Message::control(ComboRequest::SetCurSel(Some(1))));
        ui.send(combo, Message::control(ComboRequest::ShowDropDown(true)));
        let popup = dropped(&ui, combo).unwrap();
        let mut painter = RecordingPainter::new();
        ui.paint(popup, &mut painter);
        assert_eq!(painter.texts(), vec!["Red", "Green", "Blue", "Black"]);
    }
}
