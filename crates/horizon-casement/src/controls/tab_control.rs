//! Tab strip.
//!
//! The tabs sit in one row along the top of the client area; each is as wide
//! as its text plus padding. The control only tracks the selection, and the
//! parent swaps the page contents when it sees [`TCN_SELCHANGE`].

use horizon_casement_core::{
    DialogCode, Key, Message, Modifiers, MouseButton, Painter, Point, Rect, Result, UiRuntime,
    WindowBehavior, WindowId,
};

use super::{NM_CLICK, NM_RCLICK, TARGET, notify_parent};

pub(crate) const CLASS_NAME: &str = "TabControl";

/// The selection is about to change. A nonzero reply vetoes the change.
pub const TCN_SELCHANGING: u32 = 0x0301;
/// The selection changed.
pub const TCN_SELCHANGE: u32 = 0x0302;

/// Requests understood by [`TabControl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabRequest {
    /// Insert a tab at `index` (appended for `None`). Replies with the new
    /// tab's index.
    InsertTab {
        /// Insertion index.
        index: Option<usize>,
        /// Tab label.
        text: String,
    },
    /// Delete a tab.
    DeleteTab(usize),
    /// Delete every tab.
    DeleteAll,
    /// Select a tab without notifying. Replies with the previous selection
    /// or -1.
    SetSelection(Option<usize>),
    /// Reply with the selected tab or -1.
    GetSelection,
    /// Reply with the number of tabs.
    TabCount,
    /// Replace a tab's label.
    SetTabText {
        /// Tab index.
        index: usize,
        /// New label.
        text: String,
    },
    /// Filled with a tab's label.
    GetTabText {
        /// Tab index.
        index: usize,
        /// Filled in.
        text: String,
    },
    /// Filled with a tab's rectangle in client coordinates.
    TabRect {
        /// Tab index.
        index: usize,
        /// Filled in.
        rect: Option<Rect>,
    },
    /// Filled with the tab under a client point.
    HitTest {
        /// Point to test.
        pos: Point,
        /// Filled in.
        index: Option<usize>,
    },
    /// Filled with the page area below the strip.
    DisplayRect(Rect),
}

/// A tab strip.
#[derive(Debug, Default)]
pub struct TabControl {
    tabs: Vec<String>,
    selected: Option<usize>,
    has_focus: bool,
}

impl TabControl {
    /// Create an empty strip.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected tab.
    pub fn selection(&self) -> Option<usize> {
        self.selected
    }

    /// Tab labels.
    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    fn tab_rects(&self, ui: &UiRuntime) -> Vec<Rect> {
        let theme = ui.theme();
        let metrics = ui.text_metrics();
        let mut left = 0;
        self.tabs
            .iter()
            .map(|text| {
                let width = metrics.text_width(text) + 2 * theme.tab_padding;
                let rect = Rect::new(left, 0, left + width, theme.tab_height);
                left += width;
                rect
            })
            .collect()
    }

    fn hit(&self, ui: &UiRuntime, pos: Point) -> Option<usize> {
        self.tab_rects(ui).iter().position(|rect| rect.contains(pos))
    }

    /// Move the selection as the user would: ask the parent first, then
    /// notify. Returns whether the selection changed.
    fn user_select(&mut self, ui: &mut UiRuntime, hwnd: WindowId, index: usize) -> bool {
        if index >= self.tabs.len() || self.selected == Some(index) {
            return false;
        }
        if notify_parent(ui, hwnd, TCN_SELCHANGING) != 0 {
            tracing::debug!(target: TARGET, ?hwnd, index, "tab change vetoed");
            return false;
        }
        self.selected = Some(index);
        ui.invalidate(hwnd, None);
        notify_parent(ui, hwnd, TCN_SELCHANGE);
        true
    }

    fn key_down(&mut self, ui: &mut UiRuntime, hwnd: WindowId, key: Key, modifiers: Modifiers) -> bool {
        let count = self.tabs.len();
        if count == 0 {
            return false;
        }
        let current = self.selected.unwrap_or(0);
        let target = match key {
            Key::Tab if modifiers.ctrl() && modifiers.shift() => (current + count - 1) % count,
            Key::Tab if modifiers.ctrl() => (current + 1) % count,
            Key::Left | Key::Up => current.saturating_sub(1),
            Key::Right | Key::Down => (current + 1).min(count - 1),
            Key::Home => 0,
            Key::End => count - 1,
            _ => return false,
        };
        self.user_select(ui, hwnd, target);
        true
    }

    fn request(&mut self, ui: &mut UiRuntime, hwnd: WindowId, request: &mut TabRequest) -> isize {
        match request {
            TabRequest::InsertTab { index, text } => {
                let index = index.unwrap_or(self.tabs.len()).min(self.tabs.len());
                self.tabs.insert(index, std::mem::take(text));
                match self.selected {
                    Some(selected) if selected >= index => self.selected = Some(selected + 1),
                    None if self.tabs.len() == 1 => self.selected = Some(0),
                    _ => {}
                }
                ui.invalidate(hwnd, None);
                index as isize
            }
            TabRequest::DeleteTab(index) => {
                let index = *index;
                if index >= self.tabs.len() {
                    return 0;
                }
                self.tabs.remove(index);
                self.selected = match self.selected {
                    Some(selected) if selected == index => None,
                    Some(selected) if selected > index => Some(selected - 1),
                    other => other,
                };
                ui.invalidate(hwnd, None);
                1
            }
            TabRequest::DeleteAll => {
                self.tabs.clear();
                self.selected = None;
                ui.invalidate(hwnd, None);
                1
            }
            TabRequest::SetSelection(index) => {
                let previous = self.selected;
                match index {
                    Some(i) if *i < self.tabs.len() => self.selected = Some(*i),
                    Some(_) => return -1,
                    None => self.selected = None,
                }
                ui.invalidate(hwnd, None);
                previous.map_or(-1, |p| p as isize)
            }
            TabRequest::GetSelection => self.selected.map_or(-1, |s| s as isize),
            TabRequest::TabCount => self.tabs.len() as isize,
            TabRequest::SetTabText { index, text } => match self.tabs.get_mut(*index) {
                Some(tab) => {
                    *tab = std::mem::take(text);
                    ui.invalidate(hwnd, None);
                    1
                }
                None => 0,
            },
            TabRequest::GetTabText { index, text } => match self.tabs.get(*index) {
                Some(tab) => {
                    text.clone_from(tab);
                    text.len() as isize
                }
                None => 0,
            },
            TabRequest::TabRect { index, rect } => {
                *rect = self.tab_rects(ui).get(*index).copied();
                rect.is_some() as isize
            }
            TabRequest::HitTest { pos, index } => {
                *index = self.hit(ui, *pos);
                index.map_or(-1, |i| i as isize)
            }
            TabRequest::DisplayRect(rect) => {
                let client = ui.client_rect(hwnd).unwrap_or_default();
                let top = (client.top + ui.theme().tab_height).min(client.bottom);
                *rect = Rect::new(client.left + 2, top + 2, client.right - 2, client.bottom - 2);
                1
            }
        }
    }
}

impl WindowBehavior for TabControl {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        match msg {
            Message::Destroy => {
                self.tabs.clear();
                self.selected = None;
                Ok(0)
            }
            Message::SetFocus { .. } => {
                self.has_focus = true;
                ui.invalidate(hwnd, None);
                Ok(0)
            }
            Message::KillFocus { .. } => {
                self.has_focus = false;
                ui.invalidate(hwnd, None);
                Ok(0)
            }
            Message::GetDialogCode => Ok(DialogCode::WANT_ARROWS.bits() as isize),
            Message::ButtonDown { button, pos, .. } => {
                let Some(index) = self.hit(ui, *pos) else {
                    return Ok(0);
                };
                match button {
                    MouseButton::Left => {
                        if !self.has_focus {
                            ui.set_focus(hwnd);
                        }
                        self.user_select(ui, hwnd, index);
                        notify_parent(ui, hwnd, NM_CLICK);
                    }
                    MouseButton::Right => {
                        notify_parent(ui, hwnd, NM_RCLICK);
                    }
                    MouseButton::Middle => {}
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
            Message::Control(_) => match msg.control_mut::<TabRequest>() {
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
        painter.fill_rect(client, colors.face);
        let page = Rect::new(client.left, theme.tab_height, client.right, client.bottom);
        painter.frame_rect(page, colors.shadow);

        for (index, rect) in self.tab_rects(ui).into_iter().enumerate() {
            let selected = self.selected == Some(index);
            let rect = if selected {
                painter.fill_rect(rect, colors.window);
                rect
            } else {
                Rect::new(rect.left, rect.top + 2, rect.right, rect.bottom)
            };
            painter.frame_rect(rect, colors.shadow);
            painter.draw_text(
                Point::new(rect.left + theme.tab_padding, rect.top + theme.text_padding),
                &self.tabs[index],
                colors.text,
            );
            if selected && self.has_focus {
                painter.frame_rect(
                    Rect::new(rect.left + 2, rect.top + 2, rect.right - 2, rect.bottom - 2),
                    colors.text,
                );
            }
        }
    }

    fn class_name(&self) -> &'static str {
        CLASS_NAME
    }
}
