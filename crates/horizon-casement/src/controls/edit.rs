//! Text edit control, single- and multi-line.
//!
//! The caret and the selection anchor are character offsets; the caret is the
//! live end of the selection. Multi-line controls wrap greedily on whole
//! words unless [`EditStyle::AUTO_HSCROLL`] is set, and keep their display
//! lines in a [`LineCache`] keyed by content length and wrap width.
//!
//! # Keyboard
//!
//! - Left/Right, Ctrl+Left/Right (word), Home/End, Ctrl+Home/End
//! - Up/Down, Page Up/Page Down (multi-line)
//! - Shift with any movement extends the selection
//! - Backspace/Delete, Ctrl+Backspace/Delete (word)
//! - Ctrl+A, Ctrl+C/X/V, Ctrl+Insert, Shift+Insert, Shift+Delete

use std::borrow::Cow;
use std::cell::RefCell;

use bitflags::bitflags;
use horizon_casement_core::{
    DialogCode, Key, Message, Modifiers, MouseButton, Painter, Point, Rect, Result, UiRuntime,
    WindowBehavior, WindowId, WindowStyle,
};

use super::scroll::{self, BarHit, ScrollRange, ThumbDrag};
use super::text_util::{self, LineCache, LineSpan};
use super::{TARGET, command_parent};

pub(crate) const CLASS_NAME: &str = "Edit";

/// The control received focus.
pub const EN_SETFOCUS: u32 = 0x0100;
/// The control lost focus.
pub const EN_KILLFOCUS: u32 = 0x0200;
/// The text changed.
pub const EN_CHANGE: u32 = 0x0300;
/// Inserted text was truncated at the text limit.
pub const EN_MAXTEXT: u32 = 0x0501;

bitflags! {
    /// Edit control style bits (the `control_style` of the window params).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EditStyle: u32 {
        /// Multiple lines.
        const MULTILINE    = 1 << 0;
        /// Text cannot be changed by the user.
        const READ_ONLY    = 1 << 1;
        /// Characters are displayed masked.
        const PASSWORD     = 1 << 2;
        /// Scroll horizontally instead of wrapping.
        const AUTO_HSCROLL = 1 << 3;
        /// Enter inserts a line break in dialogs.
        const WANT_RETURN  = 1 << 4;
    }
}

/// Requests understood by [`EditControl`], sent with [`Message::control`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRequest {
    /// Select `anchor..caret` (character offsets, clamped).
    SetSelection {
        /// Fixed end.
        anchor: usize,
        /// Live end, where the caret goes.
        caret: usize,
    },
    /// Filled with the ordered selection (both equal the caret when empty).
    GetSelection {
        /// Start of the selection.
        start: usize,
        /// End of the selection.
        end: usize,
    },
    /// Replace the selection (or insert at the caret).
    ReplaceSelection(String),
    /// Toggle read-only mode.
    SetReadOnly(bool),
    /// Maximum number of characters; `0` removes the limit.
    SetLimit(usize),
    /// Set or clear the modify flag.
    SetModify(bool),
    /// Reply `1` if the text was changed by the user since the last `SetText`.
    GetModify,
    /// Reply with the number of display lines.
    LineCount,
    /// Reply with the display line containing a character offset.
    LineFromChar(usize),
    /// Reply with the first character of a display line, or `-1`.
    LineIndex(usize),
    /// Scroll so the caret is visible.
    ScrollToCaret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditDrag {
    /// Moving the live end of the selection.
    Select,
    /// Dragging the scrollbar thumb.
    Thumb(ThumbDrag),
}

/// Areas of the client rectangle.
struct Layout {
    text: Rect,
    wrap: Option<i32>,
    line_height: i32,
    bar: Option<Rect>,
}

/// A text edit control.
#[derive(Debug)]
pub struct EditControl {
    text: String,
    caret: usize,
    anchor: Option<usize>,
    style: EditStyle,
    limit: usize,
    modified: bool,
    focused: bool,
    scroll_x: i32,
    scroll: ScrollRange,
    lines: RefCell<LineCache>,
    drag: Option<EditDrag>,
    /// Horizontal pixel position kept across vertical moves.
    goal_x: Option<i32>,
    password_char: char,
}

impl Default for EditControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Inserted {
    changed: bool,
    truncated: bool,
}

impl EditControl {
    /// Create an empty control. Text and style come from `Message::Create`.
    pub fn new() -> Self {
        Self {
            text: String::new(),
            caret: 0,
            anchor: None,
            style: EditStyle::empty(),
            limit: 0,
            modified: false,
            focused: false,
            scroll_x: 0,
            scroll: ScrollRange::default(),
            lines: RefCell::new(LineCache::default()),
            drag: None,
            goal_x: None,
            password_char: '*',
        }
    }

    /// The text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caret position (character offset).
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Selection anchor, if a selection was started.
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// The ordered selection, or `None` when nothing is selected.
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        match anchor.cmp(&self.caret) {
            std::cmp::Ordering::Less => Some((anchor, self.caret)),
            std::cmp::Ordering::Greater => Some((self.caret, anchor)),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The selected text.
    pub fn selected_text(&self) -> &str {
        match self.selection() {
            Some((start, end)) => &self.text[text_util::char_range_to_bytes(&self.text, start, end)],
            None => "",
        }
    }

    /// Style bits.
    pub fn style(&self) -> EditStyle {
        self.style
    }

    /// Whether the text was changed by the user.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Whether editing is disabled.
    pub fn is_read_only(&self) -> bool {
        self.style.contains(EditStyle::READ_ONLY)
    }

    /// First visible display line.
    pub fn first_visible_line(&self) -> usize {
        self.scroll.pos as usize
    }

    /// Horizontal scroll offset in pixels.
    pub fn scroll_x(&self) -> i32 {
        self.scroll_x
    }

    /// Whether a selection or thumb drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn is_multiline(&self) -> bool {
        self.style.contains(EditStyle::MULTILINE)
    }

    fn char_count(&self) -> usize {
        text_util::char_len(&self.text)
    }

    fn display_text(&self) -> Cow<'_, str> {
        if self.style.contains(EditStyle::PASSWORD) {
            Cow::Owned(
                std::iter::repeat_n(self.password_char, self.char_count()).collect(),
            )
        } else {
            Cow::Borrowed(&self.text)
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    fn layout(&self, ui: &UiRuntime, hwnd: WindowId) -> Layout {
        let client = ui.client_rect(hwnd).unwrap_or_default();
        let theme = ui.theme();
        let pad = theme.text_padding;
        let bar = (self.is_multiline()
            && ui
                .style(hwnd)
                .is_some_and(|s| s.contains(WindowStyle::VSCROLL)))
        .then(|| scroll::vertical_track(client, theme));
        let right = bar.map_or(client.right, |bar| bar.left);
        let text = Rect::new(
            client.left + pad,
            client.top + pad,
            right - pad,
            client.bottom - pad,
        );
        let wrap = (self.is_multiline() && !self.style.contains(EditStyle::AUTO_HSCROLL))
            .then_some(text.width().max(1));
        Layout {
            text,
            wrap,
            line_height: ui.text_metrics().line_height().max(1),
            bar,
        }
    }

    fn with_lines<R>(
        &self,
        ui: &UiRuntime,
        layout: &Layout,
        f: impl FnOnce(&[LineSpan], &str) -> R,
    ) -> R {
        let display = self.display_text();
        let mut cache = self.lines.borrow_mut();
        let lines = cache.lines(&display, layout.wrap, ui.text_metrics());
        f(lines, &display)
    }

    /// Pixel x of character `pos` within its display line.
    fn x_of(&self, ui: &UiRuntime, layout: &Layout, pos: usize) -> (usize, i32) {
        self.with_lines(ui, layout, |lines, display| {
            let index = text_util::line_of(lines, pos);
            let line = lines[index];
            let before = LineSpan {
                start: line.start,
                len: pos.saturating_sub(line.start).min(line.len),
            };
            (
                index,
                ui.text_metrics()
                    .text_width(text_util::span_text(display, before)),
            )
        })
    }

    /// Character under a client point.
    fn char_at(&self, ui: &UiRuntime, layout: &Layout, point: Point) -> usize {
        let row = (point.y - layout.text.top).div_euclid(layout.line_height) + self.scroll.pos;
        let x = point.x - layout.text.left + self.scroll_x;
        self.with_lines(ui, layout, |lines, display| {
            let index = (row.max(0) as usize).min(lines.len().saturating_sub(1));
            let line = lines[index];
            line.start + text_util::char_at_x(text_util::span_text(display, line), x, ui.text_metrics())
        })
    }

    /// Character at pixel `x` on display line `index`.
    fn char_on_line(&self, ui: &UiRuntime, layout: &Layout, index: usize, x: i32) -> usize {
        self.with_lines(ui, layout, |lines, display| {
            let line = lines[index.min(lines.len().saturating_sub(1))];
            line.start + text_util::char_at_x(text_util::span_text(display, line), x, ui.text_metrics())
        })
    }

    fn line_count(&self, ui: &UiRuntime, layout: &Layout) -> usize {
        self.with_lines(ui, layout, |lines, _| lines.len())
    }

    fn update_extent(&mut self, ui: &UiRuntime, layout: &Layout) {
        let page = (layout.text.height() / layout.line_height).max(1);
        let total = scroll::units(self.line_count(ui, layout));
        self.scroll.set_extent(page, total);
    }

    fn scroll_to_caret(&mut self, ui: &UiRuntime, hwnd: WindowId) {
        let layout = self.layout(ui, hwnd);
        self.update_extent(ui, &layout);
        let (line, x) = self.x_of(ui, &layout, self.caret);
        if self.is_multiline() {
            self.scroll.ensure_visible(scroll::units(line));
        }
        if layout.wrap.is_none() {
            let width = layout.text.width().max(1);
            if x < self.scroll_x {
                self.scroll_x = x;
            } else if x >= self.scroll_x + width {
                self.scroll_x = x - width + 1;
            }
            self.scroll_x = self.scroll_x.max(0);
        } else {
            self.scroll_x = 0;
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    fn set_caret(&mut self, pos: usize, extend: bool) {
        let pos = pos.min(self.char_count());
        if extend {
            self.anchor.get_or_insert(self.caret);
        } else {
            self.anchor = None;
        }
        self.caret = pos;
    }

    fn select(&mut self, anchor: usize, caret: usize) {
        let len = self.char_count();
        self.anchor = Some(anchor.min(len));
        self.caret = caret.min(len);
    }

    fn delete_range(&mut self, start: usize, end: usize) -> bool {
        if start == end {
            return false;
        }
        let range = text_util::char_range_to_bytes(&self.text, start, end);
        self.text.replace_range(range, "");
        self.caret = start.min(end);
        self.anchor = None;
        self.lines.get_mut().invalidate();
        true
    }

    fn delete_selection(&mut self) -> bool {
        match self.selection() {
            Some((start, end)) => self.delete_range(start, end),
            None => {
                self.anchor = None;
                false
            }
        }
    }

    /// Line breaks become `\n`; a single-line edit keeps only the first line.
    fn normalize(&self, text: &str) -> String {
        if self.is_multiline() {
            text.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            text.split(['\r', '\n']).next().unwrap_or_default().to_owned()
        }
    }

    /// Insert at the caret, replacing the selection first.
    fn insert(&mut self, text: &str) -> Inserted {
        let normalized = self.normalize(text);
        let mut changed = self.delete_selection();
        let mut truncated = false;
        let mut insert: &str = &normalized;
        if self.limit > 0 {
            let room = self.limit.saturating_sub(self.char_count());
            if text_util::char_len(insert) > room {
                insert = &normalized[..text_util::char_to_byte(&normalized, room)];
                truncated = true;
            }
        }
        if !insert.is_empty() {
            let at = text_util::char_to_byte(&self.text, self.caret);
            self.text.insert_str(at, insert);
            self.caret += text_util::char_len(insert);
            self.lines.get_mut().invalidate();
            changed = true;
        }
        Inserted { changed, truncated }
    }

    /// Finish a user edit: flags, scrolling, repaint, notification.
    fn after_edit(&mut self, ui: &mut UiRuntime, hwnd: WindowId, changed: bool) {
        self.goal_x = None;
        self.scroll_to_caret(ui, hwnd);
        ui.invalidate(hwnd, None);
        if changed {
            self.modified = true;
            command_parent(ui, hwnd, EN_CHANGE);
        }
    }

    fn replace_selection(&mut self, ui: &mut UiRuntime, hwnd: WindowId, text: &str) {
        let inserted = self.insert(text);
        self.after_edit(ui, hwnd, inserted.changed);
        if inserted.truncated {
            command_parent(ui, hwnd, EN_MAXTEXT);
        }
    }

    fn move_caret(&mut self, ui: &mut UiRuntime, hwnd: WindowId, pos: usize, extend: bool) {
        self.set_caret(pos, extend);
        self.goal_x = None;
        self.scroll_to_caret(ui, hwnd);
        ui.invalidate(hwnd, None);
    }

    fn move_lines(&mut self, ui: &mut UiRuntime, hwnd: WindowId, delta: i32, extend: bool) {
        let layout = self.layout(ui, hwnd);
        let (line, x) = self.x_of(ui, &layout, self.caret);
        let goal = self.goal_x.unwrap_or(x);
        let last = scroll::units(self.line_count(ui, &layout).saturating_sub(1));
        let target = scroll::units(line).saturating_add(delta).clamp(0, last) as usize;
        let pos = self.char_on_line(ui, &layout, target, goal);
        self.set_caret(pos, extend);
        self.goal_x = Some(goal);
        self.scroll_to_caret(ui, hwnd);
        ui.invalidate(hwnd, None);
    }

    fn line_bounds(&self, ui: &UiRuntime, hwnd: WindowId) -> LineSpan {
        let layout = self.layout(ui, hwnd);
        self.with_lines(ui, &layout, |lines, _| lines[text_util::line_of(lines, self.caret)])
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    fn copy(&self, ui: &mut UiRuntime) -> Result<bool> {
        if self.style.contains(EditStyle::PASSWORD) {
            return Ok(false);
        }
        let selected = self.selected_text();
        if selected.is_empty() {
            return Ok(false);
        }
        ui.clipboard_mut().set_text(selected)?;
        Ok(true)
    }

    fn cut(&mut self, ui: &mut UiRuntime, hwnd: WindowId) -> Result<bool> {
        if self.is_read_only() || !self.copy(ui)? {
            return Ok(false);
        }
        let changed = self.delete_selection();
        self.after_edit(ui, hwnd, changed);
        Ok(changed)
    }

    fn paste(&mut self, ui: &mut UiRuntime, hwnd: WindowId) -> Result<bool> {
        if self.is_read_only() {
            return Ok(false);
        }
        let Some(text) = ui.clipboard_mut().get_text()? else {
            return Ok(false);
        };
        self.replace_selection(ui, hwnd, &text);
        Ok(true)
    }

    fn clear(&mut self, ui: &mut UiRuntime, hwnd: WindowId) -> bool {
        if self.is_read_only() {
            return false;
        }
        let changed = self.delete_selection();
        self.after_edit(ui, hwnd, changed);
        changed
    }

    // =========================================================================
    // Input
    // =========================================================================

    fn key_down(
        &mut self,
        ui: &mut UiRuntime,
        hwnd: WindowId,
        key: Key,
        modifiers: Modifiers,
    ) -> Result<bool> {
        let shift = modifiers.shift();
        let ctrl = modifiers.ctrl();
        match key {
            Key::Left => {
                let pos = if ctrl {
                    text_util::word_left(&self.text, self.caret)
                } else {
                    self.caret.saturating_sub(1)
                };
                self.move_caret(ui, hwnd, pos, shift);
            }
            Key::Right => {
                let pos = if ctrl {
                    text_util::word_right(&self.text, self.caret)
                } else {
                    self.caret + 1
                };
                self.move_caret(ui, hwnd, pos, shift);
            }
            Key::Home => {
                let pos = if ctrl { 0 } else { self.line_bounds(ui, hwnd).start };
                self.move_caret(ui, hwnd, pos, shift);
            }
            Key::End => {
                let pos = if ctrl {
                    self.char_count()
                } else {
                    self.line_bounds(ui, hwnd).end()
                };
                self.move_caret(ui, hwnd, pos, shift);
            }
            Key::Up if self.is_multiline() => self.move_lines(ui, hwnd, -1, shift),
            Key::Down if self.is_multiline() => self.move_lines(ui, hwnd, 1, shift),
            Key::PageUp if self.is_multiline() => {
                let page = self.scroll.page.max(1);
                self.move_lines(ui, hwnd, -page, shift);
            }
            Key::PageDown if self.is_multiline() => {
                let page = self.scroll.page.max(1);
                self.move_lines(ui, hwnd, page, shift);
            }
            Key::Backspace if !self.is_read_only() => {
                let changed = if self.selection().is_some() {
                    self.delete_selection()
                } else if ctrl {
                    let start = text_util::word_left(&self.text, self.caret);
                    self.delete_range(start, self.caret)
                } else {
                    self.delete_range(self.caret.saturating_sub(1), self.caret)
                };
                self.after_edit(ui, hwnd, changed);
            }
            Key::Delete if shift => {
                self.cut(ui, hwnd)?;
            }
            Key::Delete if !self.is_read_only() => {
                let changed = if self.selection().is_some() {
                    self.delete_selection()
                } else if ctrl {
                    let end = text_util::word_right(&self.text, self.caret);
                    self.delete_range(self.caret, end)
                } else {
                    let end = (self.caret + 1).min(self.char_count());
                    self.delete_range(self.caret, end)
                };
                self.after_edit(ui, hwnd, changed);
            }
            Key::Insert if ctrl => {
                self.copy(ui)?;
            }
            Key::Insert if shift => {
                self.paste(ui, hwnd)?;
            }
            Key::Char('a') if ctrl => {
                self.select(0, self.char_count());
                ui.invalidate(hwnd, None);
            }
            Key::Char('c') if ctrl => {
                self.copy(ui)?;
            }
            Key::Char('x') if ctrl => {
                self.cut(ui, hwnd)?;
            }
            Key::Char('v') if ctrl => {
                self.paste(ui, hwnd)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn char_input(&mut self, ui: &mut UiRuntime, hwnd: WindowId, ch: char, modifiers: Modifiers) {
        if self.is_read_only() || (modifiers.ctrl() && !modifiers.alt()) {
            return;
        }
        let text = match ch {
            '\r' | '\n' if self.is_multiline() => "\n".to_owned(),
            '\t' if self.is_multiline() => "\t".to_owned(),
            ch if ch.is_control() => return,
            ch => ch.to_string(),
        };
        self.replace_selection(ui, hwnd, &text);
    }

    fn button_down(
        &mut self,
        ui: &mut UiRuntime,
        hwnd: WindowId,
        pos: Point,
        modifiers: Modifiers,
        double_click: bool,
    ) {
        if !self.focused {
            ui.set_focus(hwnd);
        }
        let layout = self.layout(ui, hwnd);
        self.update_extent(ui, &layout);
        if let Some(track) = layout.bar {
            match scroll::hit_bar(&self.scroll, track, ui.theme(), pos) {
                Some(BarHit::Thumb(drag)) => {
                    self.drag = Some(EditDrag::Thumb(drag));
                    ui.set_capture(hwnd);
                    return;
                }
                Some(BarHit::PageUp) => {
                    self.scroll.set_pos(self.scroll.pos - self.scroll.page);
                    ui.invalidate(hwnd, None);
                    return;
                }
                Some(BarHit::PageDown) => {
                    self.scroll.set_pos(self.scroll.pos + self.scroll.page);
                    ui.invalidate(hwnd, None);
                    return;
                }
                None if track.contains(pos) => return,
                None => {}
            }
        }

        let at = self.char_at(ui, &layout, pos);
        if double_click {
            let (start, end) = text_util::word_at(&self.text, at);
            self.select(start, end);
        } else {
            self.set_caret(at, modifiers.shift());
            if !modifiers.shift() {
                self.anchor = Some(at);
            }
        }
        self.goal_x = None;
        self.drag = Some(EditDrag::Select);
        ui.set_capture(hwnd);
        self.scroll_to_caret(ui, hwnd);
        ui.invalidate(hwnd, None);
    }

    fn mouse_move(&mut self, ui: &mut UiRuntime, hwnd: WindowId, pos: Point) {
        let layout = self.layout(ui, hwnd);
        match self.drag {
            Some(EditDrag::Select) => {
                let at = self.char_at(ui, &layout, pos);
                if at != self.caret {
                    self.caret = at;
                    self.scroll_to_caret(ui, hwnd);
                    ui.invalidate(hwnd, None);
                }
            }
            Some(EditDrag::Thumb(drag)) => {
                let Some(track) = layout.bar else {
                    return;
                };
                let target =
                    self.scroll
                        .pos_for_thumb(track, ui.theme().min_thumb_length, pos.y - drag.grab);
                if self.scroll.set_pos(target) {
                    ui.invalidate(hwnd, None);
                }
            }
            None => {}
        }
    }

    fn request(&mut self, ui: &mut UiRuntime, hwnd: WindowId, request: &mut EditRequest) -> isize {
        match request {
            EditRequest::SetSelection { anchor, caret } => {
                self.select(*anchor, *caret);
                self.goal_x = None;
                self.scroll_to_caret(ui, hwnd);
                ui.invalidate(hwnd, None);
                1
            }
            EditRequest::GetSelection { start, end } => {
                let (s, e) = self.selection().unwrap_or((self.caret, self.caret));
                *start = s;
                *end = e;
                1
            }
            EditRequest::ReplaceSelection(text) => {
                let text = std::mem::take(text);
                let inserted = self.insert(&text);
                self.after_edit(ui, hwnd, inserted.changed);
                inserted.changed as isize
            }
            EditRequest::SetReadOnly(read_only) => {
                self.style.set(EditStyle::READ_ONLY, *read_only);
                ui.invalidate(hwnd, None);
                1
            }
            EditRequest::SetLimit(limit) => {
                self.limit = *limit;
                1
            }
            EditRequest::SetModify(modified) => {
                self.modified = *modified;
                1
            }
            EditRequest::GetModify => self.modified as isize,
            EditRequest::LineCount => {
                let layout = self.layout(ui, hwnd);
                self.line_count(ui, &layout) as isize
            }
            EditRequest::LineFromChar(pos) => {
                let layout = self.layout(ui, hwnd);
                self.with_lines(ui, &layout, |lines, _| text_util::line_of(lines, *pos) as isize)
            }
            EditRequest::LineIndex(index) => {
                let layout = self.layout(ui, hwnd);
                self.with_lines(ui, &layout, |lines, _| {
                    lines.get(*index).map_or(-1, |line| line.start as isize)
                })
            }
            EditRequest::ScrollToCaret => {
                self.scroll_to_caret(ui, hwnd);
                ui.invalidate(hwnd, None);
                1
            }
        }
    }
}

impl WindowBehavior for EditControl {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        match msg {
            Message::Create(info) => {
                self.style = EditStyle::from_bits_truncate(info.control_style);
                self.text = self.normalize(&info.text);
                self.caret = 0;
                self.anchor = None;
                Ok(0)
            }
            Message::Destroy => {
                self.drag = None;
                self.text.clear();
                self.lines.get_mut().invalidate();
                Ok(0)
            }
            Message::SetText(text) => {
                self.text = self.normalize(text);
                self.caret = 0;
                self.anchor = None;
                self.scroll = ScrollRange::default();
                self.scroll_x = 0;
                self.lines.get_mut().invalidate();
                self.modified = false;
                self.goal_x = None;
                ui.invalidate(hwnd, None);
                command_parent(ui, hwnd, EN_CHANGE);
                Ok(1)
            }
            Message::GetText(buffer) => {
                buffer.clear();
                buffer.push_str(&self.text);
                Ok(self.text.len() as isize)
            }
            Message::GetTextLength => Ok(self.text.len() as isize),
            Message::Size(_) => {
                let layout = self.layout(ui, hwnd);
                self.update_extent(ui, &layout);
                self.scroll_to_caret(ui, hwnd);
                Ok(0)
            }
            Message::SetFocus { .. } => {
                self.focused = true;
                ui.invalidate(hwnd, None);
                command_parent(ui, hwnd, EN_SETFOCUS);
                Ok(0)
            }
            Message::KillFocus { .. } => {
                self.focused = false;
                ui.invalidate(hwnd, None);
                command_parent(ui, hwnd, EN_KILLFOCUS);
                Ok(0)
            }
            Message::GetDialogCode => {
                let mut code = DialogCode::WANT_ARROWS | DialogCode::WANT_CHARS;
                if self.is_multiline() && self.style.contains(EditStyle::WANT_RETURN) {
                    code |= DialogCode::WANT_ENTER;
                }
                Ok(code.bits() as isize)
            }
            Message::KeyDown { key, modifiers } => {
                if self.key_down(ui, hwnd, *key, *modifiers)? {
                    Ok(0)
                } else {
                    Ok(ui.default_handle(hwnd, msg))
                }
            }
            Message::Char { ch, modifiers } => {
                self.char_input(ui, hwnd, *ch, *modifiers);
                Ok(0)
            }
            Message::ButtonDown {
                button: MouseButton::Left,
                pos,
                modifiers,
                double_click,
            } => {
                self.button_down(ui, hwnd, *pos, *modifiers, *double_click);
                Ok(0)
            }
            Message::MouseMove { pos, .. } => {
                self.mouse_move(ui, hwnd, *pos);
                Ok(0)
            }
            Message::ButtonUp {
                button: MouseButton::Left,
                ..
            } => {
                if self.drag.take().is_some() && ui.capture() == Some(hwnd) {
                    ui.release_capture();
                }
                Ok(0)
            }
            Message::CaptureChanged { .. } => {
                self.drag = None;
                Ok(0)
            }
            Message::Wheel {
                delta,
                horizontal: false,
                ..
            } if self.is_multiline() => {
                let layout = self.layout(ui, hwnd);
                self.update_extent(ui, &layout);
                if self.scroll.set_pos(self.scroll.pos - *delta * 3) {
                    ui.invalidate(hwnd, None);
                }
                Ok(0)
            }
            Message::Copy => Ok(self.copy(ui)? as isize),
            Message::Cut => Ok(self.cut(ui, hwnd)? as isize),
            Message::Paste => Ok(self.paste(ui, hwnd)? as isize),
            Message::Clear => Ok(self.clear(ui, hwnd) as isize),
            Message::Control(_) => match msg.control_mut::<EditRequest>() {
                Some(request) => Ok(self.request(ui, hwnd, request)),
                None => Ok(0),
            },
            _ => Ok(ui.default_handle(hwnd, msg)),
        }
    }

    fn paint(&self, ui: &UiRuntime, hwnd: WindowId, painter: &mut dyn Painter) {
        let theme = ui.theme();
        let colors = &theme.colors;
        let enabled = ui.is_enabled(hwnd);
        let client = ui.client_rect(hwnd).unwrap_or_default();
        let background = if enabled && !self.is_read_only() {
            colors.window
        } else {
            colors.face
        };
        painter.fill_rect(client, background);

        let layout = self.layout(ui, hwnd);
        let metrics = ui.text_metrics();
        let text_color = if enabled { colors.text } else { colors.disabled_text };
        let selection = self.selection();
        let first = self.scroll.pos.max(0) as usize;
        let visible = (layout.text.height() / layout.line_height + 1).max(1) as usize;

        painter.push_clip(layout.text);
        self.with_lines(ui, &layout, |lines, display| {
            for (row, line) in lines.iter().enumerate().skip(first).take(visible) {
                let y = layout.text.top + (row - first) as i32 * layout.line_height;
                let x0 = layout.text.left - self.scroll_x;
                let line_text = text_util::span_text(display, *line);
                painter.draw_text(Point::new(x0, y), line_text, text_color);

                if let Some((start, end)) = selection {
                    let from = start.max(line.start);
                    let to = end.min(line.end());
                    if from < to {
                        let head = LineSpan {
                            start: line.start,
                            len: from - line.start,
                        };
                        let picked = LineSpan {
                            start: from,
                            len: to - from,
                        };
                        let left = x0 + metrics.text_width(text_util::span_text(display, head));
                        let picked_text = text_util::span_text(display, picked);
                        let width = metrics.text_width(picked_text);
                        painter.fill_rect(
                            Rect::from_xywh(left, y, width, layout.line_height),
                            colors.highlight,
                        );
                        painter.draw_text(Point::new(left, y), picked_text, colors.highlight_text);
                    }
                }
            }
        });
        if self.focused && enabled {
            let (line, x) = self.x_of(ui, &layout, self.caret);
            if line >= first && line < first + visible {
                let x = layout.text.left - self.scroll_x + x;
                let y = layout.text.top + (line - first) as i32 * layout.line_height;
                painter.draw_line(
                    Point::new(x, y),
                    Point::new(x, y + layout.line_height - 1),
                    colors.text,
                );
            }
        }
        painter.pop_clip();

        if let Some(track) = layout.bar {
            let mut range = self.scroll;
            range.set_extent(
                (layout.text.height() / layout.line_height).max(1),
                scroll::units(self.line_count(ui, &layout)),
            );
            scroll::paint_vertical(&range, track, theme, painter);
        }
        tracing::trace!(target: TARGET, ?hwnd, first, "edit painted");
    }

    fn class_name(&self) -> &'static str {
        CLASS_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_casement_core::{
        DefaultBehavior, FnBehavior, MemoryClipboard, MonospaceMetrics,
        RecordingPainter, RuntimeConfig, WindowParams,
    };
    use std::rc::Rc;

    fn setup(text: &str, style: EditStyle, width: i32) -> (UiRuntime, WindowId, WindowId) {
        let mut ui = UiRuntime::new(
            RuntimeConfig::default()
                .with_text_metrics(MonospaceMetrics {
                    char_width: 10,
                    line_height: 10,
                })
                .with_clipboard(MemoryClipboard::new()),
        );
        let frame = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 400, 400)),
                DefaultBehavior,
            )
            .unwrap();
        // Padding is 2px on each side, so the text area is `width - 4` wide.
        let edit = ui
            .create_window(
                WindowParams::child(frame, 7, Rect::from_xywh(0, 0, width, 44))
                    .with_text(text)
                    .with_control_style(style.bits()),
                EditControl::new(),
            )
            .unwrap();
        (ui, frame, edit)
    }

    fn key(ui: &mut UiRuntime, edit: WindowId, key: Key, modifiers: Modifiers) {
        ui.send(edit, Message::KeyDown { key, modifiers });
    }

    fn state(ui: &UiRuntime, edit: WindowId) -> (String, usize, Option<(usize, usize)>) {
        ui.with_behavior::<EditControl, _>(edit, |e| (e.text().to_owned(), e.caret(), e.selection()))
            .unwrap()
    }

    #[test]
    fn test_word_left_over_multibyte_word() {
        let (mut ui, _, edit) = setup("café!", EditStyle::empty(), 200);
        key(&mut ui, edit, Key::End, Modifiers::empty());
        assert_eq!(state(&ui, edit).1, 5);
        key(&mut ui, edit, Key::Left, Modifiers::CTRL);
        assert_eq!(state(&ui, edit).1, 0);
    }

    #[test]
    fn test_shift_extends_and_plain_move_collapses() {
        let (mut ui, _, edit) = setup("hello", EditStyle::empty(), 200);
        key(&mut ui, edit, Key::Right, Modifiers::SHIFT);
        key(&mut ui, edit, Key::Right, Modifiers::SHIFT);
        assert_eq!(state(&ui, edit).2, Some((0, 2)));
        let selected = ui.with_behavior::<EditControl, _>(edit, |e| e.selected_text().to_owned());
        assert_eq!(selected.as_deref(), Some("he"));

        key(&mut ui, edit, Key::Right, Modifiers::empty());
        assert_eq!(state(&ui, edit).1, 3);
        assert_eq!(state(&ui, edit).2, None);
    }

    #[test]
    fn test_typing_replaces_selection_and_notifies() {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let codes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&codes);
        let frame = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 400, 400)),
                FnBehavior::new("Parent", move |ui, hwnd, msg| {
                    if let Message::Command { id: 7, code, .. } = msg {
                        sink.borrow_mut().push(*code);
                    }
                    Ok(ui.default_handle(hwnd, msg))
                }),
            )
            .unwrap();
        let edit = ui
            .create_window(
                WindowParams::child(frame, 7, Rect::from_xywh(0, 0, 200, 24)).with_text("héllo"),
                EditControl::new(),
            )
            .unwrap();
        codes.borrow_mut().clear();

        ui.send(edit, Message::control(EditRequest::SetSelection { anchor: 1, caret: 3 }));
        ui.send(
            edit,
            Message::Char {
                ch: 'ö',
                modifiers: Modifiers::empty(),
            },
        );
        assert_eq!(state(&ui, edit), ("hölo".to_owned(), 2, None));
        assert_eq!(*codes.borrow(), vec![EN_CHANGE]);
        assert_eq!(ui.text(edit), "hölo");
        assert_eq!(
            ui.send(edit, Message::control(EditRequest::GetModify)),
            1
        );
    }

    #[test]
    fn test_backspace_and_delete() {
        let (mut ui, _, edit) = setup("ab€d", EditStyle::empty(), 200);
        ui.send(edit, Message::control(EditRequest::SetSelection { anchor: 3, caret: 3 }));
        key(&mut ui, edit, Key::Backspace, Modifiers::empty());
        assert_eq!(state(&ui, edit).0, "abd");
        key(&mut ui, edit, Key::Delete, Modifiers::empty());
        assert_eq!(state(&ui, edit), ("ab".to_owned(), 2, None));
        key(&mut ui, edit, Key::Backspace, Modifiers::CTRL);
        assert_eq!(state(&ui, edit), (String::new(), 0, None));
    }

    #[test]
    fn test_clipboard_round_trip_uses_byte_ranges() {
        let (mut ui, _, edit) = setup("naïve text", EditStyle::empty(), 200);
        ui.send(edit, Message::control(EditRequest::SetSelection { anchor: 0, caret: 5 }));
        assert_eq!(ui.send(edit, Message::Cut), 1);
        assert_eq!(state(&ui, edit).0, " text");
        assert_eq!(
            ui.clipboard_mut().get_text().unwrap().as_deref(),
            Some("naïve")
        );

        key(&mut ui, edit, Key::End, Modifiers::empty());
        key(&mut ui, edit, Key::Char('v'), Modifiers::CTRL);
        assert_eq!(state(&ui, edit).0, " textnaïve");
        assert_eq!(state(&ui, edit).1, 10);
    }

    #[test]
    fn test_password_text_is_not_copied() {
        let (mut ui, _, edit) = setup("secret", EditStyle::PASSWORD, 200);
        ui.send(edit, Message::control(EditRequest::SetSelection { anchor: 0, caret: 6 }));
        assert_eq!(ui.send(edit, Message::Copy), 0);
        assert_eq!(ui.clipboard_mut().get_text().unwrap(), None);

        let mut painter = RecordingPainter::new();
        let frame = ui.parent(edit).unwrap();
        ui.paint(frame, &mut painter);
        assert!(painter.texts().contains(&"******"));
    }

    #[test]
    fn test_read_only_rejects_edits() {
        let (mut ui, _, edit) = setup("fixed", EditStyle::READ_ONLY, 200);
        ui.send(
            edit,
            Message::Char {
                ch: 'x',
                modifiers: Modifiers::empty(),
            },
        );
        key(&mut ui, edit, Key::Backspace, Modifiers::empty());
        assert_eq!(state(&ui, edit).0, "fixed");
        ui.send(edit, Message::control(EditRequest::SetReadOnly(false)));
        ui.send(
            edit,
            Message::Char {
                ch: 'x',
                modifiers: Modifiers::empty(),
            },
        );
        assert_eq!(state(&ui, edit).0, "xfixed");
    }

    #[test]
    fn test_limit_truncates_insertion() {
        let (mut ui, _, edit) = setup("abc", EditStyle::empty(), 200);
        ui.send(edit, Message::control(EditRequest::SetLimit(5)));
        ui.send(edit, Message::control(EditRequest::ReplaceSelection("wxyz".into())));
        assert_eq!(state(&ui, edit).0, "wxabc");
    }

    #[test]
    fn test_single_line_drops_line_breaks() {
        let (mut ui, _, edit) = setup("one\ntwo", EditStyle::empty(), 200);
        assert_eq!(state(&ui, edit).0, "one");
        ui.send(
            edit,
            Message::Char {
                ch: '\r',
                modifiers: Modifiers::empty(),
            },
        );
        assert_eq!(state(&ui, edit).0, "one");
    }

    #[test]
    fn test_multiline_normalizes_carriage_returns() {
        let (mut ui, _, edit) = setup("a\rb\r\nc", EditStyle::MULTILINE, 200);
        assert_eq!(state(&ui, edit).0, "a\nb\nc");
        assert_eq!(ui.send(edit, Message::control(EditRequest::LineCount)), 3);

        ui.send(edit, Message::SetText("x\ry".into()));
        assert_eq!(state(&ui, edit).0, "x\ny");
        assert_eq!(ui.send(edit, Message::control(EditRequest::LineCount)), 2);
    }

    #[test]
    fn test_multiline_wrap_and_vertical_movement() {
        // Text area is 56px: five 10px characters per line.
        let (mut ui, _, edit) = setup("aaaa bbbb cc\ndd", EditStyle::MULTILINE, 60);
        assert_eq!(ui.send(edit, Message::control(EditRequest::LineCount)), 4);
        assert_eq!(ui.send(edit, Message::control(EditRequest::LineFromChar(6))), 1);
        assert_eq!(ui.send(edit, Message::control(EditRequest::LineIndex(3))), 13);
        assert_eq!(ui.send(edit, Message::control(EditRequest::LineIndex(9))), -1);

        key(&mut ui, edit, Key::Right, Modifiers::empty());
        key(&mut ui, edit, Key::Right, Modifiers::empty());
        key(&mut ui, edit, Key::Down, Modifiers::empty());
        assert_eq!(state(&ui, edit).1, 7);
        key(&mut ui, edit, Key::Down, Modifiers::empty());
        key(&mut ui, edit, Key::Down, Modifiers::empty());
        assert_eq!(state(&ui, edit).1, 15);
        key(&mut ui, edit, Key::Home, Modifiers::empty());
        assert_eq!(state(&ui, edit).1, 13);
        key(&mut ui, edit, Key::Up, Modifiers::SHIFT);
        assert_eq!(state(&ui, edit).2, Some((10, 13)));
    }

    #[test]
    fn test_line_cache_rebuilds_on_resize() {
        let (mut ui, _, edit) = setup("aaaa bbbb", EditStyle::MULTILINE, 60);
        assert_eq!(ui.send(edit, Message::control(EditRequest::LineCount)), 2);
        ui.set_window_rect(edit, Rect::from_xywh(0, 0, 200, 44));
        assert_eq!(ui.send(edit, Message::control(EditRequest::LineCount)), 1);
    }

    #[test]
    fn test_mouse_drag_selects_under_capture() {
        let (mut ui, _, edit) = setup("hello world", EditStyle::empty(), 200);
        ui.send(
            edit,
            Message::ButtonDown {
                button: MouseButton::Left,
                pos: Point::new(12, 5),
                modifiers: Modifiers::empty(),
                double_click: false,
            },
        );
        assert_eq!(ui.capture(), Some(edit));
        ui.send(
            edit,
            Message::MouseMove {
                pos: Point::new(52, 5),
                modifiers: Modifiers::empty(),
            },
        );
        assert_eq!(state(&ui, edit).2, Some((1, 5)));
        ui.send(
            edit,
            Message::ButtonUp {
                button: MouseButton::Left,
                pos: Point::new(52, 5),
                modifiers: Modifiers::empty(),
            },
        );
        assert_eq!(ui.capture(), None);
        assert_eq!(ui.get_focus(), Some(edit));
    }

    #[test]
    fn test_double_click_selects_word() {
        let (mut ui, _, edit) = setup("hello world", EditStyle::empty(), 200);
        ui.send(
            edit,
            Message::ButtonDown {
                button: MouseButton::Left,
                pos: Point::new(75, 5),
                modifiers: Modifiers::empty(),
                double_click: true,
            },
        );
        assert_eq!(state(&ui, edit).2, Some((6, 11)));
    }

    #[test]
    fn test_scrollbar_thumb_drag() {
        let text = (0..20).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let (mut ui, frame, _) = setup("", EditStyle::empty(), 10);
        let edit = ui
            .create_window(
                WindowParams::child(frame, 8, Rect::from_xywh(0, 100, 100, 104))
                    .with_style(WindowStyle::VSCROLL)
                    .with_text(text)
                    .with_control_style(EditStyle::MULTILINE.bits()),
                EditControl::new(),
            )
            .unwrap();
        // 100px of text area: 10 visible lines out of 20, thumb is 52px tall.
        ui.send(
            edit,
            Message::ButtonDown {
                button: MouseButton::Left,
                pos: Point::new(95, 10),
                modifiers: Modifiers::empty(),
                double_click: false,
            },
        );
        assert_eq!(ui.capture(), Some(edit));
        ui.send(
            edit,
            Message::MouseMove {
                pos: Point::new(95, 200),
                modifiers: Modifiers::empty(),
            },
        );
        let first = ui.with_behavior::<EditControl, _>(edit, |e| e.first_visible_line());
        assert_eq!(first, Some(10));
        assert_eq!(state(&ui, edit).1, 0);
    }
}
