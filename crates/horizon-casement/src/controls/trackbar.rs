//! Horizontal slider.
//!
//! The thumb's left edge maps linearly onto `min..=max` across the client
//! width minus the thumb width. Every user-driven change reports
//! [`TRBN_POSCHANGED`] with the action that caused it; programmatic changes
//! are silent.

use horizon_casement_core::{
    DialogCode, Key, Message, MouseButton, Painter, Point, Rect, Result, UiRuntime,
    WindowBehavior, WindowId,
};

use super::{TARGET, notify_parent_with};

pub(crate) const CLASS_NAME: &str = "Trackbar";

/// The position changed. Payload: [`TrackbarPosition`].
pub const TRBN_POSCHANGED: u32 = 0x0401;

/// What moved the thumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackbarAction {
    /// Left or Up arrow.
    LineUp,
    /// Right or Down arrow.
    LineDown,
    /// Page Up, or a click left of the thumb.
    PageUp,
    /// Page Down, or a click right of the thumb.
    PageDown,
    /// Home.
    Top,
    /// End.
    Bottom,
    /// The thumb is being dragged.
    ThumbTrack,
    /// The thumb was released after a drag.
    ThumbPosition,
    /// The key or button that drove the change was released.
    EndTrack,
}

/// Payload of [`TRBN_POSCHANGED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackbarPosition {
    /// Position after the change.
    pub pos: i32,
    /// What caused it.
    pub action: TrackbarAction,
}

/// Requests understood by [`Trackbar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackbarRequest {
    /// Set the range; the position is clamped into it.
    SetRange {
        /// Smallest position.
        min: i32,
        /// Largest position.
        max: i32,
    },
    /// Reply with the smallest position.
    GetRangeMin,
    /// Reply with the largest position.
    GetRangeMax,
    /// Move the thumb (clamped).
    SetPos(i32),
    /// Reply with the position.
    GetPos,
    /// Set the arrow-key step. Replies with the previous one.
    SetLineSize(i32),
    /// Reply with the arrow-key step.
    GetLineSize,
    /// Set the page step. Replies with the previous one.
    SetPageSize(i32),
    /// Reply with the page step.
    GetPageSize,
}

/// A slider.
#[derive(Debug)]
pub struct Trackbar {
    min: i32,
    max: i32,
    pos: i32,
    line: i32,
    page: i32,
    /// Pointer offset from the thumb's left edge while dragging.
    drag: Option<i32>,
    has_focus: bool,
}

impl Default for Trackbar {
    fn default() -> Self {
        Self {
            min: 0,
            max: 100,
            pos: 0,
            line: 1,
            page: 10,
            drag: None,
            has_focus: false,
        }
    }
}

impl Trackbar {
    /// Create a slider over `0..=100`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position.
    pub fn pos(&self) -> i32 {
        self.pos
    }

    /// Range as `(min, max)`.
    pub fn range(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    /// Whether the thumb is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn travel(&self, ui: &UiRuntime, hwnd: WindowId) -> i32 {
        let client = ui.client_rect(hwnd).unwrap_or_default();
        (client.width() - ui.theme().trackbar_thumb).max(1)
    }

    fn thumb_rect(&self, ui: &UiRuntime, hwnd: WindowId) -> Rect {
        let client = ui.client_rect(hwnd).unwrap_or_default();
        let span = i64::from(self.max - self.min).max(1);
        let offset = i64::from(self.pos - self.min) * i64::from(self.travel(ui, hwnd)) / span;
        let left = client.left + offset as i32;
        Rect::new(left, client.top, left + ui.theme().trackbar_thumb, client.bottom)
    }

    fn pos_for_thumb_left(&self, ui: &UiRuntime, hwnd: WindowId, left: i32) -> i32 {
        let travel = i64::from(self.travel(ui, hwnd));
        let span = i64::from(self.max - self.min);
        let offset = i64::from(left.clamp(0, travel as i32));
        self.min + ((offset * span + travel / 2) / travel) as i32
    }

    fn clamp(&self, pos: i32) -> i32 {
        pos.clamp(self.min, self.max)
    }

    /// Move to `pos` on behalf of the user. Reports the change, or reports
    /// unconditionally for the terminal actions.
    fn user_move(&mut self, ui: &mut UiRuntime, hwnd: WindowId, pos: i32, action: TrackbarAction) {
        let pos = self.clamp(pos);
        let changed = pos != self.pos;
        self.pos = pos;
        if changed {
            ui.invalidate(hwnd, None);
        }
        if changed || matches!(action, TrackbarAction::ThumbPosition | TrackbarAction::EndTrack) {
            tracing::trace!(target: TARGET, ?hwnd, pos, ?action, "trackbar moved");
            notify_parent_with(ui, hwnd, TRBN_POSCHANGED, TrackbarPosition { pos, action });
        }
    }

    fn key_action(key: Key) -> Option<TrackbarAction> {
        Some(match key {
            Key::Left | Key::Up => TrackbarAction::LineUp,
            Key::Right | Key::Down => TrackbarAction::LineDown,
            Key::PageUp => TrackbarAction::PageUp,
            Key::PageDown => TrackbarAction::PageDown,
            Key::Home => TrackbarAction::Top,
            Key::End => TrackbarAction::Bottom,
            _ => return None,
        })
    }

    fn target_for(&self, action: TrackbarAction) -> i32 {
        match action {
            TrackbarAction::LineUp => self.pos.saturating_sub(self.line),
            TrackbarAction::LineDown => self.pos.saturating_add(self.line),
            TrackbarAction::PageUp => self.pos.saturating_sub(self.page),
            TrackbarAction::PageDown => self.pos.saturating_add(self.page),
            TrackbarAction::Top => self.min,
            TrackbarAction::Bottom => self.max,
            TrackbarAction::ThumbTrack
            | TrackbarAction::ThumbPosition
            | TrackbarAction::EndTrack => self.pos,
        }
    }

    fn button_down(&mut self, ui: &mut UiRuntime, hwnd: WindowId, pos: Point) {
        if !self.has_focus {
            ui.set_focus(hwnd);
        }
        let thumb = self.thumb_rect(ui, hwnd);
        if pos.x >= thumb.left && pos.x < thumb.right {
            self.drag = Some(pos.x - thumb.left);
            ui.set_capture(hwnd);
            return;
        }
        let action = if pos.x < thumb.left {
            TrackbarAction::PageUp
        } else {
            TrackbarAction::PageDown
        };
        let target = self.target_for(action);
        self.user_move(ui, hwnd, target, action);
    }

    fn request(&mut self, ui: &mut UiRuntime, hwnd: WindowId, request: TrackbarRequest) -> isize {
        match request {
            TrackbarRequest::SetRange { min, max } => {
                self.min = min.min(max);
                self.max = max.max(min);
                self.pos = self.clamp(self.pos);
                ui.invalidate(hwnd, None);
                1
            }
            TrackbarRequest::GetRangeMin => self.min as isize,
            TrackbarRequest::GetRangeMax => self.max as isize,
            TrackbarRequest::SetPos(pos) => {
                self.pos = self.clamp(pos);
                ui.invalidate(hwnd, None);
                self.pos as isize
            }
            TrackbarRequest::GetPos => self.pos as isize,
            TrackbarRequest::SetLineSize(line) => std::mem::replace(&mut self.line, line.max(1)) as isize,
            TrackbarRequest::GetLineSize => self.line as isize,
            TrackbarRequest::SetPageSize(page) => std::mem::replace(&mut self.page, page.max(1)) as isize,
            TrackbarRequest::GetPageSize => self.page as isize,
        }
    }
}

impl WindowBehavior for Trackbar {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        match msg {
            Message::Destroy => {
                if self.drag.take().is_some() && ui.capture() == Some(hwnd) {
                    ui.release_capture();
                }
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
            Message::ButtonDown {
                button: MouseButton::Left,
                pos,
                ..
            } => {
                self.button_down(ui, hwnd, *pos);
                Ok(0)
            }
            Message::MouseMove { pos, .. } => {
                if let Some(grab) = self.drag {
                    let target = self.pos_for_thumb_left(ui, hwnd, pos.x - grab);
                    self.user_move(ui, hwnd, target, TrackbarAction::ThumbTrack);
                }
                Ok(0)
            }
            Message::ButtonUp {
                button: MouseButton::Left,
                ..
            } => {
                if self.drag.take().is_some() {
                    if ui.capture() == Some(hwnd) {
                        ui.release_capture();
                    }
                    let pos = self.pos;
                    self.user_move(ui, hwnd, pos, TrackbarAction::ThumbPosition);
                }
                let pos = self.pos;
                self.user_move(ui, hwnd, pos, TrackbarAction::EndTrack);
                Ok(0)
            }
            Message::CaptureChanged { .. } => {
                self.drag = None;
                Ok(0)
            }
            Message::KeyDown { key, .. } => match Self::key_action(*key) {
                Some(action) => {
                    let target = self.target_for(action);
                    self.user_move(ui, hwnd, target, action);
                    Ok(0)
                }
                None => Ok(ui.default_handle(hwnd, msg)),
            },
            Message::KeyUp { key, .. } => {
                if Self::key_action(*key).is_some() {
                    let pos = self.pos;
                    self.user_move(ui, hwnd, pos, TrackbarAction::EndTrack);
                }
                Ok(0)
            }
            Message::Control(_) => match msg.control_mut::<TrackbarRequest>() {
                Some(request) => {
                    let request = *request;
                    Ok(self.request(ui, hwnd, request))
                }
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
        let mid = client.top + client.height() / 2;
        let half_thumb = theme.trackbar_thumb / 2;
        painter.fill_rect(
            Rect::new(client.left + half_thumb, mid - 2, client.right - half_thumb, mid + 2),
            colors.window,
        );
        painter.frame_rect(
            Rect::new(client.left + half_thumb, mid - 2, client.right - half_thumb, mid + 2),
            colors.shadow,
        );
        let thumb = self.thumb_rect(ui, hwnd);
        painter.fill_rect(thumb, if self.drag.is_some() { colors.highlight } else { colors.face });
        painter.frame_rect(thumb, colors.shadow);
        if self.has_focus {
            painter.frame_rect(client, colors.text);
        }
    }

    fn class_name(&self) -> &'static str {
        CLASS_NAME
    }
}
