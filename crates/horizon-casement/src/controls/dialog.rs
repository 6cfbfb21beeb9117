//! Dialog frames built from templates.
//!
//! A dialog is a top-level [`WindowStyle::DIALOG`] surface whose primary
//! behavior is a [`DialogFrame`]. Application logic goes in the secondary
//! [`DialogBehavior`](horizon_casement_core::DialogBehavior), which sees
//! every message first. Anything it leaves unhandled gets the frame's
//! defaults: `IDOK` and `IDCANCEL` commands end
//! the dialog with their id, and [`Message::Close`] ends it with `IDCANCEL`.
//!
//! A modal dialog disables its owner for its lifetime. Ending the dialog
//! records the result in the [`DialogHandle`], re-enables and reactivates the
//! owner, and destroys the frame.

use std::cell::Cell;
use std::rc::Rc;

use horizon_casement_core::{
    IDCANCEL, IDOK, Insets, Message, Painter, Point, Rect, Result, SharedDialogBehavior,
    UiRuntime, WindowBehavior, WindowId, WindowParams, WindowStyle,
};

use super::{ControlKind, TARGET};

pub(crate) const CLASS_NAME: &str = "Dialog";

/// One control of a [`DialogTemplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogItem {
    /// Control kind.
    pub kind: ControlKind,
    /// Control identifier.
    pub id: u32,
    /// Rectangle in dialog client coordinates.
    pub rect: Rect,
    /// Initial text.
    pub text: String,
    /// Window style; `VISIBLE | CHILD` are always added.
    pub style: WindowStyle,
    /// Control style bits.
    pub control_style: u32,
}

impl DialogItem {
    /// A tab-stop control.
    pub fn new(kind: ControlKind, id: u32, rect: Rect) -> Self {
        Self {
            kind,
            id,
            rect,
            text: String::new(),
            style: WindowStyle::TABSTOP,
            control_style: 0,
        }
    }

    /// Set the initial text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Replace the window style.
    pub fn with_style(mut self, style: WindowStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the control style bits.
    pub fn with_control_style(mut self, bits: u32) -> Self {
        self.control_style = bits;
        self
    }
}

/// Layout of a dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DialogTemplate {
    /// Caption.
    pub title: String,
    /// Frame rectangle in screen coordinates.
    pub rect: Rect,
    /// Controls, in tab order.
    pub items: Vec<DialogItem>,
    /// Disable the owner while the dialog is open.
    pub modal: bool,
}

impl DialogTemplate {
    /// An empty modeless template.
    pub fn new(title: impl Into<String>, rect: Rect) -> Self {
        Self {
            title: title.into(),
            rect,
            ..Default::default()
        }
    }

    /// Append a control.
    pub fn with_item(mut self, item: DialogItem) -> Self {
        self.items.push(item);
        self
    }

    /// Make the dialog modal.
    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }
}

/// A created dialog and the slot its result lands in.
#[derive(Debug, Clone)]
pub struct DialogHandle {
    /// The dialog frame.
    pub id: WindowId,
    result: Rc<Cell<Option<isize>>>,
}

impl DialogHandle {
    /// The value passed to [`end_dialog`], once the dialog has ended.
    pub fn result(&self) -> Option<isize> {
        self.result.get()
    }

    /// Whether the dialog has ended.
    pub fn is_ended(&self) -> bool {
        self.result.get().is_some()
    }
}

/// Primary behavior of a dialog frame.
#[derive(Debug)]
pub struct DialogFrame {
    owner: Option<WindowId>,
    modal: bool,
    result: Rc<Cell<Option<isize>>>,
    ended: bool,
}

impl DialogFrame {
    /// Record the result. Returns the owner to re-enable, or `None` if the
    /// dialog had already ended.
    fn finish(&mut self, result: isize) -> Option<Option<WindowId>> {
        if self.ended {
            return None;
        }
        self.ended = true;
        self.result.set(Some(result));
        Some(self.owner.filter(|_| self.modal))
    }

    /// Whether the dialog has ended.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether the dialog disables its owner.
    pub fn is_modal(&self) -> bool {
        self.modal
    }
}

/// Tear down after [`DialogFrame::finish`].
fn close_finished(ui: &mut UiRuntime, hwnd: WindowId, owner: Option<WindowId>) {
    if let Some(owner) = owner
        && ui.is_window(owner)
    {
        ui.enable_window(owner, true);
        if let Some(surface) = ui.top_level_of(owner) {
            ui.set_active_window(surface);
        }
    }
    ui.destroy_window(hwnd);
}

impl WindowBehavior for DialogFrame {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        let end_with = match msg {
            Message::InitDialog => return Ok(1),
            Message::Command { id, .. } if *id == IDOK || *id == IDCANCEL => *id as isize,
            Message::Close => IDCANCEL as isize,
            Message::Destroy => {
                // Destroyed without end_dialog.
                if !self.ended
                    && self.modal
                    && let Some(owner) = self.owner
                    && ui.is_window(owner)
                {
                    ui.enable_window(owner, true);
                }
                self.ended = true;
                return Ok(0);
            }
            _ => return Ok(ui.default_handle(hwnd, msg)),
        };
        if let Some(owner) = self.finish(end_with) {
            tracing::debug!(target: TARGET, ?hwnd, result = end_with, "dialog ended");
            close_finished(ui, hwnd, owner);
        }
        Ok(0)
    }

    fn paint(&self, ui: &UiRuntime, hwnd: WindowId, painter: &mut dyn Painter) {
        let colors = &ui.theme().colors;
        let client = ui.client_rect(hwnd).unwrap_or_default();
        painter.fill_rect(client, colors.face);
        if let Some(title) = ui.raw_text(hwnd)
            && !title.is_empty()
        {
            painter.draw_text(Point::new(client.left + 4, client.top), title, colors.text);
        }
    }

    fn class_name(&self) -> &'static str {
        CLASS_NAME
    }
}

/// Create a dialog from a template.
///
/// The controls are created in template order, [`init_dialog`] runs, and the
/// dialog is activated. Returns `None` if the frame or any control could not
/// be created; a partially built dialog is destroyed.
#[tracing::instrument(skip(ui, template, dialog), target = "horizon_casement::controls", level = "debug")]
pub fn create_dialog(
    ui: &mut UiRuntime,
    owner: Option<WindowId>,
    template: DialogTemplate,
    dialog: Option<SharedDialogBehavior>,
) -> Option<DialogHandle> {
    let DialogTemplate {
        title,
        rect,
        items,
        modal,
    } = template;
    let modal = modal && owner.is_some();
    let result = Rc::new(Cell::new(None));
    let frame = UiRuntime::share(DialogFrame {
        owner,
        modal,
        result: Rc::clone(&result),
        ended: false,
    });

    let mut params = WindowParams::top_level(rect)
        .with_text(title)
        .with_style(WindowStyle::VISIBLE | WindowStyle::DIALOG | WindowStyle::BORDER)
        .with_non_client(Insets::uniform(1))
        .with_modal(modal);
    if let Some(owner) = owner {
        params = params.with_owner(owner);
    }
    let id = ui.create_window_shared(params, frame, dialog)?;

    for item in items {
        let params = WindowParams::child(id, item.id, item.rect)
            .with_text(item.text)
            .with_style(item.style | WindowStyle::VISIBLE | WindowStyle::CHILD)
            .with_control_style(item.control_style);
        if item.kind.create(ui, params).is_none() {
            tracing::warn!(target: TARGET, control_id = item.id, kind = ?item.kind, "dialog control creation failed");
            ui.destroy_window(id);
            return None;
        }
    }

    if modal && let Some(owner) = owner {
        ui.enable_window(owner, false);
    }
    init_dialog(ui, id);
    ui.set_active_window(id);
    Some(DialogHandle { id, result })
}

/// Send [`Message::InitDialog`]; a nonzero reply focuses the first tab stop.
///
/// Returns the reply.
pub fn init_dialog(ui: &mut UiRuntime, hwnd: WindowId) -> isize {
    let reply = ui.send(hwnd, Message::InitDialog);
    if reply != 0
        && let Some(first) = ui.next_tab_stop(hwnd, false)
    {
        ui.set_focus(first);
    }
    reply
}

/// End a dialog with `result`: record it, re-enable a modal dialog's owner
/// and destroy the frame.
///
/// Returns `false` if `hwnd` is not a live dialog or has already ended.
pub fn end_dialog(ui: &mut UiRuntime, hwnd: WindowId, result: isize) -> bool {
    let Some(Some(owner)) = ui.with_behavior_mut::<DialogFrame, _>(hwnd, |f| f.finish(result))
    else {
        return false;
    };
    tracing::debug!(target: TARGET, ?hwnd, result, "dialog ended");
    close_finished(ui, hwnd, owner);
    true
}
