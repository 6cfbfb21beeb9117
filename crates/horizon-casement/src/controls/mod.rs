//! Built-in controls.
//!
//! Every control is a [`WindowBehavior`] whose private state lives in its own
//! struct. The shared protocol:
//!
//! - state is initialised from [`Message::Create`] (text, control style bits);
//! - dispatched messages mutate the state, including typed requests sent with
//!   [`Message::control`] (each control defines its own request enum);
//! - changes request repainting with [`UiRuntime::invalidate`], never paint
//!   directly;
//! - [`Message::Destroy`] releases everything the control holds (capture,
//!   popups, timers).
//!
//! Controls report to their parent with [`Message::Command`] (edit, button
//! and combo box codes) or [`Message::Notify`] (list, tree, tab and trackbar
//! codes). Read-only state is available without a message through
//! [`UiRuntime::with_behavior`].
//!
//! # Example
//!
//! ```
//! use horizon_casement::controls::{ControlKind, EditControl, EditRequest};
//! use horizon_casement::{DefaultBehavior, Message, Rect, UiRuntime, WindowParams};
//!
//! let mut ui = UiRuntime::new(Default::default());
//! let frame = ui
//!     .create_window(WindowParams::top_level(Rect::from_xywh(0, 0, 300, 200)), DefaultBehavior)
//!     .unwrap();
//! let edit = ControlKind::Edit
//!     .create(&mut ui, WindowParams::child(frame, 100, Rect::from_xywh(10, 10, 200, 24)).with_text("hello"))
//!     .unwrap();
//!
//! ui.send(edit, Message::control(EditRequest::SetSelection { anchor: 0, caret: 5 }));
//! let selection = ui.with_behavior::<EditControl, _>(edit, |e| e.selection());
//! assert_eq!(selection, Some(Some((0, 5))));
//! ```

mod button;
mod combo_box;
mod dialog;
mod edit;
mod label;
mod list_view;
mod progress;
pub mod row_bitmap;
pub mod scroll;
mod tab_control;
pub mod text_util;
mod trackbar;
mod tree_view;
pub mod typeahead;

use std::any::Any;

use horizon_casement_core::{
    ControlMessage, Message, Notification, UiRuntime, WindowBehavior, WindowId, WindowParams,
};

pub use button::{BN_CLICKED, Button, ButtonRequest, ButtonStyle};
pub use combo_box::{
    CBN_CLOSEUP, CBN_DROPDOWN, CBN_KILLFOCUS, CBN_SELCHANGE, CBN_SETFOCUS, ComboBox, ComboPopup,
    ComboRequest, ComboStyle,
};
pub use dialog::{
    DialogFrame, DialogHandle, DialogItem, DialogTemplate, create_dialog, end_dialog, init_dialog,
};
pub use edit::{
    EN_CHANGE, EN_KILLFOCUS, EN_MAXTEXT, EN_SETFOCUS, EditControl, EditRequest, EditStyle,
};
pub use label::{Label, LabelStyle};
pub use list_view::{
    LVN_COLUMNCLICK, LVN_ENDCOLUMNRESIZE, LVN_GETDISPINFO, LVN_ITEMCHANGED, ListColumn,
    ListDisplayRequest, ListHit, ListItemChanged, ListRequest, ListRow, ListStyle, ListView,
    RowState,
};
pub use progress::{ProgressBar, ProgressRequest};
pub use tab_control::{TCN_SELCHANGE, TCN_SELCHANGING, TabControl, TabRequest};
pub use trackbar::{TRBN_POSCHANGED, Trackbar, TrackbarAction, TrackbarPosition, TrackbarRequest};
pub use tree_view::{
    TVN_ITEMEXPANDED, TVN_SELCHANGED, TreeItemExpanded, TreeItemId, TreeRequest, TreeSelChanged,
    TreeStyle, TreeView,
};

/// Log target of the controls.
pub(crate) const TARGET: &str = "horizon_casement::controls";

/// The control was clicked with the primary button.
pub const NM_CLICK: u32 = 0x0001;
/// The control was double-clicked.
pub const NM_DBLCLK: u32 = 0x0002;
/// The control was clicked with the secondary button.
pub const NM_RCLICK: u32 = 0x0003;
/// The control received focus.
pub const NM_SETFOCUS: u32 = 0x0004;
/// The control lost focus.
pub const NM_KILLFOCUS: u32 = 0x0005;

/// The kinds of built-in controls, for creating controls by kind (dialog
/// templates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// [`EditControl`].
    Edit,
    /// [`ListView`].
    ListView,
    /// [`ComboBox`].
    ComboBox,
    /// [`TreeView`].
    TreeView,
    /// [`TabControl`].
    TabControl,
    /// [`Trackbar`].
    Trackbar,
    /// [`ProgressBar`].
    Progress,
    /// [`Button`].
    Button,
    /// [`Label`].
    Label,
}

impl ControlKind {
    /// Class name reported by controls of this kind.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Edit => edit::CLASS_NAME,
            Self::ListView => list_view::CLASS_NAME,
            Self::ComboBox => combo_box::CLASS_NAME,
            Self::TreeView => tree_view::CLASS_NAME,
            Self::TabControl => tab_control::CLASS_NAME,
            Self::Trackbar => trackbar::CLASS_NAME,
            Self::Progress => progress::CLASS_NAME,
            Self::Button => button::CLASS_NAME,
            Self::Label => label::CLASS_NAME,
        }
    }

    /// Look a kind up by class name.
    pub fn from_class_name(name: &str) -> Option<Self> {
        [
            Self::Edit,
            Self::ListView,
            Self::ComboBox,
            Self::TreeView,
            Self::TabControl,
            Self::Trackbar,
            Self::Progress,
            Self::Button,
            Self::Label,
        ]
        .into_iter()
        .find(|kind| kind.class_name().eq_ignore_ascii_case(name))
    }

    /// Create a control of this kind.
    pub fn create(self, ui: &mut UiRuntime, params: WindowParams) -> Option<WindowId> {
        match self {
            Self::Edit => ui.create_window(params, EditControl::new()),
            Self::ListView => ui.create_window(params, ListView::new()),
            Self::ComboBox => ui.create_window(params, ComboBox::new()),
            Self::TreeView => ui.create_window(params, TreeView::new()),
            Self::TabControl => ui.create_window(params, TabControl::new()),
            Self::Trackbar => ui.create_window(params, Trackbar::new()),
            Self::Progress => ui.create_window(params, ProgressBar::new()),
            Self::Button => ui.create_window(params, Button::new()),
            Self::Label => ui.create_window(params, Label::new()),
        }
    }
}

/// Send a [`Message::Command`] from `hwnd` to its parent.
pub fn command_parent(ui: &mut UiRuntime, hwnd: WindowId, code: u32) -> isize {
    let Some(parent) = ui.parent(hwnd) else {
        return 0;
    };
    let id = ui.control_id(hwnd).unwrap_or(0);
    ui.send(
        parent,
        Message::Command {
            id,
            code,
            source: Some(hwnd),
        },
    )
}

/// Send a payload-free [`Message::Notify`] from `hwnd` to its parent.
pub fn notify_parent(ui: &mut UiRuntime, hwnd: WindowId, code: u32) -> isize {
    let Some(parent) = ui.parent(hwnd) else {
        return 0;
    };
    let control_id = ui.control_id(hwnd).unwrap_or(0);
    ui.send(
        parent,
        Message::Notify(Notification {
            from: hwnd,
            control_id,
            code,
            data: None,
        }),
    )
}

/// Send a [`Message::Notify`] carrying `payload` to the parent of `hwnd`.
///
/// Returns the reply and the payload as the parent left it. The payload is
/// lost (`None`) if the parent was busy and the notification was deferred.
pub fn notify_parent_with<T: Any + Send>(
    ui: &mut UiRuntime,
    hwnd: WindowId,
    code: u32,
    payload: T,
) -> (isize, Option<T>) {
    let Some(parent) = ui.parent(hwnd) else {
        return (0, Some(payload));
    };
    let control_id = ui.control_id(hwnd).unwrap_or(0);
    let mut msg = Message::Notify(Notification {
        from: hwnd,
        control_id,
        code,
        data: Some(ControlMessage::new(payload)),
    });
    let reply = ui.dispatch(parent, &mut msg);
    let payload = match msg {
        Message::Notify(notification) => notification.data.and_then(|d| d.into_inner::<T>()),
        _ => None,
    };
    (reply, payload)
}

/// Whether the control is a live window that can take input.
pub(crate) fn is_interactive(ui: &UiRuntime, hwnd: WindowId) -> bool {
    ui.is_window(hwnd) && ui.is_enabled(hwnd)
}

static_assertions::assert_impl_all!(EditRequest: Send);
static_assertions::assert_impl_all!(ListRequest: Send);
static_assertions::assert_impl_all!(ListDisplayRequest: Send);
static_assertions::assert_impl_all!(TreeRequest: Send);

static_assertions::assert_impl_all!(EditControl: WindowBehavior);
static_assertions::assert_impl_all!(ListView: WindowBehavior);
static_assertions::assert_impl_all!(ComboBox: WindowBehavior);
static_assertions::assert_impl_all!(ComboPopup: WindowBehavior);
static_assertions::assert_impl_all!(TreeView: WindowBehavior);
static_assertions::assert_impl_all!(TabControl: WindowBehavior);
static_assertions::assert_impl_all!(Trackbar: WindowBehavior);
static_assertions::assert_impl_all!(ProgressBar: WindowBehavior);
static_assertions::assert_impl_all!(Button: WindowBehavior);
static_assertions::assert_impl_all!(Label: WindowBehavior);
static_assertions::assert_impl_all!(DialogFrame: WindowBehavior);
