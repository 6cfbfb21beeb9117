//! The Window Record: the node type of the window tree.
//!
//! Records live in the runtime's arena and are addressed by [`WindowId`], a
//! generation-checked handle. A stale handle simply fails to resolve, which
//! is how every entry point detects destroyed windows.
//!
//! Relationships are stored as handles: `parent`, the ordered `children`
//! list (index 0 is the bottom of the z-order), `owner`, and the ordered
//! `owned` list. None of these links own the target; the arena does.

use std::collections::HashMap;

use bitflags::bitflags;
use slotmap::new_key_type;

use crate::behavior::{SharedBehavior, SharedDialogBehavior};
use crate::geometry::{Insets, Rect};

new_key_type! {
    /// A unique, generation-checked handle to a window.
    ///
    /// Handles stay valid while the window exists. Once the window is
    /// destroyed every operation on the handle is a no-op.
    pub struct WindowId;
}

impl WindowId {
    /// Convert the handle to a raw u64 value, e.g. to store it in an extra slot.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Rebuild a handle from [`WindowId::as_raw`].
    ///
    /// The handle is not checked against any runtime.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Number of generic per-window storage slots.
pub const EXTRA_SLOTS: usize = 8;

bitflags! {
    /// Generic window style bits.
    ///
    /// Control-specific styles are carried separately in
    /// [`WindowParams::control_style`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowStyle: u32 {
        /// The window is a child (set automatically when linked under a parent).
        const CHILD      = 1 << 0;
        /// The window is visible.
        const VISIBLE    = 1 << 1;
        /// The window is disabled and receives no input.
        const DISABLED   = 1 << 2;
        /// The control takes part in Tab navigation.
        const TABSTOP    = 1 << 3;
        /// The control starts an arrow-key navigation group.
        const GROUP      = 1 << 4;
        /// One-pixel border in the non-client area.
        const BORDER     = 1 << 5;
        /// The window has a vertical scrollbar.
        const VSCROLL    = 1 << 6;
        /// The window has a horizontal scrollbar.
        const HSCROLL    = 1 << 7;
        /// Window acting as a dialog. On a top-level window dialog key
        /// handling applies; on a child it bounds Tab navigation.
        const DIALOG     = 1 << 8;
        /// Top-level popup (drop-down lists, menus).
        const POPUP      = 1 << 9;
    }
}

/// Destruction state machine of a record.
///
/// Transitions only move forward: `Alive -> Destroying -> Destroyed`. The
/// transition out of `Alive` is the single authority over destruction; any
/// later destroy request observes a non-`Alive` state and returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Linked and dispatchable.
    Alive,
    /// The destroy notification is being delivered.
    Destroying,
    /// Unlinked; waiting for the last reference to drop.
    Destroyed,
}

/// Parameters for [`UiRuntime::create_window`](crate::UiRuntime::create_window).
#[derive(Debug, Clone, Default)]
pub struct WindowParams {
    /// Parent window. `None` creates a top-level window.
    pub parent: Option<WindowId>,
    /// Owner of a top-level window.
    pub owner: Option<WindowId>,
    /// Control identifier, unique among siblings.
    pub control_id: u32,
    /// Initial rectangle (parent client or screen coordinates).
    pub rect: Rect,
    /// Non-client insets.
    pub non_client: Insets,
    /// Generic style.
    pub style: WindowStyle,
    /// Control-specific style bits.
    pub control_style: u32,
    /// Initial text.
    pub text: String,
    /// Opaque creation parameter forwarded in [`CreateInfo`](crate::CreateInfo).
    pub param: isize,
    /// Modal top-level window (excluded from the owner's destroy cascade).
    pub modal: bool,
    /// Profile key under which the placement of a top-level window persists.
    pub persist_key: Option<String>,
}

impl WindowParams {
    /// Parameters for a visible top-level window.
    pub fn top_level(rect: Rect) -> Self {
        Self {
            rect,
            style: WindowStyle::VISIBLE,
            ..Default::default()
        }
    }

    /// Parameters for a visible child window.
    pub fn child(parent: WindowId, control_id: u32, rect: Rect) -> Self {
        Self {
            parent: Some(parent),
            control_id,
            rect,
            style: WindowStyle::VISIBLE | WindowStyle::CHILD,
            ..Default::default()
        }
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner: WindowId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Add style bits.
    pub fn with_style(mut self, style: WindowStyle) -> Self {
        self.style |= style;
        self
    }

    /// Set control-specific style bits.
    pub fn with_control_style(mut self, bits: u32) -> Self {
        self.control_style = bits;
        self
    }

    /// Set the initial text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the non-client insets.
    pub fn with_non_client(mut self, insets: Insets) -> Self {
        self.non_client = insets;
        self
    }

    /// Mark the window as modal.
    pub fn with_modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    /// Persist the placement under the given profile key.
    pub fn with_persist_key(mut self, key: impl Into<String>) -> Self {
        self.persist_key = Some(key.into());
        self
    }
}

/// Internal data stored in the arena for each window.
pub(crate) struct WindowRecord {
    /// Tree reference plus one per in-flight dispatch.
    pub(crate) refs: u32,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) class_name: &'static str,
    pub(crate) control_id: u32,
    pub(crate) rect: Rect,
    pub(crate) non_client: Insets,
    pub(crate) style: WindowStyle,
    pub(crate) behavior: Option<SharedBehavior>,
    pub(crate) dialog: Option<SharedDialogBehavior>,
    pub(crate) text: String,
    /// Opaque associations; never owning.
    pub(crate) props: HashMap<String, isize>,
    pub(crate) extra: [isize; EXTRA_SLOTS],
    pub(crate) parent: Option<WindowId>,
    pub(crate) children: Vec<WindowId>,
    pub(crate) owner: Option<WindowId>,
    pub(crate) owned: Vec<WindowId>,
    /// Next link of the focus chain (a direct child).
    pub(crate) focused_child: Option<WindowId>,
    pub(crate) modal: bool,
    pub(crate) persist_key: Option<String>,
    /// Accumulated invalid region (top-level windows only, client coordinates).
    pub(crate) dirty: Option<Rect>,
}

impl WindowRecord {
    pub(crate) fn new(params: &WindowParams, class_name: &'static str) -> Self {
        Self {
            refs: 1,
            lifecycle: Lifecycle::Alive,
            class_name,
            control_id: params.control_id,
            rect: params.rect,
            non_client: params.non_client,
            style: params.style,
            behavior: None,
            dialog: None,
            text: params.text.clone(),
            props: HashMap::new(),
            extra: [0; EXTRA_SLOTS],
            parent: None,
            children: Vec::new(),
            owner: None,
            owned: Vec::new(),
            focused_child: None,
            modal: params.modal,
            persist_key: params.persist_key.clone(),
            dirty: None,
        }
    }

    #[inline]
    pub(crate) fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    #[inline]
    pub(crate) fn is_visible(&self) -> bool {
        self.style.contains(WindowStyle::VISIBLE)
    }

    #[inline]
    pub(crate) fn is_enabled(&self) -> bool {
        !self.style.contains(WindowStyle::DISABLED)
    }

    /// Client rectangle in the window's own coordinates.
    pub(crate) fn client_rect(&self) -> Rect {
        Rect::from_size(self.rect.size())
            .inset(self.non_client)
            .offset(-self.non_client.left, -self.non_client.top)
    }
}
