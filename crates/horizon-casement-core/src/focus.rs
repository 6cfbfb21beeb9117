//! Activation, keyboard focus and dialog navigation.
//!
//! Focus is not stored as a single handle. Each record remembers its
//! `focused_child`, and the focus is the end of the chain that starts at the
//! active surface. Switching surfaces therefore restores whatever was focused
//! inside the surface when it was last active.
//!
//! Tab navigation walks the windows of one dialog level (a surface, or a
//! child marked [`WindowStyle::DIALOG`]) in creation order, descending into
//! containers so that focus lands on the leaf-most tab stop. Arrow
//! navigation stays inside a group: a run of siblings that starts with a
//! [`WindowStyle::GROUP`] window.

use crate::logging::targets;
use crate::message::Message;
use crate::record::{WindowId, WindowStyle};
use crate::runtime::UiRuntime;
use crate::tree::ZOrder;

/// Direction of a [`UiRuntime::navigate_focus`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    /// Next tab stop (Tab).
    Next,
    /// Previous tab stop (Shift+Tab).
    Previous,
    /// Next item of the group (Right/Down).
    GroupNext,
    /// Previous item of the group (Left/Up).
    GroupPrevious,
}

impl UiRuntime {
    // =========================================================================
    // Activation
    // =========================================================================

    /// The active top-level window.
    pub fn active_window(&self) -> Option<WindowId> {
        self.active.filter(|&a| self.record(a).is_some())
    }

    /// Make `surface` the active top-level window and bring it (and the
    /// windows it owns) to the front.
    ///
    /// Focus moves to the window remembered inside `surface`. Returns the
    /// previously active window.
    pub fn set_active_window(&mut self, surface: WindowId) -> Option<WindowId> {
        let previous = self.active_window();
        if previous == Some(surface) {
            return previous;
        }
        if self.alive(surface).is_none_or(|r| r.parent.is_some()) {
            return previous;
        }
        let old_focus = self.get_focus();
        self.switch_active(Some(surface));
        let new_focus = self.get_focus();
        self.announce_focus_change(old_focus, new_focus);
        previous
    }

    fn switch_active(&mut self, surface: Option<WindowId>) {
        let previous = self.active_window();
        if previous == surface {
            return;
        }
        if let Some(previous) = previous {
            self.dispatch(previous, &mut Message::Activate(false));
        }
        self.active = surface.filter(|&s| self.is_window(s));
        let Some(surface) = self.active else {
            return;
        };
        tracing::debug!(target: targets::FOCUS, ?surface, ?previous, "surface activated");
        self.restack(surface, ZOrder::Top);
        for owned in self.owned_windows(surface) {
            if self.alive(owned).is_some_and(|r| r.is_visible()) {
                self.restack(owned, ZOrder::Top);
            }
        }
        self.dispatch(surface, &mut Message::Activate(true));
    }

    fn announce_focus_change(&mut self, old: Option<WindowId>, new: Option<WindowId>) {
        if old == new {
            return;
        }
        if let Some(old) = old {
            self.dispatch(old, &mut Message::KillFocus { next: new });
        }
        if let Some(new) = new
            && self.is_window(new)
        {
            self.dispatch(new, &mut Message::SetFocus { previous: old });
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// The window with keyboard focus.
    pub fn get_focus(&self) -> Option<WindowId> {
        let mut current = self.active_window()?;
        while let Some(next) = self.record(current).and_then(|r| r.focused_child) {
            match self.record(next) {
                Some(record) if record.parent == Some(current) => current = next,
                _ => break,
            }
        }
        Some(current)
    }

    /// Give keyboard focus to `id`, activating its surface if needed.
    ///
    /// The old focus receives [`Message::KillFocus`], then `id` receives
    /// [`Message::SetFocus`]. Returns the previous focus, or `None` without
    /// any change if `id` is dead or disabled.
    pub fn set_focus(&mut self, id: WindowId) -> Option<WindowId> {
        if !self.is_enabled(id) {
            return None;
        }
        let previous = self.get_focus();
        if previous == Some(id) {
            return previous;
        }
        let surface = self.top_level_of(id)?;
        if self.active_window() != Some(surface) {
            self.switch_active(Some(surface));
        }
        if !self.is_window(id) {
            return previous;
        }

        if let Some(record) = self.record_mut(id) {
            record.focused_child = None;
        }
        let mut child = id;
        while let Some(parent) = self.parent(child) {
            if let Some(record) = self.record_mut(parent) {
                record.focused_child = Some(child);
            }
            child = parent;
        }
        tracing::trace!(target: targets::FOCUS, ?id, ?previous, "focus set");

        self.announce_focus_change(previous, Some(id));
        previous
    }

    /// Move focus out of `id` and its descendants, if it is there.
    ///
    /// Inside a surface the focus falls back to the parent of `id`. When `id`
    /// is the active surface, activation passes to its owner.
    pub(crate) fn transfer_focus_from(&mut self, id: WindowId) {
        let Some(focus) = self.get_focus() else {
            return;
        };
        if !self.is_self_or_descendant(focus, id) {
            return;
        }
        match self.record(id).and_then(|r| r.parent) {
            Some(parent) => {
                if let Some(record) = self.record_mut(parent) {
                    record.focused_child = None;
                }
                let new_focus = self.get_focus();
                tracing::trace!(target: targets::FOCUS, ?id, ?focus, ?new_focus, "focus moved out of window");
                self.announce_focus_change(Some(focus), new_focus);
            }
            None => {
                let owner = self
                    .record(id)
                    .and_then(|r| r.owner)
                    .filter(|&o| self.is_enabled(o) && self.is_visible(o));
                self.dispatch(focus, &mut Message::KillFocus { next: None });
                self.switch_active(owner);
                if let Some(new_focus) = self.get_focus() {
                    self.dispatch(new_focus, &mut Message::SetFocus { previous: Some(focus) });
                }
            }
        }
    }

    // =========================================================================
    // Dialog navigation
    // =========================================================================

    /// The window whose descendants `from` navigates among: the nearest
    /// ancestor that is a top-level window or carries [`WindowStyle::DIALOG`].
    /// A top-level `from` is its own level.
    fn dialog_level(&self, from: WindowId) -> Option<WindowId> {
        let record = self.alive(from)?;
        if record.parent.is_none() {
            return Some(from);
        }
        self.ancestors(from).into_iter().find(|&w| {
            self.record(w)
                .is_some_and(|r| r.parent.is_none() || r.style.contains(WindowStyle::DIALOG))
        })
    }

    /// Descendants of `parent` in dialog order, with whether each is a tab
    /// stop.
    ///
    /// Hidden and disabled subtrees are not entered, nor are nested dialog
    /// levels. A container that holds a tab stop is not one itself, so focus
    /// lands on the leaf-most focusable control.
    fn collect_dialog_order(&self, parent: WindowId, order: &mut Vec<(WindowId, bool)>) {
        for child in self.children(parent) {
            let Some(style) = self.alive(child).map(|r| r.style) else {
                continue;
            };
            let index = order.len();
            order.push((child, false));
            if style.contains(WindowStyle::DIALOG)
                || !self.is_visible(child)
                || !self.is_enabled(child)
            {
                continue;
            }
            self.collect_dialog_order(child, order);
            let holds_stop = order[index + 1..].iter().any(|&(_, stop)| stop);
            order[index].1 = style.contains(WindowStyle::TABSTOP) && !holds_stop;
        }
    }

    /// The tab stop after (or before) `from` within its dialog level,
    /// wrapping around. `from` may be the surface itself.
    pub fn next_tab_stop(&self, from: WindowId, backward: bool) -> Option<WindowId> {
        let level = self.dialog_level(from)?;
        let mut order = Vec::new();
        self.collect_dialog_order(level, &mut order);
        if order.is_empty() {
            return None;
        }
        let start = std::iter::once(from)
            .chain(self.ancestors(from))
            .take_while(|&w| w != level)
            .find_map(|w| order.iter().position(|&(o, _)| o == w));
        let len = order.len();
        (1..=len)
            .map(|step| match (start, backward) {
                (Some(i), false) => (i + step) % len,
                (Some(i), true) => (i + len - step % len) % len,
                (None, false) => step - 1,
                (None, true) => len - step,
            })
            .map(|i| order[i])
            .find(|&(_, stop)| stop)
            .map(|(w, _)| w)
    }

    /// The next (or previous) enabled, visible sibling of `from` within its
    /// group, wrapping around.
    pub fn next_group_item(&self, from: WindowId, backward: bool) -> Option<WindowId> {
        let parent = self.record(from)?.parent?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&s| s == from)?;
        let is_group = |w: WindowId| {
            self.record(w)
                .is_some_and(|r| r.style.contains(WindowStyle::GROUP))
        };
        let start = (0..=index).rev().find(|&i| is_group(siblings[i])).unwrap_or(0);
        let end = (start + 1..siblings.len())
            .find(|&i| is_group(siblings[i]))
            .unwrap_or(siblings.len());
        let group = &siblings[start..end];
        let position = index - start;
        let len = group.len();
        (1..len)
            .map(|step| {
                if backward {
                    (position + len - step) % len
                } else {
                    (position + step) % len
                }
            })
            .map(|i| group[i])
            .find(|&w| self.is_visible(w) && self.is_enabled(w))
    }

    /// Move focus one step in `direction` from the current focus.
    ///
    /// Returns the newly focused window.
    pub fn navigate_focus(&mut self, direction: FocusDirection) -> Option<WindowId> {
        let from = self.get_focus()?;
        let target = match direction {
            FocusDirection::Next => self.next_tab_stop(from, false),
            FocusDirection::Previous => self.next_tab_stop(from, true),
            FocusDirection::GroupNext => self.next_group_item(from, false),
            FocusDirection::GroupPrevious => self.next_group_item(from, true),
        }?;
        if target != from {
            self.set_focus(target);
        }
        Some(target)
    }
}
