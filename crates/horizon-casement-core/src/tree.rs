//! Window tree operations: linkage, z-order, geometry, attributes,
//! hit-testing, invalidation and painting.
//!
//! Sibling lists are ordered back to front: index 0 is the bottom of the
//! z-order and the last entry is painted last and hit first. The same order
//! is the creation order, which is also the Tab order of a dialog.
//!
//! All operations accept stale handles and degrade to `false`, `None` or an
//! empty result.

use crate::geometry::{Point, Rect};
use crate::logging::targets;
use crate::message::Message;
use crate::painter::{OffsetPainter, Painter};
use crate::record::{EXTRA_SLOTS, WindowId, WindowRecord, WindowStyle};
use crate::runtime::UiRuntime;

/// Target position for [`UiRuntime::restack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    /// Front-most among the siblings.
    Top,
    /// Back-most among the siblings.
    Bottom,
    /// Directly in front of the given sibling.
    After(WindowId),
}

impl UiRuntime {
    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Parent of a child window.
    pub fn parent(&self, id: WindowId) -> Option<WindowId> {
        self.record(id)?.parent
    }

    /// Owner of a top-level window.
    pub fn owner(&self, id: WindowId) -> Option<WindowId> {
        self.record(id)?.owner
    }

    /// Windows owned by `id`, in creation order.
    pub fn owned_windows(&self, id: WindowId) -> Vec<WindowId> {
        self.record(id).map(|r| r.owned.clone()).unwrap_or_default()
    }

    /// Children of `id`, back to front.
    pub fn children(&self, id: WindowId) -> Vec<WindowId> {
        self.record(id).map(|r| r.children.clone()).unwrap_or_default()
    }

    /// Top-level windows, back to front.
    pub fn top_level_windows(&self) -> Vec<WindowId> {
        self.top_levels.clone()
    }

    /// Back-most child.
    pub fn first_child(&self, id: WindowId) -> Option<WindowId> {
        self.record(id)?.children.first().copied()
    }

    /// Front-most child.
    pub fn last_child(&self, id: WindowId) -> Option<WindowId> {
        self.record(id)?.children.last().copied()
    }

    fn sibling_list(&self, id: WindowId) -> Option<&[WindowId]> {
        let record = self.record(id)?;
        match record.parent {
            Some(parent) => self.record(parent).map(|p| p.children.as_slice()),
            None => Some(self.top_levels.as_slice()),
        }
    }

    fn sibling_list_mut(&mut self, parent: Option<WindowId>) -> Option<&mut Vec<WindowId>> {
        match parent {
            Some(parent) => self.record_mut(parent).map(|p| &mut p.children),
            None => Some(&mut self.top_levels),
        }
    }

    /// The sibling directly in front of `id`.
    pub fn next_sibling(&self, id: WindowId) -> Option<WindowId> {
        let siblings = self.sibling_list(id)?;
        let index = siblings.iter().position(|&s| s == id)?;
        siblings.get(index + 1).copied()
    }

    /// The sibling directly behind `id`.
    pub fn prev_sibling(&self, id: WindowId) -> Option<WindowId> {
        let siblings = self.sibling_list(id)?;
        let index = siblings.iter().position(|&s| s == id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: WindowId) -> Vec<WindowId> {
        let mut result = Vec::new();
        let mut current = self.record(id).and_then(|r| r.parent);
        while let Some(ancestor) = current {
            result.push(ancestor);
            current = self.record(ancestor).and_then(|r| r.parent);
        }
        result
    }

    /// All descendants of `id` in depth-first pre-order.
    pub fn descendants(&self, id: WindowId) -> Vec<WindowId> {
        let mut result = Vec::new();
        if let Some(record) = self.record(id) {
            let mut stack: Vec<WindowId> = record.children.iter().rev().copied().collect();
            while let Some(current) = stack.pop() {
                result.push(current);
                if let Some(record) = self.record(current) {
                    stack.extend(record.children.iter().rev().copied());
                }
            }
        }
        result
    }

    /// The top-level window (surface) containing `id`.
    pub fn top_level_of(&self, id: WindowId) -> Option<WindowId> {
        let mut current = id;
        loop {
            match self.record(current)?.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }

    /// Whether `child` is a descendant of `parent`.
    pub fn is_child(&self, parent: WindowId, child: WindowId) -> bool {
        self.ancestors(child).contains(&parent)
    }

    /// Whether `id` is `other` or one of its descendants.
    pub(crate) fn is_self_or_descendant(&self, id: WindowId, other: WindowId) -> bool {
        id == other || self.is_child(other, id)
    }

    /// The child of `parent` with the given control identifier.
    pub fn child_by_control_id(&self, parent: WindowId, control_id: u32) -> Option<WindowId> {
        self.record(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.record(c).is_some_and(|r| r.control_id == control_id))
    }

    /// Control identifier of a window.
    pub fn control_id(&self, id: WindowId) -> Option<u32> {
        self.record(id).map(|r| r.control_id)
    }

    // =========================================================================
    // Linkage
    // =========================================================================

    /// Move `id` under `new_parent` as its front-most child, or make it a
    /// top-level window when `new_parent` is `None`.
    ///
    /// Rejected (returns `false`) when either window is dead or when the move
    /// would create a cycle.
    pub fn reparent(&mut self, id: WindowId, new_parent: Option<WindowId>) -> bool {
        let Some(record) = self.alive(id) else {
            return false;
        };
        let old_parent = record.parent;
        let rect = record.rect;
        let visible = record.is_visible();
        if let Some(parent) = new_parent
            && (!self.is_window(parent) || self.is_self_or_descendant(parent, id))
        {
            tracing::debug!(target: targets::TREE, ?id, ?parent, "reparent rejected");
            return false;
        }

        if visible {
            match old_parent {
                Some(parent) => {
                    self.invalidate(parent, Some(rect));
                }
                None => {
                    self.invalidate(id, None);
                }
            }
        }
        if let Some(list) = self.sibling_list_mut(old_parent) {
            list.retain(|&s| s != id);
        }
        if let Some(parent) = old_parent
            && let Some(parent) = self.record_mut(parent)
            && parent.focused_child == Some(id)
        {
            parent.focused_child = None;
        }
        if let Some(list) = self.sibling_list_mut(new_parent) {
            list.push(id);
        }
        if let Some(record) = self.record_mut(id) {
            record.parent = new_parent;
            record.style.set(WindowStyle::CHILD, new_parent.is_some());
            if new_parent.is_some() {
                record.dirty = None;
            }
        }
        if self.active == Some(id) && new_parent.is_some() {
            self.active = None;
        }
        tracing::trace!(target: targets::TREE, ?id, ?old_parent, ?new_parent, "reparented");
        self.invalidate(id, None);
        true
    }

    /// Reorder `id` among its siblings.
    ///
    /// Siblings that end up in front of `id` and overlap it are invalidated so
    /// they repaint on top.
    pub fn restack(&mut self, id: WindowId, order: ZOrder) -> bool {
        let Some(record) = self.alive(id) else {
            return false;
        };
        let parent = record.parent;
        if let ZOrder::After(sibling) = order
            && (sibling == id || self.record(sibling).is_none_or(|s| s.parent != parent))
        {
            return false;
        }
        let Some(list) = self.sibling_list_mut(parent) else {
            return false;
        };
        let Some(from) = list.iter().position(|&s| s == id) else {
            return false;
        };
        list.remove(from);
        let to = match order {
            ZOrder::Top => list.len(),
            ZOrder::Bottom => 0,
            ZOrder::After(sibling) => match list.iter().position(|&s| s == sibling) {
                Some(index) => index + 1,
                None => from.min(list.len()),
            },
        };
        list.insert(to, id);
        let in_front: Vec<WindowId> = list[to + 1..].to_vec();
        tracing::trace!(target: targets::TREE, ?id, ?order, from, to, "restacked");

        let Some(rect) = self.record(id).map(|r| r.rect) else {
            return true;
        };
        for sibling in in_front {
            let overlap = self
                .record(sibling)
                .filter(|s| s.is_visible())
                .map(|s| s.rect.intersection(&rect))
                .filter(|r| !r.is_empty());
            if let Some(overlap) = overlap {
                match parent {
                    Some(parent) => {
                        self.invalidate(parent, Some(overlap));
                    }
                    None => {
                        self.invalidate(sibling, None);
                    }
                }
            }
        }
        self.invalidate(id, None);
        true
    }

    /// Check the linkage invariants of the whole tree.
    ///
    /// Every live record is listed exactly once (as a top-level window or in
    /// its parent's children), parent links agree with the lists, and owner
    /// links agree with the owned lists.
    pub fn verify_links(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for &top in &self.top_levels {
            match self.record(top) {
                Some(record) if record.parent.is_none() => {}
                _ => return false,
            }
            if !seen.insert(top) {
                return false;
            }
        }
        for (id, record) in self.windows.iter() {
            if !record.is_alive() {
                continue;
            }
            for &child in &record.children {
                if self.record(child).is_none_or(|c| c.parent != Some(id)) || !seen.insert(child) {
                    return false;
                }
            }
            for &owned in &record.owned {
                if self.record(owned).is_none_or(|o| o.owner != Some(id)) {
                    return false;
                }
            }
            if let Some(owner) = record.owner
                && self.record(owner).is_none_or(|o| !o.owned.contains(&id))
            {
                return false;
            }
        }
        let live = self.windows.values().filter(|r| r.is_alive()).count();
        if seen.len() != live {
            return false;
        }
        // Sibling navigation must agree in both directions.
        seen.iter().all(|&id| {
            let prev_ok = self
                .prev_sibling(id)
                .is_none_or(|prev| self.next_sibling(prev) == Some(id));
            let next_ok = self
                .next_sibling(id)
                .is_none_or(|next| self.prev_sibling(next) == Some(id));
            prev_ok && next_ok
        })
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Window rectangle in parent client (or screen) coordinates.
    pub fn window_rect(&self, id: WindowId) -> Option<Rect> {
        self.record(id).map(|r| r.rect)
    }

    /// Client rectangle in the window's client coordinates.
    pub fn client_rect(&self, id: WindowId) -> Option<Rect> {
        self.record(id).map(WindowRecord::client_rect)
    }

    /// Move and/or resize a window.
    ///
    /// Sends [`Message::Move`] when the origin changes and [`Message::Size`]
    /// with the new client size when the size changes.
    pub fn set_window_rect(&mut self, id: WindowId, rect: Rect) -> bool {
        let Some(record) = self.alive(id) else {
            return false;
        };
        let old = record.rect;
        if old == rect {
            return true;
        }
        let parent = record.parent;
        let visible = record.is_visible();
        if visible && let Some(parent) = parent {
            self.invalidate(parent, Some(old));
        }
        let client_size = match self.alive_mut(id) {
            Some(record) => {
                record.rect = rect;
                record.client_rect().size()
            }
            None => return false,
        };
        if old.origin() != rect.origin() {
            self.dispatch(id, &mut Message::Move(rect.origin()));
        }
        if old.size() != rect.size() {
            self.dispatch(id, &mut Message::Size(client_size));
        }
        self.invalidate(id, None);
        true
    }

    /// Screen offset of a window's client origin.
    fn client_origin(&self, id: WindowId) -> Option<Point> {
        let mut origin = Point::ZERO;
        let mut current = id;
        loop {
            let record = self.record(current)?;
            origin = origin.offset(
                record.rect.left + record.non_client.left,
                record.rect.top + record.non_client.top,
            );
            match record.parent {
                Some(parent) => current = parent,
                None => return Some(origin),
            }
        }
    }

    /// Convert a client point of `id` to screen coordinates.
    pub fn client_to_screen(&self, id: WindowId, point: Point) -> Option<Point> {
        let origin = self.client_origin(id)?;
        Some(point.offset(origin.x, origin.y))
    }

    /// Convert a screen point to client coordinates of `id`.
    pub fn screen_to_client(&self, id: WindowId, point: Point) -> Option<Point> {
        let origin = self.client_origin(id)?;
        Some(point.offset(-origin.x, -origin.y))
    }

    /// Window rectangle in screen coordinates.
    pub fn screen_rect(&self, id: WindowId) -> Option<Rect> {
        let record = self.record(id)?;
        let origin = match record.parent {
            Some(parent) => self.client_origin(parent)?,
            None => Point::ZERO,
        };
        Some(record.rect.offset(origin.x, origin.y))
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Set the window text through [`Message::SetText`].
    pub fn set_text(&mut self, id: WindowId, text: impl Into<String>) -> bool {
        self.dispatch(id, &mut Message::SetText(text.into())) != 0
    }

    /// Read the window text through [`Message::GetText`].
    pub fn text(&mut self, id: WindowId) -> String {
        let mut msg = Message::GetText(String::new());
        self.dispatch(id, &mut msg);
        match msg {
            Message::GetText(text) => text,
            _ => String::new(),
        }
    }

    /// The stored window text, without asking the behavior.
    pub fn raw_text(&self, id: WindowId) -> Option<&str> {
        self.record(id).map(|r| r.text.as_str())
    }

    /// Associate a value with a window.
    pub fn set_prop(&mut self, id: WindowId, name: impl Into<String>, value: isize) -> bool {
        match self.alive_mut(id) {
            Some(record) => {
                record.props.insert(name.into(), value);
                true
            }
            None => false,
        }
    }

    /// Read an associated value.
    pub fn prop(&self, id: WindowId, name: &str) -> Option<isize> {
        self.record(id)?.props.get(name).copied()
    }

    /// Remove an associated value and return it.
    pub fn remove_prop(&mut self, id: WindowId, name: &str) -> Option<isize> {
        self.record_mut(id)?.props.remove(name)
    }

    /// Write an extra slot. Out-of-range indices are rejected.
    pub fn set_extra(&mut self, id: WindowId, index: usize, value: isize) -> Option<isize> {
        if index >= EXTRA_SLOTS {
            return None;
        }
        let record = self.alive_mut(id)?;
        Some(std::mem::replace(&mut record.extra[index], value))
    }

    /// Read an extra slot.
    pub fn extra(&self, id: WindowId, index: usize) -> Option<isize> {
        self.record(id)?.extra.get(index).copied()
    }

    /// Generic style bits.
    pub fn style(&self, id: WindowId) -> Option<WindowStyle> {
        self.record(id).map(|r| r.style)
    }

    /// Replace style bits other than visibility and enablement, which go
    /// through [`UiRuntime::show_window`] and [`UiRuntime::enable_window`].
    pub fn set_style(&mut self, id: WindowId, style: WindowStyle) -> bool {
        let managed = WindowStyle::VISIBLE | WindowStyle::DISABLED | WindowStyle::CHILD;
        match self.alive_mut(id) {
            Some(record) => {
                record.style = (record.style & managed) | (style - managed);
                self.invalidate(id, None);
                true
            }
            None => false,
        }
    }

    /// Show or hide a window. Returns whether it was visible before.
    ///
    /// Hiding releases capture and moves focus out of the window.
    pub fn show_window(&mut self, id: WindowId, show: bool) -> bool {
        let Some(record) = self.alive(id) else {
            return false;
        };
        let was_visible = record.is_visible();
        if was_visible == show {
            return was_visible;
        }
        let parent = record.parent;
        let rect = record.rect;
        if !show {
            self.invalidate(id, None);
            self.drop_input_within(id);
        }
        if let Some(record) = self.alive_mut(id) {
            record.style.set(WindowStyle::VISIBLE, show);
        }
        if show {
            self.invalidate(id, None);
        } else if let Some(parent) = parent {
            self.invalidate(parent, Some(rect));
        }
        self.dispatch(id, &mut Message::Show(show));
        was_visible
    }

    /// Enable or disable a window. Returns whether it was enabled before.
    ///
    /// Disabling releases capture and moves focus out of the window.
    pub fn enable_window(&mut self, id: WindowId, enable: bool) -> bool {
        let Some(record) = self.alive(id) else {
            return false;
        };
        let was_enabled = record.is_enabled();
        if was_enabled == enable {
            return was_enabled;
        }
        if !enable {
            self.drop_input_within(id);
        }
        if let Some(record) = self.alive_mut(id) {
            record.style.set(WindowStyle::DISABLED, !enable);
        }
        self.dispatch(id, &mut Message::Enable(enable));
        self.invalidate(id, None);
        was_enabled
    }

    /// Whether the window and all of its ancestors are visible.
    pub fn is_visible(&self, id: WindowId) -> bool {
        self.is_window(id)
            && std::iter::once(id)
                .chain(self.ancestors(id))
                .all(|w| self.record(w).is_some_and(WindowRecord::is_visible))
    }

    /// Whether the window and all of its ancestors are enabled.
    pub fn is_enabled(&self, id: WindowId) -> bool {
        self.is_window(id)
            && std::iter::once(id)
                .chain(self.ancestors(id))
                .all(|w| self.record(w).is_some_and(WindowRecord::is_enabled))
    }

    fn drop_input_within(&mut self, id: WindowId) {
        if let Some(holder) = self.capture
            && self.is_self_or_descendant(holder, id)
        {
            self.release_capture();
        }
        self.transfer_focus_from(id);
    }

    // =========================================================================
    // Hit-testing
    // =========================================================================

    /// Find the deepest visible, enabled window under a screen point,
    /// starting at `root`. Windows owned by `root` are tested first.
    pub fn hit_test(&self, root: WindowId, point: Point) -> Option<WindowId> {
        let record = self.alive(root)?;
        if !record.is_visible() || !record.is_enabled() {
            return None;
        }
        for &owned in record.owned.iter().rev() {
            if let Some(hit) = self.hit_test(owned, point) {
                return Some(hit);
            }
        }
        if !self.screen_rect(root)?.contains(point) {
            return None;
        }
        Some(self.hit_children(root, point).unwrap_or(root))
    }

    fn hit_children(&self, parent: WindowId, point: Point) -> Option<WindowId> {
        let record = self.alive(parent)?;
        let local = self.screen_to_client(parent, point)?;
        for &child in record.children.iter().rev() {
            let Some(child_record) = self.alive(child) else {
                continue;
            };
            if !child_record.is_visible()
                || !child_record.is_enabled()
                || !child_record.rect.contains(local)
            {
                continue;
            }
            return Some(self.hit_children(child, point).unwrap_or(child));
        }
        None
    }

    /// Hit-test across every top-level window, front-most first.
    pub fn window_from_point(&self, point: Point) -> Option<WindowId> {
        self.top_levels
            .iter()
            .rev()
            .find_map(|&top| self.hit_test(top, point))
    }

    // =========================================================================
    // Invalidation and painting
    // =========================================================================

    /// Mark part of a window's client area (all of it for `None`) as needing
    /// a repaint. The region accumulates on the window's surface.
    ///
    /// Returns `false` if the window is dead or not effectively visible.
    pub fn invalidate(&mut self, id: WindowId, rect: Option<Rect>) -> bool {
        let Some(record) = self.record(id) else {
            return false;
        };
        let mut region = match rect {
            Some(rect) => rect.intersection(&record.client_rect()),
            None => record.client_rect(),
        };
        let mut current = id;
        loop {
            let Some(record) = self.record(current) else {
                return false;
            };
            if !record.is_visible() {
                return false;
            }
            let Some(parent) = record.parent else {
                break;
            };
            region = region.offset(
                record.rect.left + record.non_client.left,
                record.rect.top + record.non_client.top,
            );
            let Some(parent_record) = self.record(parent) else {
                return false;
            };
            region = region.intersection(&parent_record.client_rect());
            current = parent;
        }
        if region.is_empty() {
            return true;
        }
        if let Some(surface) = self.record_mut(current) {
            let dirty = surface.dirty.get_or_insert(Rect::EMPTY);
            *dirty = dirty.union(&region);
        }
        true
    }

    /// Take the accumulated invalid region of a surface.
    pub fn take_dirty(&mut self, surface: WindowId) -> Option<Rect> {
        self.record_mut(surface)?.dirty.take()
    }

    /// Peek at the invalid region of a surface.
    pub fn dirty_rect(&self, surface: WindowId) -> Option<Rect> {
        self.record(surface)?.dirty
    }

    /// Surfaces with a pending invalid region, back to front.
    pub fn dirty_surfaces(&self) -> Vec<WindowId> {
        self.top_levels
            .iter()
            .copied()
            .filter(|&t| self.record(t).is_some_and(|r| r.dirty.is_some()))
            .collect()
    }

    /// Paint a surface and its visible descendants back to front.
    ///
    /// The painter receives surface client coordinates; each behavior paints
    /// in its own client coordinates through a translating adapter.
    #[tracing::instrument(skip(self, painter), target = "horizon_casement_core::tree", level = "trace")]
    pub fn paint(&self, surface: WindowId, painter: &mut dyn Painter) {
        let Some(record) = self.alive(surface) else {
            return;
        };
        if !record.is_visible() {
            return;
        }
        painter.push_clip(record.client_rect());
        self.paint_window(surface, painter, Point::ZERO);
        painter.pop_clip();
    }

    fn paint_window(&self, id: WindowId, painter: &mut dyn Painter, origin: Point) {
        let Some(record) = self.alive(id) else {
            return;
        };
        if let Some(behavior) = record.behavior.as_ref()
            && let Ok(guard) = behavior.try_borrow()
        {
            let mut offset = OffsetPainter::new(painter, origin.x, origin.y);
            guard.paint(self, id, &mut offset);
        }
        for &child in &record.children {
            let Some(child_record) = self.alive(child) else {
                continue;
            };
            if !child_record.is_visible() {
                continue;
            }
            let child_origin = origin.offset(
                child_record.rect.left + child_record.non_client.left,
                child_record.rect.top + child_record.non_client.top,
            );
            let clip = child_record
                .client_rect()
                .offset(child_origin.x, child_origin.y);
            painter.push_clip(clip);
            self.paint_window(child, painter, child_origin);
            painter.pop_clip();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::DefaultBehavior;
    use crate::geometry::Insets;
    use crate::record::WindowParams;
    use crate::runtime::RuntimeConfig;

    fn setup() -> (UiRuntime, WindowId) {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let root = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(100, 100, 300, 200)),
                DefaultBehavior,
            )
            .unwrap();
        (ui, root)
    }

    fn child(ui: &mut UiRuntime, parent: WindowId, id: u32, rect: Rect) -> WindowId {
        ui.create_window(WindowParams::child(parent, id, rect), DefaultBehavior)
            .unwrap()
    }

    #[test]
    fn test_restack_after_sibling() {
        let (mut ui, root) = setup();
        let c1 = child(&mut ui, root, 1, Rect::from_xywh(0, 0, 10, 10));
        let c2 = child(&mut ui, root, 2, Rect::from_xywh(0, 0, 10, 10));
        assert_eq!(ui.children(root), vec![c1, c2]);

        assert!(ui.restack(c1, ZOrder::After(c2)));
        assert_eq!(ui.children(root), vec![c2, c1]);
        assert_eq!(ui.prev_sibling(c1), Some(c2));
        assert_eq!(ui.next_sibling(c2), Some(c1));
        assert_eq!(ui.prev_sibling(c2), None);
        assert!(ui.verify_links());
    }

    #[test]
    fn test_restack_top_and_bottom() {
        let (mut ui, root) = setup();
        let a = child(&mut ui, root, 1, Rect::from_xywh(0, 0, 10, 10));
        let b = child(&mut ui, root, 2, Rect::from_xywh(0, 0, 10, 10));
        let c = child(&mut ui, root, 3, Rect::from_xywh(0, 0, 10, 10));

        ui.restack(a, ZOrder::Top);
        assert_eq!(ui.children(root), vec![b, c, a]);
        ui.restack(a, ZOrder::Bottom);
        assert_eq!(ui.children(root), vec![a, b, c]);
        assert!(!ui.restack(a, ZOrder::After(a)));
        assert!(!ui.restack(a, ZOrder::After(root)));
        assert_eq!(ui.children(root), vec![a, b, c]);
    }

    #[test]
    fn test_reparent_rejects_cycles() {
        let (mut ui, root) = setup();
        let a = child(&mut ui, root, 1, Rect::from_xywh(0, 0, 50, 50));
        let b = child(&mut ui, a, 2, Rect::from_xywh(0, 0, 10, 10));

        assert!(!ui.reparent(a, Some(b)));
        assert!(!ui.reparent(a, Some(a)));
        assert!(ui.reparent(b, Some(root)));
        assert_eq!(ui.children(root), vec![a, b]);
        assert!(ui.reparent(b, None));
        assert_eq!(ui.parent(b), None);
        assert!(ui.top_level_windows().contains(&b));
        assert!(ui.verify_links());
    }

    #[test]
    fn test_hit_test_descends_through_non_client() {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let root = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(100, 100, 300, 200)).with_non_client(
                    Insets {
                        left: 2,
                        top: 20,
                        right: 2,
                        bottom: 2,
                    },
                ),
                DefaultBehavior,
            )
            .unwrap();
        let panel = child(&mut ui, root, 1, Rect::from_xywh(10, 10, 100, 100));
        let button = child(&mut ui, panel, 2, Rect::from_xywh(5, 5, 20, 20));

        // Client origin of root is (102, 120); panel at (112, 130); button at (117, 135).
        assert_eq!(ui.hit_test(root, Point::new(117, 135)), Some(button));
        assert_eq!(ui.hit_test(root, Point::new(150, 200)), Some(panel));
        assert_eq!(ui.hit_test(root, Point::new(101, 101)), Some(root));
        assert_eq!(ui.hit_test(root, Point::new(99, 99)), None);

        ui.enable_window(button, false);
        assert_eq!(ui.hit_test(root, Point::new(117, 135)), Some(panel));
        ui.show_window(panel, false);
        assert_eq!(ui.hit_test(root, Point::new(117, 135)), Some(root));
    }

    #[test]
    fn test_hit_test_front_most_child_wins() {
        let (mut ui, root) = setup();
        let back = child(&mut ui, root, 1, Rect::from_xywh(0, 0, 50, 50));
        let front = child(&mut ui, root, 2, Rect::from_xywh(25, 25, 50, 50));
        assert_eq!(ui.window_from_point(Point::new(130, 130)), Some(front));
        ui.restack(back, ZOrder::Top);
        assert_eq!(ui.window_from_point(Point::new(130, 130)), Some(back));
    }

    #[test]
    fn test_invalidate_maps_to_surface() {
        let (mut ui, root) = setup();
        let panel = child(&mut ui, root, 1, Rect::from_xywh(10, 20, 100, 100));
        ui.take_dirty(root);

        assert!(ui.invalidate(panel, Some(Rect::from_xywh(5, 5, 10, 10))));
        assert_eq!(ui.take_dirty(root), Some(Rect::from_xywh(15, 25, 10, 10)));
        assert!(ui.dirty_surfaces().is_empty());

        ui.show_window(panel, false);
        ui.take_dirty(root);
        assert!(!ui.invalidate(panel, None));
        assert_eq!(ui.take_dirty(root), None);
    }

    #[test]
    fn test_props_and_extra_slots() {
        let (mut ui, root) = setup();
        assert!(ui.set_prop(root, "cookie", 42));
        assert_eq!(ui.prop(root, "cookie"), Some(42));
        assert_eq!(ui.remove_prop(root, "cookie"), Some(42));
        assert_eq!(ui.prop(root, "cookie"), None);

        assert_eq!(ui.set_extra(root, 0, 7), Some(0));
        assert_eq!(ui.extra(root, 0), Some(7));
        assert_eq!(ui.set_extra(root, EXTRA_SLOTS, 1), None);
    }

    #[test]
    fn test_text_round_trip_through_messages() {
        let (mut ui, root) = setup();
        assert!(ui.set_text(root, "Hello"));
        assert_eq!(ui.text(root), "Hello");
        assert_eq!(ui.send(root, Message::GetTextLength), 5);
    }

    #[test]
    fn test_child_by_control_id_and_descendants() {
        let (mut ui, root) = setup();
        let a = child(&mut ui, root, 10, Rect::from_xywh(0, 0, 50, 50));
        let a1 = child(&mut ui, a, 11, Rect::from_xywh(0, 0, 5, 5));
        let b = child(&mut ui, root, 20, Rect::from_xywh(0, 0, 50, 50));

        assert_eq!(ui.child_by_control_id(root, 20), Some(b));
        assert_eq!(ui.child_by_control_id(root, 11), None);
        assert_eq!(ui.descendants(root), vec![a, a1, b]);
        assert_eq!(ui.ancestors(a1), vec![a, root]);
        assert_eq!(ui.top_level_of(a1), Some(root));
        assert!(ui.is_child(root, a1));
        assert!(!ui.is_child(a, b));
    }
}
