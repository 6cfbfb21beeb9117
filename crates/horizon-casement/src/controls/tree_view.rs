//! Hierarchical tree view.
//!
//! Items live in a [`slotmap`] arena keyed by [`TreeItemId`], so handles to
//! deleted items go stale instead of aliasing new ones. The rows on screen
//! are the items reachable through expanded parents, in depth-first order.

use bitflags::bitflags;
use horizon_casement_core::{
    DialogCode, Key, Message, Modifiers, MouseButton, Painter, Point, Rect, Result, UiRuntime,
    WindowBehavior, WindowId,
};
use slotmap::{SlotMap, new_key_type};

use super::scroll::{self, ScrollRange};
use super::typeahead::TypeAhead;
use super::{NM_CLICK, NM_DBLCLK, NM_RCLICK, TARGET, notify_parent_with};

pub(crate) const CLASS_NAME: &str = "TreeView";

/// The selection changed. Payload: [`TreeSelChanged`].
pub const TVN_SELCHANGED: u32 = 0x0201;
/// An item was expanded or collapsed. Payload: [`TreeItemExpanded`].
pub const TVN_ITEMEXPANDED: u32 = 0x0202;

new_key_type! {
    /// Handle to a tree item.
    pub struct TreeItemId;
}

bitflags! {
    /// Tree view style bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TreeStyle: u32 {
        /// Draw expander boxes next to items with children.
        const HAS_BUTTONS = 1 << 0;
    }
}

/// Payload of [`TVN_SELCHANGED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSelChanged {
    /// Previously selected item.
    pub old: Option<TreeItemId>,
    /// Newly selected item.
    pub new: Option<TreeItemId>,
}

/// Payload of [`TVN_ITEMEXPANDED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeItemExpanded {
    /// The item.
    pub item: TreeItemId,
    /// Whether it is now expanded.
    pub expanded: bool,
}

/// Requests understood by [`TreeView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeRequest {
    /// Append an item under `parent` (a root for `None`). `id` is filled
    /// with the new item, or stays `None` if the parent is stale.
    InsertItem {
        /// Parent item.
        parent: Option<TreeItemId>,
        /// Item text.
        text: String,
        /// Application value.
        param: isize,
        /// Filled in.
        id: Option<TreeItemId>,
    },
    /// Delete an item and its descendants.
    DeleteItem(TreeItemId),
    /// Delete every item.
    DeleteAll,
    /// Expand or collapse an item.
    Expand {
        /// The item.
        item: TreeItemId,
        /// Expand (`true`) or collapse.
        expand: bool,
    },
    /// Select an item (`None` clears).
    Select(Option<TreeItemId>),
    /// Filled with the selected item.
    GetSelection(Option<TreeItemId>),
    /// Replace an item's text.
    SetItemText {
        /// The item.
        item: TreeItemId,
        /// New text.
        text: String,
    },
    /// Filled with an item's text.
    GetItemText {
        /// The item.
        item: TreeItemId,
        /// Filled in.
        text: String,
    },
    /// Reply with an item's application value.
    GetParam(TreeItemId),
    /// Filled with the children of `item` (the roots for `None`).
    GetChildren {
        /// The item.
        item: Option<TreeItemId>,
        /// Filled in.
        children: Vec<TreeItemId>,
    },
    /// Reply with the number of items.
    ItemCount,
    /// Expand the ancestors of an item and scroll it into view.
    EnsureVisible(TreeItemId),
}

#[derive(Debug, Clone)]
struct TreeItem {
    text: String,
    param: isize,
    parent: Option<TreeItemId>,
    children: Vec<TreeItemId>,
    expanded: bool,
}

/// Where a point falls on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowPart {
    Expander,
    Label,
}

/// A tree view.
#[derive(Debug, Default)]
pub struct TreeView {
    style: TreeStyle,
    items: SlotMap<TreeItemId, TreeItem>,
    roots: Vec<TreeItemId>,
    selected: Option<TreeItemId>,
    scroll: ScrollRange,
    typeahead: TypeAhead,
    has_focus: bool,
}

impl TreeView {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the tree has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Selected item.
    pub fn selection(&self) -> Option<TreeItemId> {
        self.selected
    }

    /// An item's text.
    pub fn text(&self, item: TreeItemId) -> Option<&str> {
        self.items.get(item).map(|i| i.text.as_str())
    }

    /// Whether an item is expanded.
    pub fn is_expanded(&self, item: TreeItemId) -> bool {
        self.items.get(item).is_some_and(|i| i.expanded)
    }

    /// Parent of an item.
    pub fn parent(&self, item: TreeItemId) -> Option<TreeItemId> {
        self.items.get(item)?.parent
    }

    /// The visible rows: items under expanded parents, depth-first, with
    /// their depth.
    pub fn visible_rows(&self) -> Vec<(TreeItemId, usize)> {
        let mut rows = Vec::new();
        let mut stack: Vec<(TreeItemId, usize)> =
            self.roots.iter().rev().map(|&id| (id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(item) = self.items.get(id) else {
                continue;
            };
            rows.push((id, depth));
            if item.expanded {
                stack.extend(item.children.iter().rev().map(|&child| (child, depth + 1)));
            }
        }
        rows
    }

    fn has_children(&self, item: TreeItemId) -> bool {
        self.items.get(item).is_some_and(|i| !i.children.is_empty())
    }

    fn is_ancestor(&self, ancestor: TreeItemId, mut item: TreeItemId) -> bool {
        while let Some(parent) = self.parent(item) {
            if parent == ancestor {
                return true;
            }
            item = parent;
        }
        false
    }

    fn row_height(ui: &UiRuntime) -> i32 {
        ui.theme().row_height.max(1)
    }

    fn update_extent(&mut self, ui: &UiRuntime, hwnd: WindowId) {
        let client = ui.client_rect(hwnd).unwrap_or_default();
        let page = (client.height() / Self::row_height(ui)).max(1);
        let total = scroll::units(self.visible_rows().len());
        self.scroll.set_extent(page, total);
    }

    fn hit(&self, ui: &UiRuntime, pos: Point) -> Option<(TreeItemId, RowPart)> {
        let row = self.scroll.pos + pos.y.div_euclid(Self::row_height(ui));
        let (id, depth) = *self.visible_rows().get(usize::try_from(row).ok()?)?;
        let indent = ui.theme().tree_indent;
        let left = depth as i32 * indent;
        if pos.x >= left && pos.x < left + indent && self.has_children(id) {
            Some((id, RowPart::Expander))
        } else {
            Some((id, RowPart::Label))
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    fn insert(&mut self, parent: Option<TreeItemId>, text: String, param: isize) -> Option<TreeItemId> {
        if let Some(parent) = parent
            && !self.items.contains_key(parent)
        {
            return None;
        }
        let id = self.items.insert(TreeItem {
            text,
            param,
            parent,
            children: Vec::new(),
            expanded: false,
        });
        match parent {
            Some(parent) => self.items[parent].children.push(id),
            None => self.roots.push(id),
        }
        Some(id)
    }

    /// Remove an item and its subtree. Returns whether it existed.
    fn remove(&mut self, item: TreeItemId) -> bool {
        let Some(parent) = self.items.get(item).map(|i| i.parent) else {
            return false;
        };
        match parent {
            Some(parent) => {
                if let Some(p) = self.items.get_mut(parent) {
                    p.children.retain(|&c| c != item);
                }
            }
            None => self.roots.retain(|&r| r != item),
        }
        let mut stack = vec![item];
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.items.remove(id) {
                stack.extend(removed.children);
            }
        }
        true
    }

    fn select(&mut self, ui: &mut UiRuntime, hwnd: WindowId, item: Option<TreeItemId>) {
        let item = item.filter(|&i| self.items.contains_key(i));
        if item == self.selected {
            return;
        }
        let old = self.selected;
        self.selected = item;
        if let Some(item) = item {
            self.ensure_visible(ui, hwnd, item);
        }
        ui.invalidate(hwnd, None);
        tracing::trace!(target: TARGET, ?hwnd, ?old, new = ?item, "tree selection changed");
        notify_parent_with(ui, hwnd, TVN_SELCHANGED, TreeSelChanged { old, new: item });
    }

    fn expand(&mut self, ui: &mut UiRuntime, hwnd: WindowId, item: TreeItemId, expand: bool) -> bool {
        let Some(entry) = self.items.get_mut(item) else {
            return false;
        };
        if entry.expanded == expand || entry.children.is_empty() {
            return false;
        }
        entry.expanded = expand;
        self.update_extent(ui, hwnd);
        ui.invalidate(hwnd, None);
        notify_parent_with(
            ui,
            hwnd,
            TVN_ITEMEXPANDED,
            TreeItemExpanded {
                item,
                expanded: expand,
            },
        );
        if !expand
            && let Some(selected) = self.selected
            && self.is_ancestor(item, selected)
        {
            self.select(ui, hwnd, Some(item));
        }
        true
    }

    fn ensure_visible(&mut self, ui: &mut UiRuntime, hwnd: WindowId, item: TreeItemId) {
        let mut ancestor = self.parent(item);
        while let Some(id) = ancestor {
            if let Some(entry) = self.items.get_mut(id) {
                entry.expanded = true;
            }
            ancestor = self.parent(id);
        }
        self.update_extent(ui, hwnd);
        if let Some(row) = self.visible_rows().iter().position(|&(id, _)| id == item) {
            self.scroll.ensure_visible(scroll::units(row));
        }
        ui.invalidate(hwnd, None);
    }

    // =========================================================================
    // Input
    // =========================================================================

    fn key_down(&mut self, ui: &mut UiRuntime, hwnd: WindowId, key: Key) -> bool {
        let rows = self.visible_rows();
        if rows.is_empty() {
            return false;
        }
        let current = self
            .selected
            .and_then(|s| rows.iter().position(|&(id, _)| id == s));
        let last = rows.len() - 1;
        let page = self.scroll.page.max(1) as usize;
        let target = match (key, current) {
            (Key::Left, Some(index)) => {
                let item = rows[index].0;
                if self.is_expanded(item) {
                    self.expand(ui, hwnd, item, false);
                    return true;
                }
                match self.parent(item) {
                    Some(parent) => parent,
                    None => return true,
                }
            }
            (Key::Right, Some(index)) => {
                let item = rows[index].0;
                if !self.has_children(item) {
                    return true;
                }
                if !self.is_expanded(item) {
                    self.expand(ui, hwnd, item, true);
                    return true;
                }
                self.items[item].children[0]
            }
            (Key::Up, Some(index)) => rows[index.saturating_sub(1)].0,
            (Key::Down, Some(index)) => rows[(index + 1).min(last)].0,
            (Key::PageUp, Some(index)) => rows[index.saturating_sub(page)].0,
            (Key::PageDown, Some(index)) => rows[(index + page).min(last)].0,
            (Key::Up | Key::Down | Key::PageUp | Key::PageDown | Key::Left | Key::Right, None) => {
                rows[0].0
            }
            (Key::Home, _) => rows[0].0,
            (Key::End, _) => rows[last].0,
            _ => return false,
        };
        self.select(ui, hwnd, Some(target));
        true
    }

    fn char_input(&mut self, ui: &mut UiRuntime, hwnd: WindowId, ch: char, modifiers: Modifiers) {
        if ch.is_control() || (modifiers.ctrl() && !modifiers.alt()) {
            return;
        }
        let now = ui.now();
        let timeout = ui.theme().typeahead_timeout;
        self.typeahead.push(ch, now, timeout);
        let rows = self.visible_rows();
        let current = self
            .selected
            .and_then(|s| rows.iter().position(|&(id, _)| id == s));
        let found = self.typeahead.find(rows.len(), current, |row| {
            self.text(rows[row].0).unwrap_or_default().to_owned()
        });
        if let Some(row) = found {
            self.select(ui, hwnd, Some(rows[row].0));
        }
    }

    fn button_down(
        &mut self,
        ui: &mut UiRuntime,
        hwnd: WindowId,
        button: MouseButton,
        pos: Point,
        double_click: bool,
    ) {
        if !self.has_focus {
            ui.set_focus(hwnd);
        }
        let hit = self.hit(ui, pos);
        match (button, hit) {
            (MouseButton::Left, Some((item, RowPart::Expander))) => {
                let expand = !self.is_expanded(item);
                self.expand(ui, hwnd, item, expand);
            }
            (MouseButton::Left, Some((item, RowPart::Label))) => {
                self.select(ui, hwnd, Some(item));
                if double_click {
                    let expand = !self.is_expanded(item);
                    self.expand(ui, hwnd, item, expand);
                    notify_parent_with(ui, hwnd, NM_DBLCLK, item);
                } else {
                    notify_parent_with(ui, hwnd, NM_CLICK, item);
                }
            }
            (MouseButton::Right, Some((item, _))) => {
                notify_parent_with(ui, hwnd, NM_RCLICK, item);
            }
            _ => {}
        }
    }

    fn request(&mut self, ui: &mut UiRuntime, hwnd: WindowId, request: &mut TreeRequest) -> isize {
        match request {
            TreeRequest::InsertItem {
                parent,
                text,
                param,
                id,
            } => {
                *id = self.insert(*parent, std::mem::take(text), *param);
                if id.is_some() {
                    self.update_extent(ui, hwnd);
                    ui.invalidate(hwnd, None);
                }
                id.is_some() as isize
            }
            TreeRequest::DeleteItem(item) => {
                let item = *item;
                let selection_lost = self
                    .selected
                    .is_some_and(|s| s == item || self.is_ancestor(item, s));
                let parent = self.parent(item);
                if !self.remove(item) {
                    return 0;
                }
                if selection_lost {
                    let old = self.selected;
                    self.selected = parent;
                    notify_parent_with(ui, hwnd, TVN_SELCHANGED, TreeSelChanged { old, new: parent });
                }
                self.update_extent(ui, hwnd);
                ui.invalidate(hwnd, None);
                1
            }
            TreeRequest::DeleteAll => {
                self.items.clear();
                self.roots.clear();
                let old = self.selected.take();
                self.scroll = ScrollRange::default();
                ui.invalidate(hwnd, None);
                if old.is_some() {
                    notify_parent_with(ui, hwnd, TVN_SELCHANGED, TreeSelChanged { old, new: None });
                }
                1
            }
            TreeRequest::Expand { item, expand } => self.expand(ui, hwnd, *item, *expand) as isize,
            TreeRequest::Select(item) => {
                self.select(ui, hwnd, *item);
                (self.selected == *item) as isize
            }
            TreeRequest::GetSelection(item) => {
                *item = self.selected;
                item.is_some() as isize
            }
            TreeRequest::SetItemText { item, text } => match self.items.get_mut(*item) {
                Some(entry) => {
                    entry.text = std::mem::take(text);
                    ui.invalidate(hwnd, None);
                    1
                }
                None => 0,
            },
            TreeRequest::GetItemText { item, text } => match self.items.get(*item) {
                Some(entry) => {
                    text.clone_from(&entry.text);
                    text.len() as isize
                }
                None => 0,
            },
            TreeRequest::GetParam(item) => self.items.get(*item).map_or(0, |i| i.param),
            TreeRequest::GetChildren { item, children } => {
                *children = match item {
                    Some(item) => self
                        .items
                        .get(*item)
                        .map(|i| i.children.clone())
                        .unwrap_or_default(),
                    None => self.roots.clone(),
                };
                children.len() as isize
            }
            TreeRequest::ItemCount => self.items.len() as isize,
            TreeRequest::EnsureVisible(item) => {
                if !self.items.contains_key(*item) {
                    return 0;
                }
                self.ensure_visible(ui, hwnd, *item);
                1
            }
        }
    }
}

impl WindowBehavior for TreeView {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        match msg {
            Message::Create(info) => {
                self.style = TreeStyle::from_bits_truncate(info.control_style);
                Ok(0)
            }
            Message::Destroy => {
                self.items.clear();
                self.roots.clear();
                self.selected = None;
                Ok(0)
            }
            Message::Size(_) => {
                self.update_extent(ui, hwnd);
                Ok(0)
            }
            Message::SetFocus { .. } => {
                self.has_focus = true;
                ui.invalidate(hwnd, None);
                Ok(0)
            }
            Message::KillFocus { .. } => {
                self.has_focus = false;
                self.typeahead.reset();
                ui.invalidate(hwnd, None);
                Ok(0)
            }
            Message::GetDialogCode => {
                Ok((DialogCode::WANT_ARROWS | DialogCode::WANT_CHARS).bits() as isize)
            }
            Message::ButtonDown {
                button,
                pos,
                double_click,
                ..
            } => {
                self.button_down(ui, hwnd, *button, *pos, *double_click);
                Ok(0)
            }
            Message::Wheel {
                delta,
                horizontal: false,
                ..
            } => {
                self.update_extent(ui, hwnd);
                if self.scroll.set_pos(self.scroll.pos - *delta * 3) {
                    ui.invalidate(hwnd, None);
                }
                Ok(0)
            }
            Message::KeyDown { key, .. } => {
                if self.key_down(ui, hwnd, *key) {
                    Ok(0)
                } else {
                    Ok(ui.default_handle(hwnd, msg))
                }
            }
            Message::Char { ch, modifiers } => {
                self.char_input(ui, hwnd, *ch, *modifiers);
                Ok(0)
            }
            Message::Control(_) => match msg.control_mut::<TreeRequest>() {
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
        painter.fill_rect(client, colors.window);
        let row_height = Self::row_height(ui);
        let indent = theme.tree_indent;
        let first = self.scroll.pos.max(0) as usize;
        let visible = (client.height() / row_height + 1).max(1) as usize;

        for (row, (id, depth)) in self.visible_rows().into_iter().enumerate().skip(first).take(visible) {
            let Some(item) = self.items.get(id) else {
                continue;
            };
            let top = client.top + (row - first) as i32 * row_height;
            let left = depth as i32 * indent;
            if self.style.contains(TreeStyle::HAS_BUTTONS) && !item.children.is_empty() {
                let size = (indent / 2).max(5);
                let box_rect = Rect::from_xywh(
                    left + (indent - size) / 2,
                    top + (row_height - size) / 2,
                    size,
                    size,
                );
                painter.frame_rect(box_rect, colors.shadow);
                let mid_y = box_rect.top + size / 2;
                let mid_x = box_rect.left + size / 2;
                painter.draw_line(
                    Point::new(box_rect.left + 2, mid_y),
                    Point::new(box_rect.right - 3, mid_y),
                    colors.text,
                );
                if !item.expanded {
                    painter.draw_line(
                        Point::new(mid_x, box_rect.top + 2),
                        Point::new(mid_x, box_rect.bottom - 3),
                        colors.text,
                    );
                }
            }
            let label_left = left + indent;
            let width = ui.text_metrics().text_width(&item.text) + 2 * theme.text_padding;
            let label = Rect::new(label_left, top, label_left + width, top + row_height);
            let color = if self.selected == Some(id) {
                painter.fill_rect(label, colors.highlight);
                colors.highlight_text
            } else {
                colors.text
            };
            painter.draw_text(
                Point::new(label.left + theme.text_padding, top + theme.text_padding),
                &item.text,
                color,
            );
            if self.has_focus && self.selected == Some(id) {
                painter.frame_rect(label, colors.shadow);
            }
        }
    }

    fn class_name(&self) -> &'static str {
        CLASS_NAME
    }
}
