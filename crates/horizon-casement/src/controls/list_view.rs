//! Report-style list view.
//!
//! Rows are either owned by the control (texts, a parameter and state bits
//! per row) or, with [`ListStyle::OWNER_DATA`], supplied on demand by the
//! parent: the control only knows the row count, keeps selection in a
//! [`RowBitmap`] and asks for cell text with [`LVN_GETDISPINFO`]
//! notifications carrying a [`ListDisplayRequest`].
//!
//! Painting cannot send messages, so owner-data text for the visible rows is
//! fetched whenever the view changes and kept in a small display cache.
//!
//! # Mouse
//!
//! - Click selects; Ctrl+click toggles; Shift+click selects a range
//! - A press within the grab tolerance of a column border (in the header,
//!   or anywhere when the header is hidden) resizes the column
//! - Header clicks report [`LVN_COLUMNCLICK`]
//! - The status-icon column toggles [`RowState::CHECKED`]

use std::collections::BTreeMap;

use bitflags::bitflags;
use horizon_casement_core::{
    DialogCode, Insets, Key, Message, Modifiers, MouseButton, Painter, Point, Rect, Result,
    UiRuntime, WindowBehavior, WindowId, WindowStyle,
};

use super::row_bitmap::RowBitmap;
use super::scroll::{self, BarHit, ScrollRange, ThumbDrag};
use super::typeahead::TypeAhead;
use super::{NM_CLICK, NM_DBLCLK, NM_RCLICK, TARGET, notify_parent_with};

pub(crate) const CLASS_NAME: &str = "ListView";

/// A row's state changed. Payload: [`ListItemChanged`].
pub const LVN_ITEMCHANGED: u32 = 0x0101;
/// A header was clicked. Payload: the column index (`usize`).
pub const LVN_COLUMNCLICK: u32 = 0x0102;
/// Owner-data cell text is needed. Payload: [`ListDisplayRequest`].
pub const LVN_GETDISPINFO: u32 = 0x0103;
/// A column resize drag finished. Payload: the column index (`usize`).
pub const LVN_ENDCOLUMNRESIZE: u32 = 0x0104;

bitflags! {
    /// List view style bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ListStyle: u32 {
        /// At most one selected row.
        const SINGLE_SELECT = 1 << 0;
        /// Rows are supplied by the parent.
        const OWNER_DATA    = 1 << 1;
        /// No column header.
        const NO_HEADER     = 1 << 2;
        /// A leading status-icon column.
        const STATUS_ICONS  = 1 << 3;
    }
}

bitflags! {
    /// Per-row state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RowState: u32 {
        /// The row is selected.
        const SELECTED = 1 << 0;
        /// The status icon is checked.
        const CHECKED  = 1 << 1;
    }
}

/// A column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListColumn {
    /// Header text.
    pub title: String,
    /// Width in pixels.
    pub width: i32,
}

impl ListColumn {
    /// Create a column.
    pub fn new(title: impl Into<String>, width: i32) -> Self {
        Self {
            title: title.into(),
            width,
        }
    }
}

/// An owned row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRow {
    /// Cell texts, one per column.
    pub texts: Vec<String>,
    /// Application value.
    pub param: isize,
    /// State bits.
    pub state: RowState,
}

impl ListRow {
    /// Create an unselected row from cell texts.
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the application value.
    pub fn with_param(mut self, param: isize) -> Self {
        self.param = param;
        self
    }
}

/// Cell text request sent to the parent of an owner-data list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDisplayRequest {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub column: usize,
    /// Filled by the parent.
    pub text: String,
}

/// Payload of [`LVN_ITEMCHANGED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItemChanged {
    /// The row, or `None` when every row changed.
    pub row: Option<usize>,
    /// State before the change.
    pub old: RowState,
    /// State after the change.
    pub new: RowState,
}

/// What lies under a point of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListHit {
    /// A header cell.
    Header {
        /// Column index.
        column: usize,
    },
    /// Close enough to the right border of a column to resize it.
    ColumnBorder {
        /// Column index.
        column: usize,
    },
    /// A row.
    Row {
        /// Row index.
        row: usize,
        /// Column under the point, if any.
        column: Option<usize>,
    },
    /// The status icon of a row.
    StatusIcon {
        /// Row index.
        row: usize,
    },
    /// The vertical scrollbar.
    VScroll,
    /// Nothing.
    #[default]
    Empty,
}

/// Requests understood by [`ListView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    /// Insert a column at `index` (clamped).
    InsertColumn {
        /// Position.
        index: usize,
        /// The column.
        column: ListColumn,
    },
    /// Remove a column.
    DeleteColumn(usize),
    /// Set a column width.
    SetColumnWidth {
        /// Column index.
        column: usize,
        /// New width.
        width: i32,
    },
    /// Reply with a column width, or `-1`.
    GetColumnWidth(usize),
    /// Reply with the number of columns.
    ColumnCount,
    /// Insert an owned row, at the end for `None`. Replies with its index,
    /// or `-1` for owner-data lists.
    InsertRow {
        /// Position.
        index: Option<usize>,
        /// The row.
        row: ListRow,
    },
    /// Remove an owned row.
    DeleteRow(usize),
    /// Remove every owned row.
    DeleteAllRows,
    /// Set the text of an owned cell.
    SetText {
        /// Row index.
        row: usize,
        /// Column index.
        column: usize,
        /// New text.
        text: String,
    },
    /// Filled with the text of a cell.
    GetText {
        /// Row index.
        row: usize,
        /// Column index.
        column: usize,
        /// Filled in.
        text: String,
    },
    /// Set the application value of an owned row.
    SetParam {
        /// Row index.
        row: usize,
        /// New value.
        param: isize,
    },
    /// Reply with the application value of an owned row.
    GetParam(usize),
    /// Select or deselect a row.
    SetSelected {
        /// Row index.
        row: usize,
        /// Whether it is selected.
        selected: bool,
    },
    /// Reply `1` if the row is selected.
    IsSelected(usize),
    /// Filled with the selected rows, ascending.
    GetSelection(Vec<usize>),
    /// Reply with the number of selected rows.
    SelectedCount,
    /// Deselect every row.
    ClearSelection,
    /// Set the row count of an owner-data list. Selections beyond the new
    /// count are dropped.
    SetItemCount(usize),
    /// Reply with the number of rows.
    RowCount,
    /// Scroll a row into view.
    EnsureVisible(usize),
    /// Filled with what lies under a client point.
    HitTest {
        /// Client point.
        pos: Point,
        /// Filled in.
        result: ListHit,
    },
    /// Reply with the focused row, or `-1`.
    GetFocusedRow,
    /// Fetch owner-data text again for `first..=last`.
    RedrawRows {
        /// First row.
        first: usize,
        /// Last row.
        last: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListDrag {
    Resize {
        column: usize,
        origin_x: i32,
        origin_width: i32,
    },
    Thumb(ThumbDrag),
}

struct ListLayout {
    header: Option<Rect>,
    body: Rect,
    bar: Option<Rect>,
    row_height: i32,
    status_width: i32,
}

/// A report-style list view.
#[derive(Debug, Default)]
pub struct ListView {
    style: ListStyle,
    columns: Vec<ListColumn>,
    rows: Vec<ListRow>,
    item_count: usize,
    selected: RowBitmap,
    focused_row: Option<usize>,
    anchor: Option<usize>,
    scroll: ScrollRange,
    scroll_x: i32,
    drag: Option<ListDrag>,
    typeahead: TypeAhead,
    display: BTreeMap<usize, Vec<String>>,
    has_focus: bool,
}

impl ListView {
    /// Create an empty list. The style comes from `Message::Create`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Style bits.
    pub fn style(&self) -> ListStyle {
        self.style
    }

    /// Columns.
    pub fn columns(&self) -> &[ListColumn] {
        &self.columns
    }

    /// Owned rows (empty for owner-data lists).
    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        if self.is_owner_data() {
            self.item_count
        } else {
            self.rows.len()
        }
    }

    /// Whether a row is selected.
    pub fn is_selected(&self, row: usize) -> bool {
        if self.is_owner_data() {
            self.selected.get(row)
        } else {
            self.rows
                .get(row)
                .is_some_and(|r| r.state.contains(RowState::SELECTED))
        }
    }

    /// Selected rows, ascending.
    pub fn selection(&self) -> Vec<usize> {
        if self.is_owner_data() {
            self.selected.iter_ones().collect()
        } else {
            self.rows
                .iter()
                .enumerate()
                .filter(|(_, r)| r.state.contains(RowState::SELECTED))
                .map(|(i, _)| i)
                .collect()
        }
    }

    /// Number of selected rows.
    pub fn selected_count(&self) -> usize {
        if self.is_owner_data() {
            self.selected.count_ones()
        } else {
            self.rows
                .iter()
                .filter(|r| r.state.contains(RowState::SELECTED))
                .count()
        }
    }

    /// The row with the keyboard caret.
    pub fn focused_row(&self) -> Option<usize> {
        self.focused_row
    }

    /// First visible row.
    pub fn top_row(&self) -> usize {
        self.scroll.pos as usize
    }

    /// Horizontal scroll offset in pixels.
    pub fn scroll_x(&self) -> i32 {
        self.scroll_x
    }

    fn is_owner_data(&self) -> bool {
        self.style.contains(ListStyle::OWNER_DATA)
    }

    fn row_state(&self, row: usize) -> RowState {
        if self.is_owner_data() {
            if self.selected.get(row) {
                RowState::SELECTED
            } else {
                RowState::empty()
            }
        } else {
            self.rows.get(row).map_or(RowState::empty(), |r| r.state)
        }
    }

    // =========================================================================
    // Layout and hit-testing
    // =========================================================================

    fn layout(&self, ui: &UiRuntime, hwnd: WindowId) -> ListLayout {
        let client = ui.client_rect(hwnd).unwrap_or_default();
        let theme = ui.theme();
        let bar = ui
            .style(hwnd)
            .is_some_and(|s| s.contains(WindowStyle::VSCROLL))
            .then(|| scroll::vertical_track(client, theme));
        let right = bar.map_or(client.right, |bar| bar.left);
        let (header, top) = if self.style.contains(ListStyle::NO_HEADER) {
            (None, client.top)
        } else {
            let bottom = client.top + theme.header_height;
            (Some(Rect::new(client.left, client.top, right, bottom)), bottom)
        };
        ListLayout {
            header,
            body: Rect::new(client.left, top, right, client.bottom),
            bar,
            row_height: theme.row_height.max(1),
            status_width: if self.style.contains(ListStyle::STATUS_ICONS) {
                theme.status_icon_width
            } else {
                0
            },
        }
    }

    /// Left edge of column `index`, in client coordinates.
    fn column_left(&self, layout: &ListLayout, index: usize) -> i32 {
        layout.body.left + layout.status_width - self.scroll_x
            + self.columns[..index].iter().map(|c| c.width).sum::<i32>()
    }

    fn column_at(&self, layout: &ListLayout, x: i32) -> Option<usize> {
        let mut left = self.column_left(layout, 0);
        for (index, column) in self.columns.iter().enumerate() {
            if x >= left && x < left + column.width {
                return Some(index);
            }
            left += column.width;
        }
        None
    }

    /// Column whose right border is within `tolerance` of `x`. The last
    /// matching border wins so zero-width columns stay reachable.
    fn border_at(&self, layout: &ListLayout, x: i32, tolerance: i32) -> Option<usize> {
        let mut right = self.column_left(layout, 0);
        let mut found = None;
        for (index, column) in self.columns.iter().enumerate() {
            right += column.width;
            if (x - right).abs() <= tolerance {
                found = Some(index);
            }
        }
        found
    }

    fn hit_test(&self, ui: &UiRuntime, hwnd: WindowId, pos: Point) -> ListHit {
        let layout = self.layout(ui, hwnd);
        if layout.bar.is_some_and(|bar| bar.contains(pos)) {
            return ListHit::VScroll;
        }
        let tolerance = ui.theme().column_grab_tolerance;
        let border_zone = match layout.header {
            Some(header) => header.contains(pos),
            None => layout.body.contains(pos),
        };
        if border_zone && let Some(column) = self.border_at(&layout, pos.x, tolerance) {
            return ListHit::ColumnBorder { column };
        }
        if let Some(header) = layout.header
            && header.contains(pos)
        {
            return match self.column_at(&layout, pos.x) {
                Some(column) => ListHit::Header { column },
                None => ListHit::Empty,
            };
        }
        if !layout.body.contains(pos) {
            return ListHit::Empty;
        }
        let row = (pos.y - layout.body.top) / layout.row_height + self.scroll.pos;
        let row = row as usize;
        if row >= self.row_count() {
            return ListHit::Empty;
        }
        if pos.x < layout.body.left + layout.status_width {
            return ListHit::StatusIcon { row };
        }
        ListHit::Row {
            row,
            column: self.column_at(&layout, pos.x),
        }
    }

    // =========================================================================
    // View bookkeeping
    // =========================================================================

    fn update_extent(&mut self, layout: &ListLayout) {
        let page = (layout.body.height() / layout.row_height).max(1);
        self.scroll.set_extent(page, scroll::units(self.row_count()));
        let content: i32 = layout.status_width + self.columns.iter().map(|c| c.width).sum::<i32>();
        let max_x = (content - layout.body.width()).max(0);
        self.scroll_x = self.scroll_x.clamp(0, max_x);
    }

    /// Recompute the extent, refresh owner-data text and repaint.
    fn view_changed(&mut self, ui: &mut UiRuntime, hwnd: WindowId) {
        let layout = self.layout(ui, hwnd);
        self.update_extent(&layout);
        self.refresh_display(ui, hwnd);
        ui.invalidate(hwnd, None);
    }

    fn visible_rows(&self) -> std::ops::Range<usize> {
        let first = self.scroll.pos.max(0) as usize;
        let last = (first + self.scroll.page.max(0) as usize + 1).min(self.row_count());
        first..last.max(first)
    }

    fn request_text(&self, ui: &mut UiRuntime, hwnd: WindowId, row: usize, column: usize) -> String {
        let request = ListDisplayRequest {
            row,
            column,
            text: String::new(),
        };
        let (_, filled) = notify_parent_with(ui, hwnd, LVN_GETDISPINFO, request);
        filled.map(|r| r.text).unwrap_or_default()
    }

    /// Fetch owner-data text for the visible rows that are not cached.
    fn refresh_display(&mut self, ui: &mut UiRuntime, hwnd: WindowId) {
        if !self.is_owner_data() {
            return;
        }
        let visible = self.visible_rows();
        self.display.retain(|row, _| visible.contains(row));
        let missing: Vec<usize> = visible
            .clone()
            .filter(|row| !self.display.contains_key(row))
            .collect();
        for row in &missing {
            let texts = (0..self.columns.len().max(1))
                .map(|column| self.request_text(ui, hwnd, *row, column))
                .collect();
            self.display.insert(*row, texts);
        }
        if !missing.is_empty() {
            tracing::trace!(target: TARGET, ?hwnd, fetched = missing.len(), "owner-data rows fetched");
        }
    }

    fn cell_text(&self, ui: &mut UiRuntime, hwnd: WindowId, row: usize, column: usize) -> String {
        if self.is_owner_data() {
            match self.display.get(&row).and_then(|texts| texts.get(column)) {
                Some(text) => text.clone(),
                None => self.request_text(ui, hwnd, row, column),
            }
        } else {
            self.rows
                .get(row)
                .and_then(|r| r.texts.get(column))
                .cloned()
                .unwrap_or_default()
        }
    }

    fn ensure_visible(&mut self, ui: &mut UiRuntime, hwnd: WindowId, row: usize) {
        let layout = self.layout(ui, hwnd);
        self.update_extent(&layout);
        if self.scroll.ensure_visible(scroll::units(row)) {
            self.refresh_display(ui, hwnd);
        }
        ui.invalidate(hwnd, None);
    }

    fn scroll_to(&mut self, ui: &mut UiRuntime, hwnd: WindowId, pos: i32) {
        if self.scroll.set_pos(pos) {
            self.refresh_display(ui, hwnd);
            ui.invalidate(hwnd, None);
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    fn set_row_selected(&mut self, row: usize, selected: bool) -> bool {
        if self.is_owner_data() {
            self.selected.set(row, selected)
        } else if let Some(r) = self.rows.get_mut(row) {
            let old = r.state;
            r.state.set(RowState::SELECTED, selected);
            old != r.state
        } else {
            false
        }
    }

    /// Deselect everything except `keep`. Returns the rows that changed.
    fn clear_except(&mut self, keep: Option<usize>) -> Vec<usize> {
        let changed: Vec<usize> = self
            .selection()
            .into_iter()
            .filter(|&row| Some(row) != keep)
            .collect();
        for &row in &changed {
            self.set_row_selected(row, false);
        }
        changed
    }

    fn announce(&self, ui: &mut UiRuntime, hwnd: WindowId, rows: &[usize]) {
        for &row in rows {
            let new = self.row_state(row);
            let old = new ^ RowState::SELECTED;
            notify_parent_with(
                ui,
                hwnd,
                LVN_ITEMCHANGED,
                ListItemChanged {
                    row: Some(row),
                    old,
                    new,
                },
            );
        }
    }

    fn select_only(&mut self, row: usize) -> Vec<usize> {
        let mut changed = self.clear_except(Some(row));
        if self.set_row_selected(row, true) {
            changed.push(row);
        }
        changed
    }

    fn select_range(&mut self, from: usize, to: usize, keep_others: bool) -> Vec<usize> {
        let (start, end) = if from <= to { (from, to) } else { (to, from) };
        let mut changed = if keep_others {
            Vec::new()
        } else {
            let outside: Vec<usize> = self
                .selection()
                .into_iter()
                .filter(|row| !(start..=end).contains(row))
                .collect();
            for &row in &outside {
                self.set_row_selected(row, false);
            }
            outside
        };
        for row in start..=end.min(self.row_count().saturating_sub(1)) {
            if self.set_row_selected(row, true) {
                changed.push(row);
            }
        }
        changed
    }

    fn select_all(&mut self, ui: &mut UiRuntime, hwnd: WindowId) {
        if self.style.contains(ListStyle::SINGLE_SELECT) || self.row_count() == 0 {
            return;
        }
        if self.is_owner_data() {
            self.selected.set_range(0, self.item_count - 1, true);
        } else {
            for row in &mut self.rows {
                row.state.insert(RowState::SELECTED);
            }
        }
        notify_parent_with(
            ui,
            hwnd,
            LVN_ITEMCHANGED,
            ListItemChanged {
                row: None,
                old: RowState::empty(),
                new: RowState::SELECTED,
            },
        );
        ui.invalidate(hwnd, None);
    }

    /// Move the caret to `row`, selecting per the modifiers.
    fn select_with_modifiers(
        &mut self,
        ui: &mut UiRuntime,
        hwnd: WindowId,
        row: usize,
        modifiers: Modifiers,
        toggle_on_ctrl: bool,
    ) {
        let single = self.style.contains(ListStyle::SINGLE_SELECT);
        let changed = if single {
            self.anchor = Some(row);
            self.select_only(row)
        } else if modifiers.shift() {
            let anchor = *self.anchor.get_or_insert(self.focused_row.unwrap_or(row));
            self.select_range(anchor, row, modifiers.ctrl())
        } else if modifiers.ctrl() {
            self.anchor = Some(row);
            if toggle_on_ctrl {
                let selected = !self.is_selected(row);
                self.set_row_selected(row, selected);
                vec![row]
            } else {
                Vec::new()
            }
        } else {
            self.anchor = Some(row);
            self.select_only(row)
        };
        self.focused_row = Some(row);
        self.ensure_visible(ui, hwnd, row);
        self.announce(ui, hwnd, &changed);
    }

    // =========================================================================
    // Input
    // =========================================================================

    fn button_down(
        &mut self,
        ui: &mut UiRuntime,
        hwnd: WindowId,
        pos: Point,
        modifiers: Modifiers,
        double_click: bool,
    ) {
        if !self.has_focus {
            ui.set_focus(hwnd);
        }
        let hit = self.hit_test(ui, hwnd, pos);
        tracing::trace!(target: TARGET, ?hwnd, ?hit, "list button down");
        match hit {
            ListHit::VScroll => {
                let layout = self.layout(ui, hwnd);
                self.update_extent(&layout);
                let Some(track) = layout.bar else {
                    return;
                };
                match scroll::hit_bar(&self.scroll, track, ui.theme(), pos) {
                    Some(BarHit::Thumb(drag)) => {
                        self.drag = Some(ListDrag::Thumb(drag));
                        ui.set_capture(hwnd);
                    }
                    Some(BarHit::PageUp) => {
                        self.scroll_to(ui, hwnd, self.scroll.pos - self.scroll.page);
                    }
                    Some(BarHit::PageDown) => {
                        self.scroll_to(ui, hwnd, self.scroll.pos + self.scroll.page);
                    }
                    None => {}
                }
            }
            ListHit::ColumnBorder { column } => {
                self.drag = Some(ListDrag::Resize {
                    column,
                    origin_x: pos.x,
                    origin_width: self.columns[column].width,
                });
                ui.set_capture(hwnd);
            }
            ListHit::Header { column } => {
                notify_parent_with(ui, hwnd, LVN_COLUMNCLICK, column);
            }
            ListHit::StatusIcon { row } => {
                if let Some(r) = self.rows.get_mut(row) {
                    let old = r.state;
                    r.state.toggle(RowState::CHECKED);
                    let new = r.state;
                    ui.invalidate(hwnd, None);
                    notify_parent_with(
                        ui,
                        hwnd,
                        LVN_ITEMCHANGED,
                        ListItemChanged {
                            row: Some(row),
                            old,
                            new,
                        },
                    );
                }
                self.click(ui, hwnd, hit, double_click);
            }
            ListHit::Row { row, .. } => {
                self.select_with_modifiers(ui, hwnd, row, modifiers, true);
                self.click(ui, hwnd, hit, double_click);
            }
            ListHit::Empty => {
                if !modifiers.ctrl() && !modifiers.shift() {
                    let changed = self.clear_except(None);
                    ui.invalidate(hwnd, None);
                    self.announce(ui, hwnd, &changed);
                }
                self.click(ui, hwnd, hit, double_click);
            }
        }
    }

    fn click(&self, ui: &mut UiRuntime, hwnd: WindowId, hit: ListHit, double_click: bool) {
        let code = if double_click { NM_DBLCLK } else { NM_CLICK };
        notify_parent_with(ui, hwnd, code, hit);
    }

    fn right_button_down(&mut self, ui: &mut UiRuntime, hwnd: WindowId, pos: Point) {
        if !self.has_focus {
            ui.set_focus(hwnd);
        }
        let hit = self.hit_test(ui, hwnd, pos);
        if let ListHit::Row { row, .. } = hit
            && !self.is_selected(row)
        {
            self.select_with_modifiers(ui, hwnd, row, Modifiers::empty(), false);
        }
        notify_parent_with(ui, hwnd, NM_RCLICK, hit);
    }

    fn mouse_move(&mut self, ui: &mut UiRuntime, hwnd: WindowId, pos: Point) {
        match self.drag {
            Some(ListDrag::Resize {
                column,
                origin_x,
                origin_width,
            }) => {
                let width = (origin_width + pos.x - origin_x).max(0);
                if let Some(c) = self.columns.get_mut(column)
                    && c.width != width
                {
                    c.width = width;
                    let layout = self.layout(ui, hwnd);
                    self.update_extent(&layout);
                    ui.invalidate(hwnd, None);
                }
            }
            Some(ListDrag::Thumb(drag)) => {
                let layout = self.layout(ui, hwnd);
                if let Some(track) = layout.bar {
                    let target = self.scroll.pos_for_thumb(
                        track,
                        ui.theme().min_thumb_length,
                        pos.y - drag.grab,
                    );
                    self.scroll_to(ui, hwnd, target);
                }
            }
            None => {}
        }
    }

    fn button_up(&mut self, ui: &mut UiRuntime, hwnd: WindowId) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if ui.capture() == Some(hwnd) {
            ui.release_capture();
        }
        if let ListDrag::Resize { column, .. } = drag {
            tracing::debug!(target: TARGET, ?hwnd, column, "column resized");
            notify_parent_with(ui, hwnd, LVN_ENDCOLUMNRESIZE, column);
        }
    }

    fn key_down(&mut self, ui: &mut UiRuntime, hwnd: WindowId, key: Key, modifiers: Modifiers) -> bool {
        let count = self.row_count();
        if count == 0 {
            return false;
        }
        let last = count - 1;
        let current = self.focused_row.unwrap_or(0).min(last);
        let page = self.scroll.page.max(1) as usize;
        let target = match key {
            Key::Up => current.saturating_sub(1),
            Key::Down => (current + 1).min(last),
            Key::PageUp => current.saturating_sub(page),
            Key::PageDown => (current + page).min(last),
            Key::Home => 0,
            Key::End => last,
            Key::Space if modifiers.ctrl() => {
                self.select_with_modifiers(ui, hwnd, current, Modifiers::CTRL, true);
                return true;
            }
            Key::Char('a') if modifiers.ctrl() => {
                self.select_all(ui, hwnd);
                return true;
            }
            _ => return false,
        };
        if self.focused_row.is_none() {
            self.focused_row = Some(current);
        }
        self.select_with_modifiers(ui, hwnd, target, modifiers, false);
        true
    }

    fn char_input(&mut self, ui: &mut UiRuntime, hwnd: WindowId, ch: char, modifiers: Modifiers) {
        if ch.is_control() || (modifiers.ctrl() && !modifiers.alt()) {
            return;
        }
        let now = ui.now();
        let timeout = ui.theme().typeahead_timeout;
        self.typeahead.push(ch, now, timeout);
        let count = self.row_count();
        let found = {
            let this = &*self;
            this.typeahead
                .find(count, this.focused_row, |row| this.cell_text(ui, hwnd, row, 0))
        };
        if let Some(row) = found {
            tracing::trace!(target: TARGET, ?hwnd, row, prefix = self.typeahead.prefix(), "type-ahead match");
            self.select_with_modifiers(ui, hwnd, row, Modifiers::empty(), false);
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    fn request(&mut self, ui: &mut UiRuntime, hwnd: WindowId, request: &mut ListRequest) -> isize {
        match request {
            ListRequest::InsertColumn { index, column } => {
                let index = (*index).min(self.columns.len());
                self.columns.insert(index, column.clone());
                for row in &mut self.rows {
                    if row.texts.len() >= index {
                        row.texts.insert(index, String::new());
                    }
                }
                self.display.clear();
                self.view_changed(ui, hwnd);
                index as isize
            }
            ListRequest::DeleteColumn(index) => {
                if *index >= self.columns.len() {
                    return 0;
                }
                self.columns.remove(*index);
                for row in &mut self.rows {
                    if *index < row.texts.len() {
                        row.texts.remove(*index);
                    }
                }
                self.display.clear();
                self.view_changed(ui, hwnd);
                1
            }
            ListRequest::SetColumnWidth { column, width } => match self.columns.get_mut(*column) {
                Some(c) => {
                    c.width = (*width).max(0);
                    self.view_changed(ui, hwnd);
                    1
                }
                None => 0,
            },
            ListRequest::GetColumnWidth(column) => {
                self.columns.get(*column).map_or(-1, |c| c.width as isize)
            }
            ListRequest::ColumnCount => self.columns.len() as isize,
            ListRequest::InsertRow { index, row } => {
                if self.is_owner_data() {
                    return -1;
                }
                let index = index.unwrap_or(self.rows.len()).min(self.rows.len());
                self.rows.insert(index, std::mem::take(row));
                if let Some(focused) = self.focused_row.as_mut()
                    && *focused >= index
                {
                    *focused += 1;
                }
                self.view_changed(ui, hwnd);
                index as isize
            }
            ListRequest::DeleteRow(index) => {
                if self.is_owner_data() || *index >= self.rows.len() {
                    return 0;
                }
                self.rows.remove(*index);
                self.focused_row = match self.focused_row {
                    Some(f) if f > *index => Some(f - 1),
                    Some(f) if f == *index => None,
                    other => other,
                };
                self.anchor = None;
                self.view_changed(ui, hwnd);
                1
            }
            ListRequest::DeleteAllRows => {
                self.rows.clear();
                self.focused_row = None;
                self.anchor = None;
                self.scroll = ScrollRange::default();
                self.view_changed(ui, hwnd);
                1
            }
            ListRequest::SetText { row, column, text } => {
                let Some(r) = self.rows.get_mut(*row) else {
                    return 0;
                };
                if r.texts.len() <= *column {
                    r.texts.resize(*column + 1, String::new());
                }
                r.texts[*column] = std::mem::take(text);
                ui.invalidate(hwnd, None);
                1
            }
            ListRequest::GetText { row, column, text } => {
                if *row >= self.row_count() {
                    return 0;
                }
                *text = self.cell_text(ui, hwnd, *row, *column);
                text.len() as isize
            }
            ListRequest::SetParam { row, param } => match self.rows.get_mut(*row) {
                Some(r) => {
                    r.param = *param;
                    1
                }
                None => 0,
            },
            ListRequest::GetParam(row) => self.rows.get(*row).map_or(0, |r| r.param),
            ListRequest::SetSelected { row, selected } => {
                if *row >= self.row_count() {
                    return 0;
                }
                let mut changed = if *selected && self.style.contains(ListStyle::SINGLE_SELECT) {
                    self.clear_except(Some(*row))
                } else {
                    Vec::new()
                };
                if self.set_row_selected(*row, *selected) {
                    changed.push(*row);
                }
                ui.invalidate(hwnd, None);
                self.announce(ui, hwnd, &changed);
                1
            }
            ListRequest::IsSelected(row) => self.is_selected(*row) as isize,
            ListRequest::GetSelection(rows) => {
                *rows = self.selection();
                rows.len() as isize
            }
            ListRequest::SelectedCount => self.selected_count() as isize,
            ListRequest::ClearSelection => {
                let changed = self.clear_except(None);
                ui.invalidate(hwnd, None);
                self.announce(ui, hwnd, &changed);
                changed.len() as isize
            }
            ListRequest::SetItemCount(count) => {
                if !self.is_owner_data() {
                    return 0;
                }
                self.item_count = *count;
                self.selected.resize(*count);
                self.focused_row = self.focused_row.filter(|&f| f < *count);
                self.anchor = self.anchor.filter(|&a| a < *count);
                self.display.retain(|&row, _| row < *count);
                self.view_changed(ui, hwnd);
                1
            }
            ListRequest::RowCount => self.row_count() as isize,
            ListRequest::EnsureVisible(row) => {
                if *row >= self.row_count() {
                    return 0;
                }
                self.ensure_visible(ui, hwnd, *row);
                1
            }
            ListRequest::HitTest { pos, result } => {
                *result = self.hit_test(ui, hwnd, *pos);
                (*result != ListHit::Empty) as isize
            }
            ListRequest::GetFocusedRow => self.focused_row.map_or(-1, |row| row as isize),
            ListRequest::RedrawRows { first, last } => {
                let (first, last) = ((*first).min(*last), (*first).max(*last));
                self.display.retain(|row, _| !(first..=last).contains(row));
                self.refresh_display(ui, hwnd);
                ui.invalidate(hwnd, None);
                1
            }
        }
    }

    // =========================================================================
    // Painting
    // =========================================================================

    fn painted_text(&self, row: usize, column: usize) -> &str {
        if self.is_owner_data() {
            self.display
                .get(&row)
                .and_then(|texts| texts.get(column))
                .map_or("", String::as_str)
        } else {
            self.rows
                .get(row)
                .and_then(|r| r.texts.get(column))
                .map_or("", String::as_str)
        }
    }
}

impl WindowBehavior for ListView {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        match msg {
            Message::Create(info) => {
                self.style = ListStyle::from_bits_truncate(info.control_style);
                Ok(0)
            }
            Message::Destroy => {
                self.drag = None;
                self.rows.clear();
                self.display.clear();
                self.selected = RowBitmap::new();
                Ok(0)
            }
            Message::Size(_) => {
                self.view_changed(ui, hwnd);
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
                button: MouseButton::Left,
                pos,
                modifiers,
                double_click,
            } => {
                self.button_down(ui, hwnd, *pos, *modifiers, *double_click);
                Ok(0)
            }
            Message::ButtonDown {
                button: MouseButton::Right,
                pos,
                ..
            } => {
                self.right_button_down(ui, hwnd, *pos);
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
                self.button_up(ui, hwnd);
                Ok(0)
            }
            Message::CaptureChanged { .. } => {
                self.drag = None;
                Ok(0)
            }
            Message::Wheel {
                delta, horizontal, ..
            } => {
                if *horizontal {
                    let step = ui.text_metrics().char_width('0') * 3;
                    self.scroll_x -= *delta * step;
                    self.view_changed(ui, hwnd);
                } else {
                    self.scroll_to(ui, hwnd, self.scroll.pos - *delta * 3);
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
            Message::Control(_) => match msg.control_mut::<ListRequest>() {
                Some(request) => Ok(self.request(ui, hwnd, request)),
                None => Ok(0),
            },
            _ => Ok(ui.default_handle(hwnd, msg)),
        }
    }

    fn paint(&self, ui: &UiRuntime, hwnd: WindowId, painter: &mut dyn Painter) {
        let theme = ui.theme();
        let colors = &theme.colors;
        let layout = self.layout(ui, hwnd);
        let client = ui.client_rect(hwnd).unwrap_or_default();
        let pad = theme.text_padding;
        painter.fill_rect(client, colors.window);

        if let Some(header) = layout.header {
            painter.fill_rect(header, colors.face);
            painter.push_clip(header);
            for (index, column) in self.columns.iter().enumerate() {
                let left = self.column_left(&layout, index);
                let cell = Rect::new(left, header.top, left + column.width, header.bottom);
                painter.draw_text(Point::new(cell.left + pad, cell.top + pad), &column.title, colors.text);
                painter.draw_line(
                    Point::new(cell.right - 1, cell.top),
                    Point::new(cell.right - 1, cell.bottom - 1),
                    colors.shadow,
                );
            }
            painter.pop_clip();
        }

        painter.push_clip(layout.body);
        let first = self.scroll.pos.max(0) as usize;
        for row in self.visible_rows() {
            let top = layout.body.top + (row - first) as i32 * layout.row_height;
            let line = Rect::new(layout.body.left, top, layout.body.right, top + layout.row_height);
            let state = self.row_state(row);
            let text_color = if state.contains(RowState::SELECTED) {
                painter.fill_rect(line, colors.highlight);
                colors.highlight_text
            } else {
                colors.text
            };
            if layout.status_width > 0 {
                let icon = Rect::from_xywh(line.left + 2, top + 2, layout.status_width - 4, layout.row_height - 4);
                painter.frame_rect(icon, colors.shadow);
                if state.contains(RowState::CHECKED) {
                    painter.fill_rect(icon.inset(Insets::uniform(2)), colors.text);
                }
            }
            for column in 0..self.columns.len() {
                let left = self.column_left(&layout, column);
                let cell = Rect::new(left, top, left + self.columns[column].width, line.bottom);
                painter.push_clip(cell);
                painter.draw_text(
                    Point::new(cell.left + pad, top + pad),
                    self.painted_text(row, column),
                    text_color,
                );
                painter.pop_clip();
            }
            if self.has_focus && self.focused_row == Some(row) {
                painter.frame_rect(line, colors.shadow);
            }
        }
        painter.pop_clip();

        if let Some(track) = layout.bar {
            scroll::paint_vertical(&self.scroll, track, theme, painter);
        }
    }

    fn class_name(&self) -> &'static str {
        CLASS_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_casement_core::{
        DefaultBehavior, FnBehavior, RecordingPainter, RuntimeConfig, WindowParams,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(u32, Option<ListItemChanged>)>>>;

    /// A parent that logs list notifications and answers owner-data text
    /// requests with `"r{row}c{column}"`.
    fn setup(style: ListStyle) -> (UiRuntime, WindowId, Log) {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let frame = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 400, 400)),
                FnBehavior::new("Parent", move |ui, hwnd, msg| match msg {
                    Message::Notify(n) => {
                        if let Some(request) = n.data_mut::<ListDisplayRequest>() {
                            request.text = format!("r{}c{}", request.row, request.column);
                        } else {
                            sink.borrow_mut()
                                .push((n.code, n.data::<ListItemChanged>().copied()));
                        }
                        Ok(0)
                    }
                    _ => Ok(ui.default_handle(hwnd, msg)),
                }),
            )
            .unwrap();
        // Header 0..20, rows of 18px from y = 20.
        let list = ui
            .create_window(
                WindowParams::child(frame, 3, Rect::from_xywh(0, 0, 300, 200))
                    .with_control_style(style.bits()),
                ListView::new(),
            )
            .unwrap();
        for (index, title) in ["Name", "Size"].into_iter().enumerate() {
            ui.send(
                list,
                Message::control(ListRequest::InsertColumn {
                    index,
                    column: ListColumn::new(title, 100),
                }),
            );
        }
        (ui, list, log)
    }

    fn add_rows(ui: &mut UiRuntime, list: WindowId, names: &[&str]) {
        for name in names {
            ui.send(
                list,
                Message::control(ListRequest::InsertRow {
                    index: None,
                    row: ListRow::new([*name, "1 KB"]),
                }),
            );
        }
    }

    fn click(ui: &mut UiRuntime, list: WindowId, pos: Point, modifiers: Modifiers) {
        ui.send(
            list,
            Message::ButtonDown {
                button: MouseButton::Left,
                pos,
                modifiers,
                double_click: false,
            },
        );
        ui.send(
            list,
            Message::ButtonUp {
                button: MouseButton::Left,
                pos,
                modifiers,
            },
        );
    }

    fn row_point(row: i32) -> Point {
        Point::new(50, 20 + row * 18 + 5)
    }

    fn selection(ui: &UiRuntime, list: WindowId) -> Vec<usize> {
        ui.with_behavior::<ListView, _>(list, |l| l.selection()).unwrap()
    }

    #[test]
    fn test_click_ctrl_and_shift_selection() {
        let (mut ui, list, _) = setup(ListStyle::empty());
        add_rows(&mut ui, list, &["a", "b", "c", "d", "e"]);

        click(&mut ui, list, row_point(1), Modifiers::empty());
        assert_eq!(selection(&ui, list), vec![1]);
        click(&mut ui, list, row_point(3), Modifiers::CTRL);
        assert_eq!(selection(&ui, list), vec![1, 3]);
        click(&mut ui, list, row_point(1), Modifiers::CTRL);
        assert_eq!(selection(&ui, list), vec![3]);
        click(&mut ui, list, row_point(0), Modifiers::SHIFT);
        assert_eq!(selection(&ui, list), vec![0, 1]);
        click(&mut ui, list, row_point(4), Modifiers::empty());
        assert_eq!(selection(&ui, list), vec![4]);
        click(&mut ui, list, row_point(8), Modifiers::empty());
        assert_eq!(selection(&ui, list), Vec::<usize>::new());
    }

    #[test]
    fn test_single_select_ignores_modifiers() {
        let (mut ui, list, _) = setup(ListStyle::SINGLE_SELECT);
        add_rows(&mut ui, list, &["a", "b", "c"]);
        click(&mut ui, list, row_point(0), Modifiers::empty());
        click(&mut ui, list, row_point(2), Modifiers::SHIFT);
        assert_eq!(selection(&ui, list), vec![2]);
        ui.send(list, Message::KeyDown { key: Key::Char('a'), modifiers: Modifiers::CTRL });
        assert_eq!(selection(&ui, list), vec![2]);
    }

    #[test]
    fn test_item_changed_notifications() {
        let (mut ui, list, log) = setup(ListStyle::empty());
        add_rows(&mut ui, list, &["a", "b"]);
        click(&mut ui, list, row_point(0), Modifiers::empty());
        log.borrow_mut().clear();
        click(&mut ui, list, row_point(1), Modifiers::empty());
        let log = log.borrow();
        let changes: Vec<_> = log
            .iter()
            .filter(|(code, _)| *code == LVN_ITEMCHANGED)
            .filter_map(|(_, change)| *change)
            .collect();
        assert_eq!(
            changes,
            vec![
                ListItemChanged {
                    row: Some(0),
                    old: RowState::SELECTED,
                    new: RowState::empty(),
                },
                ListItemChanged {
                    row: Some(1),
                    old: RowState::empty(),
                    new: RowState::SELECTED,
                },
            ]
        );
        assert!(log.iter().any(|(code, _)| *code == NM_CLICK));
    }

    #[test]
    fn test_keyboard_navigation_and_select_all() {
        let (mut ui, list, _) = setup(ListStyle::empty());
        add_rows(&mut ui, list, &["a", "b", "c", "d"]);
        ui.send(list, Message::KeyDown { key: Key::Down, modifiers: Modifiers::empty() });
        assert_eq!(selection(&ui, list), vec![1]);
        ui.send(list, Message::KeyDown { key: Key::End, modifiers: Modifiers::SHIFT });
        assert_eq!(selection(&ui, list), vec![1, 2, 3]);
        ui.send(list, Message::KeyDown { key: Key::Home, modifiers: Modifiers::empty() });
        assert_eq!(selection(&ui, list), vec![0]);
        ui.send(list, Message::KeyDown { key: Key::Char('a'), modifiers: Modifiers::CTRL });
        assert_eq!(ui.send(list, Message::control(ListRequest::SelectedCount)), 4);
    }

    #[test]
    fn test_owner_data_selection_and_shrink() {
        let (mut ui, list, _) = setup(ListStyle::OWNER_DATA);
        ui.send(list, Message::control(ListRequest::SetItemCount(1000)));
        for row in [5, 500, 999] {
            ui.send(list, Message::control(ListRequest::SetSelected { row, selected: true }));
        }
        ui.send(list, Message::control(ListRequest::SetSelected { row: 1000, selected: true }));
        assert_eq!(selection(&ui, list), vec![5, 500, 999]);

        ui.send(list, Message::control(ListRequest::SetItemCount(600)));
        assert_eq!(selection(&ui, list), vec![5, 500]);
        ui.send(list, Message::control(ListRequest::SetItemCount(1000)));
        assert_eq!(ui.send(list, Message::control(ListRequest::IsSelected(999))), 0);
        assert_eq!(ui.send(list, Message::control(ListRequest::RowCount)), 1000);
    }

    #[test]
    fn test_owner_data_text_comes_from_parent() {
        let (mut ui, list, _) = setup(ListStyle::OWNER_DATA);
        ui.send(list, Message::control(ListRequest::SetItemCount(50)));
        let mut painter = RecordingPainter::new();
        let frame = ui.parent(list).unwrap();
        ui.paint(frame, &mut painter);
        let texts = painter.texts();
        assert!(texts.contains(&"r0c0"));
        assert!(texts.contains(&"r3c1"));
        assert!(!texts.contains(&"r40c0"));

        let mut msg = Message::control(ListRequest::GetText {
            row: 42,
            column: 1,
            text: String::new(),
        });
        ui.dispatch(list, &mut msg);
        match msg.control_mut::<ListRequest>() {
            Some(ListRequest::GetText { text, .. }) => assert_eq!(text, "r42c1"),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_hit_testing() {
        let (mut ui, list, _) = setup(ListStyle::STATUS_ICONS);
        add_rows(&mut ui, list, &["a", "b"]);
        let hit = |ui: &UiRuntime, pos| {
            ui.with_behavior::<ListView, _>(list, |l| l.hit_test(ui, list, pos))
                .unwrap()
        };
        // Columns start after the 16px status column: borders at 116 and 216.
        assert_eq!(hit(&ui, Point::new(50, 5)), ListHit::Header { column: 0 });
        assert_eq!(hit(&ui, Point::new(118, 5)), ListHit::ColumnBorder { column: 0 });
        assert_eq!(hit(&ui, Point::new(118, 25)), ListHit::Row { row: 0, column: Some(1) });
        assert_eq!(hit(&ui, Point::new(5, 45)), ListHit::StatusIcon { row: 1 });
        assert_eq!(hit(&ui, Point::new(250, 25)), ListHit::Row { row: 0, column: None });
        assert_eq!(hit(&ui, Point::new(50, 150)), ListHit::Empty);
    }

    #[test]
    fn test_border_outside_header_only_without_header() {
        let (mut ui, list, _) = setup(ListStyle::NO_HEADER);
        add_rows(&mut ui, list, &["a"]);
        let hit = ui
            .with_behavior::<ListView, _>(list, |l| l.hit_test(&ui, list, Point::new(102, 5)))
            .unwrap();
        assert_eq!(hit, ListHit::ColumnBorder { column: 0 });
    }

    #[test]
    fn test_column_resize_drag() {
        let (mut ui, list, log) = setup(ListStyle::empty());
        ui.send(
            list,
            Message::ButtonDown {
                button: MouseButton::Left,
                pos: Point::new(99, 5),
                modifiers: Modifiers::empty(),
                double_click: false,
            },
        );
        assert_eq!(ui.capture(), Some(list));
        ui.send(
            list,
            Message::MouseMove {
                pos: Point::new(139, 5),
                modifiers: Modifiers::empty(),
            },
        );
        ui.send(
            list,
            Message::ButtonUp {
                button: MouseButton::Left,
                pos: Point::new(139, 5),
                modifiers: Modifiers::empty(),
            },
        );
        assert_eq!(ui.capture(), None);
        assert_eq!(ui.send(list, Message::control(ListRequest::GetColumnWidth(0))), 140);
        assert!(log.borrow().iter().any(|(code, _)| *code == LVN_ENDCOLUMNRESIZE));
    }

    #[test]
    fn test_status_icon_click_toggles_checked() {
        let (mut ui, list, _) = setup(ListStyle::STATUS_ICONS);
        add_rows(&mut ui, list, &["a"]);
        click(&mut ui, list, Point::new(5, 25), Modifiers::empty());
        let state = ui.with_behavior::<ListView, _>(list, |l| l.rows()[0].state);
        assert_eq!(state, Some(RowState::CHECKED));
    }

    #[test]
    fn test_type_ahead_cycles_and_refines() {
        let (mut ui, list, _) = setup(ListStyle::SINGLE_SELECT);
        add_rows(&mut ui, list, &["apple", "banana", "blueberry", "cherry"]);
        let type_char = |ui: &mut UiRuntime, ch| {
            ui.send(list, Message::Char { ch, modifiers: Modifiers::empty() });
        };
        type_char(&mut ui, 'b');
        assert_eq!(selection(&ui, list), vec![1]);
        type_char(&mut ui, 'l');
        assert_eq!(selection(&ui, list), vec![2]);
        type_char(&mut ui, 'x');
        assert_eq!(selection(&ui, list), vec![2]);
    }

    #[test]
    fn test_delete_row_shifts_focus() {
        let (mut ui, list, _) = setup(ListStyle::empty());
        add_rows(&mut ui, list, &["a", "b", "c"]);
        click(&mut ui, list, row_point(2), Modifiers::empty());
        ui.send(list, Message::control(ListRequest::DeleteRow(0)));
        assert_eq!(ui.send(list, Message::control(ListRequest::GetFocusedRow)), 1);
        assert_eq!(selection(&ui, list), vec![1]);
        assert_eq!(ui.send(list, Message::control(ListRequest::DeleteAllRows)), 1);
        assert_eq!(ui.send(list, Message::control(ListRequest::GetFocusedRow)), -1);
    }

    #[test]
    fn test_wheel_scrolls_rows() {
        let (mut ui, list, _) = setup(ListStyle::OWNER_DATA);
        ui.send(list, Message::control(ListRequest::SetItemCount(100)));
        ui.send(
            list,
            Message::Wheel {
                delta: -2,
                horizontal: false,
                pos: Point::new(10, 40),
                modifiers: Modifiers::empty(),
            },
        );
        assert_eq!(ui.with_behavior::<ListView, _>(list, |l| l.top_row()), Some(6));
        ui.send(list, Message::control(ListRequest::EnsureVisible(0)));
        assert_eq!(ui.with_behavior::<ListView, _>(list, |l| l.top_row()), Some(0));
    }

    #[test]
    fn test_huge_owner_data_list_paints_and_drags_thumb() {
        let (mut ui, list, _) = setup(ListStyle::OWNER_DATA);
        let style = ui.style(list).unwrap() | WindowStyle::VSCROLL;
        ui.set_style(list, style);
        ui.send(list, Message::control(ListRequest::SetItemCount(10_000_000)));
        ui.send(list, Message::KeyDown { key: Key::End, modifiers: Modifiers::empty() });
        let top_row = |ui: &UiRuntime| ui.with_behavior::<ListView, _>(list, |l| l.top_row()).unwrap();
        // Ten 18px rows fit below the header.
        assert_eq!(top_row(&ui), 9_999_990);

        let frame = ui.parent(list).unwrap();
        let mut painter = RecordingPainter::new();
        ui.paint(frame, &mut painter);
        assert!(painter.texts().contains(&"r9999999c0"));

        // The minimum-length thumb sits at the bottom of the 200px track.
        let down = |pos| Message::ButtonDown {
            button: MouseButton::Left,
            pos,
            modifiers: Modifiers::empty(),
            double_click: false,
        };
        let to = |y| Message::MouseMove {
            pos: Point::new(290, y),
            modifiers: Modifiers::empty(),
        };
        ui.send(list, down(Point::new(290, 195)));
        assert_eq!(ui.capture(), Some(list));
        ui.send(list, to(99));
        assert_eq!(top_row(&ui), 4_999_995);
        ui.send(list, to(3));
        assert_eq!(top_row(&ui), 0);
        ui.send(
            list,
            Message::ButtonUp {
                button: MouseButton::Left,
                pos: Point::new(290, 3),
                modifiers: Modifiers::empty(),
            },
        );
        let mut painter = RecordingPainter::new();
        ui.paint(frame, &mut painter);
        assert!(painter.texts().contains(&"r0c0"));
    }

    #[test]
    fn test_destroyed_list_with_default_parent() {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let frame = ui
            .create_window(WindowParams::top_level(Rect::from_xywh(0, 0, 100, 100)), DefaultBehavior)
            .unwrap();
        let list = ui
            .create_window(WindowParams::child(frame, 1, Rect::from_xywh(0, 0, 100, 100)), ListView::new())
            .unwrap();
        assert!(ui.destroy_window(list));
        assert_eq!(ui.send(list, Message::control(ListRequest::RowCount)), 0);
    }
}
