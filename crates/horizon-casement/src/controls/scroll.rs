//! Scrollbar arithmetic shared by the scrolling controls.
//!
//! A [`ScrollRange`] tracks a position inside `0..=total - page` in
//! control-defined units (rows for lists, lines for edits). The vertical bar
//! occupies a strip on the right edge of the client area; its thumb length is
//! proportional to the visible page.

use horizon_casement_core::{Painter, Point, Rect, ThemeMetrics};

/// A scroll position and the extent it moves within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollRange {
    /// First visible unit.
    pub pos: i32,
    /// Units visible at once.
    pub page: i32,
    /// Total units.
    pub total: i32,
}

impl ScrollRange {
    /// Largest valid position.
    #[inline]
    pub fn max_pos(&self) -> i32 {
        (self.total - self.page).max(0)
    }

    /// Whether the content overflows the page.
    #[inline]
    pub fn is_needed(&self) -> bool {
        self.total > self.page
    }

    /// Move to `pos`, clamped. Returns whether the position changed.
    pub fn set_pos(&mut self, pos: i32) -> bool {
        let pos = pos.clamp(0, self.max_pos());
        let changed = pos != self.pos;
        self.pos = pos;
        changed
    }

    /// Update the page and total, keeping the position valid.
    pub fn set_extent(&mut self, page: i32, total: i32) {
        self.page = page.max(0);
        self.total = total.max(0);
        self.pos = self.pos.clamp(0, self.max_pos());
    }

    /// Scroll just enough to make unit `index` visible. Returns whether the
    /// position changed.
    pub fn ensure_visible(&mut self, index: i32) -> bool {
        if index < self.pos {
            self.set_pos(index)
        } else if self.page > 0 && index >= self.pos + self.page {
            self.set_pos(index - self.page + 1)
        } else {
            false
        }
    }

    /// The thumb rectangle inside a vertical `track`, if the bar is needed.
    pub fn thumb(&self, track: Rect, min_length: i32) -> Option<Rect> {
        if !self.is_needed() || track.is_empty() {
            return None;
        }
        let track_len = track.height();
        let length = mul_div(track_len, self.page, self.total.max(1))
            .max(min_length)
            .min(track_len);
        let travel = track_len - length;
        let offset = match self.max_pos() {
            0 => 0,
            max => mul_div(travel, self.pos, max),
        };
        Some(Rect::new(
            track.left,
            track.top + offset,
            track.right,
            track.top + offset + length,
        ))
    }

    /// Position for a thumb whose top edge is at `thumb_top`.
    pub fn pos_for_thumb(&self, track: Rect, min_length: i32, thumb_top: i32) -> i32 {
        let Some(thumb) = self.thumb(track, min_length) else {
            return 0;
        };
        let travel = track.height() - thumb.height();
        if travel <= 0 {
            return 0;
        }
        let offset = (thumb_top - track.top).clamp(0, travel);
        // Round to the nearest unit.
        let scaled = i64::from(offset) * i64::from(self.max_pos()) + i64::from(travel / 2);
        narrow(scaled / i64::from(travel))
    }
}

/// A row or line count as scroll units, saturating at `i32::MAX`.
#[inline]
pub fn units(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// `a * b / c` without intermediate overflow. `c` must be nonzero.
fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    narrow(i64::from(a) * i64::from(b) / i64::from(c))
}

fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// A thumb drag in progress: the grab offset from the thumb's top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbDrag {
    /// Pointer offset from the thumb's top edge at grab time.
    pub grab: i32,
}

/// Where a point falls on a vertical scrollbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarHit {
    /// On the thumb.
    Thumb(ThumbDrag),
    /// In the track above the thumb.
    PageUp,
    /// In the track below the thumb.
    PageDown,
}

/// The scrollbar strip on the right edge of `client`.
pub fn vertical_track(client: Rect, theme: &ThemeMetrics) -> Rect {
    Rect::new(
        client.right - theme.scrollbar_width,
        client.top,
        client.right,
        client.bottom,
    )
}

/// Classify a point inside `track`.
pub fn hit_bar(range: &ScrollRange, track: Rect, theme: &ThemeMetrics, point: Point) -> Option<BarHit> {
    if !track.contains(point) {
        return None;
    }
    let thumb = range.thumb(track, theme.min_thumb_length)?;
    Some(if point.y < thumb.top {
        BarHit::PageUp
    } else if point.y >= thumb.bottom {
        BarHit::PageDown
    } else {
        BarHit::Thumb(ThumbDrag {
            grab: point.y - thumb.top,
        })
    })
}

/// Paint a vertical scrollbar.
pub fn paint_vertical(range: &ScrollRange, track: Rect, theme: &ThemeMetrics, painter: &mut dyn Painter) {
    painter.fill_rect(track, theme.colors.face);
    if let Some(thumb) = range.thumb(track, theme.min_thumb_length) {
        painter.fill_rect(thumb, theme.colors.shadow);
    }
}
