//! The raster back-end boundary.
//!
//! The runtime never touches pixels. During [`UiRuntime::paint`](crate::UiRuntime::paint)
//! each visible window paints through a [`Painter`] whose coordinates are the
//! window's client coordinates; translation and clipping to ancestors is done
//! by the runtime. Text layout queries go through [`TextMeasure`].

use crate::geometry::{Point, Rect};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// A drawing context handed to behaviors during painting.
pub trait Painter {
    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a one-pixel frame around a rectangle.
    fn frame_rect(&mut self, rect: Rect, color: Color);

    /// Draw a line.
    fn draw_line(&mut self, from: Point, to: Point, color: Color);

    /// Draw a single line of text with its top-left corner at `origin`.
    fn draw_text(&mut self, origin: Point, text: &str, color: Color);

    /// Restrict drawing to `rect` until the matching [`Painter::pop_clip`].
    fn push_clip(&mut self, rect: Rect);

    /// Undo the last [`Painter::push_clip`].
    fn pop_clip(&mut self);
}

/// Measures text for layout and hit-testing.
pub trait TextMeasure {
    /// Advance width of a character.
    fn char_width(&self, ch: char) -> i32;

    /// Height of a line of text.
    fn line_height(&self) -> i32;

    /// Width of a run of text.
    fn text_width(&self, text: &str) -> i32 {
        text.chars().map(|ch| self.char_width(ch)).sum()
    }
}

/// Fixed-pitch metrics; every character has the same advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceMetrics {
    /// Advance of every character.
    pub char_width: i32,
    /// Line height.
    pub line_height: i32,
}

impl TextMeasure for MonospaceMetrics {
    fn char_width(&self, ch: char) -> i32 {
        if ch == '\t' {
            self.char_width * 4
        } else {
            self.char_width
        }
    }

    fn line_height(&self) -> i32 {
        self.line_height
    }
}

/// A recorded painting operation (client coordinates of the surface).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintOp {
    /// [`Painter::fill_rect`].
    Fill(Rect, Color),
    /// [`Painter::frame_rect`].
    Frame(Rect, Color),
    /// [`Painter::draw_line`].
    Line(Point, Point, Color),
    /// [`Painter::draw_text`].
    Text(Point, String, Color),
}

/// A painter that records operations instead of rasterizing them.
///
/// Useful for headless hosts and tests.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    ops: Vec<PaintOp>,
    clips: Vec<Rect>,
}

impl RecordingPainter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded operations.
    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    /// All text drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Text(_, text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn clipped(&self, rect: Rect) -> Option<Rect> {
        let clipped = match self.clips.last() {
            Some(clip) => rect.intersection(clip),
            None => rect,
        };
        (!clipped.is_empty()).then_some(clipped)
    }
}

impl Painter for RecordingPainter {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(rect) = self.clipped(rect) {
            self.ops.push(PaintOp::Fill(rect, color));
        }
    }

    fn frame_rect(&mut self, rect: Rect, color: Color) {
        if let Some(rect) = self.clipped(rect) {
            self.ops.push(PaintOp::Frame(rect, color));
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        self.ops.push(PaintOp::Line(from, to, color));
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        let visible = match self.clips.last() {
            Some(clip) => !clip.is_empty() && origin.y >= clip.top && origin.y < clip.bottom,
            None => true,
        };
        if visible {
            self.ops.push(PaintOp::Text(origin, text.to_owned(), color));
        }
    }

    fn push_clip(&mut self, rect: Rect) {
        let rect = match self.clips.last() {
            Some(clip) => rect.intersection(clip),
            None => rect,
        };
        self.clips.push(rect);
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }
}

/// Translates a borrowed painter into a child window's client coordinates.
pub(crate) struct OffsetPainter<'a> {
    inner: &'a mut dyn Painter,
    dx: i32,
    dy: i32,
}

impl<'a> OffsetPainter<'a> {
    pub(crate) fn new(inner: &'a mut dyn Painter, dx: i32, dy: i32) -> Self {
        Self { inner, dx, dy }
    }
}

impl Painter for OffsetPainter<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.inner.fill_rect(rect.offset(self.dx, self.dy), color);
    }

    fn frame_rect(&mut self, rect: Rect, color: Color) {
        self.inner.frame_rect(rect.offset(self.dx, self.dy), color);
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        self.inner.draw_line(
            from.offset(self.dx, self.dy),
            to.offset(self.dx, self.dy),
            color,
        );
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        self.inner
            .draw_text(origin.offset(self.dx, self.dy), text, color);
    }

    fn push_clip(&mut self, rect: Rect) {
        self.inner.push_clip(rect.offset(self.dx, self.dy));
    }

    fn pop_clip(&mut self) {
        self.inner.pop_clip();
    }
}
