//! Static text.

use bitflags::bitflags;
use horizon_casement_core::{Message, Painter, Point, Result, UiRuntime, WindowBehavior, WindowId};

pub(crate) const CLASS_NAME: &str = "Label";

bitflags! {
    /// Label alignment, passed as the control style. Left is the default.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LabelStyle: u32 {
        /// Centre each line.
        const CENTER = 1 << 0;
        /// Right-align each line.
        const RIGHT  = 1 << 1;
    }
}

/// A label showing its window text, one line per `\n`.
#[derive(Debug, Default)]
pub struct Label {
    style: LabelStyle,
}

impl Label {
    /// Create a left-aligned label.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alignment bits.
    pub fn style(&self) -> LabelStyle {
        self.style
    }
}

impl WindowBehavior for Label {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        match msg {
            Message::Create(info) => {
                self.style = LabelStyle::from_bits_truncate(info.control_style);
                Ok(0)
            }
            Message::SetText(_) => {
                let reply = ui.default_handle(hwnd, msg);
                ui.invalidate(hwnd, None);
                Ok(reply)
            }
            _ => Ok(ui.default_handle(hwnd, msg)),
        }
    }

    fn paint(&self, ui: &UiRuntime, hwnd: WindowId, painter: &mut dyn Painter) {
        let colors = &ui.theme().colors;
        let client = ui.client_rect(hwnd).unwrap_or_default();
        let color = if ui.is_enabled(hwnd) {
            colors.text
        } else {
            colors.disabled_text
        };
        let metrics = ui.text_metrics();
        let text = ui.raw_text(hwnd).unwrap_or_default();
        for (index, line) in text.lines().enumerate() {
            let width = metrics.text_width(line);
            let left = if self.style.contains(LabelStyle::RIGHT) {
                client.right - width
            } else if self.style.contains(LabelStyle::CENTER) {
                client.left + (client.width() - width) / 2
            } else {
                client.left
            };
            let top = client.top + index as i32 * metrics.line_height();
            painter.draw_text(Point::new(left, top), line, color);
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
        DefaultBehavior, PaintOp, Rect, RecordingPainter, RuntimeConfig, WindowParams,
    };

    fn painted(style: LabelStyle, text: &str) -> Vec<(Point, String)> {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let frame = ui
            .create_window(WindowParams::top_level(Rect::from_xywh(0, 0, 200, 100)), DefaultBehavior)
            .unwrap();
        ui.create_window(
            WindowParams::child(frame, 1, Rect::from_xywh(0, 0, 100, 40))
                .with_text(text)
                .with_control_style(style.bits()),
            Label::new(),
        )
        .unwrap();
        let mut painter = RecordingPainter::new();
        ui.paint(frame, &mut painter);
        painter
            .ops()
            .iter()
            .filter_map(|op| match op {
                PaintOp::Text(origin, text, _) => Some((*origin, text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_alignment() {
        assert_eq!(painted(LabelStyle::empty(), "ab"), vec![(Point::new(0, 0), "ab".into())]);
        assert_eq!(painted(LabelStyle::RIGHT, "ab"), vec![(Point::new(86, 0), "ab".into())]);
        assert_eq!(painted(LabelStyle::CENTER, "ab"), vec![(Point::new(43, 0), "ab".into())]);
    }

    #[test]
    fn test_one_line_per_newline() {
        let lines = painted(LabelStyle::empty(), "Name:\nAge:");
        assert_eq!(
            lines,
            vec![
                (Point::new(0, 0), "Name:".into()),
                (Point::new(0, 16), "Age:".into()),
            ]
        );
    }

    #[test]
    fn test_set_text_updates_raw_text() {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let frame = ui
            .create_window(WindowParams::top_level(Rect::from_xywh(0, 0, 200, 100)), DefaultBehavior)
            .unwrap();
        let label = ui
            .create_window(WindowParams::child(frame, 1, Rect::from_xywh(0, 0, 100, 20)), Label::new())
            .unwrap();
        ui.send(label, Message::SetText("Ready".into()));
        assert_eq!(ui.raw_text(label), Some("Ready"));
    }
}
