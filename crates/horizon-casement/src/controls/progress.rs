//! Progress bar. Display only; it takes no input and sends no notifications.

use horizon_casement_core::{Message, Painter, Rect, Result, UiRuntime, WindowBehavior, WindowId};

pub(crate) const CLASS_NAME: &str = "Progress";

/// Requests understood by [`ProgressBar`].
///
/// Position-changing requests reply with the previous position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressRequest {
    /// Set the range; the position is clamped into it.
    SetRange {
        /// Empty bar.
        min: i32,
        /// Full bar.
        max: i32,
    },
    /// Move to a position (clamped).
    SetPos(i32),
    /// Move by an offset (clamped).
    DeltaPos(i32),
    /// Set the increment used by [`ProgressRequest::StepIt`]. Replies with
    /// the previous increment.
    SetStep(i32),
    /// Advance by the step. Passing the maximum wraps to the minimum.
    StepIt,
    /// Reply with the position.
    GetPos,
    /// Reply with the lower bound.
    GetRangeMin,
    /// Reply with the upper bound.
    GetRangeMax,
}

/// A progress bar.
#[derive(Debug)]
pub struct ProgressBar {
    min: i32,
    max: i32,
    pos: i32,
    step: i32,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            min: 0,
            max: 100,
            pos: 0,
            step: 10,
        }
    }
}

impl ProgressBar {
    /// Create a bar over `0..=100` with a step of 10.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position.
    pub fn pos(&self) -> i32 {
        self.pos
    }

    /// Filled fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        f64::from(self.pos - self.min) / f64::from(self.max - self.min)
    }

    fn set_pos(&mut self, ui: &mut UiRuntime, hwnd: WindowId, pos: i32) -> isize {
        let previous = self.pos;
        self.pos = pos.clamp(self.min, self.max);
        if self.pos != previous {
            ui.invalidate(hwnd, None);
        }
        previous as isize
    }
}

impl WindowBehavior for ProgressBar {
    fn handle(&mut self, ui: &mut UiRuntime, hwnd: WindowId, msg: &mut Message) -> Result<isize> {
        let Some(request) = msg.control_mut::<ProgressRequest>().copied() else {
            return Ok(ui.default_handle(hwnd, msg));
        };
        Ok(match request {
            ProgressRequest::SetRange { min, max } => {
                self.min = min.min(max);
                self.max = max.max(min);
                self.pos = self.pos.clamp(self.min, self.max);
                ui.invalidate(hwnd, None);
                1
            }
            ProgressRequest::SetPos(pos) => self.set_pos(ui, hwnd, pos),
            ProgressRequest::DeltaPos(delta) => {
                let target = self.pos.saturating_add(delta);
                self.set_pos(ui, hwnd, target)
            }
            ProgressRequest::SetStep(step) => std::mem::replace(&mut self.step, step) as isize,
            ProgressRequest::StepIt => {
                let mut target = self.pos.saturating_add(self.step);
                if target > self.max {
                    target = self.min + (target - self.max);
                }
                if target < self.min {
                    target = self.max - (self.min - target);
                }
                self.set_pos(ui, hwnd, target)
            }
            ProgressRequest::GetPos => self.pos as isize,
            ProgressRequest::GetRangeMin => self.min as isize,
            ProgressRequest::GetRangeMax => self.max as isize,
        })
    }

    fn paint(&self, ui: &UiRuntime, hwnd: WindowId, painter: &mut dyn Painter) {
        let colors = &ui.theme().colors;
        let client = ui.client_rect(hwnd).unwrap_or_default();
        painter.fill_rect(client, colors.window);
        let filled = (f64::from(client.width()) * self.fraction()).round() as i32;
        if filled > 0 {
            painter.fill_rect(
                Rect::new(client.left, client.top, client.left + filled, client.bottom),
                colors.highlight,
            );
        }
        painter.frame_rect(client, colors.shadow);
    }

    fn class_name(&self) -> &'static str {
        CLASS_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_casement_core::{
        DefaultBehavior, PaintOp, RecordingPainter, RuntimeConfig, WindowParams,
    };

    fn fixture() -> (UiRuntime, WindowId, WindowId) {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let frame = ui
            .create_window(WindowParams::top_level(Rect::from_xywh(0, 0, 200, 50)), DefaultBehavior)
            .unwrap();
        let bar = ui
            .create_window(
                WindowParams::child(frame, 1, Rect::from_xywh(0, 0, 100, 10)),
                ProgressBar::new(),
            )
            .unwrap();
        (ui, frame, bar)
    }

    fn send(ui: &mut UiRuntime, bar: WindowId, request: ProgressRequest) -> isize {
        ui.send(bar, Message::control(request))
    }

    #[test]
    fn test_set_pos_returns_previous_and_clamps() {
        let (mut ui, _, bar) = fixture();
        assert_eq!(send(&mut ui, bar, ProgressRequest::SetPos(40)), 0);
        assert_eq!(send(&mut ui, bar, ProgressRequest::SetPos(140)), 40);
        assert_eq!(send(&mut ui, bar, ProgressRequest::GetPos), 100);
        assert_eq!(send(&mut ui, bar, ProgressRequest::DeltaPos(-130)), 100);
        assert_eq!(send(&mut ui, bar, ProgressRequest::GetPos), 0);
    }

    #[test]
    fn test_step_wraps_past_max() {
        let (mut ui, _, bar) = fixture();
        send(&mut ui, bar, ProgressRequest::SetStep(30));
        for _ in 0..3 {
            send(&mut ui, bar, ProgressRequest::StepIt);
        }
        assert_eq!(send(&mut ui, bar, ProgressRequest::GetPos), 90);
        send(&mut ui, bar, ProgressRequest::StepIt);
        assert_eq!(send(&mut ui, bar, ProgressRequest::GetPos), 20);
    }

    #[test]
    fn test_range_change_clamps() {
        let (mut ui, _, bar) = fixture();
        send(&mut ui, bar, ProgressRequest::SetPos(80));
        send(&mut ui, bar, ProgressRequest::SetRange { min: 0, max: 50 });
        assert_eq!(send(&mut ui, bar, ProgressRequest::GetPos), 50);
        assert_eq!(send(&mut ui, bar, ProgressRequest::GetRangeMax), 50);
    }

    #[test]
    fn test_paints_filled_fraction() {
        let (mut ui, frame, bar) = fixture();
        send(&mut ui, bar, ProgressRequest::SetPos(25));
        let mut painter = RecordingPainter::new();
        ui.paint(frame, &mut painter);
        let highlight = ui.theme().colors.highlight;
        assert!(painter
            .ops()
            .contains(&PaintOp::Fill(Rect::new(0, 0, 25, 10), highlight)));
    }
}
