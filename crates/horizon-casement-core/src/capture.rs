//! Mouse capture.
//!
//! While a window holds capture every pointer event is routed to it,
//! regardless of the pointer position. Controls take capture for drags and
//! open drop-down lists.

use crate::logging::targets;
use crate::message::Message;
use crate::record::WindowId;
use crate::runtime::UiRuntime;

impl UiRuntime {
    /// The window holding mouse capture.
    pub fn capture(&self) -> Option<WindowId> {
        self.capture.filter(|&c| self.is_window(c))
    }

    /// Route all pointer input to `id`.
    ///
    /// The previous holder receives [`Message::CaptureChanged`] before the
    /// new capture takes effect. Setting capture to the current holder does
    /// nothing. Returns the previous holder.
    pub fn set_capture(&mut self, id: WindowId) -> Option<WindowId> {
        let previous = self.capture();
        if !self.is_window(id) || previous == Some(id) {
            return previous;
        }
        if let Some(previous) = previous {
            self.dispatch(previous, &mut Message::CaptureChanged { gaining: Some(id) });
        }
        if self.is_window(id) {
            self.capture = Some(id);
            tracing::trace!(target: targets::INPUT, ?id, ?previous, "capture set");
        }
        previous
    }

    /// Release mouse capture. Safe to call without capture.
    pub fn release_capture(&mut self) -> bool {
        let Some(previous) = self.capture.take() else {
            return false;
        };
        tracing::trace!(target: targets::INPUT, ?previous, "capture released");
        self.dispatch(previous, &mut Message::CaptureChanged { gaining: None });
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::behavior::FnBehavior;
    use crate::geometry::Rect;
    use crate::record::WindowParams;
    use crate::runtime::RuntimeConfig;

    fn probe(ui: &mut UiRuntime, log: &Rc<RefCell<Vec<(WindowId, Option<WindowId>)>>>) -> WindowId {
        let log = Rc::clone(log);
        ui.create_window(
            WindowParams::top_level(Rect::from_xywh(0, 0, 10, 10)),
            FnBehavior::new("CaptureProbe", move |ui, hwnd, msg| {
                if let Message::CaptureChanged { gaining } = msg {
                    log.borrow_mut().push((hwnd, *gaining));
                }
                Ok(ui.default_handle(hwnd, msg))
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_capture_notifies_previous_holder() {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = probe(&mut ui, &log);
        let b = probe(&mut ui, &log);

        assert_eq!(ui.set_capture(a), None);
        assert_eq!(ui.set_capture(a), Some(a));
        assert!(log.borrow().is_empty());

        assert_eq!(ui.set_capture(b), Some(a));
        assert_eq!(*log.borrow(), vec![(a, Some(b))]);
        assert_eq!(ui.capture(), Some(b));

        assert!(ui.release_capture());
        assert!(!ui.release_capture());
        assert_eq!(*log.borrow(), vec![(a, Some(b)), (b, None)]);
    }

    #[test]
    fn test_destroy_releases_capture() {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = probe(&mut ui, &log);
        ui.set_capture(a);
        ui.destroy_window(a);
        assert_eq!(ui.capture(), None);
    }
}
