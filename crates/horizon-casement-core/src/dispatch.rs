//! Message dispatch: creation, destruction, synchronous and queued delivery.
//!
//! # Reference counting
//!
//! Every record starts with one reference held by the tree. Each in-flight
//! [`UiRuntime::dispatch`] takes another and releases it on return. The arena
//! slot is only freed when the count reaches zero, so a behavior that destroys
//! its own window (directly or through a descendant) keeps a valid record
//! until it returns.
//!
//! # Destruction
//!
//! Dispatching [`Message::Destroy`] moves the record from `Alive` to
//! `Destroying`; that transition is the only authority over destruction, and
//! any later destroy request returns immediately. After the behavior has seen
//! the message the destruction cascades depth-first to children and
//! non-modal owned windows, capture and focus are released, timers are
//! cancelled, and the record is unlinked.
//!
//! # Re-entrancy
//!
//! A message sent to a window whose behavior is already on the call stack
//! cannot be delivered in place. It is deferred (the caller gets a `0`
//! reply) and delivered as soon as the outer invocation returns.

use std::mem;

use crate::behavior::{SharedBehavior, SharedDialogBehavior, WindowBehavior};
use crate::logging::targets;
use crate::message::{CreateInfo, Message};
use crate::profile;
use crate::record::{Lifecycle, WindowId, WindowParams, WindowRecord, WindowStyle};
use crate::runtime::{Deferred, UiRuntime};

use std::cell::RefCell;
use std::rc::Rc;

/// Reply to [`Message::Create`] that aborts creation.
pub const CREATE_ABORT: isize = -1;

impl UiRuntime {
    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a window with the given behavior.
    ///
    /// The window is linked under `params.parent` (as the top-most child) or
    /// as a new top-level window, registered with the message queue, and
    /// sent [`Message::Create`]. Returns `None` if the parent or owner is not
    /// a live window, or if the behavior replies [`CREATE_ABORT`].
    pub fn create_window<B: WindowBehavior>(
        &mut self,
        params: WindowParams,
        behavior: B,
    ) -> Option<WindowId> {
        self.create_window_shared(params, Rc::new(RefCell::new(behavior)), None)
    }

    /// Create a window from an already shared behavior and an optional
    /// dialog behavior.
    #[tracing::instrument(
        skip(self, params, behavior, dialog),
        target = "horizon_casement_core::dispatch",
        level = "debug"
    )]
    pub fn create_window_shared(
        &mut self,
        mut params: WindowParams,
        behavior: SharedBehavior,
        dialog: Option<SharedDialogBehavior>,
    ) -> Option<WindowId> {
        if self.shut_down {
            return None;
        }
        if let Some(parent) = params.parent
            && !self.is_window(parent)
        {
            tracing::debug!(target: targets::DISPATCH, ?parent, "create rejected: dead parent");
            return None;
        }
        let owner = match params.owner {
            Some(owner) if params.parent.is_none() => {
                if !self.is_window(owner) {
                    tracing::debug!(target: targets::DISPATCH, ?owner, "create rejected: dead owner");
                    return None;
                }
                Some(owner)
            }
            _ => None,
        };

        if params.parent.is_none()
            && let Some(key) = params.persist_key.as_deref()
            && let Some(rect) = profile::load_placement(self.profile(), key)
        {
            params.rect = rect;
        }

        let class_name = behavior
            .try_borrow()
            .map(|b| b.class_name())
            .unwrap_or("Window");
        let mut record = WindowRecord::new(&params, class_name);
        record.behavior = Some(behavior);
        record.dialog = dialog;
        record.owner = owner;
        if params.parent.is_some() {
            record.style |= WindowStyle::CHILD;
        } else {
            record.style.remove(WindowStyle::CHILD);
        }
        let id = self.windows.insert(record);

        match params.parent {
            Some(parent) => {
                if let Some(parent) = self.record_mut(parent) {
                    parent.children.push(id);
                }
            }
            None => self.top_levels.push(id),
        }
        if let Some(owner) = owner
            && let Some(owner) = self.record_mut(owner)
        {
            owner.owned.push(id);
        }
        self.queue.register(id);
        tracing::debug!(target: targets::DISPATCH, ?id, class_name, "window created");

        let mut create = Message::Create(CreateInfo {
            text: params.text.clone(),
            style: params.style,
            control_style: params.control_style,
            param: params.param,
        });
        if self.dispatch(id, &mut create) == CREATE_ABORT {
            tracing::debug!(target: targets::DISPATCH, ?id, class_name, "creation aborted");
            self.destroy_window(id);
            return None;
        }
        if !self.is_window(id) {
            return None;
        }
        self.invalidate(id, None);
        Some(id)
    }

    // =========================================================================
    // Destruction
    // =========================================================================

    /// Destroy a window and everything it contains or owns (except modal
    /// owned windows, which are released from the owner instead).
    ///
    /// Idempotent: returns `false` if the window is not alive.
    pub fn destroy_window(&mut self, id: WindowId) -> bool {
        if !self.is_window(id) {
            return false;
        }
        self.dispatch(id, &mut Message::Destroy);
        true
    }

    fn destroy_cascade(&mut self, id: WindowId) {
        let (children, owned) = match self.record(id) {
            Some(record) => (record.children.clone(), record.owned.clone()),
            None => return,
        };
        for child in children.into_iter().rev() {
            self.dispatch(child, &mut Message::Destroy);
        }
        for window in owned {
            let modal = self.record(window).is_some_and(|r| r.modal);
            if modal {
                if let Some(record) = self.record_mut(window) {
                    record.owner = None;
                }
                if let Some(record) = self.record_mut(id) {
                    record.owned.retain(|&w| w != window);
                }
            } else {
                self.dispatch(window, &mut Message::Destroy);
            }
        }

        if self.capture == Some(id) {
            self.release_capture();
        }
        self.transfer_focus_from(id);
        self.timers.kill_owned_by(id);
        if let Some(record) = self.record_mut(id) {
            record.behavior = None;
            record.dialog = None;
        }
    }

    /// Unlink a record whose destroy notification has been delivered.
    fn unlink(&mut self, id: WindowId) {
        let Some(record) = self.record(id) else {
            return;
        };
        let parent = record.parent;
        let owner = record.owner;
        let rect = record.rect;
        let visible = record.is_visible();
        let placement = match (parent, record.persist_key.clone()) {
            (None, Some(key)) => Some((key, rect)),
            _ => None,
        };
        let owned = record.owned.clone();

        self.queue.clear_for(id);
        if visible && let Some(parent) = parent {
            self.invalidate(parent, Some(rect));
        }
        match parent {
            Some(parent) => {
                if let Some(parent) = self.windows.get_mut(parent) {
                    parent.children.retain(|&c| c != id);
                    if parent.focused_child == Some(id) {
                        parent.focused_child = None;
                    }
                }
            }
            None => self.top_levels.retain(|&t| t != id),
        }
        if let Some(owner) = owner
            && let Some(owner) = self.windows.get_mut(owner)
        {
            owner.owned.retain(|&w| w != id);
        }
        for window in owned {
            if let Some(record) = self.windows.get_mut(window) {
                record.owner = None;
            }
        }
        if self.capture == Some(id) {
            self.capture = None;
        }
        if self.active == Some(id) {
            self.active = None;
        }
        if let Some((key, rect)) = placement {
            profile::save_placement(self.profile_mut(), &key, rect);
        }

        if let Some(record) = self.windows.get_mut(id) {
            record.lifecycle = Lifecycle::Destroyed;
            record.parent = None;
            record.owner = None;
            record.children.clear();
            record.owned.clear();
            record.focused_child = None;
            record.props.clear();
            record.behavior = None;
            record.dialog = None;
        }
        tracing::debug!(target: targets::DISPATCH, ?id, "window destroyed");
        self.release(id);
    }

    fn release(&mut self, id: WindowId) {
        let Some(record) = self.windows.get_mut(id) else {
            return;
        };
        record.refs = record.refs.saturating_sub(1);
        if record.refs == 0 {
            self.windows.remove(id);
            tracing::trace!(target: targets::DISPATCH, ?id, "record freed");
        }
    }

    // =========================================================================
    // Synchronous delivery
    // =========================================================================

    /// Deliver a message synchronously and return the behavior's reply.
    ///
    /// Returns `0` for invalid or destroyed windows. Messages other than
    /// `Destroy` are still delivered while a window is being destroyed.
    pub fn dispatch(&mut self, id: WindowId, msg: &mut Message) -> isize {
        let is_destroy = msg.is_destroy();
        let Some(record) = self.windows.get_mut(id) else {
            return 0;
        };
        match record.lifecycle {
            Lifecycle::Alive => {}
            Lifecycle::Destroying if !is_destroy => {}
            _ => return 0,
        }
        if is_destroy {
            record.lifecycle = Lifecycle::Destroying;
        }
        record.refs += 1;
        let behavior = record.behavior.clone();
        let dialog = record.dialog.clone();
        let class_name = record.class_name;
        tracing::trace!(target: targets::DISPATCH, ?id, class_name, message = msg.name(), "dispatch");

        if is_destroy {
            self.queue.unregister(id);
        }
        let reply = self.invoke(id, class_name, behavior, dialog, msg);
        if is_destroy {
            self.destroy_cascade(id);
            self.unlink(id);
        }
        self.release(id);
        reply
    }

    /// Convenience form of [`UiRuntime::dispatch`] taking the message by value.
    pub fn send(&mut self, id: WindowId, mut msg: Message) -> isize {
        self.dispatch(id, &mut msg)
    }

    fn invoke(
        &mut self,
        id: WindowId,
        class_name: &'static str,
        behavior: Option<SharedBehavior>,
        dialog: Option<SharedDialogBehavior>,
        msg: &mut Message,
    ) -> isize {
        let busy = behavior.as_ref().is_some_and(|b| b.try_borrow_mut().is_err())
            || dialog.as_ref().is_some_and(|d| d.try_borrow_mut().is_err());
        if busy {
            tracing::trace!(target: targets::DISPATCH, ?id, message = msg.name(), "re-entrant message deferred");
            self.deferred.push(Deferred {
                hwnd: id,
                behavior,
                dialog,
                message: mem::replace(msg, Message::Null),
            });
            return 0;
        }

        let reply = self.call_behaviors(id, class_name, behavior.as_ref(), dialog.as_ref(), msg);
        self.deliver_deferred(id, class_name);
        reply
    }

    fn call_behaviors(
        &mut self,
        id: WindowId,
        class_name: &'static str,
        behavior: Option<&SharedBehavior>,
        dialog: Option<&SharedDialogBehavior>,
        msg: &mut Message,
    ) -> isize {
        if let Some(dialog) = dialog {
            let result = match dialog.try_borrow_mut() {
                Ok(mut guard) => guard.handle(self, id, msg),
                Err(_) => return 0,
            };
            match result {
                Ok(Some(reply)) => return reply,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(target: targets::DISPATCH, ?id, class_name, message = msg.name(), %err, "dialog behavior failed");
                    return 0;
                }
            }
        }
        let Some(behavior) = behavior else {
            return 0;
        };
        let result = match behavior.try_borrow_mut() {
            Ok(mut guard) => guard.handle(self, id, msg),
            Err(_) => return 0,
        };
        result.unwrap_or_else(|err| {
            tracing::warn!(target: targets::DISPATCH, ?id, class_name, message = msg.name(), %err, "behavior failed");
            0
        })
    }

    fn deliver_deferred(&mut self, id: WindowId, class_name: &'static str) {
        while let Some(index) = self.deferred.iter().position(|d| d.hwnd == id) {
            let Deferred {
                behavior,
                dialog,
                mut message,
                ..
            } = self.deferred.remove(index);
            let deliverable = match self.windows.get(id) {
                Some(record) => match record.lifecycle {
                    Lifecycle::Alive | Lifecycle::Destroying => true,
                    Lifecycle::Destroyed => message.is_destroy(),
                },
                None => message.is_destroy(),
            };
            if !deliverable {
                tracing::trace!(target: targets::DISPATCH, ?id, message = message.name(), "deferred message dropped");
                continue;
            }
            tracing::trace!(target: targets::DISPATCH, ?id, message = message.name(), "deferred message delivered");
            self.invoke(id, class_name, behavior, dialog, &mut message);
        }
    }

    // =========================================================================
    // Queued delivery
    // =========================================================================

    /// Queue a message for delivery at the next [`UiRuntime::flush`].
    ///
    /// Returns `false` if the queue is full or `id` is not a live window.
    pub fn post(&mut self, id: WindowId, msg: Message) -> bool {
        self.queue.post(id, msg)
    }

    /// Deliver the messages that are queued when the flush starts, in post
    /// order. Messages posted during the flush wait for the next one.
    ///
    /// Returns the number of messages delivered.
    pub fn flush(&mut self) -> usize {
        let pending = self.queue.len();
        let mut delivered = 0;
        for _ in 0..pending {
            let Some(mut entry) = self.queue.pop() else {
                break;
            };
            self.dispatch(entry.target, &mut entry.message);
            delivered += 1;
        }
        if delivered > 0 {
            tracing::trace!(target: targets::QUEUE, delivered, "queue flushed");
        }
        delivered
    }

    /// Drop queued messages for one window without delivering them.
    pub fn clear_queue_for(&mut self, id: WindowId) -> usize {
        self.queue.clear_for(id)
    }

    /// Drop every queued message.
    pub fn clear_queue(&mut self) -> usize {
        self.queue.clear_all()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::behavior::FnBehavior;
    use crate::error::CasementError;
    use crate::geometry::Rect;
    use crate::runtime::RuntimeConfig;

    type Log = Rc<RefCell<Vec<String>>>;

    fn logging_behavior(name: &'static str, log: &Log) -> impl WindowBehavior {
        let log = Rc::clone(log);
        FnBehavior::new(name, move |ui, hwnd, msg| {
            log.borrow_mut().push(format!("{name}:{}", msg.name()));
            Ok(ui.default_handle(hwnd, msg))
        })
    }

    fn setup() -> (UiRuntime, Log) {
        (UiRuntime::new(RuntimeConfig::default()), Rc::new(RefCell::new(Vec::new())))
    }

    #[test]
    fn test_create_sends_create_and_links() {
        let (mut ui, log) = setup();
        let root = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 100, 100)),
                logging_behavior("root", &log),
            )
            .unwrap();
        let child = ui
            .create_window(
                WindowParams::child(root, 1, Rect::from_xywh(0, 0, 10, 10)),
                logging_behavior("child", &log),
            )
            .unwrap();

        assert_eq!(*log.borrow(), vec!["root:Create", "child:Create"]);
        assert_eq!(ui.parent(child), Some(root));
        assert_eq!(ui.children(root), vec![child]);
        assert_eq!(ui.class_name(child), Some("child"));
    }

    #[test]
    fn test_create_abort_returns_none() {
        let (mut ui, _log) = setup();
        let id = ui.create_window(
            WindowParams::top_level(Rect::from_xywh(0, 0, 10, 10)),
            FnBehavior::new("Refuse", |ui, hwnd, msg| match msg {
                Message::Create(_) => Ok(CREATE_ABORT),
                _ => Ok(ui.default_handle(hwnd, msg)),
            }),
        );
        assert!(id.is_none());
        assert_eq!(ui.window_count(), 0);
        assert!(ui.top_level_windows().is_empty());
    }

    #[test]
    fn test_create_under_dead_parent_fails() {
        let (mut ui, log) = setup();
        let root = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 10, 10)),
                logging_behavior("root", &log),
            )
            .unwrap();
        ui.destroy_window(root);
        assert!(
            ui.create_window(
                WindowParams::child(root, 1, Rect::EMPTY),
                logging_behavior("child", &log)
            )
            .is_none()
        );
    }

    #[test]
    fn test_destroy_is_idempotent_and_frees_slots() {
        let (mut ui, log) = setup();
        let root = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 10, 10)),
                logging_behavior("root", &log),
            )
            .unwrap();
        assert!(ui.destroy_window(root));
        assert!(!ui.destroy_window(root));
        assert_eq!(ui.send(root, Message::Destroy), 0);
        assert!(!ui.is_window(root));
        assert_eq!(ui.slot_count(), 0);

        let destroys = log.borrow().iter().filter(|e| e.ends_with("Destroy")).count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn test_behavior_destroying_itself_keeps_record_until_return() {
        let (mut ui, _log) = setup();
        let observed = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&observed);
        let id = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 10, 10)),
                FnBehavior::new("Suicidal", move |ui, hwnd, msg| {
                    if let Message::User { .. } = msg {
                        ui.destroy_window(hwnd);
                        *sink.borrow_mut() = Some((ui.is_window(hwnd), ui.slot_count()));
                        return Ok(5);
                    }
                    Ok(ui.default_handle(hwnd, msg))
                }),
            )
            .unwrap();

        let reply = ui.send(
            id,
            Message::User {
                code: 0,
                wparam: 0,
                lparam: 0,
            },
        );
        assert_eq!(reply, 5);
        assert_eq!(*observed.borrow(), Some((false, 1)));
        assert_eq!(ui.slot_count(), 0);
    }

    #[test]
    fn test_reentrant_message_is_deferred_until_return() {
        let (mut ui, _log) = setup();
        let order = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&order);
        let id = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 10, 10)),
                FnBehavior::new("Reentrant", move |ui, hwnd, msg| {
                    if let Message::User { code, .. } = *msg {
                        sink.borrow_mut().push(format!("begin {code}"));
                        if code == 1 {
                            let reply = ui.send(
                                hwnd,
                                Message::User {
                                    code: 2,
                                    wparam: 0,
                                    lparam: 0,
                                },
                            );
                            sink.borrow_mut().push(format!("inner reply {reply}"));
                        }
                        sink.borrow_mut().push(format!("end {code}"));
                        return Ok(code as isize);
                    }
                    Ok(ui.default_handle(hwnd, msg))
                }),
            )
            .unwrap();

        ui.send(
            id,
            Message::User {
                code: 1,
                wparam: 0,
                lparam: 0,
            },
        );
        assert_eq!(
            *order.borrow(),
            vec!["begin 1", "inner reply 0", "end 1", "begin 2", "end 2"]
        );
    }

    #[test]
    fn test_behavior_error_becomes_zero_reply() {
        let (mut ui, _log) = setup();
        let id = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 10, 10)),
                FnBehavior::new("Failing", |ui, hwnd, msg| match msg {
                    Message::User { .. } => Err(CasementError::behavior("Failing", "User", "boom")),
                    _ => Ok(ui.default_handle(hwnd, msg)),
                }),
            )
            .unwrap();
        assert_eq!(
            ui.send(
                id,
                Message::User {
                    code: 0,
                    wparam: 0,
                    lparam: 0
                }
            ),
            0
        );
        assert!(ui.is_window(id));
    }

    #[test]
    fn test_flush_delivers_only_entries_present_at_start() {
        let (mut ui, _log) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 10, 10)),
                FnBehavior::new("Reposter", move |ui, hwnd, msg| {
                    if let Message::User { code, .. } = *msg {
                        sink.borrow_mut().push(code);
                        ui.post(
                            hwnd,
                            Message::User {
                                code: code + 10,
                                wparam: 0,
                                lparam: 0,
                            },
                        );
                        return Ok(0);
                    }
                    Ok(ui.default_handle(hwnd, msg))
                }),
            )
            .unwrap();

        ui.post(
            id,
            Message::User {
                code: 1,
                wparam: 0,
                lparam: 0,
            },
        );
        assert_eq!(ui.flush(), 1);
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(ui.pending_messages(), 1);
        assert_eq!(ui.flush(), 1);
        assert_eq!(*seen.borrow(), vec![1, 11]);
    }

    #[test]
    fn test_destroy_purges_queue() {
        let (mut ui, log) = setup();
        let id = ui
            .create_window(
                WindowParams::top_level(Rect::from_xywh(0, 0, 10, 10)),
                logging_behavior("w", &log),
            )
            .unwrap();
        assert!(ui.post(id, Message::Close));
        ui.destroy_window(id);
        assert_eq!(ui.pending_messages(), 0);
        assert!(!ui.post(id, Message::Close));
        assert_eq!(ui.flush(), 0);
    }
}
