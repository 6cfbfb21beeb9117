//! The UI runtime: owner of the window tree and every piece of UI-thread state.
//!
//! A [`UiRuntime`] holds the window arena, the top-level list, the message
//! queue, capture, focus, timers and the collaborators (theme, text metrics,
//! clipboard, profile). Everything except the queue is confined to the thread
//! that created the runtime; behaviors are `Rc`-shared, so the runtime is
//! neither `Send` nor `Sync`. Other threads reach it through a
//! [`PostHandle`].
//!
//! The operations of the runtime are spread over several modules, each adding
//! an `impl UiRuntime` block:
//!
//! - `dispatch`: creation, destruction, `dispatch`/`send`/`post`/`flush`
//! - `tree`: linkage, z-order, geometry, hit-testing, invalidation, painting
//! - `capture` and `focus`: input ownership
//! - `timer`: timers and the `tick` step
//! - `input`: translation of host input events

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use slotmap::SlotMap;

use crate::behavior::{SharedBehavior, SharedDialogBehavior, WindowBehavior};
use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::logging::targets;
use crate::message::Message;
use crate::painter::{MonospaceMetrics, TextMeasure};
use crate::profile::{MemoryProfile, Profile};
use crate::queue::{MessageQueue, PostHandle};
use crate::record::{Lifecycle, WindowId, WindowRecord};
use crate::theme::ThemeMetrics;
use crate::timer::TimerManager;

/// Default capacity of the asynchronous message queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

/// Configuration for a [`UiRuntime`].
///
/// ```
/// use horizon_casement_core::{MemoryProfile, RuntimeConfig, UiRuntime};
///
/// let config = RuntimeConfig::default()
///     .with_queue_capacity(256)
///     .with_profile(MemoryProfile::new());
/// let ui = UiRuntime::new(config);
/// assert_eq!(ui.queue_capacity(), 256);
/// ```
pub struct RuntimeConfig {
    /// Capacity of the asynchronous message queue.
    pub queue_capacity: usize,
    /// Theme metrics.
    pub theme: ThemeMetrics,
    profile: Option<Box<dyn Profile>>,
    clipboard: Option<Box<dyn Clipboard>>,
    text_metrics: Option<Box<dyn TextMeasure>>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            theme: ThemeMetrics::default(),
            profile: None,
            clipboard: None,
            text_metrics: None,
        }
    }
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("queue_capacity", &self.queue_capacity)
            .field("theme", &self.theme)
            .field("profile", &self.profile.is_some())
            .field("clipboard", &self.clipboard.is_some())
            .field("text_metrics", &self.text_metrics.is_some())
            .finish()
    }
}

impl RuntimeConfig {
    /// Set the queue capacity (at least 1).
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the theme.
    pub fn with_theme(mut self, theme: ThemeMetrics) -> Self {
        self.theme = theme;
        self
    }

    /// Use the given preference store.
    pub fn with_profile(mut self, profile: impl Profile + 'static) -> Self {
        self.profile = Some(Box::new(profile));
        self
    }

    /// Use the given clipboard.
    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Some(Box::new(clipboard));
        self
    }

    /// Use the given text metrics instead of the theme's monospace metrics.
    pub fn with_text_metrics(mut self, metrics: impl TextMeasure + 'static) -> Self {
        self.text_metrics = Some(Box::new(metrics));
        self
    }
}

/// A message for a window whose behavior was busy when it arrived.
pub(crate) struct Deferred {
    pub(crate) hwnd: WindowId,
    pub(crate) behavior: Option<SharedBehavior>,
    pub(crate) dialog: Option<SharedDialogBehavior>,
    pub(crate) message: Message,
}

/// The UI runtime.
pub struct UiRuntime {
    pub(crate) windows: SlotMap<WindowId, WindowRecord>,
    /// Top-level windows; index 0 is the bottom of the z-order.
    pub(crate) top_levels: Vec<WindowId>,
    pub(crate) queue: Arc<MessageQueue>,
    pub(crate) timers: TimerManager,
    pub(crate) capture: Option<WindowId>,
    pub(crate) active: Option<WindowId>,
    pub(crate) deferred: Vec<Deferred>,
    pub(crate) now: Instant,
    pub(crate) shut_down: bool,
    theme: ThemeMetrics,
    profile: Box<dyn Profile>,
    clipboard: Box<dyn Clipboard>,
    text_metrics: Box<dyn TextMeasure>,
}

impl UiRuntime {
    /// Create a runtime.
    pub fn new(config: RuntimeConfig) -> Self {
        let RuntimeConfig {
            queue_capacity,
            theme,
            profile,
            clipboard,
            text_metrics,
        } = config;
        let text_metrics = text_metrics.unwrap_or_else(|| {
            Box::new(MonospaceMetrics {
                char_width: theme.char_width,
                line_height: theme.line_height,
            })
        });
        tracing::debug!(target: targets::CORE, queue_capacity, "runtime created");
        Self {
            windows: SlotMap::with_key(),
            top_levels: Vec::new(),
            queue: Arc::new(MessageQueue::new(queue_capacity.max(1))),
            timers: TimerManager::default(),
            capture: None,
            active: None,
            deferred: Vec::new(),
            now: Instant::now(),
            shut_down: false,
            theme,
            profile: profile.unwrap_or_else(|| Box::new(MemoryProfile::new())),
            clipboard: clipboard.unwrap_or_else(|| Box::new(MemoryClipboard::new())),
            text_metrics,
        }
    }

    // =========================================================================
    // Collaborators
    // =========================================================================

    /// Theme metrics.
    pub fn theme(&self) -> &ThemeMetrics {
        &self.theme
    }

    /// Text metrics.
    pub fn text_metrics(&self) -> &dyn TextMeasure {
        self.text_metrics.as_ref()
    }

    /// The clipboard.
    pub fn clipboard_mut(&mut self) -> &mut dyn Clipboard {
        self.clipboard.as_mut()
    }

    /// The preference store.
    pub fn profile(&self) -> &dyn Profile {
        self.profile.as_ref()
    }

    /// The preference store, mutably.
    pub fn profile_mut(&mut self) -> &mut dyn Profile {
        self.profile.as_mut()
    }

    /// Current time as seen by timers and controls (advanced by `tick`).
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Capacity of the message queue.
    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Number of posted messages waiting for the next flush.
    pub fn pending_messages(&self) -> usize {
        self.queue.len()
    }

    /// A thread-safe handle for posting messages.
    pub fn post_handle(&self) -> PostHandle {
        PostHandle(Arc::clone(&self.queue))
    }

    // =========================================================================
    // Record access
    // =========================================================================

    /// The record of a window that has not finished destruction.
    #[inline]
    pub(crate) fn record(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows
            .get(id)
            .filter(|r| r.lifecycle != Lifecycle::Destroyed)
    }

    #[inline]
    pub(crate) fn record_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.windows
            .get_mut(id)
            .filter(|r| r.lifecycle != Lifecycle::Destroyed)
    }

    /// The record of a live window.
    #[inline]
    pub(crate) fn alive(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.get(id).filter(|r| r.is_alive())
    }

    #[inline]
    pub(crate) fn alive_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.windows.get_mut(id).filter(|r| r.is_alive())
    }

    /// Whether `id` names a live window.
    pub fn is_window(&self, id: WindowId) -> bool {
        self.alive(id).is_some()
    }

    /// Number of live windows.
    pub fn window_count(&self) -> usize {
        self.windows.values().filter(|r| r.is_alive()).count()
    }

    /// Number of arena slots still in use, including destroyed windows
    /// kept alive by an in-flight dispatch.
    pub fn slot_count(&self) -> usize {
        self.windows.len()
    }

    /// Class name of a window.
    pub fn class_name(&self, id: WindowId) -> Option<&'static str> {
        self.record(id).map(|r| r.class_name)
    }

    /// Borrow a window's behavior as its concrete type.
    ///
    /// Returns `None` if the window is gone, the behavior has another type,
    /// or the behavior is currently handling a message.
    pub fn with_behavior<T, R>(&self, id: WindowId, f: impl FnOnce(&T) -> R) -> Option<R>
    where
        T: WindowBehavior,
    {
        let behavior = self.record(id)?.behavior.clone()?;
        let guard = behavior.try_borrow().ok()?;
        let concrete = (*guard).as_any().downcast_ref::<T>()?;
        Some(f(concrete))
    }

    /// Mutably borrow a window's behavior as its concrete type.
    pub fn with_behavior_mut<T, R>(&self, id: WindowId, f: impl FnOnce(&mut T) -> R) -> Option<R>
    where
        T: WindowBehavior,
    {
        let behavior = self.record(id)?.behavior.clone()?;
        let mut guard = behavior.try_borrow_mut().ok()?;
        let concrete = (*guard).as_any_mut().downcast_mut::<T>()?;
        Some(f(concrete))
    }

    /// Replace the dialog behavior of a window.
    pub fn set_dialog_behavior(
        &mut self,
        id: WindowId,
        dialog: Option<SharedDialogBehavior>,
    ) -> bool {
        match self.alive_mut(id) {
            Some(record) => {
                record.dialog = dialog;
                true
            }
            None => false,
        }
    }

    /// Wrap a behavior for [`UiRuntime::create_window_shared`].
    pub fn share<B: WindowBehavior>(behavior: B) -> Rc<RefCell<B>> {
        Rc::new(RefCell::new(behavior))
    }

    // =========================================================================
    // Default handling
    // =========================================================================

    /// Default handling for messages a behavior does not process.
    pub fn default_handle(&mut self, hwnd: WindowId, msg: &mut Message) -> isize {
        match msg {
            Message::Close => {
                self.destroy_window(hwnd);
                0
            }
            Message::SetText(text) => {
                let text = std::mem::take(text);
                match self.record_mut(hwnd) {
                    Some(record) => {
                        record.text = text;
                        self.invalidate(hwnd, None);
                        1
                    }
                    None => 0,
                }
            }
            Message::GetText(buffer) => match self.record(hwnd) {
                Some(record) => {
                    buffer.clear();
                    buffer.push_str(&record.text);
                    record.text.len() as isize
                }
                None => 0,
            },
            Message::GetTextLength => self.record(hwnd).map_or(0, |r| r.text.len() as isize),
            Message::Wheel {
                delta,
                horizontal,
                pos,
                modifiers,
            } => {
                // Unhandled wheel input bubbles to the parent.
                let Some(parent) = self.record(hwnd).and_then(|r| r.parent) else {
                    return 0;
                };
                let screen = self.client_to_screen(hwnd, *pos).unwrap_or(*pos);
                let pos = self.screen_to_client(parent, screen).unwrap_or(*pos);
                self.dispatch(
                    parent,
                    &mut Message::Wheel {
                        delta: *delta,
                        horizontal: *horizontal,
                        pos,
                        modifiers: *modifiers,
                    },
                )
            }
            _ => 0,
        }
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Destroy every window, drop pending messages and timers, and flush the
    /// profile. Called automatically on drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        tracing::debug!(target: targets::CORE, windows = self.window_count(), "runtime shutting down");

        while let Some(&top) = self.top_levels.last() {
            if !self.destroy_window(top) {
                // Not alive but still listed: unlink directly.
                self.top_levels.pop();
            }
        }
        self.queue.close();
        self.timers.clear();
        self.deferred.clear();
        if let Err(err) = self.profile.flush() {
            tracing::debug!(target: targets::PROFILE, %err, "profile flush failed");
        }
    }
}

impl Drop for UiRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for UiRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiRuntime")
            .field("windows", &self.window_count())
            .field("top_levels", &self.top_levels.len())
            .field("pending", &self.queue.len())
            .field("timers", &self.timers.len())
            .field("capture", &self.capture)
            .field("active", &self.active)
            .finish()
    }
}
