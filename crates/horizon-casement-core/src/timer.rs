//! Window timers.
//!
//! Timers are plain records scanned once per [`UiRuntime::tick`]. A timer
//! either belongs to a window and fires as [`Message::Timer`], or has no
//! owner and invokes a callback. Time only advances when the host calls
//! `tick`, which keeps timer behavior deterministic under test.

use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;
use crate::message::Message;
use crate::record::WindowId;
use crate::runtime::UiRuntime;

new_key_type! {
    /// A unique identifier for a timer record.
    pub struct TimerKey;
}

/// Callback of an owner-less timer.
pub type TimerCallback = Box<dyn FnMut(&mut UiRuntime, TimerKey)>;

struct TimerRecord {
    owner: Option<WindowId>,
    id: u32,
    period: Duration,
    next_fire: Instant,
    /// Taken out while the callback runs.
    callback: Option<TimerCallback>,
}

/// Storage for every timer of a runtime.
#[derive(Default)]
pub(crate) struct TimerManager {
    timers: SlotMap<TimerKey, TimerRecord>,
}

impl TimerManager {
    fn find(&self, owner: WindowId, id: u32) -> Option<TimerKey> {
        self.timers
            .iter()
            .find(|(_, t)| t.owner == Some(owner) && t.id == id)
            .map(|(key, _)| key)
    }

    pub(crate) fn kill_owned_by(&mut self, owner: WindowId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, t| t.owner != Some(owner));
        before - self.timers.len()
    }

    pub(crate) fn clear(&mut self) {
        self.timers.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }
}

impl UiRuntime {
    /// Start (or re-arm) timer `id` of `owner`, firing every `period`.
    ///
    /// Returns `None` if `owner` is not a live window.
    pub fn set_timer(&mut self, owner: WindowId, id: u32, period: Duration) -> Option<TimerKey> {
        if !self.is_window(owner) {
            return None;
        }
        let next_fire = self.now + period;
        if let Some(key) = self.timers.find(owner, id) {
            if let Some(timer) = self.timers.timers.get_mut(key) {
                timer.period = period;
                timer.next_fire = next_fire;
            }
            tracing::trace!(target: targets::TIMER, ?owner, id, ?period, "timer re-armed");
            return Some(key);
        }
        let key = self.timers.timers.insert(TimerRecord {
            owner: Some(owner),
            id,
            period,
            next_fire,
            callback: None,
        });
        tracing::trace!(target: targets::TIMER, ?owner, id, ?period, "timer started");
        Some(key)
    }

    /// Start an owner-less timer that invokes `callback` every `period`.
    pub fn set_callback_timer<F>(&mut self, period: Duration, callback: F) -> TimerKey
    where
        F: FnMut(&mut UiRuntime, TimerKey) + 'static,
    {
        let next_fire = self.now + period;
        self.timers.timers.insert(TimerRecord {
            owner: None,
            id: 0,
            period,
            next_fire,
            callback: Some(Box::new(callback)),
        })
    }

    /// Stop timer `id` of `owner`. Returns whether a timer was removed.
    pub fn kill_timer(&mut self, owner: WindowId, id: u32) -> bool {
        match self.timers.find(owner, id) {
            Some(key) => self.timers.timers.remove(key).is_some(),
            None => false,
        }
    }

    /// Stop a timer by key.
    pub fn kill_timer_key(&mut self, key: TimerKey) -> bool {
        self.timers.timers.remove(key).is_some()
    }

    /// Stop every timer owned by `owner`. Owner-less timers are never touched.
    pub fn kill_timers_for(&mut self, owner: WindowId) -> usize {
        self.timers.kill_owned_by(owner)
    }

    /// Number of live timers.
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// The earliest time at which a timer is due, for the host's wait.
    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.timers.timers.values().map(|t| t.next_fire).min()
    }

    /// One step of the host run loop at time `now`.
    ///
    /// Flushes the message queue, then scans every timer once and fires those
    /// that are due. Returns the number of timers fired.
    #[tracing::instrument(skip(self), target = "horizon_casement_core::timer", level = "trace")]
    pub fn tick(&mut self, now: Instant) -> usize {
        if now > self.now {
            self.now = now;
        }
        self.flush();

        let keys: Vec<TimerKey> = self.timers.timers.keys().collect();
        let mut fired = 0;
        for key in keys {
            let Some(timer) = self.timers.timers.get_mut(key) else {
                continue;
            };
            if timer.next_fire > self.now {
                continue;
            }
            timer.next_fire = self.now + timer.period;
            fired += 1;

            let owner = timer.owner;
            match owner {
                Some(owner) => {
                    let id = timer.id;
                    tracing::trace!(target: targets::TIMER, ?owner, id, "timer fired");
                    self.dispatch(owner, &mut Message::Timer { id });
                }
                None => {
                    let Some(mut callback) = timer.callback.take() else {
                        continue;
                    };
                    tracing::trace!(target: targets::TIMER, ?key, "callback timer fired");
                    callback(self, key);
                    if let Some(timer) = self.timers.timers.get_mut(key) {
                        timer.callback.get_or_insert(callback);
                    }
                }
            }
        }
        fired
    }

    /// Advance the clock by `elapsed` and run [`UiRuntime::tick`].
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let now = self.now + elapsed;
        self.tick(now)
    }
}
