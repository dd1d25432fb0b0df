//! Explicit schedulers for deferred recomputation.
//!
//! Platform timers and animation frames differ in cancellation and ordering
//! guarantees, so scheduling state lives here instead: a [`TaskSlot`] holds at
//! most one pending task, rescheduling replaces it, and every task carries a
//! token so a callback from a replaced or cancelled task is recognized as
//! stale and dropped. Hosts arm whatever real timer they have and report
//! back with the token; hosts without timers poll against a [`Clock`].

use std::cell::Cell;
use std::rc::Rc;

/// Identifies one scheduled task
pub type TaskToken = u64;

/// Source of monotonic time in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Clock advanced by hand; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Wall clock measured from its creation
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Outcome of scheduling a task
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scheduled {
    /// Token of the new pending task
    pub token: TaskToken,
    /// Delay the host should arm its timer with
    pub delay_ms: f64,
    /// Token of the task this one replaced, whose host timer should be cancelled
    pub replaced: Option<TaskToken>,
}

#[derive(Debug, Clone, Copy)]
struct PendingTask {
    token: TaskToken,
    due_ms: f64,
}

/// Single pending-task slot with replace-on-reschedule
#[derive(Debug, Default)]
pub struct TaskSlot {
    next_token: TaskToken,
    pending: Option<PendingTask>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a task `delay_ms` after `now_ms`, replacing any pending task
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64) -> Scheduled {
        let replaced = self.pending.take().map(|p| p.token);
        self.next_token += 1;
        let token = self.next_token;
        let delay_ms = delay_ms.max(0.0);
        self.pending = Some(PendingTask {
            token,
            due_ms: now_ms + delay_ms,
        });
        Scheduled {
            token,
            delay_ms,
            replaced,
        }
    }

    /// Drop the pending task, returning its token
    pub fn cancel(&mut self) -> Option<TaskToken> {
        self.pending.take().map(|p| p.token)
    }

    /// Consume the pending task if `token` is current.
    ///
    /// Returns false for stale or unknown tokens.
    pub fn fire(&mut self, token: TaskToken) -> bool {
        match self.pending {
            Some(p) if p.token == token => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Consume the pending task if it is due at `now_ms`
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.pending {
            Some(p) if p.due_ms <= now_ms => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Consume the pending task regardless of its due time
    pub fn flush(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_token(&self) -> Option<TaskToken> {
        self.pending.map(|p| p.token)
    }

    pub fn due_ms(&self) -> Option<f64> {
        self.pending.map(|p| p.due_ms)
    }
}

/// Runs a task once notifications stop arriving for `delay_ms`
#[derive(Debug)]
pub struct Debouncer {
    slot: TaskSlot,
    delay_ms: f64,
}

impl Debouncer {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            slot: TaskSlot::new(),
            delay_ms,
        }
    }

    /// Record a notification; only the last one within the window fires
    pub fn notify(&mut self, now_ms: f64) -> Scheduled {
        self.slot.schedule(now_ms, self.delay_ms)
    }

    pub fn fire(&mut self, token: TaskToken) -> bool {
        self.slot.fire(token)
    }

    pub fn poll(&mut self, now_ms: f64) -> bool {
        self.slot.poll(now_ms)
    }

    pub fn cancel(&mut self) -> Option<TaskToken> {
        self.slot.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn pending_token(&self) -> Option<TaskToken> {
        self.slot.pending_token()
    }

    pub fn due_ms(&self) -> Option<f64> {
        self.slot.due_ms()
    }

    pub fn set_delay_ms(&mut self, delay_ms: f64) {
        self.delay_ms = delay_ms;
    }
}

/// At most one task per animation frame; a new request supersedes the pending one
#[derive(Debug, Default)]
pub struct FrameScheduler {
    slot: TaskSlot,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a task on the next frame, superseding any pending request
    pub fn request(&mut self) -> Scheduled {
        self.slot.schedule(0.0, 0.0)
    }

    pub fn fire(&mut self, token: TaskToken) -> bool {
        self.slot.fire(token)
    }

    /// Run the pending request, for hosts that drive frames themselves
    pub fn flush(&mut self) -> bool {
        self.slot.flush()
    }

    pub fn cancel(&mut self) -> Option<TaskToken> {
        self.slot.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn pending_token(&self) -> Option<TaskToken> {
        self.slot.pending_token()
    }
}
