//! Frame clock
//!
//! The single per-frame callback source that drives every animation scope.
//! The host platform owns one clock and calls [`ClockHandle::tick`] once per
//! frame; tests construct their own handle and step it manually.
//!
//! Tick semantics: the set of callbacks invoked by a tick is exactly the set
//! registered at the moment the tick begins. Callbacks registered mid-tick
//! first fire on the following tick; callbacks unregistered mid-tick still
//! fire for the tick in flight. Within a tick, callbacks run to completion in
//! registration order.

use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Mutex};

new_key_type! {
    /// Unique identifier for one clock registration
    pub struct CallbackId;
}

/// A callback invoked once per tick with the clock's frame number
pub type FrameCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Registration list and frame counter behind a [`ClockHandle`]
pub struct FrameClock {
    callbacks: SlotMap<CallbackId, FrameCallback>,
    /// Invocation order; slotmap iteration order is not registration order
    order: Vec<CallbackId>,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            callbacks: SlotMap::with_key(),
            order: Vec::new(),
            frame: 0,
        }
    }

    /// Register a per-frame callback
    pub fn register(&mut self, callback: FrameCallback) -> CallbackId {
        let id = self.callbacks.insert(callback);
        self.order.push(id);
        tracing::debug!(?id, count = self.callbacks.len(), "clock callback registered");
        id
    }

    /// Remove a registration. Idempotent: unknown or stale ids are a no-op.
    pub fn unregister(&mut self, id: CallbackId) -> bool {
        if self.callbacks.remove(id).is_none() {
            return false;
        }
        self.order.retain(|entry| *entry != id);
        tracing::debug!(?id, count = self.callbacks.len(), "clock callback unregistered");
        true
    }

    /// Number of live registrations
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Frames ticked so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn advance_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    /// The callbacks registered right now, in registration order
    fn snapshot(&self) -> Vec<FrameCallback> {
        self.order
            .iter()
            .filter_map(|id| self.callbacks.get(*id).cloned())
            .collect()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheaply cloneable handle to a shared [`FrameClock`]
///
/// Every scope and fade stores one of these. A multi-threaded host serializes
/// registration-list mutation through the inner mutex while keeping the
/// single-threaded tick-processing semantics: each tick snapshots the
/// registration list, releases the lock, and runs the batch to completion.
#[derive(Clone)]
pub struct ClockHandle {
    inner: Arc<Mutex<FrameClock>>,
}

impl ClockHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FrameClock::new())),
        }
    }

    /// Register a per-frame callback
    pub fn register<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let callback: FrameCallback = Arc::new(callback);
        self.inner.lock().unwrap().register(callback)
    }

    /// Remove a registration. Idempotent.
    pub fn unregister(&self, id: CallbackId) -> bool {
        self.inner.lock().unwrap().unregister(id)
    }

    /// Run one frame: invoke every callback registered at tick start.
    ///
    /// The registration lock is not held while callbacks run, so a callback
    /// may register or unregister freely; such changes take effect on the
    /// next tick.
    pub fn tick(&self) {
        let (frame, batch) = {
            let mut clock = self.inner.lock().unwrap();
            let frame = clock.advance_frame();
            (frame, clock.snapshot())
        };
        for callback in batch {
            callback(frame);
        }
    }

    /// Step the clock `n` frames (test convenience)
    pub fn tick_many(&self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Number of live registrations
    pub fn callback_count(&self) -> usize {
        self.inner.lock().unwrap().callback_count()
    }

    /// Frames ticked so far
    pub fn frame(&self) -> u64 {
        self.inner.lock().unwrap().frame()
    }
}

impl Default for ClockHandle {
    fn default() -> Self {
        Self::new()
    }
}
