//! Repaint bridge
//!
//! Animated values mutate in place every tick, outside the declarative
//! re-render path, so something must carry "this subtree needs to repaint"
//! back into the host. The bridge is that something: a single replaceable
//! callback slot plus a generation counter observable by tests.
//!
//! Replacement, not accumulation: `set` swaps the registered callback. A
//! subtree that wants its own bridge is handed a *different* `RepaintBridge`
//! value through its scope context; the inherited bridge stays untouched in
//! the parent context and becomes visible again to siblings once the shadow
//! is dropped.
//!
//! Requesting a repaint with no callback registered is valid and silent:
//! state keeps mutating, nothing repaints. Callers that rely on repaints must
//! register a callback somewhere in their ancestor chain.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// The callback invoked to force a re-render of the owning subtree
pub type RepaintCallback = Arc<dyn Fn() + Send + Sync>;

/// Cloneable handle to one repaint registration slot
#[derive(Clone)]
pub struct RepaintBridge {
    registered: Arc<Mutex<Option<RepaintCallback>>>,
    generation: Arc<AtomicU64>,
}

impl RepaintBridge {
    /// A bridge with no callback registered
    pub fn new() -> Self {
        Self {
            registered: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A bridge born with a registered callback
    pub fn from_callback<F>(callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let bridge = Self::new();
        bridge.set(callback);
        bridge
    }

    /// Register a callback, replacing any previous one
    pub fn set<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: RepaintCallback = Arc::new(callback);
        *self.registered.lock().unwrap() = Some(callback);
    }

    /// Remove the registered callback
    pub fn clear(&self) {
        *self.registered.lock().unwrap() = None;
    }

    /// Whether a callback is currently registered
    pub fn is_registered(&self) -> bool {
        self.registered.lock().unwrap().is_some()
    }

    /// Invoke the registered callback, if any.
    ///
    /// Returns whether a repaint was actually delivered. The callback runs
    /// outside the slot lock so it may itself set or clear the bridge.
    pub fn request(&self) -> bool {
        let callback = self.registered.lock().unwrap().clone();
        match callback {
            Some(callback) => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                callback();
                true
            }
            None => {
                tracing::trace!("repaint requested with no callback registered");
                false
            }
        }
    }

    /// Number of repaints delivered through this bridge
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Default for RepaintBridge {
    fn default() -> Self {
        Self::new()
    }
}
