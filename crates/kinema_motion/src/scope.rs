//! Animation scopes and context propagation
//!
//! A scope is the smallest unit that can be independently started and
//! stopped. Scopes nest: each derives its effective-running flag as
//! `running_own && visible && parent.effective_running` (an absent parent
//! counts as running), so stopping any ancestor forces the whole subtree
//! inactive without touching the descendants' own flags - and restarting the
//! ancestor brings them back without any downstream calls.
//!
//! A scope holds exactly one clock registration while it is effectively
//! running and none otherwise. Every flag change funnels through one
//! re-evaluation path, which makes double registration structurally
//! impossible and keeps stop/unmount idempotent. Pausing never resets
//! downstream state; values resume from wherever they froze.
//!
//! Control and derived flags flow down through [`ScopeContext`], an explicit
//! value threaded to child builders rather than ambient lookup. Tick-driven
//! mutation flows back up through the [`FrameBus`], which is pumped only on
//! effectively-running frames.

use crate::fade::{Fade, DEFAULT_FADE_DURATION_TICKS};
use kinema_core::clock::{CallbackId, ClockHandle};
use kinema_core::repaint::RepaintBridge;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::sync::{Arc, Mutex, Weak};

new_key_type! {
    /// Unique identifier for one frame bus subscription
    pub struct ListenerId;
}

/// A per-tick callback subscribed to a scope's frame bus
pub type FrameListener = Arc<dyn Fn(u64) + Send + Sync>;

/// Per-scope listener registry, pumped once per effectively-running frame
#[derive(Clone)]
pub struct FrameBus {
    listeners: Arc<Mutex<SlotMap<ListenerId, FrameListener>>>,
}

impl FrameBus {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Subscribe a per-tick callback. Dropping the returned guard
    /// unsubscribes.
    #[must_use]
    pub fn subscribe<F>(&self, listener: F) -> FrameSubscription
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let listener: FrameListener = Arc::new(listener);
        let id = self.listeners.lock().unwrap().insert(listener);
        FrameSubscription {
            listeners: Arc::downgrade(&self.listeners),
            id,
        }
    }

    /// Number of live subscriptions
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Invoke every listener subscribed at the start of the pump.
    ///
    /// The lock is not held while listeners run, so a listener may
    /// subscribe or unsubscribe freely.
    pub fn pump(&self, frame: u64) {
        let batch: Vec<FrameListener> = self.listeners.lock().unwrap().values().cloned().collect();
        for listener in batch {
            listener(frame);
        }
    }
}

impl Default for FrameBus {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for one frame bus subscription
pub struct FrameSubscription {
    listeners: Weak<Mutex<SlotMap<ListenerId, FrameListener>>>,
    id: ListenerId,
}

impl Drop for FrameSubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().unwrap().remove(self.id);
        }
    }
}

struct ScopeState {
    /// Locally requested running state
    running_own: bool,
    /// Local visibility; a bare scope is visible until told otherwise
    visible: bool,
    /// Cleared on unmount so a stale clock callback is dropped, not ticked
    alive: bool,
    registration: Option<CallbackId>,
    /// Non-owning back-reference; the parent owns its own lifetime
    parent: Option<Weak<Mutex<ScopeState>>>,
    /// Non-owning forward links, only for pushing re-evaluation downward
    children: SmallVec<[Weak<Mutex<ScopeState>>; 4]>,
    clock: ClockHandle,
    bus: FrameBus,
    repaint: RepaintBridge,
}

/// A start/stoppable animation scope, unregistered from the clock on drop
pub struct Scope {
    state: Arc<Mutex<ScopeState>>,
}

impl Scope {
    /// A root scope with no repaint callback registered yet
    pub fn root(clock: &ClockHandle) -> Self {
        Self::root_with_repaint(clock, RepaintBridge::new())
    }

    /// A root scope publishing `repaint` to its subtree
    pub fn root_with_repaint(clock: &ClockHandle, repaint: RepaintBridge) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScopeState {
                running_own: false,
                visible: true,
                alive: true,
                registration: None,
                parent: None,
                children: SmallVec::new(),
                clock: clock.clone(),
                bus: FrameBus::new(),
                repaint,
            })),
        }
    }

    /// Request running. Registers with the clock if effective-running
    /// becomes true. Idempotent.
    pub fn start(&self) {
        set_running(&self.state, true);
    }

    /// Request stopped. Unregisters if currently registered. Idempotent,
    /// safe before `start` and after unmount.
    pub fn stop(&self) {
        set_running(&self.state, false);
    }

    /// Flip local visibility; pauses or resumes without resetting any
    /// downstream state
    pub fn set_visible(&self, visible: bool) {
        set_visible(&self.state, visible);
    }

    pub fn is_running_own(&self) -> bool {
        self.state.lock().unwrap().running_own
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().unwrap().visible
    }

    /// `running_own && visible && parent.effective_running`, derived on
    /// demand
    pub fn effective_running(&self) -> bool {
        scope_effective(&self.state)
    }

    /// Whether this scope currently holds a clock registration
    pub fn is_registered(&self) -> bool {
        self.state.lock().unwrap().registration.is_some()
    }

    /// The bus a leaf taps for per-active-tick callbacks
    pub fn frame(&self) -> FrameBus {
        self.state.lock().unwrap().bus.clone()
    }

    /// The context value this scope publishes to its subtree
    pub fn context(&self) -> ScopeContext {
        let state = self.state.lock().unwrap();
        ScopeContext {
            scope: Arc::downgrade(&self.state),
            clock: state.clock.clone(),
            bus: state.bus.clone(),
            repaint: state.repaint.clone(),
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        teardown(&self.state);
    }
}

/// The control surface a scope publishes downward: derived running flag,
/// start/stop, the frame bus, and the repaint bridge.
///
/// Contexts are plain values: cloning is cheap, and a subtree that shadows a
/// field simply threads a modified clone to its children. The scope link is
/// weak - a context never extends the lifetime of the scope that published
/// it.
#[derive(Clone)]
pub struct ScopeContext {
    scope: Weak<Mutex<ScopeState>>,
    clock: ClockHandle,
    bus: FrameBus,
    repaint: RepaintBridge,
}

impl ScopeContext {
    /// Effective-running of the publishing scope; false once it unmounts
    pub fn effective_running(&self) -> bool {
        match self.scope.upgrade() {
            Some(state) => scope_effective(&state),
            None => false,
        }
    }

    /// Start the publishing scope. No-op after unmount.
    pub fn start(&self) {
        if let Some(state) = self.scope.upgrade() {
            set_running(&state, true);
        }
    }

    /// Stop the publishing scope. No-op after unmount.
    pub fn stop(&self) {
        if let Some(state) = self.scope.upgrade() {
            set_running(&state, false);
        }
    }

    /// The bus a leaf taps for per-active-tick callbacks
    pub fn frame(&self) -> FrameBus {
        self.bus.clone()
    }

    /// The repaint bridge visible at this level
    pub fn repaint(&self) -> RepaintBridge {
        self.repaint.clone()
    }

    /// The clock driving this tree
    pub fn clock(&self) -> ClockHandle {
        self.clock.clone()
    }

    /// Shadow the repaint bridge for the subtree built from the returned
    /// context. Replacement, not accumulation: descendants see only the new
    /// bridge, siblings built from `self` keep the inherited one.
    pub fn with_repaint(&self, repaint: RepaintBridge) -> ScopeContext {
        ScopeContext {
            scope: self.scope.clone(),
            clock: self.clock.clone(),
            bus: self.bus.clone(),
            repaint,
        }
    }

    /// Shadow the repaint bridge with a fresh one wrapping `callback`
    pub fn register_repaint<F>(&self, callback: F) -> ScopeContext
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.with_repaint(RepaintBridge::from_callback(callback))
    }

    /// Derive a nested scope whose effective-running ANDs with the
    /// inherited one. The child starts stopped and inherits this context's
    /// repaint bridge.
    pub fn child_scope(&self) -> Scope {
        let shared = Arc::new(Mutex::new(ScopeState {
            running_own: false,
            visible: true,
            alive: true,
            registration: None,
            parent: Some(self.scope.clone()),
            children: SmallVec::new(),
            clock: self.clock.clone(),
            bus: FrameBus::new(),
            repaint: self.repaint.clone(),
        }));
        if let Some(parent) = self.scope.upgrade() {
            parent.lock().unwrap().children.push(Arc::downgrade(&shared));
        }
        Scope { state: shared }
    }

    /// Build a fade transition driven by the same clock
    pub fn fade(&self, initially_visible: bool) -> Fade {
        Fade::with_duration(&self.clock, initially_visible, DEFAULT_FADE_DURATION_TICKS)
    }
}

fn set_running(shared: &Arc<Mutex<ScopeState>>, running: bool) {
    {
        let mut state = shared.lock().unwrap();
        if state.running_own == running {
            return;
        }
        state.running_own = running;
    }
    refresh_subtree(shared);
}

fn set_visible(shared: &Arc<Mutex<ScopeState>>, visible: bool) {
    {
        let mut state = shared.lock().unwrap();
        if state.visible == visible {
            return;
        }
        state.visible = visible;
    }
    refresh_subtree(shared);
}

fn scope_effective(shared: &Arc<Mutex<ScopeState>>) -> bool {
    let state = shared.lock().unwrap();
    state.alive && state.running_own && state.visible && ancestors_effective(state.parent.clone())
}

/// Walk the parent chain; locks are taken strictly upward, one at a time
fn ancestors_effective(start: Option<Weak<Mutex<ScopeState>>>) -> bool {
    let mut next = start;
    while let Some(weak) = next {
        let Some(shared) = weak.upgrade() else {
            // Detached from a gone parent: the chain above is treated as a
            // root boundary
            return true;
        };
        let state = shared.lock().unwrap();
        if !(state.alive && state.running_own && state.visible) {
            return false;
        }
        next = state.parent.clone();
    }
    true
}

/// Re-evaluate this scope's registration and then its whole subtree
fn refresh_subtree(shared: &Arc<Mutex<ScopeState>>) {
    refresh_registration(shared);
    let children: Vec<Arc<Mutex<ScopeState>>> = {
        let mut state = shared.lock().unwrap();
        state.children.retain(|weak| weak.strong_count() > 0);
        state.children.iter().filter_map(Weak::upgrade).collect()
    };
    for child in &children {
        refresh_subtree(child);
    }
}

/// The single choke point deciding whether a scope holds a clock
/// registration: registered iff alive and effectively running
fn refresh_registration(shared: &Arc<Mutex<ScopeState>>) {
    let mut state = shared.lock().unwrap();
    let should_register = state.alive
        && state.running_own
        && state.visible
        && ancestors_effective(state.parent.clone());

    match (state.registration.is_some(), should_register) {
        (false, true) => {
            let weak = Arc::downgrade(shared);
            let id = state.clock.register(move |frame| on_clock_tick(&weak, frame));
            state.registration = Some(id);
        }
        (true, false) => {
            if let Some(id) = state.registration.take() {
                state.clock.unregister(id);
            }
        }
        _ => {}
    }
}

fn on_clock_tick(weak: &Weak<Mutex<ScopeState>>, frame: u64) {
    let Some(shared) = weak.upgrade() else {
        tracing::trace!("frame callback for a dropped scope ignored");
        return;
    };
    let bus = {
        let state = shared.lock().unwrap();
        if !state.alive {
            tracing::trace!("frame callback for an unmounted scope ignored");
            return;
        }
        if !(state.running_own && state.visible && ancestors_effective(state.parent.clone())) {
            // Registration update raced the tick snapshot; skip this frame
            return;
        }
        state.bus.clone()
    };
    bus.pump(frame);
}

/// Release on every exit path: clear liveness, drop the registration, and
/// force descendants to re-evaluate against the now-dead ancestor
fn teardown(shared: &Arc<Mutex<ScopeState>>) {
    {
        let mut state = shared.lock().unwrap();
        if !state.alive {
            return;
        }
        state.alive = false;
        state.running_own = false;
        if let Some(id) = state.registration.take() {
            state.clock.unregister(id);
        }
    }
    let children: Vec<Arc<Mutex<ScopeState>>> = {
        let state = shared.lock().unwrap();
        state.children.iter().filter_map(Weak::upgrade).collect()
    };
    for child in &children {
        refresh_subtree(child);
    }
}
