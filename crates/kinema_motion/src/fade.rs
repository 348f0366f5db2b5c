//! Fade transitions
//!
//! A small secondary state machine that eases opacity toward 0 or 1 over a
//! fixed number of ticks, driven by the same frame clock as everything else.
//! Retriggering while a run is in flight cancels it first - there are never
//! two live registrations for one node - and the new run lerps from the
//! opacity the node actually shows, not from either endpoint.

use kinema_core::clock::{CallbackId, ClockHandle};
use std::sync::{Arc, Mutex, Weak};

/// Transition length in clock ticks (3000 ms at a nominal 60 Hz)
pub const DEFAULT_FADE_DURATION_TICKS: u64 = 180;

/// Phase of a fade node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadePhase {
    /// At rest; no clock registration held
    Idle,
    /// Easing toward the target; one clock registration held
    Transitioning,
}

struct FadeState {
    clock: ClockHandle,
    phase: FadePhase,
    opacity: f64,
    /// Snapshot of the opacity when the current run started
    source: f64,
    target: f64,
    elapsed: u64,
    duration: u64,
    registration: Option<CallbackId>,
    alive: bool,
}

/// Opacity transition for one node, unregistered from the clock on drop
pub struct Fade {
    state: Arc<Mutex<FadeState>>,
}

impl Fade {
    /// A fade at rest, fully opaque or fully transparent
    pub fn new(clock: &ClockHandle, initially_visible: bool) -> Self {
        Self::with_duration(clock, initially_visible, DEFAULT_FADE_DURATION_TICKS)
    }

    pub fn with_duration(clock: &ClockHandle, initially_visible: bool, duration_ticks: u64) -> Self {
        let opacity = if initially_visible { 1.0 } else { 0.0 };
        Self {
            state: Arc::new(Mutex::new(FadeState {
                clock: clock.clone(),
                phase: FadePhase::Idle,
                opacity,
                source: opacity,
                target: opacity,
                elapsed: 0,
                duration: duration_ticks,
                registration: None,
                alive: true,
            })),
        }
    }

    /// Start easing toward visible (opacity 1) or invisible (opacity 0).
    ///
    /// Cancels any in-flight run before starting the new one; the new run
    /// starts from the current opacity.
    pub fn set_visible_target(&self, visible: bool) {
        let mut state = self.state.lock().unwrap();
        if !state.alive {
            return;
        }
        if let Some(id) = state.registration.take() {
            state.clock.unregister(id);
            tracing::debug!("in-flight fade cancelled");
        }
        state.target = if visible { 1.0 } else { 0.0 };
        state.source = state.opacity;
        state.elapsed = 0;
        state.phase = FadePhase::Transitioning;

        let weak = Arc::downgrade(&self.state);
        let id = state.clock.register(move |_frame| on_fade_tick(&weak));
        state.registration = Some(id);
    }

    pub fn opacity(&self) -> f64 {
        self.state.lock().unwrap().opacity
    }

    pub fn phase(&self) -> FadePhase {
        self.state.lock().unwrap().phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase() == FadePhase::Transitioning
    }
}

impl Drop for Fade {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.alive = false;
        if let Some(id) = state.registration.take() {
            state.clock.unregister(id);
        }
    }
}

fn on_fade_tick(weak: &Weak<Mutex<FadeState>>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut state = shared.lock().unwrap();
    if !state.alive || state.phase != FadePhase::Transitioning {
        return;
    }

    state.elapsed += 1;
    let progress = if state.duration == 0 {
        1.0
    } else {
        (state.elapsed as f64 / state.duration as f64).clamp(0.0, 1.0)
    };
    state.opacity = state.source + (state.target - state.source) * progress;

    // Terminal: land exactly on the target, release the registration, and
    // request no further frames
    if progress >= 1.0 || state.opacity == state.target {
        state.opacity = state.target;
        state.phase = FadePhase::Idle;
        if let Some(id) = state.registration.take() {
            state.clock.unregister(id);
        }
        tracing::debug!(opacity = state.opacity, "fade complete");
    }
}
