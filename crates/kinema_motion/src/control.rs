//! User-control adapters
//!
//! Two ways user-facing components drive a scope without learning its
//! internals: [`ClickToAnimate`] toggles a visibility-gated scope on
//! activation, and [`CallbackAnimator`] flattens an inherited context into
//! the exact surface a leaf needs.

use crate::scope::{FrameBus, ScopeContext};
use crate::visibility::VisibilityGate;
use kinema_core::repaint::RepaintBridge;

/// Click-or-key activation toggling a gated scope.
///
/// The end state depends only on the parity of activations applied to the
/// initial state, never on how the events arrived; re-rendered wrappers
/// converge to the same effective-running.
pub struct ClickToAnimate {
    gate: VisibilityGate,
    requested: bool,
}

impl ClickToAnimate {
    pub fn new(gate: VisibilityGate) -> Self {
        let requested = gate.requested_running();
        Self { gate, requested }
    }

    /// One activation: click, Enter, Space - they all toggle
    pub fn activate(&mut self) {
        self.requested = !self.requested;
        tracing::debug!(requested = self.requested, "animation toggled");
        self.gate.set_requested_running(self.requested);
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    pub fn gate(&self) -> &VisibilityGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut VisibilityGate {
        &mut self.gate
    }
}

/// What a leaf component gets: the current running flag, the bus to tap for
/// active ticks, and the repaint bridge. No scope or gate types leak through.
pub struct LeafControls {
    pub running: bool,
    pub frame: FrameBus,
    pub repaint: RepaintBridge,
}

/// Pass-through adapter from an inherited context to [`LeafControls`]
pub struct CallbackAnimator {
    context: ScopeContext,
}

impl CallbackAnimator {
    pub fn new(context: &ScopeContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Sample the current control surface
    pub fn controls(&self) -> LeafControls {
        LeafControls {
            running: self.context.effective_running(),
            frame: self.context.frame(),
            repaint: self.context.repaint(),
        }
    }

    /// Hand the controls to an opaque render callback. The returned subtree
    /// is never inspected here.
    pub fn render<T>(&self, render: impl FnOnce(LeafControls) -> T) -> T {
        render(self.controls())
    }
}
