//! Kinema Animation Coordination
//!
//! The tree-shaped scheduler behind interactive math visualizations.
//!
//! # Features
//!
//! - **Scopes**: nested, independently start/stoppable units; stopping an
//!   ancestor pauses the whole subtree, restarting resumes it
//! - **Visibility Gating**: scrolled-out scopes release their clock
//!   registration and resume from frozen values
//! - **Interpolation Groups**: named values advanced by pluggable wave
//!   interpolators, with per-value freeze overrides
//! - **Repaint Bridging**: in-place mutation carried back into the host's
//!   render path through an explicit callback registration
//! - **Fades**: clamped opacity transitions with in-flight cancellation

pub mod control;
pub mod fade;
pub mod group;
pub mod interpolator;
pub mod scope;
pub mod visibility;

pub use control::{CallbackAnimator, ClickToAnimate, LeafControls};
pub use fade::{Fade, FadePhase, DEFAULT_FADE_DURATION_TICKS};
pub use group::{InterpolationGroup, SharedGroup, ValueSpec};
pub use interpolator::{Interpolator, DEFAULT_WAVE_FREQUENCY};
pub use scope::{FrameBus, FrameSubscription, Scope, ScopeContext};
pub use visibility::{
    HeadlessProbe, Rect, RectProbe, ViewportProbe, VisibilityGate, DEFAULT_VISIBILITY_MARGIN_PX,
};
