//! Visibility gating
//!
//! Scrolled-out visualizations should not burn frames. A [`VisibilityGate`]
//! wraps a scope and ANDs a viewport-intersection signal into its running
//! flag: what reaches the wrapped scope is `requested_running && visible`.
//! Scrolling out while running pauses the scope without touching any
//! animated value; scrolling back in resumes from the frozen values.
//!
//! The intersection source is a collaborator behind [`ViewportProbe`]. A
//! headless host (server render, tests without a window) uses
//! [`HeadlessProbe`], which reports not-visible - nothing animates where
//! nothing can be seen.

use crate::scope::Scope;

/// Margin around the viewport inside which a node still counts as visible,
/// in pixels
pub const DEFAULT_VISIBILITY_MARGIN_PX: f64 = 100.0;

/// An axis-aligned rectangle in viewport coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grow every edge outward by `margin`
    pub fn expand(&self, margin: f64) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// The viewport-intersection collaborator
pub trait ViewportProbe {
    /// Whether `bounds` intersects the viewport expanded by `margin_px`
    fn is_visible(&self, bounds: Rect, margin_px: f64) -> bool;
}

/// Geometric probe for hosts that track element bounds
pub struct RectProbe {
    viewport: Rect,
}

impl RectProbe {
    pub fn new(viewport: Rect) -> Self {
        Self { viewport }
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }
}

impl ViewportProbe for RectProbe {
    fn is_visible(&self, bounds: Rect, margin_px: f64) -> bool {
        self.viewport.expand(margin_px).intersects(&bounds)
    }
}

/// Probe for hosts with no intersection source: always not-visible, so
/// nothing animates at first paint off a windowed host
pub struct HeadlessProbe;

impl ViewportProbe for HeadlessProbe {
    fn is_visible(&self, _bounds: Rect, _margin_px: f64) -> bool {
        false
    }
}

/// A scope gated on viewport visibility
pub struct VisibilityGate {
    scope: Scope,
    requested_running: bool,
    /// Not-visible until a probe says otherwise
    visible: bool,
    bounds: Rect,
    margin_px: f64,
}

impl VisibilityGate {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            requested_running: false,
            visible: false,
            bounds: Rect::ZERO,
            margin_px: DEFAULT_VISIBILITY_MARGIN_PX,
        }
    }

    pub fn with_margin(mut self, margin_px: f64) -> Self {
        self.margin_px = margin_px;
        self
    }

    /// Update the gated node's bounds (viewport coordinates)
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// The externally requested running flag
    pub fn set_requested_running(&mut self, requested: bool) {
        self.requested_running = requested;
        self.apply();
    }

    pub fn requested_running(&self) -> bool {
        self.requested_running
    }

    /// Re-read visibility from the probe and re-apply the gate
    pub fn poll(&mut self, probe: &dyn ViewportProbe) {
        let visible = probe.is_visible(self.bounds, self.margin_px);
        if visible != self.visible {
            tracing::debug!(visible, "visibility changed");
        }
        self.visible = visible;
        self.apply();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// What reaches the wrapped scope is `requested_running && visible`
    fn apply(&self) {
        if self.requested_running && self.visible {
            self.scope.start();
        } else {
            self.scope.stop();
        }
    }
}
