//! Interpolators for named animated values
//!
//! An interpolator maps `(begin, end, current, elapsed_ticks)` to the next
//! raw value. The built-in wave interpolators ignore `current` and oscillate
//! between the bounds forever; custom interpolators receive it so stateful
//! integrators are expressible.

use std::fmt;
use std::sync::Arc;

/// Angular frequency of the built-in wave interpolators, in radians per tick.
/// One full period is 2π / 0.05 ≈ 126 ticks.
pub const DEFAULT_WAVE_FREQUENCY: f64 = 0.05;

/// A pluggable interpolation function
pub type InterpolatorFn = dyn Fn(f64, f64, f64, u64) -> f64 + Send + Sync;

/// Interpolator for one named value
#[derive(Clone, Default)]
pub enum Interpolator {
    /// `progress = (sin(t * 0.05) + 1) / 2`, oscillating between the bounds
    #[default]
    Sine,
    /// Sine shifted 90°: starts at `end` instead of the midpoint crossing
    Cosine,
    /// Arbitrary caller-supplied function
    Custom(Arc<InterpolatorFn>),
}

impl Interpolator {
    /// Wrap an arbitrary function as an interpolator
    pub fn custom<F>(function: F) -> Self
    where
        F: Fn(f64, f64, f64, u64) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(function))
    }

    /// A sine wave at a non-default frequency (radians per tick)
    pub fn sine_with_frequency(frequency: f64) -> Self {
        Self::custom(move |begin, end, _current, ticks| {
            let progress = ((ticks as f64 * frequency).sin() + 1.0) / 2.0;
            begin + (end - begin) * progress
        })
    }

    /// A cosine wave at a non-default frequency (radians per tick)
    pub fn cosine_with_frequency(frequency: f64) -> Self {
        Self::custom(move |begin, end, _current, ticks| {
            let progress = ((ticks as f64 * frequency).cos() + 1.0) / 2.0;
            begin + (end - begin) * progress
        })
    }

    /// Compute the next raw value
    pub fn sample(&self, begin: f64, end: f64, current: f64, elapsed_ticks: u64) -> f64 {
        match self {
            Interpolator::Sine => {
                let progress = ((elapsed_ticks as f64 * DEFAULT_WAVE_FREQUENCY).sin() + 1.0) / 2.0;
                begin + (end - begin) * progress
            }
            Interpolator::Cosine => {
                let progress = ((elapsed_ticks as f64 * DEFAULT_WAVE_FREQUENCY).cos() + 1.0) / 2.0;
                begin + (end - begin) * progress
            }
            Interpolator::Custom(function) => function(begin, end, current, elapsed_ticks),
        }
    }
}

impl fmt::Debug for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolator::Sine => f.write_str("Sine"),
            Interpolator::Cosine => f.write_str("Cosine"),
            Interpolator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
