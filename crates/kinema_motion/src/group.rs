//! Interpolation groups
//!
//! A group is a named set of animated values ticked once per active frame.
//! Identity is stable across re-renders of the owning component: the group is
//! constructed once and mutated in place, which is exactly why the repaint
//! bridge exists - nothing in the declarative path sees the mutation.
//!
//! The key set is fixed at construction. Raw values are recomputed every tick
//! for every key, including keys that are currently overridden; clearing an
//! override therefore snaps the displayed value to wherever the simulation
//! drifted in the meantime. Downstream visuals depend on that discontinuity,
//! so it is load-bearing behavior, not an artifact.

use crate::interpolator::Interpolator;
use crate::scope::{FrameBus, FrameSubscription};
use kinema_core::error::MotionError;
use kinema_core::repaint::RepaintBridge;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};

/// Construction-time description of one named value
#[derive(Clone, Debug)]
pub struct ValueSpec {
    begin: f64,
    end: f64,
    interpolator: Interpolator,
}

impl ValueSpec {
    /// A value animating between `begin` and `end` with the default sine wave
    pub fn new(begin: f64, end: f64) -> Self {
        Self {
            begin,
            end,
            interpolator: Interpolator::default(),
        }
    }

    /// Replace the interpolator
    pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = interpolator;
        self
    }
}

struct NamedValue {
    begin: f64,
    end: f64,
    interpolator: Interpolator,
    /// Recomputed every tick, independent of the override
    raw: f64,
    /// When present, the displayed value; `raw` keeps advancing underneath
    override_value: Option<f64>,
}

impl NamedValue {
    fn displayed(&self) -> f64 {
        self.override_value.unwrap_or(self.raw)
    }
}

/// Shared handle for a group ticked from a frame bus
pub type SharedGroup = Arc<Mutex<InterpolationGroup>>;

/// A named set of animated values sharing one tick counter
pub struct InterpolationGroup {
    values: FxHashMap<String, NamedValue>,
    elapsed_ticks: u64,
    repaint: RepaintBridge,
}

impl InterpolationGroup {
    /// Build a group from `(key, spec)` pairs.
    ///
    /// Fails fast on an empty key, a duplicate key, or a non-finite bound,
    /// naming the offending key. Raw values start at `begin`.
    pub fn new<I, K>(specs: I, repaint: RepaintBridge) -> Result<Self, MotionError>
    where
        I: IntoIterator<Item = (K, ValueSpec)>,
        K: Into<String>,
    {
        let mut values = FxHashMap::default();
        for (key, spec) in specs {
            let key = key.into();
            if key.is_empty() {
                return Err(MotionError::EmptyKey);
            }
            if !spec.begin.is_finite() {
                return Err(MotionError::NonFiniteBound { key, bound: "begin" });
            }
            if !spec.end.is_finite() {
                return Err(MotionError::NonFiniteBound { key, bound: "end" });
            }
            if values.contains_key(&key) {
                return Err(MotionError::DuplicateKey { key });
            }
            values.insert(
                key,
                NamedValue {
                    begin: spec.begin,
                    end: spec.end,
                    interpolator: spec.interpolator,
                    raw: spec.begin,
                    override_value: None,
                },
            );
        }
        Ok(Self {
            values,
            elapsed_ticks: 0,
            repaint,
        })
    }

    /// Advance one frame: bump the shared tick counter and recompute every
    /// raw value, overridden or not. Order across keys is not observable.
    pub fn tick(&mut self) {
        self.elapsed_ticks += 1;
        for value in self.values.values_mut() {
            value.raw =
                value
                    .interpolator
                    .sample(value.begin, value.end, value.raw, self.elapsed_ticks);
        }
    }

    /// The value a render callback should display for `key`
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).map(NamedValue::displayed)
    }

    /// The interpolated value underneath any override
    pub fn raw_value(&self, key: &str) -> Option<f64> {
        self.values.get(key).map(|value| value.raw)
    }

    /// The override for `key`, if one is set
    pub fn override_value(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(|value| value.override_value)
    }

    /// Freeze `key` at `value` until cleared.
    ///
    /// Notifies the repaint bridge only when the displayed value actually
    /// changes; repeated identical input does not repaint. Returns false for
    /// an unknown key.
    pub fn set_override(&mut self, key: &str, value: f64) -> bool {
        let Some(named) = self.values.get_mut(key) else {
            tracing::warn!(key, "override for unknown value ignored");
            return false;
        };
        let displayed = named.displayed();
        named.override_value = Some(value);
        if value != displayed {
            tracing::debug!(key, value, "override set");
            self.repaint.request();
        }
        true
    }

    /// Unfreeze `key`. The displayed value becomes the current raw value,
    /// not a continuation of the override. Returns false for an unknown key.
    pub fn clear_override(&mut self, key: &str) -> bool {
        let Some(named) = self.values.get_mut(key) else {
            tracing::warn!(key, "override clear for unknown value ignored");
            return false;
        };
        let Some(previous) = named.override_value.take() else {
            return true;
        };
        if named.raw != previous {
            tracing::debug!(key, "override cleared");
            self.repaint.request();
        }
        true
    }

    /// Ticks elapsed while the enclosing scope was effectively running
    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// The repaint bridge this group notifies
    pub fn repaint(&self) -> &RepaintBridge {
        &self.repaint
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Wrap the group for sharing with a frame bus subscription
    pub fn into_shared(self) -> SharedGroup {
        Arc::new(Mutex::new(self))
    }

    /// Tick `shared` once per active frame of `bus`. Dropping the returned
    /// subscription detaches the group.
    pub fn attach(shared: &SharedGroup, bus: &FrameBus) -> FrameSubscription {
        let group = Arc::clone(shared);
        bus.subscribe(move |_frame| group.lock().unwrap().tick())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolator::DEFAULT_WAVE_FREQUENCY;

    fn sine_raw(begin: f64, end: f64, ticks: u64) -> f64 {
        let progress = ((ticks as f64 * DEFAULT_WAVE_FREQUENCY).sin() + 1.0) / 2.0;
        begin + (end - begin) * progress
    }

    #[test]
    fn test_raw_value_equals_begin_before_any_tick() {
        let group =
            InterpolationGroup::new([("x", ValueSpec::new(0.0, 10.0))], RepaintBridge::new())
                .unwrap();

        assert_eq!(group.value("x"), Some(0.0));
        assert_eq!(group.raw_value("x"), Some(0.0));
        assert_eq!(group.elapsed_ticks(), 0);
    }

    #[test]
    fn test_tick_advances_every_value_with_a_shared_counter() {
        let mut group = InterpolationGroup::new(
            [
                ("x", ValueSpec::new(0.0, 10.0)),
                ("y", ValueSpec::new(-1.0, 1.0)),
            ],
            RepaintBridge::new(),
        )
        .unwrap();

        group.tick();
        group.tick();

        assert_eq!(group.elapsed_ticks(), 2);
        assert_eq!(group.raw_value("x"), Some(sine_raw(0.0, 10.0, 2)));
        assert_eq!(group.raw_value("y"), Some(sine_raw(-1.0, 1.0, 2)));
    }

    #[test]
    fn test_override_pins_display_while_raw_drifts() {
        let mut group =
            InterpolationGroup::new([("x", ValueSpec::new(0.0, 1.0))], RepaintBridge::new())
                .unwrap();

        group.tick();
        assert!(group.set_override("x", 0.5));

        for _ in 0..40 {
            group.tick();
            assert_eq!(group.value("x"), Some(0.5));
        }
        assert_eq!(group.raw_value("x"), Some(sine_raw(0.0, 1.0, 41)));
    }

    #[test]
    fn test_clear_override_snaps_to_current_raw() {
        let mut group =
            InterpolationGroup::new([("x", ValueSpec::new(0.0, 1.0))], RepaintBridge::new())
                .unwrap();

        group.tick();
        let before_override = group.value("x").unwrap();
        group.set_override("x", 0.5);
        group.tick();
        group.tick();
        group.clear_override("x");

        let displayed = group.value("x").unwrap();
        assert_eq!(displayed, sine_raw(0.0, 1.0, 3));
        assert_ne!(displayed, 0.5);
        assert_ne!(displayed, before_override);
    }

    #[test]
    fn test_repaint_fires_only_when_displayed_value_changes() {
        let bridge = RepaintBridge::from_callback(|| {});
        let mut group =
            InterpolationGroup::new([("x", ValueSpec::new(0.0, 1.0))], bridge.clone()).unwrap();

        // Display is 0.0; an identical override must not repaint.
        group.set_override("x", 0.0);
        assert_eq!(bridge.generation(), 0);

        group.set_override("x", 0.25);
        assert_eq!(bridge.generation(), 1);

        // Same value again: no storm.
        group.set_override("x", 0.25);
        assert_eq!(bridge.generation(), 1);

        // Raw is still 0.0 at tick 0, so clearing changes the display.
        group.clear_override("x");
        assert_eq!(bridge.generation(), 2);

        // Nothing left to clear.
        group.clear_override("x");
        assert_eq!(bridge.generation(), 2);
    }

    #[test]
    fn test_dead_override_mutates_state_without_repainting() {
        let bridge = RepaintBridge::new();
        let mut group =
            InterpolationGroup::new([("x", ValueSpec::new(0.0, 1.0))], bridge.clone()).unwrap();

        group.set_override("x", 0.75);
        assert_eq!(group.value("x"), Some(0.75));
        assert_eq!(bridge.generation(), 0);

        group.clear_override("x");
        assert_eq!(group.value("x"), Some(0.0));
        assert_eq!(bridge.generation(), 0);
    }

    #[test]
    fn test_unknown_key_is_rejected_without_panicking() {
        let mut group =
            InterpolationGroup::new([("x", ValueSpec::new(0.0, 1.0))], RepaintBridge::new())
                .unwrap();

        assert!(!group.set_override("missing", 1.0));
        assert!(!group.clear_override("missing"));
        assert_eq!(group.value("missing"), None);
    }

    #[test]
    fn test_non_finite_bound_fails_naming_the_key() {
        let result = InterpolationGroup::new(
            [
                ("ok", ValueSpec::new(0.0, 1.0)),
                ("bad", ValueSpec::new(f64::NAN, 1.0)),
            ],
            RepaintBridge::new(),
        );

        match result {
            Err(MotionError::NonFiniteBound { key, bound }) => {
                assert_eq!(key, "bad");
                assert_eq!(bound, "begin");
            }
            Err(other) => panic!("expected NonFiniteBound, got {other}"),
            Ok(_) => panic!("expected NonFiniteBound, got a group"),
        }
    }

    #[test]
    fn test_duplicate_and_empty_keys_fail() {
        let duplicate = InterpolationGroup::new(
            [
                ("x", ValueSpec::new(0.0, 1.0)),
                ("x", ValueSpec::new(1.0, 2.0)),
            ],
            RepaintBridge::new(),
        );
        assert!(matches!(duplicate, Err(MotionError::DuplicateKey { key }) if key == "x"));

        let empty = InterpolationGroup::new([("", ValueSpec::new(0.0, 1.0))], RepaintBridge::new());
        assert!(matches!(empty, Err(MotionError::EmptyKey)));
    }

    #[test]
    fn test_equal_bounds_stay_put() {
        let mut group =
            InterpolationGroup::new([("pinned", ValueSpec::new(4.0, 4.0))], RepaintBridge::new())
                .unwrap();

        for _ in 0..10 {
            group.tick();
            assert_eq!(group.value("pinned"), Some(4.0));
        }
    }
}
