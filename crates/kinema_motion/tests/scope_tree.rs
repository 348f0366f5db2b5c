//! Integration tests for the scope tree
//!
//! Effective-running is the AND of a scope's own running flag, its own
//! visibility, and its ancestors' effective-running; registration with the
//! clock follows it exactly, at every depth.

use kinema_core::clock::ClockHandle;
use kinema_core::repaint::RepaintBridge;
use kinema_motion::group::{InterpolationGroup, ValueSpec};
use kinema_motion::scope::Scope;
use kinema_motion::visibility::{Rect, RectProbe, VisibilityGate};
use std::sync::{Arc, Mutex};

/// Exhaustive truth table over a three-deep chain: effective-running at each
/// node equals the AND of its own flags and its parent's effective-running
#[test]
fn test_effective_running_is_the_and_over_the_chain() {
    for mask in 0..64u32 {
        let flags: Vec<bool> = (0..6).map(|bit| mask & (1 << bit) != 0).collect();
        let (running, visible) = (&flags[..3], &flags[3..]);

        let clock = ClockHandle::new();
        let root = Scope::root(&clock);
        let mid = root.context().child_scope();
        let leaf = mid.context().child_scope();
        let chain = [&root, &mid, &leaf];

        for (scope, (&run, &vis)) in chain.iter().zip(running.iter().zip(visible)) {
            if run {
                scope.start();
            }
            scope.set_visible(vis);
        }

        let mut expected_ancestors = true;
        for (scope, (&run, &vis)) in chain.iter().zip(running.iter().zip(visible)) {
            let expected = run && vis && expected_ancestors;
            assert_eq!(
                scope.effective_running(),
                expected,
                "mask {mask:06b}: expected {expected}"
            );
            assert_eq!(scope.is_registered(), expected);
            expected_ancestors = expected;
        }
    }
}

/// Stopping an ancestor forces every descendant inactive regardless of the
/// descendants' own flags; restarting restores them without downstream calls
#[test]
fn test_ancestor_stop_and_restart_scenario() {
    let clock = ClockHandle::new();
    let a = Scope::root(&clock);
    let b = a.context().child_scope();

    a.start();
    b.start();
    assert!(a.effective_running());
    assert!(b.effective_running());

    a.stop();
    assert!(!b.effective_running());
    assert!(b.is_running_own());
    assert_eq!(clock.callback_count(), 0);

    a.start();
    assert!(b.effective_running());
    assert_eq!(clock.callback_count(), 2);
}

/// An invisible gate means zero tick callbacks for that subtree until it
/// becomes visible again
#[test]
fn test_invisible_subtree_receives_no_ticks() {
    let clock = ClockHandle::new();
    let viewport = RectProbe::new(Rect::new(0.0, 0.0, 1000.0, 1000.0));

    let mut gate = VisibilityGate::new(Scope::root(&clock));
    gate.set_bounds(Rect::new(0.0, 2000.0, 100.0, 100.0));
    gate.set_requested_running(true);
    gate.poll(&viewport);

    let ticks = Arc::new(Mutex::new(0u32));
    let ticks_clone = ticks.clone();
    let _subscription = gate.scope().frame().subscribe(move |_| {
        *ticks_clone.lock().unwrap() += 1;
    });

    clock.tick_many(10);
    assert_eq!(*ticks.lock().unwrap(), 0);

    gate.set_bounds(Rect::new(0.0, 500.0, 100.0, 100.0));
    gate.poll(&viewport);
    clock.tick_many(10);
    assert_eq!(*ticks.lock().unwrap(), 10);
}

/// Pausing via visibility freezes interpolated values in place; resuming
/// continues from the frozen values rather than restarting from begin
#[test]
fn test_pause_preserves_interpolation_state() {
    let clock = ClockHandle::new();
    let viewport = RectProbe::new(Rect::new(0.0, 0.0, 1000.0, 1000.0));

    let mut gate = VisibilityGate::new(Scope::root(&clock));
    gate.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
    gate.set_requested_running(true);
    gate.poll(&viewport);

    let group = InterpolationGroup::new([("x", ValueSpec::new(0.0, 10.0))], RepaintBridge::new())
        .unwrap()
        .into_shared();
    let _subscription = InterpolationGroup::attach(&group, &gate.scope().frame());

    clock.tick_many(7);
    let frozen = group.lock().unwrap().value("x").unwrap();
    assert_eq!(group.lock().unwrap().elapsed_ticks(), 7);

    // Scrolled out: ticks pass, nothing advances, nothing resets
    gate.set_bounds(Rect::new(0.0, 2000.0, 100.0, 100.0));
    gate.poll(&viewport);
    clock.tick_many(50);
    assert_eq!(group.lock().unwrap().value("x").unwrap(), frozen);
    assert_eq!(group.lock().unwrap().elapsed_ticks(), 7);

    // Back in view: the eighth tick continues where the seventh left off
    gate.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
    gate.poll(&viewport);
    clock.tick();
    assert_eq!(group.lock().unwrap().elapsed_ticks(), 8);
}

/// A subtree shadowing the repaint bridge replaces it for descendants only;
/// siblings keep the inherited bridge, with no restoration code involved
#[test]
fn test_repaint_shadowing_is_replacement_scoped_to_the_subtree() {
    let clock = ClockHandle::new();
    let inherited_count = Arc::new(Mutex::new(0u32));
    let shadow_count = Arc::new(Mutex::new(0u32));

    let inherited_clone = inherited_count.clone();
    let root = Scope::root_with_repaint(
        &clock,
        RepaintBridge::from_callback(move || *inherited_clone.lock().unwrap() += 1),
    );
    let root_context = root.context();

    let shadow_clone = shadow_count.clone();
    let shadowed_context =
        root_context.register_repaint(move || *shadow_clone.lock().unwrap() += 1);

    let mut shadowed_group =
        InterpolationGroup::new([("x", ValueSpec::new(0.0, 1.0))], shadowed_context.repaint())
            .unwrap();
    let mut sibling_group =
        InterpolationGroup::new([("x", ValueSpec::new(0.0, 1.0))], root_context.repaint())
            .unwrap();

    shadowed_group.set_override("x", 0.9);
    assert_eq!(*shadow_count.lock().unwrap(), 1);
    assert_eq!(*inherited_count.lock().unwrap(), 0);

    sibling_group.set_override("x", 0.9);
    assert_eq!(*shadow_count.lock().unwrap(), 1);
    assert_eq!(*inherited_count.lock().unwrap(), 1);

    // The shadow is a value; dropping it leaves the inherited bridge in
    // place for anything still built from the root context
    drop(shadowed_context);
    sibling_group.set_override("x", 0.1);
    assert_eq!(*inherited_count.lock().unwrap(), 2);
}

/// A scope dropped while its callback sits in the current tick's snapshot is
/// silently skipped, not ticked
#[test]
fn test_mid_tick_unmount_drops_the_stale_callback() {
    let clock = ClockHandle::new();

    // The dropper registers with the clock first, so when its listener
    // unmounts the victim mid-tick, the victim's callback is still sitting
    // later in the same tick's snapshot.
    let dropper = Scope::root(&clock);
    dropper.start();
    let victim = Scope::root(&clock);
    victim.start();

    let victim_ticks = Arc::new(Mutex::new(0u32));
    let victim_ticks_clone = victim_ticks.clone();
    let _victim_subscription = victim.frame().subscribe(move |_| {
        *victim_ticks_clone.lock().unwrap() += 1;
    });

    let victim_slot = Arc::new(Mutex::new(Some(victim)));
    let victim_slot_clone = victim_slot.clone();
    let _dropper_subscription = dropper.frame().subscribe(move |_| {
        victim_slot_clone.lock().unwrap().take();
    });

    clock.tick();
    assert_eq!(*victim_ticks.lock().unwrap(), 0);
    assert!(victim_slot.lock().unwrap().is_none());
    assert_eq!(clock.callback_count(), 1);
}
