//! Orbit Demo
//!
//! A headless walk through the animation pipeline as a math explainer would
//! use it:
//! - A root scope driving an orbit (angle + radius) interpolation group
//! - A nested, visibility-gated scope for a satellite trail
//! - Freezing the radius with an override while the angle keeps advancing
//! - A fade-in running on the same clock
//!
//! Run with: cargo run -p kinema_motion --example orbit_demo

use kinema_core::clock::ClockHandle;
use kinema_core::config::MotionConfig;
use kinema_core::error::MotionError;
use kinema_core::repaint::RepaintBridge;
use kinema_motion::fade::Fade;
use kinema_motion::group::{InterpolationGroup, ValueSpec};
use kinema_motion::interpolator::Interpolator;
use kinema_motion::scope::Scope;
use kinema_motion::visibility::{Rect, RectProbe, VisibilityGate};

fn main() -> Result<(), MotionError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = MotionConfig::load_str("fade_duration_ticks = 30\n")?;
    let clock = ClockHandle::new();

    // Repaints would re-render the visualization subtree; here they just log.
    let root = Scope::root_with_repaint(
        &clock,
        RepaintBridge::from_callback(|| tracing::info!("repaint requested")),
    );
    let context = root.context();

    let orbit = InterpolationGroup::new(
        [
            ("angle", ValueSpec::new(0.0, std::f64::consts::TAU)),
            (
                "radius",
                ValueSpec::new(80.0, 120.0)
                    .with_interpolator(Interpolator::cosine_with_frequency(config.wave_frequency)),
            ),
        ],
        context.repaint(),
    )?
    .into_shared();
    let _orbit_ticks = InterpolationGroup::attach(&orbit, &context.frame());

    // The satellite trail only animates while scrolled into view.
    let mut trail_gate = VisibilityGate::new(context.child_scope())
        .with_margin(config.visibility_margin_px);
    trail_gate.set_bounds(Rect::new(0.0, 200.0, 300.0, 300.0));
    trail_gate.set_requested_running(true);
    trail_gate.poll(&RectProbe::new(Rect::new(0.0, 0.0, 1280.0, 720.0)));

    let fade = Fade::with_duration(&clock, false, config.fade_duration_ticks);
    fade.set_visible_target(true);

    root.start();
    clock.tick_many(30);
    report("after 30 ticks", &orbit, &fade);

    // Freeze the radius; the angle keeps orbiting and the simulation keeps
    // advancing the radius underneath.
    orbit.lock().unwrap().set_override("radius", 100.0);
    clock.tick_many(30);
    report("radius frozen", &orbit, &fade);

    // Unfreeze: the radius snaps to wherever the simulation drifted.
    orbit.lock().unwrap().clear_override("radius");
    report("radius released", &orbit, &fade);

    root.stop();
    clock.tick_many(10);
    tracing::info!(
        elapsed = orbit.lock().unwrap().elapsed_ticks(),
        "stopped; ticks no longer advance"
    );

    Ok(())
}

fn report(
    label: &str,
    orbit: &kinema_motion::group::SharedGroup,
    fade: &Fade,
) {
    let orbit = orbit.lock().unwrap();
    tracing::info!(
        angle = orbit.value("angle").unwrap_or_default(),
        radius = orbit.value("radius").unwrap_or_default(),
        opacity = fade.opacity(),
        "{label}"
    );
}
