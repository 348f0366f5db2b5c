//! Kinema Core Runtime
//!
//! Foundational primitives for the Kinema animation engine:
//!
//! - **Frame Clock**: the single per-frame callback source, injectable so
//!   tests can step frames deterministically
//! - **Repaint Bridge**: explicit observer registration for state that
//!   mutates outside the declarative render path
//! - **Error Taxonomy**: fatal construction errors; recoverable conditions
//!   degrade to "inactive" instead of surfacing
//! - **Configuration**: TOML-loadable tuning knobs with serde defaults
//!
//! # Example
//!
//! ```rust
//! use kinema_core::clock::ClockHandle;
//!
//! let clock = ClockHandle::new();
//!
//! let id = clock.register(|frame| {
//!     println!("frame {frame}");
//! });
//!
//! clock.tick();
//! clock.unregister(id);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod repaint;

pub use clock::{CallbackId, ClockHandle, FrameCallback, FrameClock};
pub use config::MotionConfig;
pub use error::MotionError;
pub use repaint::{RepaintBridge, RepaintCallback};
