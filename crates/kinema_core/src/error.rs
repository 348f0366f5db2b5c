//! Error taxonomy
//!
//! Only configuration mistakes are errors here, and they fail fast at
//! construction naming the offending key. The recoverable conditions from the
//! runtime (stale clock callbacks, repaint requests with no bridge callback,
//! an unavailable visibility source) are deliberately not represented: they
//! degrade to "treat as inactive" and must never crash the render tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    /// A named value was configured with a NaN or infinite bound. Typed
    /// construction makes an absent bound unrepresentable; non-finite is the
    /// way a bound goes missing in practice.
    #[error("value '{key}' has a non-finite {bound} bound")]
    NonFiniteBound { key: String, bound: &'static str },

    #[error("value registered under an empty key")]
    EmptyKey,

    #[error("value '{key}' configured more than once")]
    DuplicateKey { key: String },

    #[error(transparent)]
    ConfigParse(#[from] toml::de::Error),
}
