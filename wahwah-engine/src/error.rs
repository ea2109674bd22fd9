//! Error surface of the effect boundary.
//!
//! Two families, per the processing contract:
//! - configuration errors (bad sample rate, out-of-range field) are
//!   recoverable: fix the value and initialize again;
//! - sequencing errors (processing before init, stale channel index) signal
//!   a host/effect protocol mismatch and are reported, never papered over.

use thiserror::Error;

/// Everything the effect boundary can reject.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EffectError {
    /// The stream sample rate must be positive.
    #[error("invalid sample rate {0} Hz (must be > 0)")]
    InvalidSampleRate(f64),

    /// A parameter field left its declared range (or is not finite).
    /// `res` at zero is the division hazard this guard exists for.
    #[error("parameter `{name}` = {value} outside {min}..={max}")]
    ParamOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A process call arrived before the matching initialize.
    #[error("process called before initialization")]
    NotInitialized,

    /// A realtime channel index beyond the current slave count.
    #[error("channel index {index} out of range ({channels} active)")]
    ChannelOutOfRange { index: usize, channels: usize },
}
