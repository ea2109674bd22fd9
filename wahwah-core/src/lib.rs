#![cfg_attr(not(feature = "std"), no_std)]
//! Wahwah Core — no_std-ready DSP state for an LFO-swept resonant filter.
//!
//! Features
//! - `std`    : (default) use the Rust standard library
//! - `no-std` : build with `#![no_std]` and use `libm` for f64 math
//! - `serde`  : derive `Serialize`/`Deserialize` on [`params::WahwahParams`]
//!
//! Modules
//! - [`dsp`]    : math backend and dB/linear helpers
//! - [`params`] : the flat parameter record read by every stream
//! - [`wah`]    : [`wah::WahState`], the per-stream filter state machine
//!
//! Design
//! - No heap allocations; one mutable value-type state per audio stream
//! - The record is pure data; range enforcement happens at the caller's
//!   boundary, never inside the sample loop

pub mod dsp;
pub mod params;
pub mod wah;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::dsp::{db_to_lin, lin_to_db, TAU};
    pub use crate::params::WahwahParams;
    pub use crate::wah::{WahState, LFO_SKIP_SAMPLES};
}

#[cfg(test)]
mod smoke {

    #[test]
    fn prelude_exists() {
        use crate::prelude::*;
        let _ = db_to_lin(-6.0);
        let params = WahwahParams::default();
        let mut state = WahState::new(48_000.0, &params);
        let mut out = [0.0f32; 4];
        let n = state.process(&params, &[0.25, 0.5, 0.25, 0.0], &mut out);
        assert_eq!(n, 4);
    }
}
