//! Math backend and dB helpers shared by the filter core.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Backend selection that works in both `std` and `no_std` contexts
//! - Side-effect free helpers that are easy to test
//!
//! Conventions:
//! - Everything here is `f64`: the filter state keeps double precision and
//!   only the buffer boundary is `f32`.
//! - All functions are `#[inline]` where useful to help the optimizer.

#![allow(clippy::excessive_precision)]

use core::f64::consts::PI;

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // libm (C math) in no_std
    if #[cfg(feature = "no-std")] {
        #[inline] pub(crate) fn m_sin(x: f64) -> f64 { libm::sin(x) }
        #[inline] pub(crate) fn m_cos(x: f64) -> f64 { libm::cos(x) }
        #[inline] pub(crate) fn m_exp(x: f64) -> f64 { libm::exp(x) }
        #[inline] pub(crate) fn m_ln(x: f64) -> f64 { libm::log(x) }
    // std backend
    } else {
        #[inline] pub(crate) fn m_sin(x: f64) -> f64 { x.sin() }
        #[inline] pub(crate) fn m_cos(x: f64) -> f64 { x.cos() }
        #[inline] pub(crate) fn m_exp(x: f64) -> f64 { x.exp() }
        #[inline] pub(crate) fn m_ln(x: f64) -> f64 { x.ln() }
    }
}

// --------------------------------- Constants -------------------------------------

/// 2π (commonly useful)
pub const TAU: f64 = 2.0 * PI;

/// A very small epsilon used in safe log arguments.
pub const EPS_SMALL: f64 = 1.0e-20;

// --------------------------------- dB / linear -----------------------------------

/// Convert dB to linear gain: lin = 10^(db/20).
#[inline]
pub fn db_to_lin(db: f64) -> f64 {
    if db <= -120.0 { 0.0 } else { m_exp(0.11512925464970229_f64 * db) } // ln(10)/20 ≈ 0.115129...
}

/// Convert linear gain to dB: db = 20*log10(lin).
#[inline]
pub fn lin_to_db(lin: f64) -> f64 {
    if lin <= EPS_SMALL { -120.0 }
    else { 8.685889638065036553_f64 * m_ln(lin) } // 20/ln(10)
}

// --------------------------------- Tests (std only) ------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_lin_roundtrip() {
        for db in [-60.0, -20.0, -6.0, 0.0, 6.0, 12.0, 24.0] {
            let lin = db_to_lin(db);
            let back = lin_to_db(lin);
            assert!((db - back).abs() < 1e-9, "db={}, back={}", db, back);
        }
    }

    #[test]
    fn unity_is_zero_db() {
        assert!((db_to_lin(0.0) - 1.0).abs() < 1e-12);
        assert!(lin_to_db(1.0).abs() < 1e-12);
    }

    #[test]
    fn six_db_doubles_roughly() {
        let g = db_to_lin(6.0);
        assert!((g - 1.9952623149688795).abs() < 1e-9, "g={}", g);
    }
}
