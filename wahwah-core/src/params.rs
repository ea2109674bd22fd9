//! The flat wahwah parameter record.
//!
//! Pure data: six independently mutable fields, each with its own declared
//! range. Every stream reads the *current* record once per process call, so
//! edits made between blocks take effect without touching filter memory.
//!
//! The core never clamps; the hosting boundary is responsible for keeping
//! each field inside its range before the record reaches a sample loop. The
//! two hard hazards are `res == 0` (divides `alpha`) and a non-positive
//! sample rate (divides the LFO increment); both must be rejected upstream.

/// Parameter record for one wahwah effect activation.
///
/// All fields are plain `f64`; there is no cross-field coupling. Ranges and
/// defaults are exposed as associated consts so hosts can build their own
/// clamping controls against them.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WahwahParams {
    /// LFO rate in Hz.
    pub freq_hz: f64,
    /// LFO start phase in degrees; semantically periodic over [0, 360).
    pub phase_deg: f64,
    /// Sweep depth in percent of the available range.
    pub depth_pct: f64,
    /// Filter resonance (peak sharpness). Bounded away from zero.
    pub res: f64,
    /// Lower bound of the sweep, in percent (lifts the whole sweep upward).
    pub freq_ofs_pct: f64,
    /// Output gain in dB, applied after the filter.
    pub out_gain_db: f64,
}

impl WahwahParams {
    pub const FREQ_DEFAULT: f64 = 1.5;
    pub const FREQ_MIN: f64 = 0.1;
    pub const FREQ_MAX: f64 = 4.0;

    pub const PHASE_DEFAULT: f64 = 0.0;
    pub const PHASE_MIN: f64 = 0.0;
    pub const PHASE_MAX: f64 = 360.0;

    pub const DEPTH_DEFAULT: f64 = 70.0;
    pub const DEPTH_MIN: f64 = 0.0;
    pub const DEPTH_MAX: f64 = 100.0;

    pub const RES_DEFAULT: f64 = 2.5;
    pub const RES_MIN: f64 = 0.1;
    pub const RES_MAX: f64 = 10.0;

    pub const FREQ_OFS_DEFAULT: f64 = 30.0;
    pub const FREQ_OFS_MIN: f64 = 0.0;
    pub const FREQ_OFS_MAX: f64 = 100.0;

    pub const OUT_GAIN_DEFAULT: f64 = -6.0;
    pub const OUT_GAIN_MIN: f64 = -30.0;
    pub const OUT_GAIN_MAX: f64 = 30.0;
}

impl Default for WahwahParams {
    fn default() -> Self {
        Self {
            freq_hz: Self::FREQ_DEFAULT,
            phase_deg: Self::PHASE_DEFAULT,
            depth_pct: Self::DEPTH_DEFAULT,
            res: Self::RES_DEFAULT,
            freq_ofs_pct: Self::FREQ_OFS_DEFAULT,
            out_gain_db: Self::OUT_GAIN_DEFAULT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_sit_inside_ranges() {
        let p = WahwahParams::default();
        assert!((WahwahParams::FREQ_MIN..=WahwahParams::FREQ_MAX).contains(&p.freq_hz));
        assert!((WahwahParams::PHASE_MIN..=WahwahParams::PHASE_MAX).contains(&p.phase_deg));
        assert!((WahwahParams::DEPTH_MIN..=WahwahParams::DEPTH_MAX).contains(&p.depth_pct));
        assert!((WahwahParams::RES_MIN..=WahwahParams::RES_MAX).contains(&p.res));
        assert!(
            (WahwahParams::FREQ_OFS_MIN..=WahwahParams::FREQ_OFS_MAX).contains(&p.freq_ofs_pct)
        );
        assert!(
            (WahwahParams::OUT_GAIN_MIN..=WahwahParams::OUT_GAIN_MAX).contains(&p.out_gain_db)
        );
    }

    #[test]
    fn res_range_excludes_zero() {
        assert!(WahwahParams::RES_MIN > 0.0);
    }
}
