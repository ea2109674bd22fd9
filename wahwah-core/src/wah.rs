//! Per-stream wahwah filter state: an LFO-swept second-order recursive
//! filter recomputed at control rate.
//!
//! One [`WahState`] per audio stream, exclusively owned, never shared. The
//! state splits into three groups:
//! - LFO bookkeeping (`skip_count`, `lfo_skip`, `phase`), advanced per sample
//! - derived parameter copies, refreshed once per [`WahState::process`] call
//! - filter continuity memory (`xn1..yn2`) and coefficients (`b0..a2`)
//!
//! Coefficients are recomputed only every [`LFO_SKIP_SAMPLES`]th processed
//! sample; between recomputes the stream behaves as a fixed-coefficient
//! biquad. That keeps the transcendental calls at control rate while the
//! memory shift runs at audio rate.
//!
//! Samples cross the boundary as `f32`; all internal state is `f64`.

use crate::dsp::{db_to_lin, m_cos, m_exp, m_sin, TAU};
use crate::params::WahwahParams;

use core::f64::consts::PI;

/// Samples processed between recomputes of the LFO-driven coefficients.
pub const LFO_SKIP_SAMPLES: u64 = 30;

/// Mutable state of one wahwah stream.
///
/// Create with [`WahState::new`], feed blocks through [`WahState::process`]
/// or [`WahState::process_in_place`]. The sample rate is fixed at creation;
/// a rate change means a fresh state (`reset`).
#[derive(Copy, Clone, Debug)]
pub struct WahState {
    sample_rate: f64,
    /// Monotonic count of processed samples; the control-rate clock.
    skip_count: u64,
    // Derived copies of the record, refreshed at every process call.
    lfo_skip: f64,
    depth: f64,
    freq_ofs: f64,
    phase: f64,
    out_gain: f64,
    /// One-time start-phase offset (stereo decorrelation); survives the
    /// per-call re-derivation of `phase`.
    phase_offset: f64,
    // Filter continuity memory.
    xn1: f64,
    xn2: f64,
    yn1: f64,
    yn2: f64,
    // Current coefficients; zero until the first processed sample.
    b0: f64,
    b1: f64,
    b2: f64,
    a0: f64,
    a1: f64,
    a2: f64,
}

impl WahState {
    /// Fresh state for a stream at `sample_rate` Hz.
    ///
    /// Filter memory and the sample counter start at zero; coefficients stay
    /// zero until the first processed sample (which always lands on a
    /// control-rate boundary, so `a0` is set before the filter divides by it).
    ///
    /// The record must already be validated: `res != 0`, `sample_rate > 0`.
    pub fn new(sample_rate: f64, params: &WahwahParams) -> Self {
        let mut s = Self {
            sample_rate,
            skip_count: 0,
            lfo_skip: 0.0,
            depth: 0.0,
            freq_ofs: 0.0,
            phase: 0.0,
            out_gain: 0.0,
            phase_offset: 0.0,
            xn1: 0.0,
            xn2: 0.0,
            yn1: 0.0,
            yn2: 0.0,
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
            a0: 0.0,
            a1: 0.0,
            a2: 0.0,
        };
        s.refresh(params);
        s
    }

    /// Reinitialize in place (new stream, possibly a new rate).
    pub fn reset(&mut self, sample_rate: f64, params: &WahwahParams) {
        *self = Self::new(sample_rate, params);
    }

    /// Shift the LFO start phase by `radians`, on top of whatever the record
    /// says. Applied once at stream start; a `+π` here decorrelates the
    /// sweep of the second channel of a stereo pair for the whole stream.
    #[inline]
    pub fn offset_phase(&mut self, radians: f64) {
        self.phase_offset += radians;
        self.phase += radians;
    }

    /// The rate this state was initialized for.
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Count of samples processed so far.
    #[inline]
    pub fn samples_processed(&self) -> u64 {
        self.skip_count
    }

    /// Re-derive the time-varying quantities from the live record. Runs once
    /// per process call, never per sample: a record edit lands at the next
    /// call boundary, with filter memory untouched.
    #[inline]
    fn refresh(&mut self, params: &WahwahParams) {
        self.lfo_skip = params.freq_hz * TAU / self.sample_rate;
        self.depth = params.depth_pct / 100.0;
        self.freq_ofs = params.freq_ofs_pct / 100.0;
        self.phase = params.phase_deg * PI / 180.0 + self.phase_offset;
        self.out_gain = db_to_lin(params.out_gain_db);
    }

    /// One audio-rate step. `res` is the live resonance for this call.
    #[inline]
    fn tick(&mut self, res: f64, x: f32) -> f32 {
        let input = f64::from(x);

        // Recompute on the 0th, 30th, 60th, … processed sample; the phase
        // term sees the already-advanced counter.
        let recompute = self.skip_count % LFO_SKIP_SAMPLES == 0;
        self.skip_count += 1;
        if recompute {
            // LFO in [0,1], warped toward the low end, then mapped to ω.
            let lfo = (1.0 + m_cos(self.skip_count as f64 * self.lfo_skip + self.phase)) / 2.0;
            let warped = lfo * self.depth * (1.0 - self.freq_ofs) + self.freq_ofs;
            let frequency = m_exp((warped - 1.0) * 6.0);
            let omega = PI * frequency;
            let sn = m_sin(omega);
            let cs = m_cos(omega);
            let alpha = sn / (2.0 * res);
            self.b0 = (1.0 - cs) / 2.0;
            self.b1 = 1.0 - cs;
            self.b2 = (1.0 - cs) / 2.0;
            self.a0 = 1.0 + alpha;
            self.a1 = -2.0 * cs;
            self.a2 = 1.0 - alpha;
        }

        let out = (self.b0 * input + self.b1 * self.xn1 + self.b2 * self.xn2
            - self.a1 * self.yn1
            - self.a2 * self.yn2)
            / self.a0;
        self.xn2 = self.xn1;
        self.xn1 = input;
        self.yn2 = self.yn1;
        self.yn1 = out;

        (out * self.out_gain) as f32
    }

    /// Process one block: read `input`, write the filtered result to
    /// `output`. Both slices carry the same stream; the shorter one bounds
    /// the work. Returns the number of samples produced.
    ///
    /// Synchronous, allocation-free, no latency: sample `i` out depends only
    /// on samples `..=i` in plus carried memory.
    pub fn process(&mut self, params: &WahwahParams, input: &[f32], output: &mut [f32]) -> usize {
        self.refresh(params);
        let res = params.res;
        let n = input.len().min(output.len());
        for (x, y) in input[..n].iter().zip(output[..n].iter_mut()) {
            *y = self.tick(res, *x);
        }
        n
    }

    /// Same transform when the host hands a single buffer for both
    /// directions. Equivalent to [`WahState::process`] sample for sample.
    pub fn process_in_place(&mut self, params: &WahwahParams, buf: &mut [f32]) -> usize {
        self.refresh(params);
        let res = params.res;
        for x in buf.iter_mut() {
            *x = self.tick(res, *x);
        }
        buf.len()
    }
}
