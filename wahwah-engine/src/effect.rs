//! Effect lifecycle: one master state for offline passes, N slave states
//! for concurrent realtime channels.
//!
//! Both paths share the *same* live parameter record but never share filter
//! memory: a knob edit while several channels play reaches every stream at
//! its next block without one channel's memory bleeding into another's.
//! The two paths are mutually exclusive per activation:
//!
//! ```text
//! Idle → offline_init → offline_process*                (offline / preview)
//! Idle → realtime_init → add_channel* / process* → realtime_finalize → Idle
//! ```
//!
//! The channel index handed out by `realtime_add_channel` is the channel's
//! stable identity for the activation; the `&mut self` receiver is the
//! exclusivity boundary the concurrency contract asks for.

use log::{debug, trace};

use wahwah_core::params::WahwahParams;
use wahwah_core::wah::WahState;

use crate::error::EffectError;

use std::f64::consts::PI;

/// Preferred realtime block size in samples, fixed at `realtime_init`.
/// A latency/throughput tradeoff: small enough to track live edits, large
/// enough to amortize the per-block parameter refresh.
pub const REALTIME_BLOCK_SIZE: usize = 512;

/// Process-wide descriptive metadata for effect discovery. Read-only; has
/// no bearing on the DSP itself.
#[derive(Copy, Clone, Debug)]
pub struct EffectDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub supports_realtime: bool,
    pub audio_in: u32,
    pub audio_out: u32,
}

/// The wahwah effect descriptor.
pub const WAHWAH: EffectDescriptor = EffectDescriptor {
    name: "Wahwah",
    description: "Rapid tone quality variations, like that guitar sound so popular in the 1970's",
    supports_realtime: true,
    audio_in: 1,
    audio_out: 1,
};

/// Which member of a stereo pair (if any) an offline stream carries. The
/// second channel gets a one-time +π LFO start-phase offset so the two
/// sweeps decorrelate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChannelRole {
    Mono,
    Left,
    Right,
}

/// Activation paths; `Idle` accepts either initialize.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Activation {
    Idle,
    Offline,
    Realtime,
}

/// Check every field of the record against its declared range.
///
/// Per-field only; the filter math tolerates any in-range combination. The
/// hazards this actually guards are `res` at zero and non-finite values.
pub fn validate_params(params: &WahwahParams) -> Result<(), EffectError> {
    type P = WahwahParams;
    check("freq_hz", params.freq_hz, P::FREQ_MIN, P::FREQ_MAX)?;
    check("phase_deg", params.phase_deg, P::PHASE_MIN, P::PHASE_MAX)?;
    check("depth_pct", params.depth_pct, P::DEPTH_MIN, P::DEPTH_MAX)?;
    check("res", params.res, P::RES_MIN, P::RES_MAX)?;
    check("freq_ofs_pct", params.freq_ofs_pct, P::FREQ_OFS_MIN, P::FREQ_OFS_MAX)?;
    check("out_gain_db", params.out_gain_db, P::OUT_GAIN_MIN, P::OUT_GAIN_MAX)?;
    Ok(())
}

fn check(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), EffectError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(EffectError::ParamOutOfRange { name, value, min, max })
    }
}

/// One wahwah effect instance: the owning container of per-stream states.
///
/// Holds the live parameter record, the optional master stream (offline
/// path) and the slave collection (realtime path). All methods are
/// synchronous; nothing here spawns threads or blocks.
#[derive(Clone, Debug)]
pub struct WahwahEffect {
    params: WahwahParams,
    master: Option<WahState>,
    slaves: Vec<WahState>,
    block_size: usize,
    activation: Activation,
}

impl WahwahEffect {
    /// Build an effect around a validated record.
    pub fn new(params: WahwahParams) -> Result<Self, EffectError> {
        validate_params(&params)?;
        Ok(Self {
            params,
            master: None,
            slaves: Vec::new(),
            block_size: REALTIME_BLOCK_SIZE,
            activation: Activation::Idle,
        })
    }

    /// The live record.
    #[inline]
    pub fn params(&self) -> &WahwahParams {
        &self.params
    }

    /// Swap in an edited record (validated, commit-on-success). Every
    /// stream, master and slaves alike, picks it up at its next block;
    /// filter memory is left untouched, so the stream stays continuous.
    pub fn set_params(&mut self, params: WahwahParams) -> Result<(), EffectError> {
        validate_params(&params)?;
        trace!("parameter record swapped: {:?}", params);
        self.params = params;
        Ok(())
    }

    /// Preferred block length for the realtime path.
    #[inline]
    pub fn preferred_block_size(&self) -> usize {
        self.block_size
    }

    /// Number of active realtime channels.
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.slaves.len()
    }

    // ------------------------- offline path -------------------------------

    /// Begin an offline activation: build the master stream at
    /// `sample_rate`. A `Right` role shifts the LFO start phase by +π once,
    /// before any processing.
    pub fn offline_init(
        &mut self,
        sample_rate: f64,
        role: ChannelRole,
    ) -> Result<(), EffectError> {
        if !(sample_rate > 0.0) {
            return Err(EffectError::InvalidSampleRate(sample_rate));
        }
        let mut master = WahState::new(sample_rate, &self.params);
        if role == ChannelRole::Right {
            master.offset_phase(PI);
        }
        self.master = Some(master);
        self.slaves.clear();
        self.activation = Activation::Offline;
        debug!("offline init: {:?} @ {} Hz", role, sample_rate);
        Ok(())
    }

    /// Run one offline block through the master stream. Calling before
    /// [`WahwahEffect::offline_init`] is a sequencing error.
    pub fn offline_process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
    ) -> Result<usize, EffectError> {
        if self.activation != Activation::Offline {
            return Err(EffectError::NotInitialized);
        }
        let master = self.master.as_mut().ok_or(EffectError::NotInitialized)?;
        Ok(master.process(&self.params, input, output))
    }

    /// In-place variant of [`WahwahEffect::offline_process`].
    pub fn offline_process_in_place(&mut self, buf: &mut [f32]) -> Result<usize, EffectError> {
        if self.activation != Activation::Offline {
            return Err(EffectError::NotInitialized);
        }
        let master = self.master.as_mut().ok_or(EffectError::NotInitialized)?;
        Ok(master.process_in_place(&self.params, buf))
    }

    // ------------------------- realtime path ------------------------------

    /// Begin a realtime activation: drop any previous streams and fix the
    /// preferred block size. Channels are added one by one afterwards.
    pub fn realtime_init(&mut self) {
        self.block_size = REALTIME_BLOCK_SIZE;
        self.slaves.clear();
        self.master = None;
        self.activation = Activation::Realtime;
        debug!("realtime init, block size {}", self.block_size);
    }

    /// Append a fresh slave stream for the next channel; returns its stable
    /// index. Order of addition defines channel identity.
    pub fn realtime_add_channel(&mut self, sample_rate: f64) -> Result<usize, EffectError> {
        if self.activation != Activation::Realtime {
            return Err(EffectError::NotInitialized);
        }
        if !(sample_rate > 0.0) {
            return Err(EffectError::InvalidSampleRate(sample_rate));
        }
        self.slaves.push(WahState::new(sample_rate, &self.params));
        let index = self.slaves.len() - 1;
        debug!("realtime channel {} added @ {} Hz", index, sample_rate);
        Ok(index)
    }

    /// Run one realtime block through the slave owning `channel`. A stale
    /// index is detected and reported, never an out-of-bounds read.
    pub fn realtime_process(
        &mut self,
        channel: usize,
        input: &[f32],
        output: &mut [f32],
    ) -> Result<usize, EffectError> {
        if self.activation != Activation::Realtime {
            return Err(EffectError::NotInitialized);
        }
        let channels = self.slaves.len();
        let slave = self
            .slaves
            .get_mut(channel)
            .ok_or(EffectError::ChannelOutOfRange { index: channel, channels })?;
        Ok(slave.process(&self.params, input, output))
    }

    /// In-place variant of [`WahwahEffect::realtime_process`].
    pub fn realtime_process_in_place(
        &mut self,
        channel: usize,
        buf: &mut [f32],
    ) -> Result<usize, EffectError> {
        if self.activation != Activation::Realtime {
            return Err(EffectError::NotInitialized);
        }
        let channels = self.slaves.len();
        let slave = self
            .slaves
            .get_mut(channel)
            .ok_or(EffectError::ChannelOutOfRange { index: channel, channels })?;
        Ok(slave.process_in_place(&self.params, buf))
    }

    /// End the realtime activation: clear every slave and return to idle.
    /// Idempotent, and safe even if `realtime_init` never ran.
    pub fn realtime_finalize(&mut self) {
        if !self.slaves.is_empty() {
            debug!("realtime finalize, {} channel(s) dropped", self.slaves.len());
        }
        self.slaves.clear();
        self.activation = Activation::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SignalSource;

    const SR: f64 = 48_000.0;

    fn fill_sine(buf: &mut [f32]) {
        let mut src = SignalSource::sine(440.0);
        src.fill(buf, SR as f32);
    }

    #[test]
    fn zero_resonance_is_rejected_up_front() {
        let params = WahwahParams { res: 0.0, ..WahwahParams::default() };
        match WahwahEffect::new(params) {
            Err(EffectError::ParamOutOfRange { name: "res", .. }) => {}
            other => panic!("expected res rejection, got {:?}", other),
        }
    }

    #[test]
    fn non_finite_fields_are_rejected() {
        let params = WahwahParams { depth_pct: f64::NAN, ..WahwahParams::default() };
        assert!(WahwahEffect::new(params).is_err());
    }

    #[test]
    fn bad_sample_rates_are_rejected() {
        let mut fx = WahwahEffect::new(WahwahParams::default()).unwrap();
        assert_eq!(
            fx.offline_init(0.0, ChannelRole::Mono),
            Err(EffectError::InvalidSampleRate(0.0))
        );
        assert_eq!(
            fx.offline_init(-44_100.0, ChannelRole::Mono),
            Err(EffectError::InvalidSampleRate(-44_100.0))
        );
        fx.realtime_init();
        assert!(fx.realtime_add_channel(f64::NAN).is_err());
    }

    #[test]
    fn process_before_init_is_a_sequencing_error() {
        let mut fx = WahwahEffect::new(WahwahParams::default()).unwrap();
        let input = [0.0f32; 16];
        let mut output = [0.0f32; 16];
        assert_eq!(
            fx.offline_process(&input, &mut output),
            Err(EffectError::NotInitialized)
        );
        assert_eq!(
            fx.realtime_process(0, &input, &mut output),
            Err(EffectError::NotInitialized)
        );
        assert_eq!(fx.realtime_add_channel(SR), Err(EffectError::NotInitialized));
    }

    #[test]
    fn stale_channel_index_is_detected() {
        let mut fx = WahwahEffect::new(WahwahParams::default()).unwrap();
        fx.realtime_init();
        fx.realtime_add_channel(SR).unwrap();
        let input = [0.0f32; 8];
        let mut output = [0.0f32; 8];
        assert_eq!(
            fx.realtime_process(1, &input, &mut output),
            Err(EffectError::ChannelOutOfRange { index: 1, channels: 1 })
        );
    }

    #[test]
    fn finalize_is_idempotent_and_total() {
        let mut fx = WahwahEffect::new(WahwahParams::default()).unwrap();
        // Never initialized: still fine.
        fx.realtime_finalize();
        fx.realtime_init();
        fx.realtime_add_channel(SR).unwrap();
        fx.realtime_finalize();
        fx.realtime_finalize();
        assert_eq!(fx.channel_count(), 0);
        let input = [0.0f32; 8];
        let mut output = [0.0f32; 8];
        assert_eq!(
            fx.realtime_process(0, &input, &mut output),
            Err(EffectError::NotInitialized)
        );
    }

    #[test]
    fn slaves_share_the_record_but_not_memory() {
        let mut fx = WahwahEffect::new(WahwahParams::default()).unwrap();
        fx.realtime_init();
        let a = fx.realtime_add_channel(SR).unwrap();
        let b = fx.realtime_add_channel(SR).unwrap();

        let mut input = vec![0.0f32; 256];
        fill_sine(&mut input);
        let mut out_a = vec![0.0f32; 256];
        let mut out_b = vec![0.0f32; 256];

        // Identical twins fed identical input agree bit for bit.
        fx.realtime_process(a, &input, &mut out_a).unwrap();
        fx.realtime_process(b, &input, &mut out_b).unwrap();
        for (x, y) in out_a.iter().zip(out_b.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }

        // Perturbing one must not disturb the other's subsequent output.
        let noise: Vec<f32> = {
            let mut src = SignalSource::noise(7);
            let mut buf = vec![0.0f32; 256];
            src.fill(&mut buf, SR as f32);
            buf
        };
        fx.realtime_process(a, &noise, &mut out_a).unwrap();

        let mut reference = WahwahEffect::new(WahwahParams::default()).unwrap();
        reference.realtime_init();
        let r = reference.realtime_add_channel(SR).unwrap();
        let mut out_r = vec![0.0f32; 256];
        reference.realtime_process(r, &input, &mut out_r).unwrap();
        reference.realtime_process(r, &input, &mut out_r).unwrap();

        fx.realtime_process(b, &input, &mut out_b).unwrap();
        for (x, y) in out_b.iter().zip(out_r.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn right_role_matches_a_half_turn_start_phase() {
        let input = {
            let mut buf = vec![0.0f32; 512];
            fill_sine(&mut buf);
            buf
        };

        let mut right = WahwahEffect::new(WahwahParams::default()).unwrap();
        right.offline_init(SR, ChannelRole::Right).unwrap();
        let mut out_right = vec![0.0f32; 512];
        right.offline_process(&input, &mut out_right).unwrap();

        let shifted = WahwahParams { phase_deg: 180.0, ..WahwahParams::default() };
        let mut left = WahwahEffect::new(shifted).unwrap();
        left.offline_init(SR, ChannelRole::Left).unwrap();
        let mut out_left = vec![0.0f32; 512];
        left.offline_process(&input, &mut out_left).unwrap();

        for (x, y) in out_right.iter().zip(out_left.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn record_swap_keeps_streams_continuous() {
        let input = {
            let mut buf = vec![0.0f32; 60];
            fill_sine(&mut buf);
            buf
        };

        let mut fx = WahwahEffect::new(WahwahParams::default()).unwrap();
        fx.offline_init(SR, ChannelRole::Mono).unwrap();
        let mut edited = vec![0.0f32; 60];
        fx.offline_process(&input[..30], &mut edited[..30]).unwrap();
        let louder = WahwahParams { out_gain_db: 0.0, ..WahwahParams::default() };
        fx.set_params(louder).unwrap();
        fx.offline_process(&input[30..], &mut edited[30..]).unwrap();

        let mut plain_fx = WahwahEffect::new(WahwahParams::default()).unwrap();
        plain_fx.offline_init(SR, ChannelRole::Mono).unwrap();
        let mut plain = vec![0.0f32; 60];
        plain_fx.offline_process(&input, &mut plain).unwrap();

        for i in 0..30 {
            assert_eq!(edited[i].to_bits(), plain[i].to_bits());
        }
        // Gain applies post-filter, so the tail rescales without any restart.
        let ratio = wahwah_core::dsp::db_to_lin(0.0) / wahwah_core::dsp::db_to_lin(-6.0);
        for i in 30..60 {
            assert!((f64::from(plain[i]) * ratio - f64::from(edited[i])).abs() < 1e-6);
        }
    }

    #[test]
    fn rejected_swap_leaves_the_record_alone() {
        let mut fx = WahwahEffect::new(WahwahParams::default()).unwrap();
        let bad = WahwahParams { res: 0.0, ..WahwahParams::default() };
        assert!(fx.set_params(bad).is_err());
        assert_eq!(fx.params().res, WahwahParams::RES_DEFAULT);
    }

    #[test]
    fn descriptor_is_sane() {
        assert_eq!(WAHWAH.name, "Wahwah");
        assert!(WAHWAH.supports_realtime);
        assert_eq!((WAHWAH.audio_in, WAHWAH.audio_out), (1, 1));
    }
}
