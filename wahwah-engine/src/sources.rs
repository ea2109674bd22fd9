//! Deterministic signal sources for driving the effect in demos and tests.
//!
//! Nothing here belongs to the processing contract; the effect consumes
//! whatever buffers the host hands it. These exist so the CLI (and the test
//! suite) can feed the wah something audible without any file I/O.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use core::f32::consts::TAU;

/// Source waveform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Sine,
    Saw,
    Noise,
}

/// Free-running test source: a phase-accumulator oscillator for the
/// periodic kinds, seeded white noise otherwise. The seed makes noise runs
/// repeatable, which the tests rely on.
#[derive(Clone, Debug)]
pub struct SignalSource {
    kind: SourceKind,
    freq: f32,
    phase: f32, // [0,1)
    rng: SmallRng,
}

impl SignalSource {
    pub fn new(kind: SourceKind, freq_hz: f32, seed: u64) -> Self {
        Self {
            kind,
            freq: freq_hz.max(0.0),
            phase: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn sine(freq_hz: f32) -> Self {
        Self::new(SourceKind::Sine, freq_hz, 0)
    }

    pub fn saw(freq_hz: f32) -> Self {
        Self::new(SourceKind::Saw, freq_hz, 0)
    }

    pub fn noise(seed: u64) -> Self {
        Self::new(SourceKind::Noise, 0.0, seed)
    }

    /// Advance one sample and return it, in [-1, 1].
    #[inline]
    pub fn next(&mut self, sr: f32) -> f32 {
        let s = match self.kind {
            SourceKind::Sine => (TAU * self.phase).sin(),
            SourceKind::Saw => 2.0 * self.phase - 1.0,
            SourceKind::Noise => self.rng.gen_range(-1.0..1.0),
        };
        self.phase = (self.phase + self.freq / sr) % 1.0;
        s
    }

    /// Fill a whole block.
    pub fn fill(&mut self, out: &mut [f32], sr: f32) {
        for y in out.iter_mut() {
            *y = self.next(sr);
        }
    }
}
