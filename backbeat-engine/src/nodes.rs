//! Building blocks (nodes) for Backbeat voices.
//!
//! These are zero-allocation, per-sample components designed for realtime use.
//!
//! Contents:
//! - `Wave`, `Osc` : basic oscillators (Sine/Saw) with stable phase wrap
//! - `Noise`       : white noise in [-1, 1)
//!
//! Frequency is **Hz**; methods expect the current **sample rate** when stepping.

use backbeat_core::dsp::{fast_sin, wrap_phase01, TAU};
use core::fmt::Debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Oscillator waveform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wave { Sine, Saw }

#[inline]
fn osc_sample(phase01: f32, wave: Wave) -> f32 {
    match wave {
        Wave::Sine => fast_sin(TAU * phase01),
        Wave::Saw  => 2.0 * phase01 - 1.0,
    }
}

/// Free-running oscillator. Naive (aliasing) saw; the bass sits low enough for it.
#[derive(Copy, Clone, Debug)]
pub struct Osc {
    phase: f32,   // [0,1)
    freq:  f32,   // Hz
    wave:  Wave,
}

impl Osc {
    #[inline] pub fn new(freq_hz: f32, wave: Wave) -> Self { Self { phase: 0.0, freq: freq_hz.max(0.0), wave } }
    #[inline] pub fn set_freq(&mut self, hz: f32) { self.freq = hz.max(0.0); }
    #[inline] pub fn freq(&self) -> f32 { self.freq }
    #[inline] pub fn wave(&self) -> Wave { self.wave }

    /// Return the sample at the current phase, then advance one sample.
    #[inline]
    pub fn next(&mut self, sr: f32) -> f32 {
        let s = osc_sample(self.phase, self.wave);
        self.phase = wrap_phase01(self.phase + self.freq / sr);
        s
    }
}

/// White noise source with its own small PRNG, so the audio thread never touches
/// a thread-local generator.
#[derive(Clone, Debug)]
pub struct Noise {
    rng: SmallRng,
}

impl Noise {
    /// Seed from the calling thread's RNG. Call off the audio thread.
    pub fn from_entropy() -> Self {
        Self { rng: SmallRng::from_rng(rand::thread_rng()).unwrap_or_else(|_| SmallRng::seed_from_u64(0x6261_636b)) }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed) }
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }
}
