//! Percussion and bass voices that implement the realtime [`Generator`](crate::graph::Generator) trait.
//!
//! Each voice is a one-shot: it starts at its trigger velocity, decays to (near)
//! silence over a fixed length, and the mixer drops it once that length has elapsed.
//! Ramps are sample-based, so they are armed in `reset` once the mixer's sample rate
//! is known.

use backbeat_core::envelopes::{ExpRamp, LinearRamp};
use backbeat_core::filters::SvfTpt;

use crate::graph::Generator;
use crate::nodes::{Noise, Osc, Wave};
use crate::pattern::Voice;

/// Level exponential envelopes decay to. Exponential ramps cannot reach zero.
pub const ENVELOPE_FLOOR: f32 = 0.01;

pub const KICK_START_HZ: f32 = 150.0;
pub const KICK_END_HZ: f32 = 0.01;
pub const HAT_CUTOFF_HZ: f32 = 10_000.0;

/// Sample rate assumed until the mixer calls `reset`.
const PROVISIONAL_SR: f32 = 48_000.0;

/// Lifetime of each voice in seconds.
#[inline]
pub fn length_secs(voice: Voice) -> f32 {
    match voice {
        Voice::Kick => 0.5,
        Voice::Snare => 0.1,
        Voice::ClosedHat => 0.05,
        Voice::OpenHat => 0.2,
        Voice::Bass => 1.0,
    }
}

// ------------------------------------- Kick --------------------------------------

/// Sine with an exponential pitch drop from 150 Hz and an exponential amplitude decay.
#[derive(Copy, Clone, Debug)]
pub struct Kick {
    velocity: f32,
    sr: f32,
    osc: Osc,
    pitch: ExpRamp,
    amp: ExpRamp,
}

impl Kick {
    pub fn new(velocity: f32) -> Self {
        let mut k = Self {
            velocity,
            sr: PROVISIONAL_SR,
            osc: Osc::new(KICK_START_HZ, Wave::Sine),
            pitch: ExpRamp::new(KICK_START_HZ, KICK_END_HZ, 0.0, PROVISIONAL_SR),
            amp: ExpRamp::new(velocity, ENVELOPE_FLOOR, 0.0, PROVISIONAL_SR),
        };
        k.reset(PROVISIONAL_SR);
        k
    }
}

impl Generator for Kick {
    fn reset(&mut self, sr: f32) {
        let len = length_secs(Voice::Kick);
        self.sr = sr.max(1.0);
        self.osc = Osc::new(KICK_START_HZ, Wave::Sine);
        self.pitch = ExpRamp::new(KICK_START_HZ, KICK_END_HZ, len, self.sr);
        self.amp = ExpRamp::new(self.velocity, ENVELOPE_FLOOR, len, self.sr);
    }

    #[inline]
    fn next(&mut self) -> f32 {
        self.osc.set_freq(self.pitch.next());
        self.osc.next(self.sr) * self.amp.next()
    }
}

// ---------------------------------- Noise burst ----------------------------------

/// White noise with an exponential decay; optionally high-passed (hi-hats).
#[derive(Clone, Debug)]
pub struct NoiseBurst {
    velocity: f32,
    length: f32,
    noise: Noise,
    hp: Option<SvfTpt>,
    amp: ExpRamp,
}

impl NoiseBurst {
    pub fn snare(velocity: f32, noise: Noise) -> Self {
        Self::build(velocity, length_secs(Voice::Snare), noise, None)
    }

    pub fn hat(velocity: f32, open: bool, noise: Noise) -> Self {
        let voice = if open { Voice::OpenHat } else { Voice::ClosedHat };
        let hp = SvfTpt::highpass(HAT_CUTOFF_HZ, PROVISIONAL_SR);
        Self::build(velocity, length_secs(voice), noise, Some(hp))
    }

    fn build(velocity: f32, length: f32, noise: Noise, hp: Option<SvfTpt>) -> Self {
        Self {
            velocity,
            length,
            noise,
            hp,
            amp: ExpRamp::new(velocity, ENVELOPE_FLOOR, length, PROVISIONAL_SR),
        }
    }

    #[inline] pub fn is_filtered(&self) -> bool { self.hp.is_some() }
}

impl Generator for NoiseBurst {
    fn reset(&mut self, sr: f32) {
        let sr = sr.max(1.0);
        if let Some(hp) = self.hp.as_mut() {
            hp.set_sample_rate(sr);
            hp.reset();
        }
        self.amp = ExpRamp::new(self.velocity, ENVELOPE_FLOOR, self.length, sr);
    }

    #[inline]
    fn next(&mut self) -> f32 {
        let x = self.noise.next();
        let x = match self.hp.as_mut() {
            Some(hp) => hp.process(x),
            None => x,
        };
        x * self.amp.next()
    }
}

// ------------------------------------- Bass --------------------------------------

/// Sustained tone with a linear fade to silence. Sine for lofi, saw otherwise.
#[derive(Copy, Clone, Debug)]
pub struct Bass {
    gain: f32,
    sr: f32,
    osc: Osc,
    amp: LinearRamp,
}

impl Bass {
    pub fn new(freq_hz: f32, gain: f32, wave: Wave) -> Self {
        Self {
            gain,
            sr: PROVISIONAL_SR,
            osc: Osc::new(freq_hz, wave),
            amp: LinearRamp::new(gain, 0.0, length_secs(Voice::Bass), PROVISIONAL_SR),
        }
    }

    #[inline] pub fn wave(&self) -> Wave { self.osc.wave() }
    #[inline] pub fn freq(&self) -> f32 { self.osc.freq() }
}

impl Generator for Bass {
    fn reset(&mut self, sr: f32) {
        self.sr = sr.max(1.0);
        self.osc = Osc::new(self.osc.freq(), self.osc.wave());
        self.amp = LinearRamp::new(self.gain, 0.0, length_secs(Voice::Bass), self.sr);
    }

    #[inline]
    fn next(&mut self) -> f32 {
        self.osc.next(self.sr) * self.amp.next()
    }
}

// ------------------------------------ Tests --------------------------------------
