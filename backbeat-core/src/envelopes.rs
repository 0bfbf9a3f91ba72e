//! One-shot ramps used as per-voice envelopes and pitch sweeps.
//!
//! Provided ramps:
//! - `ExpRamp`    : multiplicative (exponential) glide between two positive values
//! - `LinearRamp` : straight-line glide, may reach or cross zero
//!
//! Both are `no_std` friendly and avoid heap allocations. A ramp is armed with a
//! length in seconds and a sample rate, then `next()` is called once per sample; after
//! the last step it holds its end value.

use core::fmt::Debug;
use crate::dsp::{exp_step_ratio, secs_to_samples};

// ------------------------------- Exponential ramp --------------------------------

/// Exponential ramp from `from` to `to` over a fixed number of samples.
///
/// Non-positive or non-finite endpoints make the ramp hold `max(from, 0)`.
#[derive(Copy, Clone, Debug)]
pub struct ExpRamp {
    value: f32,
    end:   f32,
    ratio: f32,
    left:  u32,
}

impl ExpRamp {
    #[inline]
    pub fn new(from: f32, to: f32, secs: f32, sr: f32) -> Self {
        let samples = secs_to_samples(secs, sr);
        let valid = from > 0.0 && to > 0.0 && from.is_finite() && to.is_finite();
        if !valid {
            let hold = if from.is_finite() { from.max(0.0) } else { 0.0 };
            return Self { value: hold, end: hold, ratio: 1.0, left: 0 };
        }
        Self { value: from, end: to, ratio: exp_step_ratio(from, to, samples), left: samples }
    }

    /// Current value, then advance one sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let out = self.value;
        if self.left > 0 {
            self.left -= 1;
            self.value = if self.left == 0 { self.end } else { self.value * self.ratio };
        }
        out
    }

    #[inline] pub fn value(&self) -> f32 { self.value }
    #[inline] pub fn is_done(&self) -> bool { self.left == 0 }
}

// --------------------------------- Linear ramp -----------------------------------

/// Linear ramp from `from` to `to` over a fixed number of samples.
#[derive(Copy, Clone, Debug)]
pub struct LinearRamp {
    value: f32,
    end:   f32,
    inc:   f32,
    left:  u32,
}

impl LinearRamp {
    #[inline]
    pub fn new(from: f32, to: f32, secs: f32, sr: f32) -> Self {
        let samples = secs_to_samples(secs, sr);
        if samples == 0 {
            return Self { value: to, end: to, inc: 0.0, left: 0 };
        }
        Self { value: from, end: to, inc: (to - from) / samples as f32, left: samples }
    }

    /// Current value, then advance one sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let out = self.value;
        if self.left > 0 {
            self.left -= 1;
            self.value = if self.left == 0 { self.end } else { self.value + self.inc };
        }
        out
    }

    #[inline] pub fn value(&self) -> f32 { self.value }
    #[inline] pub fn is_done(&self) -> bool { self.left == 0 }
}

// ------------------------------------ Tests --------------------------------------
