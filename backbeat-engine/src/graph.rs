//! Realtime synthesis graph core.
//!
//! This module defines the minimal `Generator` trait and `ScheduledUnit`, a
//! generator pinned to a window `[start, stop)` on the audio clock. Units are
//! built off the audio thread, handed to the mixer, and dropped by it once the
//! clock passes `stop`.
//!
//! Design goals
//! - No dynamic allocations per sample
//! - SR communicated once, when the mixer admits the unit
//! - Every unit has a finite lifetime

use core::fmt;

use crate::clock::AudioTime;
use crate::pattern::Voice;

/// Anything that can generate one sample at a time.
pub trait Generator: Send {
    /// Called once with the mixer's sample rate before the first `next`.
    fn reset(&mut self, sr: f32);

    /// Generate the next mono sample. Implementations should assume the sample
    /// rate has been communicated via `reset`.
    fn next(&mut self) -> f32;
}

/// A generator bound to a start and stop time on the device clock.
pub struct ScheduledUnit {
    pub voice: Voice,
    pub velocity: f32,
    pub start: AudioTime,
    pub stop: AudioTime,
    gen: Box<dyn Generator>,
}

impl ScheduledUnit {
    pub fn new(voice: Voice, velocity: f32, start: AudioTime, length: AudioTime, gen: Box<dyn Generator>) -> Self {
        Self { voice, velocity, start, stop: start + length.max(0.0), gen }
    }

    #[inline] pub(crate) fn reset(&mut self, sr: f32) { self.gen.reset(sr); }

    /// Whether the unit sounds at time `t`.
    #[inline]
    pub fn is_active_at(&self, t: AudioTime) -> bool {
        t >= self.start && t < self.stop
    }

    #[inline] pub(crate) fn next(&mut self) -> f32 { self.gen.next() }
}

impl fmt::Debug for ScheduledUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledUnit")
            .field("voice", &self.voice)
            .field("velocity", &self.velocity)
            .field("start", &self.start)
            .field("stop", &self.stop)
            .finish_non_exhaustive()
    }
}
