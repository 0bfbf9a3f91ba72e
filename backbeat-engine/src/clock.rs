//! Audio-device clock.
//!
//! The clock counts frames the mixer has rendered, so it lives in the output
//! device's time base and only ever moves forward. Readers on other threads see it
//! advance once per rendered block.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Seconds on the audio-device clock.
pub type AudioTime = f64;

/// Shared frame counter plus the sample rate needed to turn it into seconds.
#[derive(Clone, Debug)]
pub struct AudioClock {
    frames: Arc<AtomicU64>,
    sr: f32,
}

impl AudioClock {
    /// New clock at frame zero. `sr` must already be validated as positive.
    pub fn new(sr: f32) -> Self {
        Self { frames: Arc::new(AtomicU64::new(0)), sr }
    }

    #[inline] pub fn sample_rate(&self) -> f32 { self.sr }

    /// Frames rendered so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Current device time in seconds.
    #[inline]
    pub fn now(&self) -> AudioTime {
        self.frames() as f64 / f64::from(self.sr)
    }

    /// Time of an absolute frame index.
    #[inline]
    pub fn time_of(&self, frame: u64) -> AudioTime {
        frame as f64 / f64::from(self.sr)
    }

    /// Move the clock forward by `frames`. Only the renderer calls this.
    #[inline]
    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_counter() {
        let clock = AudioClock::new(48_000.0);
        let reader = clock.clone();
        clock.advance(24_000);
        assert_eq!(reader.frames(), 24_000);
        assert!((reader.now() - 0.5).abs() < 1e-12);
    }
}
