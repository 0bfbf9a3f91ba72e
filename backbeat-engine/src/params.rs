//! Live tempo and genre.
//!
//! Written by the owner at any time, read by the scheduler once per slot. Reads
//! are lock-free; a change lands on the next slot boundary.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::pattern::Classification;

pub const DEFAULT_TEMPO_BPM: f32 = 120.0;
pub const MAX_TEMPO_BPM: f32 = 1000.0;
pub const DEFAULT_GENRE: &str = "Pop";

/// Coerce a requested tempo into a usable divisor.
///
/// Non-finite or non-positive values fall back to the default; values above the
/// ceiling are clamped so one lookahead window stays a bounded amount of work.
#[inline]
pub fn sanitize_tempo(bpm: f32) -> f32 {
    if !bpm.is_finite() || bpm <= 0.0 {
        DEFAULT_TEMPO_BPM
    } else {
        bpm.min(MAX_TEMPO_BPM)
    }
}

/// Length of one sixteenth note in seconds.
#[inline]
pub fn sixteenth_secs(bpm: f32) -> f64 {
    (60.0 / f64::from(sanitize_tempo(bpm))) * 0.25
}

/// Shared tempo/genre block.
#[derive(Debug)]
pub struct Params {
    tempo_bits: AtomicU32,
    genre: ArcSwap<String>,
}

impl Default for Params {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPO_BPM, DEFAULT_GENRE)
    }
}

impl Params {
    pub fn new(tempo_bpm: f32, genre: impl Into<String>) -> Self {
        Self {
            tempo_bits: AtomicU32::new(sanitize_tempo(tempo_bpm).to_bits()),
            genre: ArcSwap::from_pointee(genre.into()),
        }
    }

    pub fn set_tempo(&self, bpm: f32) {
        self.tempo_bits.store(sanitize_tempo(bpm).to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn tempo(&self) -> f32 {
        f32::from_bits(self.tempo_bits.load(Ordering::Relaxed))
    }

    pub fn set_genre(&self, label: impl Into<String>) {
        self.genre.store(Arc::new(label.into()));
    }

    pub fn genre(&self) -> Arc<String> {
        self.genre.load_full()
    }

    /// Classification of the current label.
    #[inline]
    pub fn classification(&self) -> Classification {
        Classification::of(&self.genre.load())
    }
}
