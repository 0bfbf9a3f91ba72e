//! A device that records what it is asked to play, with a hand-driven clock.

use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::{AudioClock, AudioTime};
use crate::device::AudioDevice;
use crate::error::SynthError;
use crate::graph::ScheduledUnit;
use crate::pattern::Voice;

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub voice: Voice,
    pub velocity: f32,
    pub start: AudioTime,
    pub stop: AudioTime,
}

/// Clones share the clock and the record list.
#[derive(Clone)]
pub struct RecordingDevice {
    clock: AudioClock,
    records: Arc<Mutex<Vec<Record>>>,
    rejected: Vec<Voice>,
}

impl RecordingDevice {
    pub fn new(sr: f32) -> Self {
        Self { clock: AudioClock::new(sr), records: Arc::default(), rejected: Vec::new() }
    }

    /// Fail every `schedule` call for `voice`.
    pub fn reject(&mut self, voice: Voice) {
        self.rejected.push(voice);
    }

    pub fn advance_secs(&self, secs: f64) {
        let frames = (secs * f64::from(self.clock.sample_rate())).round() as u64;
        self.clock.advance(frames);
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl AudioDevice for RecordingDevice {
    fn current_time(&self) -> AudioTime {
        self.clock.now()
    }

    fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }

    fn schedule(&mut self, unit: ScheduledUnit) -> Result<(), SynthError> {
        if self.rejected.contains(&unit.voice) {
            return Err(SynthError::QueueFull);
        }
        self.records.lock().unwrap_or_else(PoisonError::into_inner).push(Record {
            voice: unit.voice,
            velocity: unit.velocity,
            start: unit.start,
            stop: unit.stop,
        });
        Ok(())
    }
}
