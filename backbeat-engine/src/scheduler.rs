//! Lookahead scheduler.
//!
//! The code that decides what to play runs on a coarse, jittery timer; the sounds
//! it queues start at exact device-clock times. Each tick fills the window
//! `[now, now + lookahead)` with every slot whose time falls inside it, so wake-up
//! jitter only changes how early a slot is queued, never when it sounds.

use std::time::Duration;

use tracing::trace;

use crate::clock::AudioTime;
use crate::device::AudioDevice;
use crate::params::{sixteenth_secs, Params};
use crate::pattern::{triggers, Slot};
use crate::synth::schedule_set;

/// How far ahead of the device clock a tick may queue events.
pub const DEFAULT_LOOKAHEAD_SECS: f64 = 0.1;
/// How often the scheduler wakes up.
pub const DEFAULT_WAKE_INTERVAL: Duration = Duration::from_millis(25);

/// Timing constants for the scheduler.
///
/// The defaults are empirical: the lookahead must exceed the wake interval plus
/// its worst-case jitter, or slots will be queued late.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SchedulerConfig {
    pub lookahead: f64,
    pub wake_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { lookahead: DEFAULT_LOOKAHEAD_SECS, wake_interval: DEFAULT_WAKE_INTERVAL }
    }
}

impl SchedulerConfig {
    /// Replace non-finite or non-positive values with the defaults.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            lookahead: if self.lookahead.is_finite() && self.lookahead > 0.0 { self.lookahead } else { d.lookahead },
            wake_interval: if self.wake_interval.is_zero() { d.wake_interval } else { self.wake_interval },
        }
    }
}

/// Slot position and next event time for one playback session.
#[derive(Clone, Debug)]
pub struct Sequencer {
    config: SchedulerConfig,
    next_event_time: AudioTime,
    slot: Slot,
}

impl Sequencer {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config: config.sanitized(), next_event_time: 0.0, slot: Slot::FIRST }
    }

    #[inline] pub fn config(&self) -> &SchedulerConfig { &self.config }
    #[inline] pub fn slot(&self) -> Slot { self.slot }
    #[inline] pub fn next_event_time(&self) -> AudioTime { self.next_event_time }

    /// Begin a session at device time `now`: slot 0, first event at `now`.
    pub fn restart(&mut self, now: AudioTime) {
        self.slot = Slot::FIRST;
        self.next_event_time = now;
    }

    /// Queue every slot inside the lookahead window. Returns how many slots were queued.
    ///
    /// Tempo and genre are read once per slot, so a change affects the spacing and
    /// pattern of not-yet-queued slots only.
    pub fn tick<D: AudioDevice + ?Sized>(&mut self, device: &mut D, params: &Params) -> usize {
        let horizon = device.current_time() + self.config.lookahead;
        let mut slots = 0;
        while self.next_event_time < horizon {
            let class = params.classification();
            let set = triggers(class, self.slot);
            let voices = schedule_set(device, &set, class, self.next_event_time);
            trace!(slot = self.slot.index(), at = self.next_event_time, voices, %class, "slot queued");

            self.next_event_time += sixteenth_secs(params.tempo());
            self.slot = self.slot.next();
            slots += 1;
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Voice;
    use crate::test_support::RecordingDevice;

    fn slot_times(dev: &RecordingDevice, voice: Voice) -> Vec<f64> {
        dev.records().iter().filter(|r| r.voice == voice).map(|r| r.start).collect()
    }

    #[test]
    fn spacing_is_a_sixteenth_regardless_of_wake_jitter() {
        for bpm in [60.0_f32, 97.0, 120.0, 174.0] {
            let mut dev = RecordingDevice::new(48_000.0);
            let params = Params::new(bpm, "Pop");
            let mut seq = Sequencer::new(SchedulerConfig::default());
            seq.restart(dev.current_time());

            // Irregular wake-ups between 3 ms and 70 ms.
            let jitter = [0.003, 0.070, 0.025, 0.011, 0.049, 0.031, 0.068, 0.004];
            let mut starts = Vec::new();
            for i in 0..400 {
                let before = seq.next_event_time();
                let n = seq.tick(&mut dev, &params);
                for k in 0..n {
                    starts.push(before + k as f64 * sixteenth_secs(bpm));
                }
                dev.advance_secs(jitter[i % jitter.len()]);
            }

            let step = 15.0 / f64::from(bpm);
            let hats = slot_times(&dev, Voice::ClosedHat);
            assert!(hats.len() > 8);
            for w in hats.windows(2) {
                assert!((w[1] - w[0] - 2.0 * step).abs() < 1e-9, "bpm={bpm} gap={}", w[1] - w[0]);
            }
            for w in starts.windows(2) {
                assert!((w[1] - w[0] - step).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn slots_cycle_in_order_without_skips() {
        let mut dev = RecordingDevice::new(44_100.0);
        let params = Params::new(140.0, "Techno");
        let mut seq = Sequencer::new(SchedulerConfig::default());
        seq.restart(0.0);
        let mut seen = Vec::new();
        for _ in 0..200 {
            let before = seq.slot();
            let n = seq.tick(&mut dev, &params);
            let mut s = before;
            for _ in 0..n {
                seen.push(s.index());
                s = s.next();
            }
            assert_eq!(s, seq.slot());
            dev.advance_secs(0.025);
        }
        assert!(seen.len() > 32);
        for (i, s) in seen.iter().enumerate() {
            assert_eq!(usize::from(*s), i % 16);
        }
    }

    #[test]
    fn tick_fills_exactly_the_lookahead_window() {
        let mut dev = RecordingDevice::new(48_000.0);
        let params = Params::new(120.0, "Pop");
        let mut seq = Sequencer::new(SchedulerConfig::default());
        seq.restart(0.0);
        // 0.125 s per slot: only slot 0 fits in [0, 0.1).
        assert_eq!(seq.tick(&mut dev, &params), 1);
        assert_eq!(seq.tick(&mut dev, &params), 0);
        dev.advance_secs(0.05);
        assert_eq!(seq.tick(&mut dev, &params), 1);
        assert_eq!(seq.slot().index(), 2);
        assert!((seq.next_event_time() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn tempo_change_only_affects_unqueued_slots() {
        let mut dev = RecordingDevice::new(48_000.0);
        let params = Params::new(120.0, "Pop");
        let mut seq = Sequencer::new(SchedulerConfig::default());
        seq.restart(0.0);
        seq.tick(&mut dev, &params);
        params.set_tempo(60.0);
        dev.advance_secs(0.2);
        seq.tick(&mut dev, &params);
        let hats = slot_times(&dev, Voice::ClosedHat);
        // slot 0 at 0.0 queued at 120 BPM; slot 1 at 0.125 used the old spacing,
        // slot 2 follows 0.25 s later at the new tempo.
        assert_eq!(hats[0], 0.0);
        assert!((seq.next_event_time() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn genre_change_lands_on_next_slot() {
        let mut dev = RecordingDevice::new(48_000.0);
        let params = Params::new(120.0, "Pop");
        let mut seq = Sequencer::new(SchedulerConfig::default());
        seq.restart(0.0);
        // Pop: kick on 0 and 8. Queue slots 0..=3.
        dev.advance_secs(0.3);
        seq.tick(&mut dev, &params);
        params.set_genre("Techno");
        dev.advance_secs(0.5);
        seq.tick(&mut dev, &params);
        let kicks = slot_times(&dev, Voice::Kick);
        // Slot 0 under Pop, slot 4 under Techno.
        assert_eq!(kicks, vec![0.0, 0.5]);
    }

    #[test]
    fn config_is_sanitized() {
        let c = SchedulerConfig { lookahead: f64::NAN, wake_interval: Duration::ZERO }.sanitized();
        assert_eq!(c, SchedulerConfig::default());
    }
}
