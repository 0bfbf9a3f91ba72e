//! Sample-accurate voice mixer.
//!
//! The mixer is the only owner of sounding units and the only writer of the
//! [`AudioClock`]. Units arrive from the scheduling side through a lock-free SPSC
//! ring; the [`MixerLink`] end implements [`AudioDevice`], so the scheduler never
//! touches audio-thread state directly.

use backbeat_core::dsp::clamp;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::clock::{AudioClock, AudioTime};
use crate::device::AudioDevice;
use crate::error::SynthError;
use crate::graph::ScheduledUnit;

/// Intake ring size. A bar at 1000 BPM queues well under this per lookahead window.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Upper bound on simultaneously sounding units.
pub const MAX_ACTIVE_UNITS: usize = 128;

/// Audio-thread side: renders units and advances the clock.
pub struct Mixer {
    clock: AudioClock,
    intake: HeapCons<ScheduledUnit>,
    active: Vec<ScheduledUnit>,
    gain: f32,
}

/// Scheduling side: reads the clock and queues units.
pub struct MixerLink {
    clock: AudioClock,
    queue: HeapProd<ScheduledUnit>,
}

impl Mixer {
    /// New mixer and its link, with the clock at zero.
    pub fn new(sr: f32) -> (Self, MixerLink) {
        Self::with_capacity(sr, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(sr: f32, capacity: usize) -> (Self, MixerLink) {
        let clock = AudioClock::new(sr);
        let (queue, intake) = HeapRb::<ScheduledUnit>::new(capacity.max(1)).split();
        let mixer = Self {
            clock: clock.clone(),
            intake,
            active: Vec::with_capacity(MAX_ACTIVE_UNITS),
            gain: 1.0,
        };
        (mixer, MixerLink { clock, queue })
    }

    #[inline] pub fn clock(&self) -> &AudioClock { &self.clock }
    #[inline] pub fn active_units(&self) -> usize { self.active.len() }
    #[inline] pub fn gain(&self) -> f32 { self.gain }

    /// Master gain, clamped to `[0, 4]`; non-finite values reset to unity.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = if gain.is_finite() { clamp(gain, 0.0, 4.0) } else { 1.0 };
    }

    /// Move queued units into the active set, up to the active limit.
    fn admit(&mut self) {
        let sr = self.clock.sample_rate();
        while self.active.len() < MAX_ACTIVE_UNITS {
            match self.intake.try_pop() {
                Some(mut unit) => {
                    unit.reset(sr);
                    self.active.push(unit);
                }
                None => break,
            }
        }
    }

    /// Render `frames` mono samples, handing each to `emit`, then advance the clock.
    ///
    /// A unit sounds on every frame whose time `t` satisfies `start <= t < stop`,
    /// so onsets land on the first frame at or after the requested time.
    pub fn process<F: FnMut(f32)>(&mut self, frames: usize, mut emit: F) {
        self.admit();
        let base = self.clock.frames();
        for i in 0..frames as u64 {
            let t = self.clock.time_of(base + i);
            let mut acc = 0.0;
            for unit in &mut self.active {
                if unit.is_active_at(t) {
                    acc += unit.next();
                }
            }
            emit(clamp(acc * self.gain, -1.0, 1.0));
        }
        let end: AudioTime = self.clock.time_of(base + frames as u64);
        self.active.retain(|u| u.stop > end);
        self.clock.advance(frames as u64);
    }

    /// Render into an interleaved buffer, duplicating the mono mix to every channel.
    /// A trailing partial frame is zeroed.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        let ch = channels.max(1);
        let frames = out.len() / ch;
        let mut it = out.chunks_exact_mut(ch);
        self.process(frames, |s| {
            if let Some(frame) = it.next() {
                frame.fill(s);
            }
        });
        out[frames * ch..].fill(0.0);
    }
}

impl MixerLink {
    #[inline] pub fn clock(&self) -> &AudioClock { &self.clock }
}

impl AudioDevice for MixerLink {
    #[inline]
    fn current_time(&self) -> AudioTime {
        self.clock.now()
    }

    #[inline]
    fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }

    fn schedule(&mut self, unit: ScheduledUnit) -> Result<(), SynthError> {
        self.queue.try_push(unit).map_err(|_| SynthError::QueueFull)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Generator;
    use crate::pattern::Voice;

    struct Dc(f32);
    impl Generator for Dc {
        fn reset(&mut self, _sr: f32) {}
        fn next(&mut self) -> f32 { self.0 }
    }

    fn unit(start: f64, length: f64, level: f32) -> ScheduledUnit {
        ScheduledUnit::new(Voice::Snare, level, start, length, Box::new(Dc(level)))
    }

    #[test]
    fn onset_lands_on_the_exact_frame() {
        let (mut mixer, mut link) = Mixer::new(1024.0);
        link.schedule(unit(10.0 / 1024.0, 5.0 / 1024.0, 0.5)).unwrap();
        let mut out = vec![0.0; 32];
        mixer.render_interleaved(&mut out, 1);
        let hot: Vec<usize> = out.iter().enumerate().filter(|(_, s)| **s != 0.0).map(|(i, _)| i).collect();
        assert_eq!(hot, vec![10, 11, 12, 13, 14]);
        assert_eq!(link.clock().frames(), 32);
    }

    #[test]
    fn finished_units_are_released() {
        let (mut mixer, mut link) = Mixer::new(1000.0);
        link.schedule(unit(0.0, 0.010, 0.1)).unwrap();
        link.schedule(unit(0.0, 0.100, 0.1)).unwrap();
        let mut out = vec![0.0; 20];
        mixer.render_interleaved(&mut out, 1);
        assert_eq!(mixer.active_units(), 1);
        let mut out = vec![0.0; 100];
        mixer.render_interleaved(&mut out, 1);
        assert_eq!(mixer.active_units(), 0);
    }

    #[test]
    fn sum_is_clamped_and_duplicated_across_channels() {
        let (mut mixer, mut link) = Mixer::new(1000.0);
        for _ in 0..3 {
            link.schedule(unit(0.0, 1.0, 0.6)).unwrap();
        }
        let mut out = vec![0.0; 8];
        mixer.render_interleaved(&mut out, 2);
        assert!(out.iter().all(|s| *s == 1.0));
        assert_eq!(link.clock().frames(), 4);
    }

    #[test]
    fn partial_trailing_frame_is_zeroed() {
        let (mut mixer, mut link) = Mixer::new(1000.0);
        link.schedule(unit(0.0, 1.0, 0.5)).unwrap();
        let mut out = vec![7.0; 7];
        mixer.render_interleaved(&mut out, 2);
        assert_eq!(&out[..6], &[0.5; 6]);
        assert_eq!(out[6], 0.0);
        assert_eq!(link.clock().frames(), 3);
    }

    #[test]
    fn full_queue_reports_an_error() {
        let (_mixer, mut link) = Mixer::with_capacity(1000.0, 2);
        link.schedule(unit(0.0, 0.1, 0.1)).unwrap();
        link.schedule(unit(0.0, 0.1, 0.1)).unwrap();
        assert_eq!(link.schedule(unit(0.0, 0.1, 0.1)).unwrap_err(), SynthError::QueueFull);
    }

    #[test]
    fn gain_is_sanitised() {
        let (mut mixer, _link) = Mixer::new(1000.0);
        mixer.set_gain(f32::NAN);
        assert_eq!(mixer.gain(), 1.0);
        mixer.set_gain(-2.0);
        assert_eq!(mixer.gain(), 0.0);
    }
}
