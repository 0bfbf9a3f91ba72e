//! Host-driven engine.
//!
//! `BlockEngine` owns the mixer and the scheduler and has no timer thread: the host
//! pulls audio with [`BlockEngine::render`], and the scheduler is ticked before every
//! chunk of at most one wake interval. Offline rendering and the C ABI use it.

use crate::clock::AudioTime;
use crate::error::{EngineError, EngineResult};
use crate::mixer::{Mixer, MixerLink};
use crate::params::Params;
use crate::pattern::Slot;
use crate::scheduler::{SchedulerConfig, Sequencer};
use crate::device::AudioDevice;

pub struct BlockEngine {
    mixer: Mixer,
    link: MixerLink,
    sequencer: Sequencer,
    params: Params,
    running: bool,
    chunk_frames: usize,
}

impl BlockEngine {
    pub fn new(sample_rate: f32) -> EngineResult<Self> {
        Self::with_config(sample_rate, SchedulerConfig::default())
    }

    pub fn with_config(sample_rate: f32, config: SchedulerConfig) -> EngineResult<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        let sequencer = Sequencer::new(config);
        let cfg = sequencer.config();
        // A chunk must fit inside the lookahead or its tail would be queued late.
        let span = cfg.wake_interval.as_secs_f64().min(cfg.lookahead);
        let chunk_frames = ((span * f64::from(sample_rate)) as usize).max(1);
        let (mixer, link) = Mixer::new(sample_rate);
        Ok(Self { mixer, link, sequencer, params: Params::default(), running: false, chunk_frames })
    }

    /// No-op while running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.sequencer.restart(self.link.current_time());
        self.sequencer.tick(&mut self.link, &self.params);
    }

    /// Queued sounds still play out through later `render` calls. No-op while stopped.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Same coercion as [`Engine::set_tempo`](crate::Engine::set_tempo), including the ceiling.
    pub fn set_tempo(&mut self, bpm: f32) {
        self.params.set_tempo(bpm);
    }

    pub fn set_genre(&mut self, label: impl Into<String>) {
        self.params.set_genre(label);
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.mixer.set_gain(gain);
    }

    #[inline] pub fn is_running(&self) -> bool { self.running }
    #[inline] pub fn params(&self) -> &Params { &self.params }
    #[inline] pub fn slot(&self) -> Slot { self.sequencer.slot() }
    #[inline] pub fn next_event_time(&self) -> AudioTime { self.sequencer.next_event_time() }
    #[inline] pub fn current_time(&self) -> AudioTime { self.link.current_time() }
    #[inline] pub fn sample_rate(&self) -> f32 { self.link.sample_rate() }
    #[inline] pub fn active_units(&self) -> usize { self.mixer.active_units() }

    /// Fill an interleaved buffer, ticking the scheduler between chunks. A trailing
    /// partial frame is zeroed.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let ch = channels.max(1);
        for chunk in out.chunks_mut(self.chunk_frames * ch) {
            if self.running {
                self.sequencer.tick(&mut self.link, &self.params);
            }
            self.mixer.render_interleaved(chunk, ch);
        }
    }

    /// Render `secs` of mono audio into a new buffer.
    pub fn render_secs(&mut self, secs: f64) -> Vec<f32> {
        let frames = (secs.max(0.0) * f64::from(self.sample_rate())).round() as usize;
        let mut out = vec![0.0; frames];
        self.render(&mut out, 1);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(xs: &[f32]) -> f32 {
        xs.iter().fold(0.0_f32, |p, x| p.max(x.abs()))
    }

    #[test]
    fn silent_until_started() {
        let mut e = BlockEngine::new(48_000.0).unwrap();
        let out = e.render_secs(0.5);
        assert_eq!(peak(&out), 0.0);
        assert_eq!(e.current_time(), 0.5);
    }

    #[test]
    fn plays_after_start_and_keeps_slot_pace() {
        let mut e = BlockEngine::new(48_000.0).unwrap();
        e.set_genre("Techno");
        e.set_tempo(120.0);
        e.start();
        let out = e.render_secs(2.0);
        assert!(peak(&out) > 0.1);
        // 2 s at 120 BPM is 16 slots; the window reaches 0.1 s past the clock.
        assert!((e.next_event_time() - 2.0).abs() < 0.1 + 0.125);
        assert_eq!(e.slot().index(), 1);
    }

    #[test]
    fn stop_lets_queued_sounds_ring_out_then_silence() {
        let mut e = BlockEngine::new(48_000.0).unwrap();
        e.start();
        e.render_secs(0.05);
        e.stop();
        let tail = e.render_secs(0.3);
        assert!(peak(&tail) > 0.0);
        e.render_secs(1.5);
        assert_eq!(e.active_units(), 0);
        assert_eq!(peak(&e.render_secs(0.5)), 0.0);
    }

    #[test]
    fn restart_begins_a_fresh_bar_at_the_clock() {
        let mut e = BlockEngine::new(48_000.0).unwrap();
        e.start();
        e.render_secs(0.7);
        e.stop();
        e.render_secs(0.3);
        e.start();
        assert_eq!(e.slot().index(), 1);
        assert!((e.next_event_time() - (e.current_time() + 0.125)).abs() < 1e-9);
    }

    #[test]
    fn ragged_buffer_tail_is_zeroed() {
        let mut e = BlockEngine::new(48_000.0).unwrap();
        e.set_genre("Acoustic Rock");
        e.start();
        // Longer than one chunk, with one sample past the last whole stereo frame.
        let mut buf = vec![9.0_f32; 2 * 3000 + 1];
        e.render(&mut buf, 2);
        assert_eq!(*buf.last().unwrap(), 0.0);
        assert!(buf.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert_eq!(e.current_time(), 3000.0 / 48_000.0);
    }

    #[test]
    fn rejects_bad_sample_rates() {
        assert!(matches!(BlockEngine::new(0.0), Err(EngineError::InvalidSampleRate(_))));
        assert!(matches!(BlockEngine::new(f32::NAN), Err(EngineError::InvalidSampleRate(_))));
    }
}
