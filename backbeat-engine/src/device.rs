//! The output-device contract the scheduler and synthesizer rely on.

use crate::clock::AudioTime;
use crate::error::SynthError;
use crate::graph::ScheduledUnit;

/// An audio output that exposes a monotonic clock and accepts units to play
/// at future times on that clock.
pub trait AudioDevice: Send {
    /// Current time on the device clock, in seconds.
    fn current_time(&self) -> AudioTime;

    /// Output sample rate in Hz.
    fn sample_rate(&self) -> f32;

    /// Queue a unit. It starts at `unit.start` and is released after `unit.stop`.
    fn schedule(&mut self, unit: ScheduledUnit) -> Result<(), SynthError>;
}
