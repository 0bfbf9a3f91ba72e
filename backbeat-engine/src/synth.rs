//! Turns triggers into scheduled units on an [`AudioDevice`].
//!
//! Every voice is built and queued independently; a failure drops that voice only.

use tracing::debug;

use crate::clock::AudioTime;
use crate::device::AudioDevice;
use crate::error::SynthError;
use crate::graph::ScheduledUnit;
use crate::nodes::{Noise, Wave};
use crate::pattern::{Classification, Trigger, TriggerSet, Voice};
use crate::voices::{length_secs, Bass, Kick, NoiseBurst};

/// Bass waveform for a classification: smooth for lofi, bright otherwise.
#[inline]
pub fn bass_wave(class: Classification) -> Wave {
    if class == Classification::Lofi { Wave::Sine } else { Wave::Saw }
}

/// Build the unit for one trigger, starting at `at`.
pub fn build_unit(trigger: &Trigger, class: Classification, at: AudioTime) -> Result<ScheduledUnit, SynthError> {
    if !at.is_finite() {
        return Err(SynthError::InvalidTime(at));
    }
    let velocity = if trigger.velocity.is_finite() { trigger.velocity.clamp(0.0, 1.0) } else { 0.0 };
    let length = f64::from(length_secs(trigger.voice));

    let gen: Box<dyn crate::graph::Generator> = match trigger.voice {
        Voice::Kick => Box::new(Kick::new(velocity)),
        Voice::Snare => Box::new(NoiseBurst::snare(velocity, Noise::from_entropy())),
        Voice::ClosedHat => Box::new(NoiseBurst::hat(velocity, false, Noise::from_entropy())),
        Voice::OpenHat => Box::new(NoiseBurst::hat(velocity, true, Noise::from_entropy())),
        Voice::Bass => {
            let hz = trigger.pitch_hz.unwrap_or(class.bass_root_hz());
            if !hz.is_finite() || hz <= 0.0 {
                return Err(SynthError::InvalidFrequency(hz));
            }
            Box::new(Bass::new(hz, velocity, bass_wave(class)))
        }
    };

    Ok(ScheduledUnit::new(trigger.voice, velocity, at, length, gen))
}

/// Queue every trigger of `set` at `at`. Returns how many voices were queued.
pub fn schedule_set<D: AudioDevice + ?Sized>(
    device: &mut D,
    set: &TriggerSet,
    class: Classification,
    at: AudioTime,
) -> usize {
    let mut queued = 0;
    for trigger in set.iter() {
        match build_unit(trigger, class, at).and_then(|unit| device.schedule(unit)) {
            Ok(()) => queued += 1,
            Err(e) => debug!(voice = ?trigger.voice, at, error = %e, "voice dropped"),
        }
    }
    queued
}
