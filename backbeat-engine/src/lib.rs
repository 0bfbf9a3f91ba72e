//! Backbeat Engine: genre-aware drum and bass patterns on a lookahead scheduler.
//!
//! Crate layout:
//! - [`pattern`]   : genre classification and the 16-slot trigger table
//! - [`scheduler`] : lookahead `Sequencer` that queues slots ahead of the clock
//! - [`engine`]    : `Engine<D>`, the sequencer on its own wake-up thread
//! - [`block`]     : `BlockEngine`, the sequencer ticked from a host render call
//! - [`voices`]    : kick, snare, hi-hats and bass as `Generator`s
//! - [`mixer`]     : sample-accurate mixer fed through a lock-free queue
//! - [`output`]    : CPAL output stream (feature `realtime`)
//!
//! Audio-thread code never locks and never allocates once the mixer is built;
//! units are boxed on the scheduling side and freed when they finish.

pub mod block;
pub mod clock;
pub mod device;
pub mod engine;
pub mod error;
pub mod graph;
pub mod mixer;
pub mod nodes;
pub mod params;
pub mod pattern;
pub mod scheduler;
pub mod synth;
pub mod voices;

#[cfg(feature = "realtime")]
pub mod output;

#[cfg(test)]
mod test_support;

pub use block::BlockEngine;
pub use clock::{AudioClock, AudioTime};
pub use device::AudioDevice;
pub use engine::Engine;
pub use error::{EngineError, EngineResult, SynthError};
pub use graph::{Generator, ScheduledUnit};
pub use mixer::{Mixer, MixerLink};
pub use params::{Params, DEFAULT_GENRE, DEFAULT_TEMPO_BPM};
pub use pattern::{BassRoot, Classification, Slot, Trigger, TriggerSet, Voice};
pub use scheduler::SchedulerConfig;

#[cfg(feature = "realtime")]
pub use output::{list_output_devices, CpalOutput, OutputOptions};
