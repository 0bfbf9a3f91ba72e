//! Realtime engine: the scheduler driven by its own wake-up thread.
//!
//! One worker thread lives as long as the engine. While a session runs it wakes
//! every `wake_interval` and ticks the [`Sequencer`]; while stopped it sleeps on a
//! condition variable. Ticks and `start`/`stop` take the same lock, so at most one
//! tick runs at a time and no tick runs after `stop` returns.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::clock::AudioTime;
use crate::device::AudioDevice;
use crate::error::{EngineError, EngineResult};
use crate::params::{Params, MAX_TEMPO_BPM};
use crate::pattern::{Classification, Slot};
use crate::scheduler::{SchedulerConfig, Sequencer};

struct State<D> {
    running: bool,
    shutdown: bool,
    device: D,
    sequencer: Sequencer,
}

impl<D: AudioDevice> State<D> {
    #[inline]
    fn tick(&mut self, params: &Params) -> usize {
        self.sequencer.tick(&mut self.device, params)
    }
}

struct Shared<D> {
    params: Params,
    state: Mutex<State<D>>,
    wake: Condvar,
    wake_interval: Duration,
}

impl<D> Shared<D> {
    fn lock(&self) -> MutexGuard<'_, State<D>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drum and bass engine bound to one output device.
pub struct Engine<D: AudioDevice + 'static> {
    shared: Arc<Shared<D>>,
    worker: Option<JoinHandle<()>>,
}

impl<D: AudioDevice + 'static> Engine<D> {
    /// Engine with the default scheduler timing.
    pub fn new(device: D) -> EngineResult<Self> {
        Self::with_config(device, SchedulerConfig::default())
    }

    /// Fails if the device reports an unusable sample rate or the worker cannot start.
    pub fn with_config(device: D, config: SchedulerConfig) -> EngineResult<Self> {
        let sr = device.sample_rate();
        if !sr.is_finite() || sr <= 0.0 {
            return Err(EngineError::InvalidSampleRate(sr));
        }
        let sequencer = Sequencer::new(config);
        let wake_interval = sequencer.config().wake_interval;
        let shared = Arc::new(Shared {
            params: Params::default(),
            state: Mutex::new(State { running: false, shutdown: false, device, sequencer }),
            wake: Condvar::new(),
            wake_interval,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("backbeat-scheduler".into())
            .spawn(move || run_worker(&worker_shared))?;

        debug!(sample_rate = sr, ?wake_interval, "engine ready");
        Ok(Self { shared, worker: Some(worker) })
    }

    /// Begin a session at the current device time. No-op while running.
    pub fn start(&self) {
        let mut state = self.shared.lock();
        if state.running || state.shutdown {
            return;
        }
        state.running = true;
        let now = state.device.current_time();
        state.sequencer.restart(now);
        let queued = state.tick(&self.shared.params);
        drop(state);
        self.shared.wake.notify_all();

        info!(
            at = now,
            tempo = self.shared.params.tempo(),
            genre = %self.shared.params.genre(),
            queued,
            "playback started"
        );
    }

    /// Stop queueing new slots. Sounds already queued play out. No-op while stopped.
    pub fn stop(&self) {
        let mut state = self.shared.lock();
        if !state.running {
            return;
        }
        state.running = false;
        drop(state);
        self.shared.wake.notify_all();
        info!("playback stopped");
    }

    /// Takes effect on the next slot. Non-finite or non-positive tempos select
    /// 120 BPM; tempos above [`MAX_TEMPO_BPM`] are clamped to it, which bounds the
    /// number of slots one tick can queue.
    pub fn set_tempo(&self, bpm: f32) {
        self.shared.params.set_tempo(bpm);
    }

    /// Takes effect on the next slot. Unknown labels fall back to the default pattern.
    pub fn set_genre(&self, label: impl Into<String>) {
        self.shared.params.set_genre(label);
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    pub fn tempo(&self) -> f32 {
        self.shared.params.tempo()
    }

    pub fn genre(&self) -> Arc<String> {
        self.shared.params.genre()
    }

    pub fn classification(&self) -> Classification {
        self.shared.params.classification()
    }

    /// Next slot to be queued.
    pub fn slot(&self) -> Slot {
        self.shared.lock().sequencer.slot()
    }

    /// Device time of the next slot to be queued.
    pub fn next_event_time(&self) -> AudioTime {
        self.shared.lock().sequencer.next_event_time()
    }

    pub fn current_time(&self) -> AudioTime {
        self.shared.lock().device.current_time()
    }
}

impl<D: AudioDevice + 'static> Drop for Engine<D> {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.running = false;
            state.shutdown = true;
        }
        self.shared.wake.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker<D: AudioDevice>(shared: &Shared<D>) {
    let mut state = shared.lock();
    loop {
        if state.shutdown {
            break;
        }
        if !state.running {
            state = shared.wake.wait(state).unwrap_or_else(PoisonError::into_inner);
            continue;
        }
        state = shared
            .wake
            .wait_timeout(state, shared.wake_interval)
            .unwrap_or_else(PoisonError::into_inner)
            .0;
        if state.running && !state.shutdown {
            state.tick(&shared.params);
        }
    }
}
