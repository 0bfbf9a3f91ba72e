//! C ABI wrapper for the Backbeat engine.
//!
//! The host owns the audio callback and pulls interleaved f32 frames; the
//! scheduler runs inside each render call, so no extra thread is created.
//!
//! ABI notes
//! - Opaque handle type: `BackbeatEngine` (heap-allocated; free it with `backbeat_destroy`).
//! - Null handles are ignored by every function.
//! - Render path produces **mono** internally and duplicates to N channels.
//!
//! Threading
//! - The object is NOT thread-safe; call all functions from the same thread, or
//!   serialise access on the host side.

use std::ffi::{c_char, CStr};

use backbeat_engine::BlockEngine;
use tracing::warn;

/// Opaque engine handle.
pub struct BackbeatEngine {
    inner: BlockEngine,
}

/// Borrow the engine behind `engine`, or `None` for null.
///
/// # Safety
/// `engine` must be null or a live pointer from `backbeat_create`.
unsafe fn engine_mut<'a>(engine: *mut BackbeatEngine) -> Option<&'a mut BackbeatEngine> {
    engine.as_mut()
}

// --- Creation / destruction -------------------------------------------------------

/// Create a stopped engine with tempo 120 BPM and genre "Pop".
/// Returns null if `sample_rate` is not a positive finite number.
#[no_mangle]
pub extern "C" fn backbeat_create(sample_rate: f32) -> *mut BackbeatEngine {
    match BlockEngine::new(sample_rate) {
        Ok(inner) => Box::into_raw(Box::new(BackbeatEngine { inner })),
        Err(e) => {
            warn!("backbeat_create: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Destroy an engine previously returned by `backbeat_create`.
///
/// # Safety
/// `engine` must be null or a pointer from `backbeat_create` not yet destroyed.
#[no_mangle]
pub unsafe extern "C" fn backbeat_destroy(engine: *mut BackbeatEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

// --- Transport --------------------------------------------------------------------

/// Begin playback at the engine's current time. No-op while playing.
///
/// # Safety
/// `engine` must be null or a live pointer from `backbeat_create`.
#[no_mangle]
pub unsafe extern "C" fn backbeat_start(engine: *mut BackbeatEngine) {
    if let Some(e) = engine_mut(engine) {
        e.inner.start();
    }
}

/// Stop queueing new slots; queued sounds ring out in later renders.
///
/// # Safety
/// `engine` must be null or a live pointer from `backbeat_create`.
#[no_mangle]
pub unsafe extern "C" fn backbeat_stop(engine: *mut BackbeatEngine) {
    if let Some(e) = engine_mut(engine) {
        e.inner.stop();
    }
}

/// 1 while playing, 0 otherwise (including for null).
///
/// # Safety
/// `engine` must be null or a live pointer from `backbeat_create`.
#[no_mangle]
pub unsafe extern "C" fn backbeat_is_running(engine: *mut BackbeatEngine) -> u32 {
    engine_mut(engine).map_or(0, |e| u32::from(e.inner.is_running()))
}

// --- Parameters -------------------------------------------------------------------

/// Tempo in BPM. Non-positive or non-finite values select 120.
///
/// # Safety
/// `engine` must be null or a live pointer from `backbeat_create`.
#[no_mangle]
pub unsafe extern "C" fn backbeat_set_tempo(engine: *mut BackbeatEngine, bpm: f32) {
    if let Some(e) = engine_mut(engine) {
        e.inner.set_tempo(bpm);
    }
}

/// Genre label as a NUL-terminated UTF-8 string. Null or invalid UTF-8 is ignored.
///
/// # Safety
/// `engine` must be null or a live pointer from `backbeat_create`; `genre` must be
/// null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn backbeat_set_genre(engine: *mut BackbeatEngine, genre: *const c_char) {
    let Some(e) = engine_mut(engine) else { return };
    if genre.is_null() {
        return;
    }
    match CStr::from_ptr(genre).to_str() {
        Ok(label) => e.inner.set_genre(label),
        Err(err) => warn!("backbeat_set_genre: {err}"),
    }
}

/// Output gain, clamped to [0, 4]; non-finite resets to 1.
///
/// # Safety
/// `engine` must be null or a live pointer from `backbeat_create`.
#[no_mangle]
pub unsafe extern "C" fn backbeat_set_gain(engine: *mut BackbeatEngine, gain: f32) {
    if let Some(e) = engine_mut(engine) {
        e.inner.set_gain(gain);
    }
}

// --- Rendering --------------------------------------------------------------------

/// Render `frames` of audio into an interleaved f32 buffer with `channels` channels.
/// Returns the number of frames rendered (0 on error).
///
/// # Safety
/// `engine` must be null or a live pointer from `backbeat_create`; `out_interleaved`
/// must be null or valid for `frames * channels` writes.
#[no_mangle]
pub unsafe extern "C" fn backbeat_render_interleaved_f32(
    engine: *mut BackbeatEngine,
    out_interleaved: *mut f32,
    frames: u32,
    channels: u32,
) -> u32 {
    let Some(e) = engine_mut(engine) else { return 0 };
    if out_interleaved.is_null() || frames == 0 || channels == 0 {
        return 0;
    }
    let ch = channels as usize;
    let out = std::slice::from_raw_parts_mut(out_interleaved, frames as usize * ch);
    e.inner.render(out, ch);
    frames
}
